use super::ClimateTable;

/// Replace every occurrence of `source_year` in `value` with `year`.
///
/// All matches are rewritten, so a cell like `"2024-01-01 (2024 run)"` becomes
/// `"2031-01-01 (2031 run)"`.
pub fn restamp(value: &str, source_year: &str, year: i32) -> String {
    value.replace(source_year, &year.to_string())
}

/// Apply [`restamp`] to the flagged columns of every row.
pub fn apply_year_stamp(
    table: &mut ClimateTable,
    stamp_columns: &[usize],
    source_year: &str,
    year: i32,
) {
    if stamp_columns.is_empty() {
        return;
    }

    for row in table.rows.iter_mut() {
        for &idx in stamp_columns {
            if let Some(cell) = row.get_mut(idx) {
                if cell.contains(source_year) {
                    *cell = restamp(cell, source_year, year);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restamp_date() {
        assert_eq!(restamp("2024-01-15", "2024", 2031), "2031-01-15");
        assert_eq!(restamp("2023-12-31", "2024", 2031), "2023-12-31");
    }

    #[test]
    fn test_restamp_replaces_all() {
        assert_eq!(
            restamp("2024-01-01 (from 2024 run)", "2024", 2040),
            "2040-01-01 (from 2040 run)"
        );
    }

    #[test]
    fn test_apply_only_touches_flagged_columns() {
        let mut table = ClimateTable {
            headers: vec!["valid_time".into(), "source".into()],
            rows: vec![
                vec!["2024-01-01".into(), "era5 2024".into()],
                vec!["2024-02-01".into(), "era5 2024".into()],
            ],
        };
        apply_year_stamp(&mut table, &[0], "2024", 2027);
        assert_eq!(table.rows[0], vec!["2027-01-01", "era5 2024"]);
        assert_eq!(table.rows[1], vec!["2027-02-01", "era5 2024"]);

        apply_year_stamp(&mut table, &[1], "2024", 2027);
        assert_eq!(table.rows[1], vec!["2027-02-01", "era5 2027"]);
    }
}
