use anyhow::{Context, Result};
use glob::glob;
use rayon::prelude::*;
use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use crate::{config::NamingStrategy, table::ClimateTable};

/// What we found for one expected output file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCheck {
    pub year: i32,
    pub path: PathBuf,
    /// `None` when the file is missing.
    pub rows: Option<usize>,
    pub headers_match: bool,
}

impl FileCheck {
    pub fn is_ok(&self, expected_rows: usize) -> bool {
        self.rows == Some(expected_rows) && self.headers_match
    }
}

pub fn check_year_file(source: &ClimateTable, year: i32, path: &Path) -> Result<FileCheck> {
    if !path.exists() {
        return Ok(FileCheck {
            year,
            path: path.to_path_buf(),
            rows: None,
            headers_match: false,
        });
    }
    let table = ClimateTable::read_csv(path)?;
    Ok(FileCheck {
        year,
        path: path.to_path_buf(),
        rows: Some(table.rows.len()),
        headers_match: table.headers == source.headers,
    })
}

/// Check every expected year file in parallel, in year order.
pub fn check_outputs(
    source: &ClimateTable,
    naming: &NamingStrategy,
    years: RangeInclusive<i32>,
    output_dir: &Path,
) -> Result<Vec<FileCheck>> {
    let years: Vec<i32> = years.collect();
    years
        .par_iter()
        .map(|&year| {
            let path = output_dir.join(naming.output_filename(year));
            check_year_file(source, year, &path)
                .with_context(|| format!("checking {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()
}

/// Files in `output_dir` that match the naming template but fall outside `years`.
pub fn find_stray_outputs(
    output_dir: &Path,
    naming: &NamingStrategy,
    years: RangeInclusive<i32>,
) -> Result<Vec<PathBuf>> {
    let re = naming.output_regex()?;
    let pattern = format!("{}/*.csv", output_dir.display());
    let mut stray = Vec::new();
    for path in glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
    {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = re.captures(name) {
            let in_range = caps[1]
                .parse::<i32>()
                .map(|y| years.contains(&y))
                .unwrap_or(false);
            if !in_range {
                stray.push(path);
            }
        }
    }
    stray.sort();
    Ok(stray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use std::fs;
    use tempfile::tempdir;

    fn source() -> ClimateTable {
        ClimateTable {
            headers: vec!["latitude".into(), "t2m".into(), "valid_time".into()],
            rows: vec![
                vec!["0".into(), "1.0".into(), "2024-01-01".into()],
                vec!["10".into(), "2.0".into(), "2024-01-01".into()],
            ],
        }
    }

    #[test]
    fn test_check_outputs_flags_missing_and_short_files() -> Result<()> {
        let dir = tempdir()?;
        let naming = NamingStrategy::for_resolution(Resolution::HalfDegree);
        let source = source();

        source.write_csv(dir.path().join(naming.output_filename(2025)))?;
        let mut short = source.clone();
        short.rows.pop();
        short.write_csv(dir.path().join(naming.output_filename(2026)))?;

        let checks = check_outputs(&source, &naming, 2025..=2027, dir.path())?;
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[0].year, 2025);
        assert!(checks[0].is_ok(2));
        assert_eq!(checks[1].rows, Some(1));
        assert!(!checks[1].is_ok(2));
        assert_eq!(checks[2].rows, None);
        Ok(())
    }

    #[test]
    fn test_header_mismatch_is_flagged() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("2025_data_january.csv");
        let mut renamed = source();
        renamed.headers[1] = "t2m_adjusted".into();
        renamed.write_csv(&path)?;

        let check = check_year_file(&source(), 2025, &path)?;
        assert_eq!(check.rows, Some(2));
        assert!(!check.headers_match);
        Ok(())
    }

    #[test]
    fn test_find_stray_outputs() -> Result<()> {
        let dir = tempdir()?;
        let naming = NamingStrategy::for_resolution(Resolution::High);
        for name in [
            "2024_data_january.csv",
            "2030_data_january.csv",
            "2050_data_january.csv",
            "2050_data_january_05res.csv",
            "notes.csv",
        ] {
            fs::write(dir.path().join(name), "a\n1\n")?;
        }

        let stray = find_stray_outputs(dir.path(), &naming, 2025..=2045)?;
        let names: Vec<_> = stray
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["2024_data_january.csv", "2050_data_january.csv"]);
        Ok(())
    }
}
