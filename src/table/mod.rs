use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};
use tracing::debug;

pub mod stamp;

pub use stamp::{apply_year_stamp, restamp};

/// A CSV file held in memory as text cells.
///
/// Cells stay as the strings read from disk, so columns the generator does not
/// touch are written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateTable {
    /// Column names from the header row, in file order.
    pub headers: Vec<String>,
    /// One entry per data row, one string per column.
    pub rows: Vec<Vec<String>>,
}

impl ClimateTable {
    /// Read a headed CSV file. Ragged rows are a parse error.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open CSV file: {:?}", path))?;
        let table = Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read CSV file: {:?}", path))?;
        debug!(
            path = %path.display(),
            rows = table.rows.len(),
            columns = table.headers.len(),
            "loaded table"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("CSV parse error in header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("creating file {}", path.display()))?;
        self.to_writer(BufWriter::new(file))
            .with_context(|| format!("writing CSV file {}", path.display()))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("column '{}' not found in {:?}", name, self.headers))
    }

    /// Parse every cell of column `idx` as a float.
    pub fn numeric_column(&self, idx: usize) -> Result<Vec<f64>> {
        let name = self.headers.get(idx).map(String::as_str).unwrap_or("?");
        self.rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let cell = row.get(idx).map(String::as_str).unwrap_or("");
                parse_numeric_cell(cell)
                    .with_context(|| format!("column '{}' at record {}", name, row_idx))
            })
            .collect()
    }

    /// Overwrite column `idx` with formatted floats. `values` must have one entry per row.
    pub fn set_numeric_column(&mut self, idx: usize, values: &[f64]) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(anyhow!(
                "expected {} values for column {}, got {}",
                self.rows.len(),
                idx,
                values.len()
            ));
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            if let Some(cell) = row.get_mut(idx) {
                *cell = format_numeric_cell(*value);
            }
        }
        Ok(())
    }
}

/// Empty cells are missing values and read as NaN; anything else must parse.
pub fn parse_numeric_cell(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .with_context(|| format!("non-numeric value '{}'", raw))
}

/// NaN writes back as an empty cell; everything else uses shortest round-trip form.
pub fn format_numeric_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:?}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    const SAMPLE: &str = "valid_time,latitude,longitude,t2m\n\
2024-01-01,0.0,10.0,10.0\n\
2024-01-01,45.5,10.0,-3.25\n\
2024-01-01,-90.0,10.0,\n";

    #[test]
    fn test_read_sample() -> Result<()> {
        let table = ClimateTable::from_reader(Cursor::new(SAMPLE))?;
        assert_eq!(table.headers, vec!["valid_time", "latitude", "longitude", "t2m"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.column_index("t2m")?, 3);

        let t2m = table.numeric_column(3)?;
        assert_eq!(t2m[0], 10.0);
        assert_eq!(t2m[1], -3.25);
        assert!(t2m[2].is_nan());
        Ok(())
    }

    #[test]
    fn test_missing_column_is_error() {
        let table = ClimateTable::from_reader(Cursor::new(SAMPLE)).unwrap();
        let err = table.column_index("t2m_kelvin").unwrap_err();
        assert!(err.to_string().contains("t2m_kelvin"));
    }

    #[test]
    fn test_non_numeric_cell_is_error() {
        let table =
            ClimateTable::from_reader(Cursor::new("latitude,t2m\nnorth,1.0\n")).unwrap();
        let err = table.numeric_column(0).unwrap_err();
        assert!(format!("{:#}", err).contains("north"));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let res = ClimateTable::from_reader(Cursor::new("latitude,t2m\n1.0,2.0,3.0\n"));
        assert!(res.is_err());
    }

    #[test]
    fn test_set_numeric_column_formats() -> Result<()> {
        let mut table = ClimateTable::from_reader(Cursor::new(SAMPLE))?;
        table.set_numeric_column(3, &[11.0, -3.5, f64::NAN])?;
        assert_eq!(table.rows[0][3], "11.0");
        assert_eq!(table.rows[1][3], "-3.5");
        assert_eq!(table.rows[2][3], "");
        assert!(table.set_numeric_column(3, &[1.0]).is_err());
        Ok(())
    }

    #[test]
    fn test_write_then_read_keeps_untouched_cells() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        let table = ClimateTable::from_reader(Cursor::new(
            "valid_time,latitude,note\n2024-01-01,0.50,\"a, quoted\"\n",
        ))?;
        table.write_csv(&path)?;

        let back = ClimateTable::read_csv(&path)?;
        assert_eq!(back, table);
        assert_eq!(back.rows[0][1], "0.50");
        assert_eq!(back.rows[0][2], "a, quoted");
        Ok(())
    }
}
