use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::food::{pie_slices, Nutrient, PieSlice};

#[derive(Debug, Error)]
pub enum DataVizError {
    #[error("a table needs a label column and at least one value column")]
    NoMetricColumns,

    #[error("table has no rows")]
    NoRows,

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, expected: usize, found: usize },

    #[error("row {row}, column {column:?} is empty")]
    EmptyCell { row: usize, column: String },

    #[error("row {row}, column {column:?}: {value:?} is not a whole number")]
    NotDigits { row: usize, column: String, value: String },

    #[error("no value column named {0:?}")]
    UnknownColumn(String),

    #[error("unsupported table file {0:?}, use .csv or .toml")]
    UnknownFormat(String),

    #[error("table is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartType {
    #[default]
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub label: String,
    pub values: Vec<u64>,
}

/// First column holds row labels, every other column a non-negative integer
/// series. Only fully filled tables are accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<DataRow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TomlCell {
    Int(i64),
    Text(String),
}

impl TomlCell {
    fn into_text(self) -> String {
        match self {
            TomlCell::Int(v) => v.to_string(),
            TomlCell::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct TomlTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<TomlCell>>,
}

fn parse_count(raw: &str, row: usize, column: &str) -> Result<u64, DataVizError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DataVizError::EmptyCell {
            row,
            column: column.to_string(),
        });
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DataVizError::NotDigits {
            row,
            column: column.to_string(),
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| DataVizError::NotDigits {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

impl DataTable {
    /// Builds a table from header names and raw string cells. Rows are
    /// numbered from 1 in errors.
    pub fn from_cells(columns: Vec<String>, cells: Vec<Vec<String>>) -> Result<Self, DataVizError> {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();
        if columns.len() < 2 || columns.iter().any(|c| c.is_empty()) {
            return Err(DataVizError::NoMetricColumns);
        }
        if cells.is_empty() {
            return Err(DataVizError::NoRows);
        }

        let mut rows = Vec::with_capacity(cells.len());
        for (i, raw) in cells.into_iter().enumerate() {
            let row = i + 1;
            if raw.len() != columns.len() {
                return Err(DataVizError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: raw.len(),
                });
            }
            let label = raw[0].trim().to_string();
            if label.is_empty() {
                return Err(DataVizError::EmptyCell {
                    row,
                    column: columns[0].clone(),
                });
            }
            let values = raw[1..]
                .iter()
                .zip(&columns[1..])
                .map(|(cell, column)| parse_count(cell, row, column))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(DataRow { label, values });
        }
        Ok(Self { columns, rows })
    }

    /// Header line then one row per line, comma separated. Blank lines are
    /// skipped; quoting is not supported.
    pub fn from_csv(text: &str) -> Result<Self, DataVizError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let split = |line: &str| line.split(',').map(|c| c.trim().to_string()).collect::<Vec<_>>();
        let Some(header) = lines.next() else {
            return Err(DataVizError::NoMetricColumns);
        };
        let columns = split(header);
        let cells = lines.map(split).collect();
        Self::from_cells(columns, cells)
    }

    /// `columns = [...]` plus `rows = [[...], ...]`; value cells may be
    /// integers or digit strings.
    pub fn from_toml(text: &str) -> Result<Self, DataVizError> {
        let raw: TomlTable = toml::from_str(text)?;
        let cells = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(TomlCell::into_text).collect())
            .collect();
        Self::from_cells(raw.columns, cells)
    }

    /// Picks the parser from the file extension.
    pub fn parse_file(path: &Path, text: &str) -> Result<Self, DataVizError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::from_csv(text),
            "toml" => Self::from_toml(text),
            _ => Err(DataVizError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn label_column(&self) -> &str {
        &self.columns[0]
    }

    pub fn metric_columns(&self) -> &[String] {
        &self.columns[1..]
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.label.clone()).collect()
    }

    /// Index into `DataRow::values`. `None` selects the first value column.
    pub fn metric_index(&self, column: Option<&str>) -> Result<usize, DataVizError> {
        let Some(name) = column else {
            return Ok(0);
        };
        self.metric_columns()
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DataVizError::UnknownColumn(name.to_string()))
    }

    /// Per-row value groups, one entry per value column, in row order.
    pub fn groups(&self) -> Vec<Vec<u64>> {
        self.rows.iter().map(|r| r.values.clone()).collect()
    }

    /// One column as pie slices keyed by row label, largest first, with the
    /// tail folded into an `Other` slice past `max_slices`.
    pub fn pie_shares(&self, column: Option<&str>, max_slices: usize) -> Result<Vec<PieSlice>, DataVizError> {
        let idx = self.metric_index(column)?;
        let entries: Vec<Nutrient> = self
            .rows
            .iter()
            .map(|r| Nutrient {
                key: r.label.clone(),
                value: r.values[idx] as f64,
            })
            .collect();
        Ok(pie_slices(&entries, max_slices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES_CSV: &str = "Region, Sales, Returns\nNorth, 120, 4\n\nSouth, 80, 10\nEast, 40, 2\n";

    #[test]
    fn test_csv_parses_labels_and_values() {
        let t = DataTable::from_csv(SALES_CSV).unwrap();
        assert_eq!(t.label_column(), "Region");
        assert_eq!(t.metric_columns(), ["Sales", "Returns"]);
        assert_eq!(t.labels(), ["North", "South", "East"]);
        assert_eq!(t.groups(), vec![vec![120, 4], vec![80, 10], vec![40, 2]]);
    }

    #[test]
    fn test_toml_accepts_integers_and_digit_strings() {
        let t = DataTable::from_toml(
            r#"
            columns = ["Region", "Sales"]
            rows = [["North", 120], ["South", "80"]]
            "#,
        )
        .unwrap();
        assert_eq!(t.groups(), vec![vec![120], vec![80]]);
    }

    #[test]
    fn test_label_only_table_is_rejected() {
        assert!(matches!(
            DataTable::from_csv("Region\nNorth\n"),
            Err(DataVizError::NoMetricColumns)
        ));
        assert!(matches!(DataTable::from_csv(""), Err(DataVizError::NoMetricColumns)));
    }

    #[test]
    fn test_header_without_rows_is_rejected() {
        assert!(matches!(DataTable::from_csv("Region,Sales\n"), Err(DataVizError::NoRows)));
        assert!(matches!(
            DataTable::from_toml(r#"columns = ["Region", "Sales"]"#),
            Err(DataVizError::NoRows)
        ));
    }

    #[test]
    fn test_blank_and_non_digit_cells_are_rejected() {
        match DataTable::from_csv("Region,Sales\nNorth,\n") {
            Err(DataVizError::EmptyCell { row, column }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "Sales");
            }
            other => panic!("unexpected {other:?}"),
        }
        for bad in ["-3", "1.5", "12a"] {
            let err = DataTable::from_csv(&format!("Region,Sales\nNorth,{bad}\n")).unwrap_err();
            assert!(matches!(err, DataVizError::NotDigits { .. }), "{bad}: {err}");
        }
        let err = DataTable::from_toml(r#"columns = ["R", "S"]
rows = [["a", -1]]"#)
        .unwrap_err();
        assert!(matches!(err, DataVizError::NotDigits { .. }));
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = DataTable::from_csv("Region,Sales,Returns\nNorth,1\n").unwrap_err();
        assert_eq!(err.to_string(), "row 1 has 2 cells, expected 3");
    }

    #[test]
    fn test_format_follows_extension() {
        assert!(DataTable::parse_file(Path::new("sales.CSV"), SALES_CSV).is_ok());
        assert!(matches!(
            DataTable::parse_file(Path::new("sales.xlsx"), SALES_CSV),
            Err(DataVizError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_pie_shares_use_selected_column() {
        let t = DataTable::from_csv(SALES_CSV).unwrap();
        let by_sales: Vec<(String, f64)> = t
            .pie_shares(None, 6)
            .unwrap()
            .into_iter()
            .map(|s| (s.label, s.value))
            .collect();
        assert_eq!(
            by_sales,
            [("North".to_string(), 120.0), ("South".to_string(), 80.0), ("East".to_string(), 40.0)]
        );

        let by_returns = t.pie_shares(Some("returns"), 2).unwrap();
        assert_eq!(by_returns[0].label, "South");
        assert_eq!(by_returns[1].label, "Other");
        assert_eq!(by_returns[1].value, 6.0);

        assert!(matches!(t.pie_shares(Some("Profit"), 6), Err(DataVizError::UnknownColumn(_))));
    }
}
