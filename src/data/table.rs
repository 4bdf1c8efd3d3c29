//! Table Module
//! Turns DataFrames into display rows and writes them out as CSV.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Polars(#[from] PolarsError),
}

/// Display-ready copy of a DataFrame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// Format every cell of `df`. Floats get three decimals.
    pub fn from_dataframe(df: &DataFrame) -> Self {
        let columns = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = (0..df.height())
            .map(|i| {
                df.get_columns()
                    .iter()
                    .map(|col| col.get(i).map(|v| format_cell(&v)).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{:.3}", v),
        AnyValue::Float32(v) => format!("{:.3}", v),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

/// Write `df` to `path` as CSV with a header row.
pub fn export_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut df = df.clone();
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;

    tracing::info!(path = %path.display(), rows = df.height(), "exported table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Column::new("stage".into(), ["访问", "注册"]),
            Column::new("users".into(), [1000.0, 812.5]),
            Column::new("rank".into(), [1i64, 2]),
        ])
        .unwrap()
    }

    #[test]
    fn view_formats_cells() {
        let view = TableView::from_dataframe(&sample());
        assert_eq!(view.columns, ["stage", "users", "rank"]);
        assert_eq!(view.row_count(), 2);
        assert_eq!(view.rows[0], ["访问", "1000.000", "1"]);
        assert_eq!(view.rows[1], ["注册", "812.500", "2"]);
    }

    #[test]
    fn view_formats_dates() {
        let date = Column::new("date".into(), [19_358i32])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![date]).unwrap();
        let view = TableView::from_dataframe(&df);
        assert_eq!(view.rows[0][0], "2023-01-01");
    }

    #[test]
    fn csv_roundtrip_header_and_rows() {
        let path = std::env::temp_dir().join(format!("chart_gallery_export_{}.csv", std::process::id()));
        export_csv(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("stage,users,rank"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("访问"));
    }

    #[test]
    fn export_to_missing_dir_fails() {
        let err = export_csv(&sample(), Path::new("/nonexistent/dir/out.csv")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
