use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::row::{CellValue, Row};
use crate::error::{AppError, AppResult};
use crate::services::RowSource;

/// Reads rows from a local JSON file holding an array of row arrays, header first.
pub struct JsonRowsFile {
    path: PathBuf,
}

impl JsonRowsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RowSource for JsonRowsFile {
    async fn read_rows(&self) -> AppResult<Vec<Row>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            AppError::SourceUnavailable(format!("cannot read {}: {err}", self.path.display()))
        })?;
        let table: Vec<Vec<Value>> = serde_json::from_str(&contents).map_err(|err| {
            AppError::SourceUnavailable(format!(
                "{} is not an array of rows: {err}",
                self.path.display()
            ))
        })?;

        let rows = data_rows(table);
        info!(path = %self.path.display(), rows = rows.len(), "read ticket rows from file");
        Ok(rows)
    }
}

/// Drops the header row and converts the remaining JSON cells.
pub(crate) fn data_rows(table: Vec<Vec<Value>>) -> Vec<Row> {
    table
        .into_iter()
        .skip(1)
        .map(|cells| Row::new(cells.into_iter().map(cell_from_json).collect()))
        .collect()
}

pub(crate) fn cell_from_json(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(flag) => CellValue::Bool(flag),
        Value::Number(number) => number
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(number.to_string())),
        Value::String(text) => CellValue::Text(text),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn converts_json_cells() {
        assert_eq!(cell_from_json(json!(null)), CellValue::Empty);
        assert_eq!(cell_from_json(json!(42)), CellValue::Number(42.0));
        assert_eq!(cell_from_json(json!(false)), CellValue::Bool(false));
        assert_eq!(
            cell_from_json(json!("Acme")),
            CellValue::Text("Acme".to_string())
        );
    }

    #[tokio::test]
    async fn skips_header_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tickets.json");
        std::fs::write(
            &path,
            r#"[["ID", "Summary", "Org"], [1, "A", "Acme"], [2, "B"]]"#,
        )
        .unwrap();

        let rows = JsonRowsFile::new(path).read_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(0), &CellValue::Number(1.0));
        assert_eq!(rows[1].cell(2), &CellValue::Empty);
    }

    #[tokio::test]
    async fn header_only_file_has_no_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tickets.json");
        std::fs::write(&path, r#"[["ID"]]"#).unwrap();

        let rows = JsonRowsFile::new(path).read_rows().await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = JsonRowsFile::new(dir.path().join("absent.json"))
            .read_rows()
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tickets.json");
        std::fs::write(&path, r#"{"rows": []}"#).unwrap();

        let err = JsonRowsFile::new(path).read_rows().await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }
}
