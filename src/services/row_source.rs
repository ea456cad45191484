use async_trait::async_trait;

use crate::domain::row::Row;
use crate::error::AppResult;

#[async_trait]
pub trait RowSource: Send + Sync {
    /// All data rows in table order, without the leading header row.
    async fn read_rows(&self) -> AppResult<Vec<Row>>;
}
