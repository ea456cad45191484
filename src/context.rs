use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{DocumentSink, RowSource};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub row_source: Arc<dyn RowSource>,
    pub document_sink: Arc<dyn DocumentSink>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        row_source: Arc<dyn RowSource>,
        document_sink: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            config,
            row_source,
            document_sink,
        }
    }
}
