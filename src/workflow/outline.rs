use tracing::info;

use crate::context::AppContext;
use crate::domain::grouping::group;
use crate::domain::link::LinkTemplate;
use crate::domain::outline::{OutlineNode, render};
use crate::error::{AppError, AppResult};
use crate::services::{DocumentSink, ItemStyle, PublishedDocument};

pub struct OutlineWorkflowOutcome {
    pub document: PublishedDocument,
    pub organizations: usize,
    pub tickets: usize,
}

/// Reads every row, groups by organization, renders and writes one fresh outline.
pub async fn generate_outline(
    ctx: &AppContext,
    title_override: Option<String>,
) -> AppResult<OutlineWorkflowOutcome> {
    let base_url = ctx
        .config
        .ticket_base_url
        .as_deref()
        .ok_or_else(|| AppError::Configuration("ticket base URL not configured".to_string()))?;
    let template = LinkTemplate::new(base_url);
    let title = title_override.unwrap_or_else(|| ctx.config.document_title.clone());

    let rows = ctx.row_source.read_rows().await?;

    let layout = ctx.config.columns;
    let grouped = group(rows, |row| layout.organization_name(row));
    if grouped.is_empty() {
        info!("no ticket rows found; writing an empty outline");
    } else {
        info!(
            organizations = grouped.len(),
            tickets = grouped.row_count(),
            "grouped ticket rows"
        );
    }

    let nodes = render(&grouped, &layout, |ticket_id| template.url_for(ticket_id));
    let document = write_outline(ctx.document_sink.as_ref(), &title, &nodes).await?;
    info!(document = %document.id, nodes = nodes.len(), "outline written");

    Ok(OutlineWorkflowOutcome {
        document,
        organizations: grouped.len(),
        tickets: grouped.row_count(),
    })
}

pub async fn write_outline(
    sink: &dyn DocumentSink,
    title: &str,
    nodes: &[OutlineNode],
) -> AppResult<PublishedDocument> {
    let document = sink.create_document(title).await?;

    for node in nodes {
        match node {
            OutlineNode::OrganizationHeader { name } => {
                sink.append_header_item(&document, name, ItemStyle::HEADER)
                    .await?;
            }
            OutlineNode::TicketEntry(entry) => {
                let item = sink
                    .append_entry_item(&document, &entry.text(), ItemStyle::ENTRY)
                    .await?;
                if let Some(span) = entry.link_span.filter(|span| !span.is_empty()) {
                    sink.set_hyperlink(&item, span.start, span.end_inclusive(), &entry.link_url)
                        .await?;
                }
            }
        }
    }

    sink.finish_document(&document).await
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{AppConfig, SinkConfig, SourceConfig};
    use crate::domain::row::{CellValue, ColumnLayout, Row};
    use crate::services::{DocumentHandle, EntryHandle, RowSource};

    const BASE_URL: &str = "https://support.example.com";

    struct StaticRows(Vec<Row>);

    #[async_trait]
    impl RowSource for StaticRows {
        async fn read_rows(&self) -> AppResult<Vec<Row>> {
            Ok(self.0.clone())
        }
    }

    struct UnavailableRows;

    #[async_trait]
    impl RowSource for UnavailableRows {
        async fn read_rows(&self) -> AppResult<Vec<Row>> {
            Err(AppError::SourceUnavailable("sheet deleted".to_string()))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SinkCall {
        Create(String),
        Header(String, ItemStyle),
        Entry(String, ItemStyle),
        Link(usize, usize, usize, String),
        Finish,
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<SinkCall>>,
        fail_appends: bool,
    }

    impl RecordingSink {
        fn record(&self, call: SinkCall) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len() - 1
        }

        fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentSink for RecordingSink {
        async fn create_document(&self, title: &str) -> AppResult<DocumentHandle> {
            self.record(SinkCall::Create(title.to_string()));
            Ok(DocumentHandle {
                id: "doc".to_string(),
                title: title.to_string(),
            })
        }

        async fn append_header_item(
            &self,
            _document: &DocumentHandle,
            text: &str,
            style: ItemStyle,
        ) -> AppResult<()> {
            if self.fail_appends {
                return Err(AppError::SinkWriteFailed("quota exceeded".to_string()));
            }
            self.record(SinkCall::Header(text.to_string(), style));
            Ok(())
        }

        async fn append_entry_item(
            &self,
            document: &DocumentHandle,
            text: &str,
            style: ItemStyle,
        ) -> AppResult<EntryHandle> {
            let index = self.record(SinkCall::Entry(text.to_string(), style));
            Ok(EntryHandle {
                document_id: document.id.clone(),
                index,
            })
        }

        async fn set_hyperlink(
            &self,
            entry: &EntryHandle,
            start: usize,
            end_inclusive: usize,
            url: &str,
        ) -> AppResult<()> {
            self.record(SinkCall::Link(
                entry.index,
                start,
                end_inclusive,
                url.to_string(),
            ));
            Ok(())
        }

        async fn finish_document(&self, document: &DocumentHandle) -> AppResult<PublishedDocument> {
            self.record(SinkCall::Finish);
            Ok(PublishedDocument {
                id: document.id.clone(),
                location: format!("memory://{}", document.id),
            })
        }
    }

    fn config(base_url: Option<&str>) -> AppConfig {
        AppConfig {
            source: SourceConfig::File("unused.json".into()),
            sink: SinkConfig::GoogleDocs,
            google_access_token: None,
            ticket_base_url: base_url.map(str::to_string),
            document_title: "Support Outline".to_string(),
            columns: ColumnLayout::default(),
        }
    }

    fn ticket(id: f64, summary: &str, org: &str) -> Row {
        let mut cells = vec![CellValue::Empty; 11];
        cells[0] = CellValue::Number(id);
        cells[6] = CellValue::Text(summary.to_string());
        cells[10] = CellValue::Text(org.to_string());
        Row::new(cells)
    }

    fn context(rows: Arc<dyn RowSource>, sink: Arc<RecordingSink>) -> AppContext {
        AppContext::new(config(Some(BASE_URL)), rows, sink)
    }

    #[tokio::test]
    async fn writes_grouped_outline_with_links() {
        let sink = Arc::new(RecordingSink::default());
        let rows = Arc::new(StaticRows(vec![
            ticket(1.0, "A", "Acme"),
            ticket(3.0, "C", "Globex"),
            ticket(2.0, "B", "Acme"),
        ]));
        let ctx = context(rows, sink.clone());

        let outcome = generate_outline(&ctx, None).await.unwrap();

        assert_eq!(outcome.organizations, 2);
        assert_eq!(outcome.tickets, 3);
        assert_eq!(outcome.document.location, "memory://doc");
        let url = |id: &str| format!("{BASE_URL}/agent/tickets/{id}");
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Create("Support Outline".to_string()),
                SinkCall::Header("Acme".to_string(), ItemStyle::HEADER),
                SinkCall::Entry("#1 - A".to_string(), ItemStyle::ENTRY),
                SinkCall::Link(2, 0, 1, url("1")),
                SinkCall::Entry("#2 - B".to_string(), ItemStyle::ENTRY),
                SinkCall::Link(4, 0, 1, url("2")),
                SinkCall::Header("Globex".to_string(), ItemStyle::HEADER),
                SinkCall::Entry("#3 - C".to_string(), ItemStyle::ENTRY),
                SinkCall::Link(7, 0, 1, url("3")),
                SinkCall::Finish,
            ]
        );
    }

    #[tokio::test]
    async fn empty_source_only_creates_document() {
        let sink = Arc::new(RecordingSink::default());
        let ctx = context(Arc::new(StaticRows(Vec::new())), sink.clone());

        let outcome = generate_outline(&ctx, Some("Empty".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.tickets, 0);
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Create("Empty".to_string()), SinkCall::Finish]
        );
    }

    #[tokio::test]
    async fn source_failure_aborts_before_writing() {
        let sink = Arc::new(RecordingSink::default());
        let ctx = context(Arc::new(UnavailableRows), sink.clone());

        let err = generate_outline(&ctx, None).await.err().unwrap();

        assert!(matches!(err, AppError::SourceUnavailable(_)));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn sink_failure_propagates() {
        let sink = Arc::new(RecordingSink {
            fail_appends: true,
            ..RecordingSink::default()
        });
        let ctx = context(Arc::new(StaticRows(vec![ticket(1.0, "A", "Acme")])), sink.clone());

        let err = generate_outline(&ctx, None).await.err().unwrap();

        assert!(matches!(err, AppError::SinkWriteFailed(_)));
        assert!(!sink.calls().contains(&SinkCall::Finish));
    }

    #[tokio::test]
    async fn missing_base_url_fails_before_reading() {
        let sink = Arc::new(RecordingSink::default());
        let ctx = AppContext::new(config(None), Arc::new(UnavailableRows), sink.clone());

        let err = generate_outline(&ctx, None).await.err().unwrap();

        assert!(matches!(err, AppError::Configuration(_)));
        assert!(sink.calls().is_empty());
    }
}
