use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::outline::LinkSpan;
use crate::error::{AppError, AppResult};
use crate::infra::draft::{DocumentDraft, DraftStore};
use crate::services::{
    BulletStyle, DocumentHandle, DocumentSink, EntryHandle, ItemStyle, PublishedDocument,
};

const DOCS_API_BASE: &str = "https://docs.googleapis.com";
// Level 0 renders a solid disc, level 1 a hollow circle.
const BULLET_PRESET: &str = "BULLET_DISC_CIRCLE_SQUARE";
// Index 0 is the body's own start; text goes in at 1.
const BODY_START: usize = 1;
// Vertical tab is a line break inside a paragraph.
const SOFT_BREAK: char = '\u{000B}';

pub struct GoogleDocsClient {
    http: Client,
    token: Option<String>,
    drafts: DraftStore,
}

impl GoogleDocsClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            token,
            drafts: DraftStore::new(),
        }
    }

    fn bearer(&self) -> AppResult<String> {
        self.token
            .as_deref()
            .map(|token| format!("Bearer {token}"))
            .ok_or_else(|| {
                AppError::Configuration("Google access token not configured".to_string())
            })
    }

    fn documents_endpoint() -> String {
        format!("{DOCS_API_BASE}/v1/documents")
    }

    fn batch_update_endpoint(document_id: &str) -> String {
        format!("{DOCS_API_BASE}/v1/documents/{document_id}:batchUpdate")
    }

    fn edit_url(document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{document_id}/edit")
    }
}

#[async_trait]
impl DocumentSink for GoogleDocsClient {
    async fn create_document(&self, title: &str) -> AppResult<DocumentHandle> {
        let bearer = self.bearer()?;
        let response = self
            .http
            .post(Self::documents_endpoint())
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&CreateDocumentRequest { title })
            .send()
            .await
            .map_err(|err| AppError::SinkUnavailable(format!("failed to call Docs: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response_text(response).await;
            return Err(AppError::SinkUnavailable(format!(
                "Docs responded with {status}: {body}"
            )));
        }

        let payload: CreateDocumentResponse = response.json().await.map_err(|err| {
            AppError::SinkUnavailable(format!("failed to parse Docs response: {err}"))
        })?;

        let handle = DocumentHandle {
            id: payload.document_id,
            title: title.to_string(),
        };
        self.drafts.open(&handle)?;
        debug!(document = %handle.id, "created Google document");
        Ok(handle)
    }

    async fn append_header_item(
        &self,
        document: &DocumentHandle,
        text: &str,
        style: ItemStyle,
    ) -> AppResult<()> {
        self.drafts.push(&document.id, text, style)?;
        Ok(())
    }

    async fn append_entry_item(
        &self,
        document: &DocumentHandle,
        text: &str,
        style: ItemStyle,
    ) -> AppResult<EntryHandle> {
        let index = self.drafts.push(&document.id, text, style)?;
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
        self.drafts.link(entry, start, end_inclusive, url)
    }

    async fn finish_document(&self, document: &DocumentHandle) -> AppResult<PublishedDocument> {
        let draft = self.drafts.take(&document.id)?;
        let requests = batch_requests(&draft)?;

        if !requests.is_empty() {
            let bearer = self.bearer()?;
            let response = self
                .http
                .post(Self::batch_update_endpoint(&document.id))
                .header(AUTHORIZATION, bearer)
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .json(&BatchUpdateRequest {
                    requests: &requests,
                })
                .send()
                .await
                .map_err(|err| {
                    AppError::SinkWriteFailed(format!("failed to update document: {err}"))
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response_text(response).await;
                return Err(AppError::SinkWriteFailed(format!(
                    "Docs responded with {status}: {body}"
                )));
            }
        }

        info!(
            document = %document.id,
            items = draft.items.len(),
            "wrote Google Docs outline"
        );
        Ok(PublishedDocument {
            id: document.id.clone(),
            location: Self::edit_url(&document.id),
        })
    }
}

async fn response_text(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unable to read response>".to_string())
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Rewrites item text so it stays a single paragraph at its own bullet level.
///
/// Line breaks become soft breaks (`\r\n` counts once) and leading tabs are
/// dropped. Returns the text and, for every character offset of the input
/// plus its end, the matching character offset in the output.
fn paragraph_text(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len() + 1);
    let mut written = 0;
    let mut leading = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        offsets.push(written);
        match ch {
            '\t' if leading => continue,
            '\r' if chars.peek() == Some(&'\n') => continue,
            '\r' | '\n' => out.push(SOFT_BREAK),
            other => out.push(other),
        }
        leading = false;
        written += 1;
    }
    offsets.push(written);
    (out, offsets)
}

/// Translates a buffered outline into one Docs batch update.
///
/// Entry lines are inserted with a leading tab so that the final bullet
/// request nests them one level down; styles are applied before the bullets
/// because creating them strips the tabs and shifts every later index.
fn batch_requests(draft: &DocumentDraft) -> AppResult<Vec<DocsRequest>> {
    if draft.items.is_empty() {
        return Ok(Vec::new());
    }

    let mut body = String::new();
    let mut styles = Vec::new();
    let mut index = BODY_START;

    for item in &draft.items {
        let prefix = match item.style.bullet {
            BulletStyle::Solid => "",
            BulletStyle::Hollow => "\t",
        };
        let (text, offsets) = paragraph_text(&item.text);
        let text_start = index + utf16_len(prefix);
        let text_len = utf16_len(&text);

        if text_len > 0 {
            styles.push(DocsRequest::UpdateTextStyle(UpdateTextStyle {
                range: DocRange::new(text_start, text_start + text_len),
                text_style: TextStyle {
                    bold: Some(item.style.bold),
                    link: None,
                },
                fields: "bold",
            }));
        }

        if let Some(link) = &item.link {
            let span = match (offsets.get(link.span.start), offsets.get(link.span.end)) {
                (Some(&start), Some(&end)) => LinkSpan { start, end },
                _ => {
                    return Err(AppError::SinkWriteFailed(format!(
                        "link span outside \"{}\"",
                        item.text
                    )));
                }
            };
            // A span over stripped tabs alone has nothing left to link.
            if let Some(range) = span.utf16_range(&text).filter(|range| !range.is_empty()) {
                styles.push(DocsRequest::UpdateTextStyle(UpdateTextStyle {
                    range: DocRange::new(text_start + range.start, text_start + range.end),
                    text_style: TextStyle {
                        bold: None,
                        link: Some(DocLink {
                            url: link.url.clone(),
                        }),
                    },
                    fields: "link",
                }));
            }
        }

        body.push_str(prefix);
        body.push_str(&text);
        body.push('\n');
        index = text_start + text_len + 1;
    }

    let mut requests = Vec::with_capacity(styles.len() + 2);
    requests.push(DocsRequest::InsertText(InsertText {
        location: Location { index: BODY_START },
        text: body,
    }));
    requests.extend(styles);
    requests.push(DocsRequest::CreateParagraphBullets(CreateParagraphBullets {
        range: DocRange::new(BODY_START, index),
        bullet_preset: BULLET_PRESET,
    }));
    Ok(requests)
}

#[derive(Serialize)]
struct CreateDocumentRequest<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentResponse {
    document_id: String,
}

#[derive(Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [DocsRequest],
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
enum DocsRequest {
    InsertText(InsertText),
    UpdateTextStyle(UpdateTextStyle),
    CreateParagraphBullets(CreateParagraphBullets),
}

#[derive(Serialize, Debug)]
struct InsertText {
    location: Location,
    text: String,
}

#[derive(Serialize, Debug)]
struct Location {
    index: usize,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdateTextStyle {
    range: DocRange,
    text_style: TextStyle,
    fields: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DocRange {
    start_index: usize,
    end_index: usize,
}

impl DocRange {
    fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

#[derive(Serialize, Debug)]
struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<DocLink>,
}

#[derive(Serialize, Debug)]
struct DocLink {
    url: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateParagraphBullets {
    range: DocRange,
    bullet_preset: &'static str,
}
