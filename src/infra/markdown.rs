use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::infra::draft::{DocumentDraft, DraftItem, DraftStore};
use crate::services::{
    BulletStyle, DocumentHandle, DocumentSink, EntryHandle, ItemStyle, PublishedDocument,
};

/// Writes the outline as a Markdown bullet list under `output_dir`.
pub struct MarkdownFile {
    output_dir: PathBuf,
    drafts: DraftStore,
}

impl MarkdownFile {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            drafts: DraftStore::new(),
        }
    }

    fn document_path(&self, title: &str) -> PathBuf {
        self.output_dir.join(format!("{}.md", slugify(title)))
    }
}

#[async_trait]
impl DocumentSink for MarkdownFile {
    async fn create_document(&self, title: &str) -> AppResult<DocumentHandle> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|err| {
                AppError::SinkUnavailable(format!(
                    "cannot create output directory {}: {err}",
                    self.output_dir.display()
                ))
            })?;

        let handle = DocumentHandle {
            id: self.document_path(title).display().to_string(),
            title: title.to_string(),
        };
        self.drafts.open(&handle)?;
        debug!(document = %handle.id, "opened markdown draft");
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
        let contents = render_markdown(&draft)?;
        tokio::fs::write(&document.id, contents)
            .await
            .map_err(|err| {
                AppError::SinkWriteFailed(format!("failed to write {}: {err}", document.id))
            })?;

        info!(path = %document.id, items = draft.items.len(), "wrote markdown outline");
        Ok(PublishedDocument {
            id: document.id.clone(),
            location: document.id.clone(),
        })
    }
}

fn render_markdown(draft: &DocumentDraft) -> AppResult<String> {
    let mut out = format!("# {}\n\n", escape(&draft.title));
    for item in &draft.items {
        let indent = match item.style.bullet {
            BulletStyle::Solid => "",
            BulletStyle::Hollow => "  ",
        };
        let body = render_item(item)?;
        if body.is_empty() {
            out.push_str(&format!("{indent}-\n"));
        } else {
            out.push_str(&format!("{indent}- {body}\n"));
        }
    }
    Ok(out)
}

fn render_item(item: &DraftItem) -> AppResult<String> {
    let body = match &item.link {
        None => escape(&item.text),
        Some(link) => {
            let range = link.span.byte_range(&item.text).ok_or_else(|| {
                AppError::SinkWriteFailed(format!("link span outside \"{}\"", item.text))
            })?;
            format!(
                "{}[{}]({}){}",
                escape(&item.text[..range.start]),
                escape(&item.text[range.clone()]),
                link_target(&link.url),
                escape(&item.text[range.end..]),
            )
        }
    };

    Ok(if item.style.bold {
        embolden(&body)
    } else {
        body
    })
}

// CommonMark ignores `**` that touches whitespace on its inner side.
fn embolden(body: &str) -> String {
    let inner = body.trim();
    if inner.is_empty() {
        return body.to_string();
    }
    let lead = &body[..body.len() - body.trim_start().len()];
    let trail = &body[body.trim_end().len()..];
    format!("{lead}**{inner}**{trail}")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn link_target(url: &str) -> String {
    if url.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{url}>")
    } else {
        url.to_string()
    }
}

fn slugify(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut prev_dash = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            result.push('-');
            prev_dash = true;
        }
    }
    let trimmed = result.trim_end_matches('-');
    if trimmed.is_empty() {
        "outline".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn slugifies_title() {
        assert_eq!(
            slugify("Generate Docs Outline From Sheet"),
            "generate-docs-outline-from-sheet"
        );
        assert_eq!(slugify("  Q3 / Tickets!! "), "q3-tickets");
        assert_eq!(slugify("???"), "outline");
    }

    #[test]
    fn escapes_markdown_characters() {
        assert_eq!(escape("a_b *c* [d]"), "a\\_b \\*c\\* \\[d\\]");
    }

    #[tokio::test]
    async fn writes_nested_outline() {
        let dir = tempdir().unwrap();
        let sink = MarkdownFile::new(dir.path().join("out"));

        let doc = sink.create_document("Ticket Outline").await.unwrap();
        sink.append_header_item(&doc, "Acme", ItemStyle::HEADER)
            .await
            .unwrap();
        let entry = sink
            .append_entry_item(&doc, "#1 - A", ItemStyle::ENTRY)
            .await
            .unwrap();
        sink.set_hyperlink(&entry, 0, 1, "https://support.example.com/agent/tickets/1")
            .await
            .unwrap();
        sink.append_header_item(&doc, "", ItemStyle::HEADER)
            .await
            .unwrap();
        sink.append_entry_item(&doc, "#2 - snake_case", ItemStyle::ENTRY)
            .await
            .unwrap();
        let published = sink.finish_document(&doc).await.unwrap();

        let expected_path = dir.path().join("out").join("ticket-outline.md");
        assert_eq!(published.location, expected_path.display().to_string());
        let written = std::fs::read_to_string(expected_path).unwrap();
        assert_eq!(
            written,
            "# Ticket Outline\n\n\
             - **Acme**\n  \
             - [#1](https://support.example.com/agent/tickets/1) - A\n\
             -\n  \
             - #2 - snake\\_case\n"
        );
    }

    #[test]
    fn bold_markers_hug_padded_names() {
        let draft = DocumentDraft {
            title: "t".to_string(),
            items: ["Acme ", " Initech", "   "]
                .into_iter()
                .map(|name| DraftItem {
                    text: name.to_string(),
                    style: ItemStyle::HEADER,
                    link: None,
                })
                .collect(),
        };

        assert_eq!(
            render_markdown(&draft).unwrap(),
            "# t\n\n- **Acme** \n-  **Initech**\n-    \n"
        );
    }

    #[tokio::test]
    async fn finishing_unknown_document_fails() {
        let dir = tempdir().unwrap();
        let sink = MarkdownFile::new(dir.path().to_path_buf());
        let handle = DocumentHandle {
            id: "nope".to_string(),
            title: "nope".to_string(),
        };
        let err = sink.finish_document(&handle).await.unwrap_err();
        assert!(matches!(err, AppError::SinkWriteFailed(_)));
    }
}
