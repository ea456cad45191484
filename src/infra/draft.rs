use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::outline::LinkSpan;
use crate::error::{AppError, AppResult};
use crate::services::{DocumentHandle, EntryHandle, ItemStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLink {
    pub span: LinkSpan,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub text: String,
    pub style: ItemStyle,
    pub link: Option<DraftLink>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentDraft {
    pub title: String,
    pub items: Vec<DraftItem>,
}

/// In-memory documents buffered by a sink until they are flushed.
#[derive(Default)]
pub struct DraftStore {
    drafts: Mutex<HashMap<String, DocumentDraft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, document: &DocumentHandle) -> AppResult<()> {
        self.lock()?.insert(
            document.id.clone(),
            DocumentDraft {
                title: document.title.clone(),
                items: Vec::new(),
            },
        );
        Ok(())
    }

    /// Appends an item and returns its index within the document.
    pub fn push(&self, document_id: &str, text: &str, style: ItemStyle) -> AppResult<usize> {
        let mut drafts = self.lock()?;
        let draft = drafts
            .get_mut(document_id)
            .ok_or_else(|| unknown_document(document_id))?;
        draft.items.push(DraftItem {
            text: text.to_string(),
            style,
            link: None,
        });
        Ok(draft.items.len() - 1)
    }

    pub fn link(
        &self,
        entry: &EntryHandle,
        start: usize,
        end_inclusive: usize,
        url: &str,
    ) -> AppResult<()> {
        let mut drafts = self.lock()?;
        let draft = drafts
            .get_mut(&entry.document_id)
            .ok_or_else(|| unknown_document(&entry.document_id))?;
        let item = draft.items.get_mut(entry.index).ok_or_else(|| {
            AppError::SinkWriteFailed(format!(
                "document {} has no item {}",
                entry.document_id, entry.index
            ))
        })?;

        let char_count = item.text.chars().count();
        if start > end_inclusive || end_inclusive >= char_count {
            return Err(AppError::SinkWriteFailed(format!(
                "link range {start}..={end_inclusive} is outside item text of {char_count} characters"
            )));
        }

        item.link = Some(DraftLink {
            span: LinkSpan {
                start,
                end: end_inclusive + 1,
            },
            url: url.to_string(),
        });
        Ok(())
    }

    /// Removes the draft so it can be flushed.
    pub fn take(&self, document_id: &str) -> AppResult<DocumentDraft> {
        self.lock()?
            .remove(document_id)
            .ok_or_else(|| unknown_document(document_id))
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, HashMap<String, DocumentDraft>>> {
        self.drafts
            .lock()
            .map_err(|_| AppError::SinkWriteFailed("document buffer poisoned".to_string()))
    }
}

fn unknown_document(document_id: &str) -> AppError {
    AppError::SinkWriteFailed(format!("unknown document {document_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> DocumentHandle {
        DocumentHandle {
            id: "doc-1".to_string(),
            title: "Outline".to_string(),
        }
    }

    #[test]
    fn buffers_items_in_order() {
        let store = DraftStore::new();
        store.open(&handle()).unwrap();
        assert_eq!(store.push("doc-1", "Acme", ItemStyle::HEADER).unwrap(), 0);
        let index = store.push("doc-1", "#1 - A", ItemStyle::ENTRY).unwrap();
        let entry = EntryHandle {
            document_id: "doc-1".to_string(),
            index,
        };
        store.link(&entry, 0, 1, "https://x/agent/tickets/1").unwrap();

        let draft = store.take("doc-1").unwrap();
        assert_eq!(draft.title, "Outline");
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].link, None);
        assert_eq!(
            draft.items[1].link,
            Some(DraftLink {
                span: LinkSpan { start: 0, end: 2 },
                url: "https://x/agent/tickets/1".to_string(),
            })
        );
        assert!(store.take("doc-1").is_err());
    }

    #[test]
    fn rejects_unknown_document() {
        let store = DraftStore::new();
        let err = store.push("missing", "x", ItemStyle::HEADER).unwrap_err();
        assert!(matches!(err, AppError::SinkWriteFailed(_)));
    }

    #[test]
    fn rejects_link_past_text() {
        let store = DraftStore::new();
        store.open(&handle()).unwrap();
        let index = store.push("doc-1", "#1", ItemStyle::ENTRY).unwrap();
        let entry = EntryHandle {
            document_id: "doc-1".to_string(),
            index,
        };
        let err = store.link(&entry, 0, 2, "u").unwrap_err();
        assert!(matches!(err, AppError::SinkWriteFailed(_)));
    }
}
