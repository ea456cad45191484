use async_trait::async_trait;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletStyle {
    Solid,
    Hollow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStyle {
    pub bold: bool,
    pub bullet: BulletStyle,
}

impl ItemStyle {
    pub const HEADER: ItemStyle = ItemStyle {
        bold: true,
        bullet: BulletStyle::Solid,
    };
    pub const ENTRY: ItemStyle = ItemStyle {
        bold: false,
        bullet: BulletStyle::Hollow,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub id: String,
    pub title: String,
}

/// Refers to one appended entry item so a hyperlink can be attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHandle {
    pub document_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    pub id: String,
    pub location: String,
}

#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn create_document(&self, title: &str) -> AppResult<DocumentHandle>;

    async fn append_header_item(
        &self,
        document: &DocumentHandle,
        text: &str,
        style: ItemStyle,
    ) -> AppResult<()>;

    async fn append_entry_item(
        &self,
        document: &DocumentHandle,
        text: &str,
        style: ItemStyle,
    ) -> AppResult<EntryHandle>;

    /// Links the characters `start..=end_inclusive` of an entry's text.
    async fn set_hyperlink(
        &self,
        entry: &EntryHandle,
        start: usize,
        end_inclusive: usize,
        url: &str,
    ) -> AppResult<()>;

    async fn finish_document(&self, document: &DocumentHandle) -> AppResult<PublishedDocument>;
}
