pub mod document_sink;
pub mod row_source;

pub use document_sink::{
    BulletStyle, DocumentHandle, DocumentSink, EntryHandle, ItemStyle, PublishedDocument,
};
pub use row_source::RowSource;
