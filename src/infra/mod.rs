pub mod draft;
pub mod google_docs;
pub mod json_rows;
pub mod markdown;
pub mod sheets;
