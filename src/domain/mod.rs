pub mod grouping;
pub mod link;
pub mod outline;
pub mod row;
