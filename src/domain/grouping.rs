use indexmap::IndexMap;

use crate::domain::row::Row;

/// Rows bucketed by organization, buckets kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedTickets {
    buckets: IndexMap<String, Vec<Row>>,
}

impl GroupedTickets {
    /// Number of organization buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.buckets
            .iter()
            .map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }
}

pub fn group<I, F>(rows: I, key_of: F) -> GroupedTickets
where
    I: IntoIterator<Item = Row>,
    F: Fn(&Row) -> String,
{
    let mut buckets: IndexMap<String, Vec<Row>> = IndexMap::new();
    for row in rows {
        buckets.entry(key_of(&row)).or_default().push(row);
    }
    GroupedTickets { buckets }
}
