use std::ops::Range;

use tracing::warn;

use crate::domain::grouping::GroupedTickets;
use crate::domain::row::ColumnLayout;

const ID_PREFIX: &str = "#";
const SEPARATOR: &str = " - ";

/// Half-open range of character offsets inside a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpan {
    pub start: usize,
    pub end: usize,
}

impl LinkSpan {
    /// Span of `token` at character offset `start` of `text`, if it is really there.
    pub fn covering(text: &str, start: usize, token: &str) -> Option<Self> {
        let len = token.chars().count();
        if len == 0 {
            return None;
        }
        let found = text.chars().skip(start).take(len).eq(token.chars());
        found.then_some(Self {
            start,
            end: start + len,
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Offset of the last linked character.
    pub fn end_inclusive(&self) -> usize {
        self.end.saturating_sub(1)
    }

    /// Byte range of this span within `text`.
    pub fn byte_range(&self, text: &str) -> Option<Range<usize>> {
        let mut offsets = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()));
        let start = offsets.nth(self.start)?;
        let end = if self.is_empty() {
            start
        } else {
            offsets.nth(self.len() - 1)?
        };
        Some(start..end)
    }

    /// UTF-16 code unit range of this span within `text`.
    pub fn utf16_range(&self, text: &str) -> Option<Range<usize>> {
        let bytes = self.byte_range(text)?;
        let start = text[..bytes.start].encode_utf16().count();
        let len = text[bytes].encode_utf16().count();
        Some(start..start + len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketEntry {
    pub ticket_id: String,
    pub summary: String,
    pub link_url: String,
    pub link_span: Option<LinkSpan>,
}

impl TicketEntry {
    pub fn new(ticket_id: String, summary: String, link_url: String) -> Self {
        let token = format!("{ID_PREFIX}{ticket_id}");
        let text = format!("{token}{SEPARATOR}{summary}");
        let link_span = LinkSpan::covering(&text, 0, &token);
        if link_span.is_none() {
            warn!(ticket_id = %ticket_id, "LinkSpanNotFound: ticket link omitted");
        }
        Self {
            ticket_id,
            summary,
            link_url,
            link_span,
        }
    }

    pub fn text(&self) -> String {
        format!("{ID_PREFIX}{}{SEPARATOR}{}", self.ticket_id, self.summary)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutlineNode {
    OrganizationHeader { name: String },
    TicketEntry(TicketEntry),
}

pub fn render<F>(grouped: &GroupedTickets, layout: &ColumnLayout, link_for: F) -> Vec<OutlineNode>
where
    F: Fn(&str) -> String,
{
    let mut nodes = Vec::with_capacity(grouped.len() + grouped.row_count());
    for (name, rows) in grouped.iter() {
        nodes.push(OutlineNode::OrganizationHeader {
            name: name.to_string(),
        });
        for row in rows {
            let ticket_id = layout.ticket_id(row);
            let link_url = link_for(&ticket_id);
            nodes.push(OutlineNode::TicketEntry(TicketEntry::new(
                ticket_id,
                layout.ticket_summary(row),
                link_url,
            )));
        }
    }
    nodes
}
