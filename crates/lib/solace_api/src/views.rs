//! HTML views.

use askama::Template;
use solace_core::entries::Entry;

/// Display form of a stored entry.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub addiction_type: String,
    pub description: String,
    pub response: String,
    pub created_at: String,
}

impl From<Entry> for EntryView {
    fn from(entry: Entry) -> Self {
        Self {
            addiction_type: entry.addiction_type,
            description: entry.description,
            response: entry.response,
            created_at: entry.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// `GET /` — submission form followed by every entry, newest first.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub entries: Vec<EntryView>,
}

impl IndexPage {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: entries.into_iter().map(EntryView::from).collect(),
        }
    }
}
