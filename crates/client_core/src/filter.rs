//! Filter state behind the history table, and the query it builds. Changing
//! anything other than the page jumps back to page 1 so a narrowed result
//! set is never asked for an out-of-range page.

use chrono::{DateTime, Utc};
use shared::protocol::HistoryQuery;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    search: String,
    date_from: Option<DateTime<Utc>>,
    date_to: Option<DateTime<Utc>>,
    page: u32,
    limit: u32,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            date_from: None,
            date_to: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl HistoryFilter {
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_date_from(&mut self, date_from: Option<DateTime<Utc>>) {
        self.date_from = date_from;
        self.page = 1;
    }

    pub fn set_date_to(&mut self, date_to: Option<DateTime<Utc>>) {
        self.date_to = date_to;
        self.page = 1;
    }

    pub fn clear_dates(&mut self) {
        self.date_from = None;
        self.date_to = None;
        self.page = 1;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.max(1);
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn to_query(&self) -> HistoryQuery {
        let search = self.search.trim();
        HistoryQuery {
            page: self.page,
            limit: self.limit,
            search: if search.is_empty() {
                None
            } else {
                Some(search.to_string())
            },
            date_from: self.date_from,
            date_to: self.date_to,
        }
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
