use crate::filter::filter;
use crate::viewport;

/// One navigable list: every fetched name, the subset matching the current
/// query, and the cursor into that subset.
///
/// `cursor` is always a valid index into `filtered`, or 0 when it is empty.
#[derive(Clone, Debug, Default)]
pub struct ListState {
    all: Vec<String>,
    filtered: Vec<String>,
    query: String,
    cursor: usize,
    offset: usize,
    loading: bool,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[String] {
        &self.all
    }

    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn selected(&self) -> Option<&str> {
        self.filtered.get(self.cursor).map(String::as_str)
    }

    /// Replaces the whole item set with a fresh fetch result.
    pub fn replace(&mut self, items: Vec<String>) {
        self.all = items;
        self.filtered = filter(&self.all, &self.query);
        self.cursor = 0;
        self.offset = 0;
        self.loading = false;
    }

    /// Drops every item, keeping nothing from a previous fetch.
    pub fn clear(&mut self) {
        self.all.clear();
        self.filtered.clear();
        self.query.clear();
        self.cursor = 0;
        self.offset = 0;
        self.loading = false;
    }

    /// Re-filters under `query`, keeping the cursor's index where possible.
    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_string();
        self.filtered = filter(&self.all, &self.query);
        self.clamp_cursor();
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.move_by(1);
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.cursor = 0;
            return;
        }
        let last = self.filtered.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn jump_first(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_last(&mut self) {
        self.cursor = self.filtered.len().saturating_sub(1);
    }

    /// Points the cursor at `name` if it is currently visible.
    pub fn select(&mut self, name: &str) -> bool {
        match self.filtered.iter().position(|item| item == name) {
            Some(idx) => {
                self.cursor = idx;
                true
            }
            None => false,
        }
    }

    /// Moves the stored scroll offset so the cursor stays within `capacity` rows.
    pub fn scroll_to_cursor(&mut self, capacity: usize) {
        self.offset = viewport::follow(self.offset, self.filtered.len(), self.cursor, capacity).start;
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.filtered.len().saturating_sub(1));
    }
}
