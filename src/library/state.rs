//! Cached list state owned by [`super::LibraryStore`].

use crate::api::{ListQuery, Literature};

/// Default page size of a fresh store.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The four list filters. Empty string means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub category: String,
    pub description: String,
    pub reading_guide: String,
    pub tags: String,
}

impl Filters {
    /// Shallow merge: fields present in `update` replace, others stay.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(reading_guide) = update.reading_guide {
            self.reading_guide = reading_guide;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// List query for `page`/`size` with these filters.
    #[must_use]
    pub fn to_query(&self, page: u32, size: u32) -> ListQuery {
        ListQuery {
            page,
            size,
            category: self.category.clone(),
            description: self.description.clone(),
            reading_guide: self.reading_guide.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Partial filter update for [`super::LibraryStore::set_search_params`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub description: Option<String>,
    pub reading_guide: Option<String>,
    pub tags: Option<String>,
}

/// Snapshot of the current page, pagination cursor, filters and status flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCacheState {
    pub records: Vec<Literature>,
    pub total_count: u64,
    /// 1-based page of the cursor used for refreshes after mutations.
    pub current_page: u32,
    pub page_size: u32,
    pub filters: Filters,
    pub loading: bool,
    /// User-facing message of the last failed operation; cleared when the next one starts.
    pub error: Option<String>,
}

impl Default for ListCacheState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_count: 0,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: Filters::default(),
            loading: false,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_shallow_union() {
        let mut filters = Filters {
            category: "paper".to_string(),
            tags: "ml".to_string(),
            ..Filters::default()
        };
        filters.merge(FilterUpdate {
            tags: Some("nlp".to_string()),
            description: Some("survey".to_string()),
            ..FilterUpdate::default()
        });
        assert_eq!(filters.category, "paper");
        assert_eq!(filters.tags, "nlp");
        assert_eq!(filters.description, "survey");
        assert_eq!(filters.reading_guide, "");
    }

    #[test]
    fn test_merge_can_clear_a_field() {
        let mut filters = Filters {
            category: "paper".to_string(),
            ..Filters::default()
        };
        filters.merge(FilterUpdate {
            category: Some(String::new()),
            ..FilterUpdate::default()
        });
        assert!(filters.is_empty());
    }

    #[test]
    fn test_default_cursor() {
        let state = ListCacheState::default();
        assert_eq!(state.current_page, 1);
        assert_eq!(state.page_size, DEFAULT_PAGE_SIZE);
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_to_query_carries_filters() {
        let filters = Filters {
            reading_guide: "intro".to_string(),
            ..Filters::default()
        };
        let query = filters.to_query(3, 20);
        assert_eq!(query.page, 3);
        assert_eq!(query.size, 20);
        assert_eq!(query.reading_guide, "intro");
    }
}
