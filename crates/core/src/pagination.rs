//! Paging and ordering shared by every listing query.

use serde::{Deserialize, Serialize};

use crate::validation::{Validate, ValidationErrors};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A sortable column of some listing query.
pub trait OrderField: Copy + core::fmt::Debug + Send + Sync + 'static {
    /// Field name in the entity's serialized form.
    fn field(&self) -> &'static str;

    /// The field holds a `DateTime` and must be ordered as an instant.
    fn is_instant(&self) -> bool {
        false
    }
}

fn default_page_number() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_descending() -> bool {
    true
}

/// Page request: 1-based page number, page size, optional order field and
/// direction (descending unless stated otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "O: Deserialize<'de>"))]
pub struct PageRequest<O> {
    #[serde(default = "default_page_number")]
    pub page_number: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub order_by: Option<O>,
    #[serde(default = "default_descending")]
    pub is_descending: bool,
}

impl<O> Default for PageRequest<O> {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
            order_by: None,
            is_descending: default_descending(),
        }
    }
}

impl<O> PageRequest<O> {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            ..Default::default()
        }
    }

    pub fn ordered(mut self, order_by: O, is_descending: bool) -> Self {
        self.order_by = Some(order_by);
        self.is_descending = is_descending;
        self
    }

    /// Number of rows to skip: `(page_number - 1) * page_size`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn take(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl<O> Validate for PageRequest<O> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(self.page_number >= 1, "page_number", "must be at least 1")
            .check(self.page_size >= 1, "page_size", "must be at least 1")
            .check(
                self.page_size <= MAX_PAGE_SIZE,
                "page_size",
                format!("must be at most {MAX_PAGE_SIZE}"),
            );
        errors.into_result()
    }
}

/// One page of results plus the total row count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new<O>(items: Vec<T>, total_count: u64, request: &PageRequest<O>) -> Self {
        Self {
            items,
            total_count,
            page_number: request.page_number,
            page_size: request.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }

    pub fn has_more(&self) -> bool {
        u64::from(self.page_number) * u64::from(self.page_size) < self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum ByName {
        Name,
    }

    impl OrderField for ByName {
        fn field(&self) -> &'static str {
            "name"
        }
    }

    #[test]
    fn defaults() {
        let req = PageRequest::<ByName>::default();
        assert_eq!(req.page_number, 1);
        assert_eq!(req.page_size, 10);
        assert!(req.is_descending);
        assert_eq!(req.order_by, None);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn skip_examples() {
        assert_eq!(PageRequest::<ByName>::new(1, 10).skip(), 0);
        assert_eq!(PageRequest::<ByName>::new(3, 20).skip(), 40);
    }

    #[test]
    fn deserializes_with_defaults() {
        let req: PageRequest<ByName> =
            serde_json::from_str(r#"{"page_size": 25, "order_by": "name"}"#).unwrap();
        assert_eq!(req.page_number, 1);
        assert_eq!(req.page_size, 25);
        assert_eq!(req.order_by, Some(ByName::Name));
        assert!(req.is_descending);
    }

    #[test]
    fn validation_rejects_out_of_range() {
        let err = PageRequest::<ByName>::new(0, 0).validate().unwrap_err();
        assert!(err.has_field("page_number"));
        assert!(err.has_field("page_size"));
        assert!(PageRequest::<ByName>::new(1, MAX_PAGE_SIZE + 1).validate().is_err());
        assert!(PageRequest::<ByName>::new(2, MAX_PAGE_SIZE).validate().is_ok());
    }

    #[test]
    fn has_more_uses_total() {
        let req = PageRequest::<ByName>::new(2, 10);
        assert!(Page::new(vec![1; 10], 21, &req).has_more());
        assert!(!Page::new(vec![1; 10], 20, &req).has_more());
    }

    proptest! {
        #[test]
        fn skip_is_previous_pages_times_size(page in 1u32..10_000, size in 1u32..=MAX_PAGE_SIZE) {
            let req = PageRequest::<ByName>::new(page, size);
            prop_assert_eq!(req.skip(), u64::from(page - 1) * u64::from(size));
        }
    }
}
