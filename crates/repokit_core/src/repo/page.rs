//! Listing requests and paginated results.

use crate::model::capability::SortParams;
use serde::{Deserialize, Serialize};

/// Caller input for `index`.
///
/// `per_page = None` uses `RepositoryConfig::default_per_page`. Pages are
/// 1-based; `0` is read as the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub sort: Option<SortParams>,
}

impl PageRequest {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn sorted(mut self, sort: SortParams) -> Self {
        self.sort = Some(sort);
        self
    }

    pub(crate) fn current_page(&self) -> u32 {
        self.page.max(1)
    }
}

/// One page of records plus length-aware pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, total: u64, per_page: u32, current_page: u32) -> Self {
        let last_page = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            items,
            total,
            per_page,
            current_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    /// 1-based position of the first item on this page, `None` when empty.
    pub fn from_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.offset() + 1)
    }

    /// 1-based position of the last item on this page, `None` when empty.
    pub fn to_item(&self) -> Option<u64> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.offset() + self.items.len() as u64)
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }

    fn offset(&self) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.per_page)
    }
}
