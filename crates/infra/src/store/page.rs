use pricelens_core::{DomainError, DomainResult};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Zero-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// `page` defaults to 0 and `size` to 10; `size` must be within `1..=100`.
    pub fn new(page: Option<u32>, size: Option<u32>) -> DomainResult<Self> {
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "size: must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self {
            page: page.unwrap_or(0),
            size,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus the totals needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_items,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_items.div_ceil(u64::from(self.size))
    }
}
