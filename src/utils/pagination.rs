use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// Query-string pagination parameters, `?page=2&per_page=50`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    /// Clamp the raw parameters to sane bounds. Page numbering is 1-based.
    pub fn resolve(self) -> ResolvedPage {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        ResolvedPage { page, per_page }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedPage {
    pub page: u32,
    pub per_page: u32,
}

impl ResolvedPage {
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// One page of results plus the bookkeeping the admin tables need to render
/// their pagers.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: ResolvedPage, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as u64).div_ceil(u64::from(page.per_page))) as u32
        };

        Self {
            items,
            page: page.page,
            per_page: page.per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_missing() {
        let resolved = PageParams {
            page: None,
            per_page: None,
        }
        .resolve();

        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.per_page, DEFAULT_PER_PAGE);
        assert_eq!(resolved.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped() {
        let resolved = PageParams {
            page: Some(3),
            per_page: Some(10_000),
        }
        .resolve();

        assert_eq!(resolved.per_page, MAX_PER_PAGE);
        assert_eq!(resolved.offset(), 200);
    }

    #[test]
    fn page_zero_becomes_one() {
        let resolved = PageParams {
            page: Some(0),
            per_page: Some(25),
        }
        .resolve();

        assert_eq!(resolved.page, 1);
        assert_eq!(resolved.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageParams {
            page: Some(1),
            per_page: Some(20),
        }
        .resolve();

        let paged: Paginated<u8> = Paginated::new(vec![], page, 41);
        assert_eq!(paged.total_pages, 3);

        let empty: Paginated<u8> = Paginated::new(vec![], page, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
