use serde::{Deserialize, Serialize};

/// Raw `?page=&limit=` query parameters as sent by the client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Server-side bounds applied to every paginated listing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PagingLimits {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 { 10 }
fn max_limit() -> u32 { 100 }

impl Default for PagingLimits {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: max_limit(),
        }
    }
}

/// A validated page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Fill in missing values and clamp the limit to the configured maximum.
    pub fn from_query(query: PageQuery, limits: &PagingLimits) -> Self {
        let limit = query
            .limit
            .unwrap_or(limits.default_limit)
            .min(limits.max_limit.max(1));
        Self::new(query.page.unwrap_or(1), limit)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, default_limit())
    }
}

/// One page of a listing plus the total number of matching records.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Cut a page out of an already filtered and ordered collection.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit as usize)
            .collect();
        Self::new(items, total, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let limits = PagingLimits { default_limit: 10, max_limit: 50 };

        let request = PageRequest::from_query(PageQuery::default(), &limits);
        assert_eq!(request, PageRequest { page: 1, limit: 10 });

        let request = PageRequest::from_query(PageQuery { page: Some(0), limit: Some(500) }, &limits);
        assert_eq!(request, PageRequest { page: 1, limit: 50 });
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_slice() {
        let page = Page::slice((1..=25).collect::<Vec<_>>(), PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);

        let page = Page::slice((1..=5).collect::<Vec<_>>(), PageRequest::new(2, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }
}
