use serde::Serialize;
use utoipa::ToSchema;

/// Pagination details of list responses; all `None` for single objects.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub has_next: Option<bool>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            has_next: Some(page.saturating_mul(per_page) < total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
            has_next: None,
        }
    }
}

/// Envelope shared by every JSON endpoint, errors included.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_reports_next_page() {
        assert_eq!(Meta::new(1, 6, 13).has_next, Some(true));
        assert_eq!(Meta::new(3, 6, 13).has_next, Some(false));
        assert_eq!(Meta::new(1, 6, 0).has_next, Some(false));
        assert_eq!(Meta::empty().has_next, None);
    }

    #[test]
    fn meta_handles_huge_page() {
        let meta = Meta::new(i64::MAX, 6, 13);
        assert_eq!(meta.page, Some(i64::MAX));
        assert_eq!(meta.has_next, Some(false));
    }
}
