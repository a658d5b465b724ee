use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(6).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

/// Recipe list filters. `tags` may repeat (`?tags=breakfast&tags=lunch`),
/// which plain `Query` extraction cannot express, so the raw query string is parsed here.
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    pub pagination: Pagination,
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    pub fn from_query(raw: Option<&str>) -> AppResult<Self> {
        let pairs: Vec<(String, String)> = match raw {
            Some(raw) => serde_urlencoded::from_str(raw)
                .map_err(|_| AppError::BadRequest("Invalid query string".into()))?,
            None => Vec::new(),
        };

        let mut filter = RecipeFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => filter.pagination.page = Some(parse_int(&key, &value)?),
                "limit" | "per_page" => filter.pagination.per_page = Some(parse_int(&key, &value)?),
                "tags" if !value.is_empty() => filter.tags.push(value),
                "author" if !value.is_empty() => {
                    let id = Uuid::parse_str(&value)
                        .map_err(|_| AppError::BadRequest("author: invalid user id".into()))?;
                    filter.author = Some(id);
                }
                "is_favorited" => filter.is_favorited = parse_flag(&key, &value)?,
                "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(&key, &value)?,
                _ => {}
            }
        }
        Ok(filter)
    }
}

fn parse_int(key: &str, value: &str) -> AppResult<i64> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{key}: a valid integer is required")))
}

fn parse_flag(key: &str, value: &str) -> AppResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(AppError::BadRequest(format!("{key}: a valid boolean is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 6, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));
        let p = Pagination {
            page: Some(-2),
            per_page: Some(0),
        };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn huge_page_saturates_offset() {
        let filter = RecipeFilter::from_query(Some("page=9223372036854775807&limit=6")).unwrap();
        let (page, per_page, offset) = filter.pagination.normalize();
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, 6);
        assert_eq!(offset, i64::MAX);
    }

    #[test]
    fn parses_repeated_tags_and_flags() {
        let author = Uuid::new_v4();
        let raw = format!(
            "page=2&limit=10&tags=breakfast&tags=lunch&author={author}&is_favorited=1&is_in_shopping_cart=false"
        );
        let filter = RecipeFilter::from_query(Some(&raw)).unwrap();
        assert_eq!(filter.pagination.page, Some(2));
        assert_eq!(filter.pagination.per_page, Some(10));
        assert_eq!(filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(filter.author, Some(author));
        assert!(filter.is_favorited);
        assert!(!filter.is_in_shopping_cart);
    }

    #[test]
    fn empty_query_is_default() {
        let filter = RecipeFilter::from_query(None).unwrap();
        assert!(filter.tags.is_empty());
        assert!(filter.author.is_none());
        assert!(!filter.is_favorited);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(RecipeFilter::from_query(Some("page=abc")).is_err());
        assert!(RecipeFilter::from_query(Some("author=42")).is_err());
        assert!(RecipeFilter::from_query(Some("is_favorited=maybe")).is_err());
    }
}
