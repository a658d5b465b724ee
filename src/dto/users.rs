use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{Creator, UserProfile},
    routes::params::Pagination,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// `data:image/<ext>;base64,<payload>`
    pub avatar: String,
}

/// Query of the subscription endpoints. `recipes_limit` is kept raw so that a
/// malformed value surfaces as our own 400 instead of an extractor rejection.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    #[serde(alias = "per_page")]
    pub limit: Option<i64>,
    pub recipes_limit: Option<String>,
}

impl SubscriptionQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.limit,
        }
    }

    /// `None` means "no truncation"; zero and negative limits are ignored.
    pub fn recipes_limit(&self) -> AppResult<Option<usize>> {
        match self.recipes_limit.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => {
                let limit = raw
                    .parse::<i64>()
                    .map_err(|_| AppError::BadRequest("Invalid recipes_limit value".into()))?;
                Ok((limit > 0).then_some(limit as usize))
            }
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserProfile>)]
    pub items: Vec<UserProfile>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CreatorList {
    #[schema(value_type = Vec<Creator>)]
    pub items: Vec<Creator>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<&str>) -> SubscriptionQuery {
        SubscriptionQuery {
            recipes_limit: limit.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn parses_recipes_limit() {
        assert_eq!(query(None).recipes_limit().unwrap(), None);
        assert_eq!(query(Some("3")).recipes_limit().unwrap(), Some(3));
        assert_eq!(query(Some("0")).recipes_limit().unwrap(), None);
    }

    #[test]
    fn rejects_non_numeric_recipes_limit() {
        assert!(query(Some("three")).recipes_limit().is_err());
    }
}
