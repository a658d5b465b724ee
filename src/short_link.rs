//! Short recipe links: `/s/<hash>` resolves to the recipe detail route.

use uuid::Uuid;

use crate::random;

pub const HASH_LENGTH: usize = 8;

/// Attempts made to draw an unused hash before giving up.
pub const MAX_HASH_ATTEMPTS: usize = 5;

pub fn generate_hash() -> String {
    random::alphanumeric(HASH_LENGTH)
}

/// Hashes come from user-controlled paths, so anything outside the generated
/// alphabet is rejected before touching the database.
pub fn is_well_formed(hash: &str) -> bool {
    hash.len() == HASH_LENGTH && hash.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Canonical frontend route of a recipe.
pub fn recipe_detail_path(recipe_id: Uuid) -> String {
    format!("/recipes/{recipe_id}/")
}

pub fn short_url(public_url: &str, hash: &str) -> String {
    format!("{}/s/{hash}", public_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_hash_is_eight_alphanumerics() {
        for _ in 0..100 {
            let hash = generate_hash();
            assert_eq!(hash.len(), HASH_LENGTH);
            assert!(is_well_formed(&hash));
        }
    }

    #[test]
    fn rejects_malformed_hashes() {
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed("abcdefghi"));
        assert!(!is_well_formed("abc-efgh"));
        assert!(is_well_formed("aZ09bY18"));
    }

    #[test]
    fn builds_urls() {
        let id = Uuid::nil();
        assert_eq!(
            recipe_detail_path(id),
            "/recipes/00000000-0000-0000-0000-000000000000/"
        );
        assert_eq!(
            short_url("http://localhost:3000/", "aZ09bY18"),
            "http://localhost:3000/s/aZ09bY18"
        );
    }
}
