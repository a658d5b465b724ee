use rand::{Rng, distributions::Alphanumeric};

/// Random string over `[A-Za-z0-9]`.
pub fn alphanumeric(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_requested_length_and_charset() {
        let value = alphanumeric(16);
        assert_eq!(value.len(), 16);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn zero_length_is_empty() {
        assert!(alphanumeric(0).is_empty());
    }
}
