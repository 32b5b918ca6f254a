//! Session code generation and turn-order shuffling

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;

/// Smallest session code (10 digits)
pub const CODE_MIN: u64 = 1_000_000_000;

/// Largest session code (10 digits)
pub const CODE_MAX: u64 = 9_999_999_999;

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9][0-9]{9}$").unwrap());

/// Draw a candidate code uniformly from `[CODE_MIN, CODE_MAX]`.
///
/// Uniqueness is not checked here; the service retries against the store.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Whether `code` looks like a session code.
pub fn is_valid_code(code: &str) -> bool {
    CODE_RE.is_match(code)
}

/// Independent uniform permutation of `items`.
pub fn shuffled<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_codes_are_ten_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), 10);
            assert!(is_valid_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_code_bounds_are_valid() {
        assert!(is_valid_code(&CODE_MIN.to_string()));
        assert!(is_valid_code(&CODE_MAX.to_string()));
    }

    #[test]
    fn test_rejects_malformed_codes() {
        assert!(!is_valid_code(""));
        assert!(!is_valid_code("123456789"));
        assert!(!is_valid_code("12345678901"));
        assert!(!is_valid_code("0123456789"));
        assert!(!is_valid_code("12345abcde"));
        assert!(!is_valid_code(" 1234567890"));
    }

    #[test]
    fn test_shuffled_eventually_reorders() {
        let mut rng = StdRng::seed_from_u64(1);
        let items: Vec<u32> = (0..8).collect();
        let moved = (0..20).any(|_| shuffled(items.clone(), &mut rng) != items);
        assert!(moved);
    }
}
