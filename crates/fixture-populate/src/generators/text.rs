//! String generators.
//!
//! Patterns support placeholders:
//! - `{index}` - per-run counter of values produced by the generator
//! - `{uuid}` - UUID v4 drawn from the seeded random source
//! - `{rand:N}` - random N-digit number

use crate::error::BoxError;
use crate::generator::Generator;
use crate::generators::uuid::random_uuid;
use crate::random::Random;
use fixture_core::{Settings, Value};

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern(pattern: &str, random: &mut Random, index: u64) -> Value {
    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &random_uuid(random).to_string(), 1);
    }

    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let end = start + len;
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) => {
                let number = random.digits(digits);
                result = format!("{}{}{}", &result[..start], number, &result[end + 1..]);
                search_from = start + number.len();
            }
            // Leave malformed placeholders in place
            Err(_) => search_from = end + 1,
        }
    }

    Value::String(result)
}

/// Generate an upper-case alphabetic string.
pub fn generate_alphabetic(random: &mut Random, min_length: usize, max_length: usize) -> Value {
    Value::String(random.upper_case_alphabetic(min_length, max_length))
}

/// Default `String` generator.
#[derive(Debug, Clone)]
pub struct StringGenerator {
    min_length: usize,
    max_length: usize,
}

impl StringGenerator {
    pub fn new(settings: &Settings) -> Self {
        Self::with_lengths(settings.string_min_length, settings.string_max_length)
    }

    pub fn with_lengths(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }
}

impl Generator for StringGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(generate_alphabetic(random, self.min_length, self.max_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: Value) -> String {
        match value {
            Value::String(s) => s,
            other => panic!("Expected String value, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_pattern_index() {
        let mut random = Random::new(42);
        let value = generate_pattern("user_{index}@example.com", &mut random, 123);
        assert_eq!(value, Value::String("user_123@example.com".to_string()));
    }

    #[test]
    fn test_generate_pattern_uuid_is_seeded() {
        let a = text(generate_pattern("id-{uuid}", &mut Random::new(42), 0));
        let b = text(generate_pattern("id-{uuid}", &mut Random::new(42), 0));

        assert!(a.starts_with("id-"));
        assert_eq!(a.len(), 3 + 36);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_pattern_multiple_placeholders() {
        let mut random = Random::new(42);
        let s = text(generate_pattern("user_{index}_code_{rand:4}", &mut random, 42));

        assert!(s.starts_with("user_42_code_"));
        assert_eq!(s.len(), 13 + 4);
        assert!(s[13..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_malformed_placeholder_is_kept() {
        let mut random = Random::new(1);
        let s = text(generate_pattern("{rand:x}-{rand:2}", &mut random, 0));
        assert!(s.starts_with("{rand:x}-"));
        assert_eq!(s.len(), "{rand:x}-".len() + 2);
    }

    #[test]
    fn test_string_generator_lengths() {
        let generator = StringGenerator::with_lengths(4, 4);
        let s = text(generator.generate(&mut Random::new(8)).unwrap());
        assert_eq!(s.len(), 4);
        assert!(s.chars().all(|c| c.is_ascii_uppercase()));
    }
}
