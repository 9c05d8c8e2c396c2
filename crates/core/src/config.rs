//! Helpers for reading typed configuration from environment variables.

use std::str::FromStr;

use crate::error::CoreError;

/// Read `key` from the environment, falling back to `default` when unset.
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse `key` from the environment, falling back to `default`
/// when unset. A value that does not parse is a [`CoreError::Validation`].
pub fn env_parse<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse a raw configuration value, naming `key` in the error.
pub fn parse_value<T>(key: &str, raw: &str) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CoreError::Validation(format!("{key} has invalid value '{raw}': {e}")))
}

/// Split a comma-separated list, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_value_trims() {
        assert_eq!(parse_value::<u16>("PORT", " 9983 ").unwrap(), 9983);
    }

    #[test]
    fn parse_value_names_the_key() {
        let err = parse_value::<u16>("PORT", "abc").unwrap_err();
        assert_matches!(&err, CoreError::Validation(msg) if msg.contains("PORT"));
    }

    #[test]
    fn unset_key_uses_default() {
        assert_eq!(
            env_parse("SCENEGEN_TEST_SURELY_UNSET_KEY", 42u64).unwrap(),
            42
        );
        assert_eq!(env_string("SCENEGEN_TEST_SURELY_UNSET_KEY", "x"), "x");
    }

    #[test]
    fn list_splitting() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
