//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in the binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load .env if present, exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_read_as_unset() {
        std::env::set_var("GAMEDEALS_TEST_EMPTY", "  ");
        assert_eq!(env_opt("GAMEDEALS_TEST_EMPTY"), None);
    }

    #[test]
    fn parse_falls_back_on_garbage() {
        std::env::set_var("GAMEDEALS_TEST_PARSE", "not-a-number");
        assert_eq!(env_parse("GAMEDEALS_TEST_PARSE", 10usize), 10);
        std::env::set_var("GAMEDEALS_TEST_PARSE", "3");
        assert_eq!(env_parse("GAMEDEALS_TEST_PARSE", 10usize), 3);
    }
}
