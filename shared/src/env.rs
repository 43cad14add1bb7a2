use std::str::FromStr;

/// Loads variables from a `.env` file when one is present.
pub fn init() {
    _ = dotenv::dotenv();
}

/// Reads `key`, falling back to `default` when the variable is unset.
pub fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses `key`, falling back to `default` when the variable is
/// unset or does not parse.
pub fn parse_var_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
