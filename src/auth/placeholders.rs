//! Placeholder resolution for auth configuration.
//!
//! Auth values may reference connection-specific data with `:name` tokens
//! (for example `"Token :token"`). Tokens are replaced with the matching
//! entry from the connection data; tokens with no entry are left as written.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

/// Matches `:name` where `name` is an identifier.
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("Failed to compile placeholder regex")
});

/// Replaces every `:name` token in `input` that has an entry in `data`.
///
/// # Examples
///
/// ```
/// use rest_plugins::auth::resolve_placeholders;
/// use std::collections::HashMap;
///
/// let mut data = HashMap::new();
/// data.insert("token".to_string(), "abc".to_string());
///
/// assert_eq!(resolve_placeholders("Token :token", &data), "Token abc");
/// assert_eq!(resolve_placeholders(":missing", &data), ":missing");
/// ```
pub fn resolve_placeholders(input: &str, data: &HashMap<String, String>) -> String {
    if data.is_empty() {
        return input.to_string();
    }

    PLACEHOLDER_REGEX
        .replace_all(input, |caps: &Captures| match data.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
