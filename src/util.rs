use std::env;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::{CatalogError, Result};

pub(crate) fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse a setting value looked up under `name`. Unset or blank yields
/// `None`; a value that does not parse is an error rather than a silent default.
pub(crate) fn parse_setting<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    match value.filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CatalogError::Config(format!("Invalid {name}: {value:?}"))),
        None => Ok(None),
    }
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn trim_trailing_slash(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
