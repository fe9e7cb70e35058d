use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// One entry of a Cookie-Editor style JSON export. Domain, expiry and flag
/// fields are ignored; entries without a usable name/value pair are skipped.
#[derive(Debug, Deserialize)]
struct CookieEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("could not read cookie file: {0}")]
    Io(#[from] io::Error),
    #[error("cookie file is not a JSON cookie list: {0}")]
    Format(#[from] serde_json::Error),
}

/// Loads a cookie export and folds it into one `Cookie` header value.
///
/// A missing file is not an error: the run proceeds unauthenticated.
pub fn load_cookie_header(path: &Path) -> Result<Option<String>, CookieError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)?;
    let entries: Vec<CookieEntry> = serde_json::from_str(&raw)?;

    let pairs: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.name.filter(|n| !n.is_empty())?;
            let value = entry.value.unwrap_or_default();
            Some(format!("{name}={value}"))
        })
        .collect();

    if pairs.is_empty() {
        Ok(None)
    } else {
        Ok(Some(pairs.join("; ")))
    }
}
