//! Request targets from full URLs or bare URIs.

use url::Url;
use xs_core::{XsError, XsResult};

/// Stand-in origin for bare and scheme-relative URIs.
const PLACEHOLDER_BASE: &str = "http://localhost/";

fn parse(input: &str) -> XsResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(XsError::InvalidInput);
    }
    let base = Url::parse(PLACEHOLDER_BASE).map_err(|_| XsError::InvalidInput)?;
    base.join(input).map_err(|_| XsError::InvalidInput)
}

/// Drops `;params` from the last path segment only.
fn strip_params(path: &str) -> &str {
    let last = path.rfind('/').unwrap_or(0);
    match path[last..].find(';') {
        Some(pos) => &path[..last + pos],
        None => path,
    }
}

/// Path of a full URL or bare URI, without host, params, query or fragment.
/// Empty input and a root-only path are rejected.
pub fn extract_uri(input: &str) -> XsResult<String> {
    path_of(&parse(input)?)
}

fn path_of(url: &Url) -> XsResult<String> {
    let path = strip_params(url.path());
    if path.is_empty() || path == "/" {
        return Err(XsError::InvalidInput);
    }
    Ok(path.to_string())
}

/// `path[?query]` as it goes on the wire; the fragment never does.
pub fn request_target(input: &str) -> XsResult<String> {
    let url = parse(input)?;
    let path = path_of(&url)?;
    Ok(match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path,
    })
}
