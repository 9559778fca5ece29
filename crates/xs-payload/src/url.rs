//! Request-target helpers shared by the builder and callers. Full-URL
//! parsing lives in `xs_host::target`.

use alloc::string::String;
use xs_core::{XsError, XsResult};

/// Strips an inline JSON body or query string: everything from the first
/// `{` or `?` onward.
pub fn extract_api_path(uri_and_body: &str) -> &str {
    match uri_and_body.find(|c| c == '{' || c == '?') {
        Some(pos) => &uri_and_body[..pos],
        None => uri_and_body,
    }
}

/// A query parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryValue<'a> {
    Text(&'a str),
    /// Joined with `,`.
    List(&'a [&'a str]),
    /// Rendered as an empty value (`key=`).
    Empty,
}

/// Appends `params` to `base_url` in order.
///
/// Only `=` inside values is escaped (`%3D`); commas and every other
/// character pass through untouched, since the platform signs the raw form.
pub fn build_url(base_url: &str, params: &[(&str, QueryValue<'_>)]) -> XsResult<String> {
    if base_url.is_empty() {
        return Err(XsError::InvalidInput);
    }

    let mut out = String::from(base_url);
    if params.is_empty() {
        return Ok(out);
    }

    if !base_url.contains('?') {
        out.push('?');
    } else if !(base_url.ends_with('?') || base_url.ends_with('&')) {
        out.push('&');
    }

    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 { out.push('&'); }
        out.push_str(key);
        out.push('=');
        match value {
            QueryValue::Text(v) => push_escaped(&mut out, v),
            QueryValue::List(items) => {
                for (j, item) in items.iter().enumerate() {
                    if j > 0 { out.push(','); }
                    push_escaped(&mut out, item);
                }
            }
            QueryValue::Empty => {}
        }
    }
    Ok(out)
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        if c == '=' { out.push_str("%3D"); } else { out.push(c); }
    }
}
