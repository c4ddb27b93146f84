//! Sanitized diagnostics for filtered upstream error pages.
//!
//! # Responsibilities
//! - Strip markup (script and style blocks included) from error bodies
//! - Collapse the remainder to non-empty trimmed lines
//! - Prefix a banner naming the upstream status code
//!
//! # Design Decisions
//! - Runs only when content filtering is active and the upstream status
//!   is neither 200 nor exempt: un-vetted error pages never reach the
//!   embedding page as markup
//! - Non-UTF-8 bytes are replaced, not rejected; the diagnostic is a
//!   best-effort rendering of a body that was never going to be relayed

/// Rewrite an upstream error body into a plain-text diagnostic.
///
/// The result is served with `Content-Type: text/plain; charset=UTF-8`.
pub fn error_page_diagnostic(status: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let stripped = strip_markup(&text);
    let lines: Vec<&str> = stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    format!(
        "*\n* HTTP RESPONSE CODE {}\n*\n\n{}",
        status,
        lines.join("\n")
    )
}

/// Remove script and style elements with their content, then all
/// remaining tags.
fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < input.len() {
        if bytes[i] == b'<' {
            if let Some(rest) = skip_container(input, i, "script") {
                i = rest;
                continue;
            }
            if let Some(rest) = skip_container(input, i, "style") {
                i = rest;
                continue;
            }
            // plain tag: skip to the closing '>'; an unterminated tag
            // swallows the remainder
            match input[i..].find('>') {
                Some(end) => i += end + 1,
                None => break,
            }
        } else {
            let ch_len = input[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            out.push_str(&input[i..i + ch_len]);
            i += ch_len;
        }
    }

    out
}

/// If `input[start..]` opens the named element, return the index just past
/// its closing tag, content skipped entirely.
fn skip_container(input: &str, start: usize, name: &str) -> Option<usize> {
    let open = &input.as_bytes()[start + 1..];
    if open.len() < name.len() || !open[..name.len()].eq_ignore_ascii_case(name.as_bytes()) {
        return None;
    }
    // must be "<script>", "<script ...>" or "<script/>"
    let after = *open.get(name.len())? as char;
    if after != '>' && after != ' ' && after != '\t' && after != '\n' && after != '/' {
        return None;
    }

    let lower = input.to_ascii_lowercase();
    let close_pat = format!("</{name}");
    match lower[start..].find(&close_pat) {
        Some(rel) => {
            let close_start = start + rel;
            match input[close_start..].find('>') {
                Some(end) => Some(close_start + end + 1),
                None => Some(input.len()),
            }
        }
        // unterminated container swallows the remainder
        None => Some(input.len()),
    }
}
