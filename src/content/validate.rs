//! Body well-formedness validators.
//!
//! # Responsibilities
//! - Shared UTF-8 + control-byte precondition for all text-like groups
//! - Structural JSON validation (must parse, not just look like JSON)
//! - Structural XML validation (malformed input is rejected, not repaired)
//!
//! # Design Decisions
//! - Control bytes are checked with an explicit allow-list, not a pattern
//! - XML requires exactly one root element; a bare text stream is not XML
//! - `media` bodies are never inspected

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::content::groups::ContentGroup;

/// Check that a body is valid UTF-8 and free of disallowed control bytes.
///
/// Allowed in the 0x00–0x1F range: 0x09 (tab), 0x0A (LF), 0x0D (CR).
/// 0x7F (DEL) is always rejected. Multi-byte UTF-8 sequences only use
/// bytes ≥ 0x80, so the byte scan cannot misfire inside a sequence.
pub fn is_clean_utf8_text(body: &[u8]) -> bool {
    if std::str::from_utf8(body).is_err() {
        return false;
    }
    !body
        .iter()
        .any(|&b| (b < 0x20 && !matches!(b, 0x09 | 0x0A | 0x0D)) || b == 0x7F)
}

/// Check that a body is clean UTF-8 text and parses as JSON.
pub fn is_valid_json(body: &[u8]) -> bool {
    if !is_clean_utf8_text(body) {
        return false;
    }
    serde_json::from_slice::<serde_json::Value>(body).is_ok()
}

/// Check that a body is clean UTF-8 text and a well-formed XML document.
///
/// Well-formed means: parses without error, mismatched end tags included,
/// has exactly one root element, and carries no non-whitespace text
/// outside of it.
pub fn is_valid_xml(body: &[u8]) -> bool {
    if !is_clean_utf8_text(body) {
        return false;
    }
    let text = match std::str::from_utf8(body) {
        Ok(t) => t,
        Err(_) => return false,
    };

    let mut reader = Reader::from_str(text);
    let mut depth: usize = 0;
    let mut roots: usize = 0;

    loop {
        match reader.read_event() {
            Err(_) => return false,
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Ok(Event::Empty(_)) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Ok(Event::Text(t)) => {
                let bytes: &[u8] = t.as_ref();
                if depth == 0 && !bytes.iter().all(|b| b.is_ascii_whitespace()) {
                    return false;
                }
            }
            Ok(Event::CData(_)) => {
                if depth == 0 {
                    return false;
                }
            }
            Ok(Event::Eof) => return roots == 1 && depth == 0,
            Ok(_) => {}
        }
    }
}

/// Run the validator that applies to a mimetype group.
///
/// `txt` and `utf8` share the text check; `media` always passes.
pub fn validate_body(group: ContentGroup, body: &[u8]) -> bool {
    match group {
        ContentGroup::Json => is_valid_json(body),
        ContentGroup::Xml => is_valid_xml(body),
        ContentGroup::Txt | ContentGroup::Utf8 => is_clean_utf8_text(body),
        ContentGroup::Media => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_accepts_allowed_controls() {
        assert!(is_clean_utf8_text(b"line one\r\n\tline two\n"));
        assert!(is_clean_utf8_text("caf\u{e9} – na\u{ef}ve".as_bytes()));
        assert!(is_clean_utf8_text(b""));
    }

    #[test]
    fn test_clean_text_rejects_control_bytes() {
        assert!(!is_clean_utf8_text(b"null\x00byte"));
        assert!(!is_clean_utf8_text(b"vertical\x0Btab"));
        assert!(!is_clean_utf8_text(b"form\x0Cfeed"));
        assert!(!is_clean_utf8_text(b"escape\x1B[0m"));
        assert!(!is_clean_utf8_text(b"del\x7F"));
    }

    #[test]
    fn test_clean_text_rejects_invalid_utf8() {
        assert!(!is_clean_utf8_text(&[0xFF, 0xFE, 0x41]));
        assert!(!is_clean_utf8_text(&[0xC3])); // truncated sequence
    }

    #[test]
    fn test_json_validation() {
        assert!(is_valid_json(br#"{"a":1}"#));
        assert!(is_valid_json(b"[1,2,3]"));
        assert!(is_valid_json(b"42"));
        assert!(!is_valid_json(b"{invalid"));
        assert!(!is_valid_json(b""));
        assert!(!is_valid_json(b"{\"a\":\x00}"));
    }

    #[test]
    fn test_xml_validation() {
        assert!(is_valid_xml(b"<root><a>1</a></root>"));
        assert!(is_valid_xml(b"<?xml version=\"1.0\"?>\n<feed xmlns=\"x\"/>"));
        assert!(is_valid_xml(b"<!-- note -->\n<doc/>\n"));
        assert!(!is_valid_xml(b"<root><a></root>")); // mismatched end tag
        assert!(!is_valid_xml(b"<unclosed>"));
        assert!(!is_valid_xml(b"just text"));
        assert!(!is_valid_xml(b"<a/><b/>")); // two roots
        assert!(!is_valid_xml(b"trailing<doc/>"));
        assert!(!is_valid_xml(b""));
    }

    #[test]
    fn test_group_dispatch() {
        assert!(validate_body(ContentGroup::Json, br#"{"ok":true}"#));
        assert!(!validate_body(ContentGroup::Json, b"<doc/>"));
        assert!(validate_body(ContentGroup::Xml, b"<doc/>"));
        assert!(validate_body(ContentGroup::Txt, b"plain text"));
        assert!(validate_body(ContentGroup::Utf8, b"<html></html>"));
        // media is pass-through, raw bytes included
        assert!(validate_body(ContentGroup::Media, &[0x00, 0xFF, 0x13]));
    }
}
