//! Small XML helpers shared by the reader and writer

use std::borrow::Cow;

use quick_xml::events::BytesStart;

/// Escape text content
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an attribute value
pub(crate) fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format for characters XML cannot carry:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut is_escape = false;

        if chars.peek() == Some(&'x') {
            chars.next();

            for _ in 0..4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                if let Some(decoded) =
                    u32::from_str_radix(&hex_chars, 16).ok().and_then(char::from_u32)
                {
                    result.push(decoded);
                    is_escape = true;
                } else {
                    // Lone surrogate or similar; keep the text as written
                    result.push_str("_x");
                    result.push_str(&hex_chars);
                    result.push('_');
                    is_escape = true;
                }
            }

            if !is_escape {
                result.push_str("_x");
                result.push_str(&hex_chars);
                continue;
            }
        }

        if !is_escape {
            result.push('_');
        }
    }

    result
}

/// Encode characters XML 1.0 cannot carry as `_xHHHH_`
///
/// Text that already looks like an escape gets its underscore escaped so it
/// reads back literally.
pub(crate) fn encode_excel_escapes(s: &str) -> Cow<'_, str> {
    let needs_work = s
        .chars()
        .any(|c| is_xml_illegal(c) || c == '\r')
        || (s.contains("_x") && looks_like_escape_anywhere(s));
    if !needs_work {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for (i, c) in s.char_indices() {
        if c == '_' && looks_like_escape(&s[i..]) {
            out.push_str("_x005F_");
        } else if is_xml_illegal(c) || c == '\r' {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn is_xml_illegal(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

fn looks_like_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[0] == b'_'
        && b[1] == b'x'
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}

fn looks_like_escape_anywhere(s: &str) -> bool {
    s.match_indices('_').any(|(i, _)| looks_like_escape(&s[i..]))
}

/// Whether text needs `xml:space="preserve"` to keep its whitespace
pub(crate) fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) || s.contains('\n')
}

/// Value of an attribute matched by its full (possibly prefixed) name
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of an attribute matched by local name, ignoring its prefix
pub(crate) fn local_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse an `xsd:boolean` attribute value
pub(crate) fn is_true(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_excel_escapes_carriage_return() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
    }

    #[test]
    fn test_decode_excel_escapes_multiple() {
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_b"), "a_b");
        assert_eq!(decode_excel_escapes("__x"), "__x");
    }

    #[test]
    fn test_decode_excel_escapes_uppercase() {
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("_x000A_"), "\n");
    }

    #[test]
    fn test_encode_control_characters() {
        assert_eq!(encode_excel_escapes("a\u{1}b"), "a_x0001_b");
        assert_eq!(encode_excel_escapes("a\r\nb"), "a_x000D_\nb");
        assert_eq!(encode_excel_escapes("tab\there"), "tab\there");
        assert!(matches!(encode_excel_escapes("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_encode_literal_escape_text() {
        let text = "id_x0041_";
        let encoded = encode_excel_escapes(text);
        assert_eq!(encoded, "id_x005F_x0041_");
        assert_eq!(decode_excel_escapes(&encoded), text);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
        assert!(matches!(escape_attr("Sheet1"), Cow::Borrowed(_)));
    }
}
