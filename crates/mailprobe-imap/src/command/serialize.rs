//! Command serialization helpers.

/// Writes an astring (atom or quoted string).
///
/// Values containing CR or LF cannot be sent as quoted strings and are
/// rejected by [`needs_literal`] before serialization.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Returns true if the value cannot be expressed as an atom or quoted string.
#[must_use]
pub fn needs_literal(s: &str) -> bool {
    s.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) || !s.is_ascii()
}

/// Returns true if the byte needs quoting.
const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b == 0x7F
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn astring(s: &str) -> String {
        let mut buf = Vec::new();
        write_astring(&mut buf, s);
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn atoms_are_written_bare() {
        assert_eq!(astring("user@example.com"), "user@example.com");
    }

    #[test]
    fn specials_are_quoted_and_escaped() {
        assert_eq!(astring(""), "\"\"");
        assert_eq!(astring("pass word"), "\"pass word\"");
        assert_eq!(astring(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn literal_detection() {
        assert!(needs_literal("line\r\nbreak"));
        assert!(needs_literal("pässword"));
        assert!(!needs_literal("plain ascii"));
    }

    proptest! {
        #[test]
        fn quoted_output_never_contains_unescaped_quote(s in "[ -~]{0,40}") {
            let out = astring(&s);
            if out.starts_with('"') {
                let inner = &out[1..out.len() - 1];
                let mut escaped = false;
                for c in inner.chars() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else {
                        prop_assert_ne!(c, '"');
                    }
                }
                prop_assert!(!escaped);
            } else {
                prop_assert_eq!(out, s);
            }
        }
    }
}
