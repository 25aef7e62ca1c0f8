//! String literal decoding and encoding

/// Decode the raw text of a JavaScript string literal, quotes included
pub(crate) fn unescape(raw: &str) -> String {
    let inner = strip_quotes(raw);
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        match escaped {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            'x' => {
                let code = take_hex(&mut chars, 2);
                push_code_unit(&mut value, &mut chars, code);
            }
            'u' => {
                let code = if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut digits = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        digits.push(c);
                    }
                    u32::from_str_radix(&digits, 16).ok()
                } else {
                    take_hex(&mut chars, 4)
                };
                push_code_unit(&mut value, &mut chars, code);
            }
            '0'..='7' => {
                // Legacy octal escapes, `\0` included
                let mut code = escaped.to_digit(8).unwrap_or(0);
                let max_digits = if escaped <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            // Line continuations contribute nothing
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            other => value.push(other),
        }
    }

    value
}

/// Encode `value` as a double-quoted JavaScript string literal
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn strip_quotes(raw: &str) -> &str {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close => &raw[1..raw.len() - 1],
        (Some('"' | '\''), _) => &raw[1..],
        _ => raw,
    }
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut code = 0;
    for _ in 0..count {
        let digit = chars.peek()?.to_digit(16)?;
        chars.next();
        code = code * 16 + digit;
    }
    Some(code)
}

/// Push a decoded code point, pairing UTF-16 surrogates spelled as `\uXXXX\uXXXX`
fn push_code_unit(
    value: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    code: Option<u32>,
) {
    let Some(code) = code else {
        value.push('\u{fffd}');
        return;
    };
    if (0xD800..0xDC00).contains(&code) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low @ 0xDC00..=0xDFFF) = take_hex(&mut lookahead, 4) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(combined) {
                    value.push(c);
                    *chars = lookahead;
                    return;
                }
            }
        }
    }
    value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r#""plain""#, "plain")]
    #[case("'single'", "single")]
    #[case(r#""a\nb\tc""#, "a\nb\tc")]
    #[case(r#""quote \" and \\""#, "quote \" and \\")]
    #[case(r#""\x41B\u{43}""#, "ABC")]
    #[case(r#""\uD83D\uDE00""#, "\u{1F600}")]
    #[case(r#""\0""#, "\0")]
    #[case(r#""\101""#, "A")]
    #[case("\"line\\\ncontinued\"", "linecontinued")]
    #[case(r#""\q""#, "q")]
    #[case(r#""""#, "")]
    fn test_unescape(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(unescape(raw), expected);
    }

    #[test]
    fn test_unescape_keeps_non_ascii() {
        assert_eq!(
            unescape("\"Context low · Run /compact\""),
            "Context low · Run /compact"
        );
    }

    #[rstest]
    #[case("", r#""""#)]
    #[case("esc", r#""esc""#)]
    #[case("say \"hi\"\n", r#""say \"hi\"\n""#)]
    #[case("back\\slash", r#""back\\slash""#)]
    #[case("\u{1}", r#""\x01""#)]
    fn test_quote(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(quote(value), expected);
    }
}
