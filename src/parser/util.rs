use crate::parser::ast::LiteralValue;

pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Splits `/pattern/flags` into its two parts.
pub fn split_regular_expression(raw: &str) -> (&str, &str) {
    match raw.rfind('/') {
        Some(end) if end > 0 => (&raw[1..end], &raw[end + 1..]),
        _ => (raw, ""),
    }
}

pub fn parse_numeric_literal(raw: &str) -> Option<LiteralValue> {
    let digits: String = raw.chars().filter(|c| *c != '_').collect();
    if let Some(big) = digits.strip_suffix('n') {
        return Some(LiteralValue::BigInt(big.to_string()));
    }
    let lower = digits.to_ascii_lowercase();
    let radix = if lower.starts_with("0x") {
        16
    } else if lower.starts_with("0o") {
        8
    } else if lower.starts_with("0b") {
        2
    } else {
        return digits.parse::<f64>().ok().map(LiteralValue::Number);
    };
    let mut value = 0f64;
    for c in lower[2..].chars() {
        value = value * radix as f64 + c.to_digit(radix)? as f64;
    }
    Some(LiteralValue::Number(value))
}

/// Resolves escape sequences of a string or template body. Malformed escapes
/// are kept as written.
pub fn cook_string(raw: &str) -> String {
    let mut cooked = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            cooked.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some(escaped) => escaped,
            None => {
                cooked.push('\\');
                break;
            }
        };
        match escaped {
            'n' => cooked.push('\n'),
            't' => cooked.push('\t'),
            'r' => cooked.push('\r'),
            'b' => cooked.push('\u{8}'),
            'f' => cooked.push('\u{c}'),
            'v' => cooked.push('\u{b}'),
            '0' if !chars.peek().map_or(false, |d| d.is_ascii_digit()) => cooked.push('\0'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) if hex.len() == 2 => cooked.push(ch),
                    _ => {
                        cooked.push_str("\\x");
                        cooked.push_str(&hex);
                    }
                }
            }
            'u' => {
                let code = read_unicode_escape(&mut chars);
                match code {
                    Some(high @ 0xD800..=0xDBFF) => {
                        let mut lookahead = chars.clone();
                        let low = if lookahead.next() == Some('\\') && lookahead.next() == Some('u')
                        {
                            read_unicode_escape(&mut lookahead)
                        } else {
                            None
                        };
                        match low {
                            Some(low @ 0xDC00..=0xDFFF) => {
                                chars = lookahead;
                                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                                cooked.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                            }
                            _ => cooked.push('\u{FFFD}'),
                        }
                    }
                    Some(code) => cooked.push(char::from_u32(code).unwrap_or('\u{FFFD}')),
                    None => cooked.push_str("\\u"),
                }
            }
            other => cooked.push(other),
        }
    }
    cooked
}

fn read_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        chars.next();
        let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
        return u32::from_str_radix(&hex, 16).ok();
    }
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooks_common_escapes() {
        assert_eq!(cook_string(r"a\nb\t\x41B\u{43}"), "a\nb\tABC");
        assert_eq!(cook_string(r"\uD83D\uDE00"), "\u{1F600}");
        assert_eq!(cook_string("line\\\ncontinued"), "linecontinued");
    }

    #[test]
    fn numbers_in_every_radix() {
        assert_eq!(parse_numeric_literal("0x1F"), Some(LiteralValue::Number(31.0)));
        assert_eq!(parse_numeric_literal("0b101"), Some(LiteralValue::Number(5.0)));
        assert_eq!(parse_numeric_literal("0o17"), Some(LiteralValue::Number(15.0)));
        assert_eq!(parse_numeric_literal("1_000.5"), Some(LiteralValue::Number(1000.5)));
        assert_eq!(parse_numeric_literal(".5e1"), Some(LiteralValue::Number(5.0)));
        assert_eq!(
            parse_numeric_literal("10n"),
            Some(LiteralValue::BigInt("10".to_string()))
        );
    }

    #[test]
    fn regular_expression_parts() {
        assert_eq!(split_regular_expression("/a[/]b/gi"), ("a[/]b", "gi"));
    }
}
