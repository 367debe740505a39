//! Small numeric and CSS text helpers shared by the built-in classes.

use tracing::warn;

use crate::theme::InlineStyle;
use crate::value::{Value, format_number};

/// Round to one decimal place, halves toward positive infinity.
pub fn round(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Interpret a scalar-ish property.
///
/// `true` is 1 and `false` is 0. Numbers and numeric strings are rounded
/// to one decimal; anything else is 0.
pub fn scalar(value: &Value) -> f64 {
    let n = match value {
        Value::Bool(true) => return 1.0,
        Value::Bool(false) | Value::Unset | Value::Color(_) => return 0.0,
        Value::Number(n) => *n,
        Value::Str(s) => leading_float(s),
    };
    if n.is_finite() { round(n) } else { 0.0 }
}

/// Parse the longest numeric prefix, so `"2px"` reads as 2 and `"1e3"` as
/// 1000.
fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    s[..end].parse().unwrap_or(f64::NAN)
}

/// Format a pixel length, rounded to one decimal.
pub fn px(value: f64) -> String {
    format!("{}px", format_number(round(value)))
}

/// Split an identifier into words at separators, lower-to-upper case
/// changes, the end of an acronym run (`XMLHttp`), and letter/digit
/// boundaries.
fn words(name: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let bytes = segment.as_bytes();
        let mut start = 0;
        for i in 1..bytes.len() {
            let (prev, cur) = (bytes[i - 1], bytes[i]);
            let boundary = prev.is_ascii_digit() != cur.is_ascii_digit()
                || (prev.is_ascii_lowercase() && cur.is_ascii_uppercase())
                || (prev.is_ascii_uppercase()
                    && cur.is_ascii_uppercase()
                    && bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase));
            if boundary {
                out.push(&segment[start..i]);
                start = i;
            }
        }
        if start < segment.len() {
            out.push(&segment[start..]);
        }
    }
    out
}

/// Convert `kebab-case`, `snake_case`, space separated or shouting words to
/// `camelCase`. Each word is lowercased, then every word after the first is
/// capitalized.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in words(name).into_iter().enumerate() {
        let lower = word.to_ascii_lowercase();
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.push(first);
            } else {
                out.push(first.to_ascii_uppercase());
            }
            out.extend(chars);
        }
    }
    out
}

/// Parse a run of `name: value;` declarations into an inline style map.
///
/// Whitespace runs collapse to one space. Text after the last `;` is
/// ignored. Names are camelCased and values trimmed.
pub fn css_to_inline(css: &str) -> InlineStyle {
    let collapsed = css.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut rules: Vec<&str> = collapsed.split(';').collect();
    rules.pop();

    let mut style = InlineStyle::new();
    for rule in rules {
        let (name, value) = match rule.split_once(':') {
            Some((name, value)) => (name, value.split(':').next().unwrap_or("")),
            None => {
                if !rule.trim().is_empty() {
                    warn!(inline.rule = rule, "Inline rule has no ':' separator");
                }
                (rule, "")
            }
        };
        let name = camel_case(name);
        if name.is_empty() {
            continue;
        }
        style.insert(name, value.trim());
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round(2.34), 2.3);
        assert_eq!(round(2.36), 2.4);
        assert_eq!(round(7.0), 7.0);
        assert_eq!(round(-0.25), -0.2);
    }

    #[test]
    fn test_scalar() {
        assert_eq!(scalar(&Value::Bool(true)), 1.0);
        assert_eq!(scalar(&Value::Bool(false)), 0.0);
        assert_eq!(scalar(&Value::Number(1.26)), 1.3);
        assert_eq!(scalar(&Value::from("2px")), 2.0);
        assert_eq!(scalar(&Value::from("auto")), 0.0);
        assert_eq!(scalar(&Value::from("1e3")), 1000.0);
        assert_eq!(scalar(&Value::from("2.5E-1px")), 0.3);
        assert_eq!(scalar(&Value::from(".5")), 0.5);
        assert_eq!(scalar(&Value::from("3em")), 3.0);
        assert_eq!(scalar(&Value::from("-")), 0.0);
        assert_eq!(scalar(&Value::Unset), 0.0);
    }

    #[test]
    fn test_px() {
        assert_eq!(px(14.0), "14px");
        assert_eq!(px(14.0 / 6.0), "2.3px");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("border-radius"), "borderRadius");
        assert_eq!(camel_case(" background-color "), "backgroundColor");
        assert_eq!(camel_case("color"), "color");
        assert_eq!(camel_case("fontSize"), "fontSize");
        assert_eq!(camel_case("-webkit-user-select"), "webkitUserSelect");
        assert_eq!(camel_case("BORDER-radius"), "borderRadius");
        assert_eq!(camel_case("Font-Size"), "fontSize");
        assert_eq!(camel_case("XMLHttpRequest"), "xmlHttpRequest");
        assert_eq!(camel_case("grid_row2end"), "gridRow2End");
    }

    #[test]
    fn test_css_to_inline() {
        let style = css_to_inline("  font-size:  12px;\n  border-radius: 2px 0 ;  trailing");
        assert_eq!(style.str("fontSize"), Some("12px"));
        assert_eq!(style.str("borderRadius"), Some("2px 0"));
        assert!(!style.contains("trailing"));
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn test_css_to_inline_value_stops_at_second_colon() {
        let style = css_to_inline("background: url(a:b);");
        assert_eq!(style.str("background"), Some("url(a"));
    }

    #[test]
    fn test_css_to_inline_missing_value() {
        let style = css_to_inline("display;");
        assert_eq!(style.str("display"), Some(""));
    }
}
