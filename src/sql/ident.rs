//! Identifier and literal quoting for generated Trino SQL

/// Returns `name` unchanged when it is a plain identifier, otherwise a
/// double-quoted identifier with embedded quotes doubled.
///
/// Trino folds identifiers to lowercase whether or not they are quoted.
pub fn quote_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Single-quoted SQL string literal with embedded quotes doubled
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        let test_cases = [
            // (input, expected, description)
            ("orders", "orders", "plain lowercase"),
            ("Order_Items2", "Order_Items2", "mixed case with digits"),
            ("_tmp", "_tmp", "leading underscore"),
            ("order date", "\"order date\"", "space"),
            ("2024_sales", "\"2024_sales\"", "leading digit"),
            ("a\"b", "\"a\"\"b\"", "embedded double quote"),
            ("x; DROP TABLE y", "\"x; DROP TABLE y\"", "injection attempt"),
            ("", "\"\"", "empty"),
        ];

        for (input, expected, description) in test_cases {
            assert_eq!(
                quote_identifier(input),
                expected,
                "Failed: {} - input '{}'",
                description,
                input
            );
        }
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("dt"), "'dt'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }
}
