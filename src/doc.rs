//! Doc-template filling.
//!
//! Substitutes named placeholders in documentation templates at wrap time.
//! Useful when several callables share common inputs or when the valid range
//! of a parameter is defined by a constant that the docs should quote.

/// Substitute `{name}` placeholders in `template` with the given values.
///
/// Placeholders with no matching value are left intact, so a partially
/// filled template can be filled again later. `{{` and `}}` produce literal
/// braces.
///
/// # Example
/// ```ignore
/// let doc = doc::fill(
///     "Retries up to {max} times. Escaped: {{not_a_placeholder}}",
///     &[("max", "4".to_string())],
/// );
/// assert_eq!(doc, "Retries up to 4 times. Escaped: {not_a_placeholder}");
/// ```
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                match values.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) if closed => out.push_str(value),
                    _ => {
                        // unknown or unterminated: emit verbatim
                        out.push('{');
                        out.push_str(&name);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_named_placeholders() {
        let out = fill(
            "options are {opts}, default {default}",
            &[
                ("opts", "a, b, c".to_string()),
                ("default", "a".to_string()),
            ],
        );
        assert_eq!(out, "options are a, b, c, default a");
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let out = fill("known {a}, unknown {b}", &[("a", "1".to_string())]);
        assert_eq!(out, "known 1, unknown {b}");
    }

    #[test]
    fn escaped_braces() {
        let out = fill("literal {{x}} and {x}", &[("x", "42".to_string())]);
        assert_eq!(out, "literal {x} and 42");
    }

    #[test]
    fn unterminated_placeholder_is_kept() {
        let out = fill("broken {tail", &[("tail", "v".to_string())]);
        assert_eq!(out, "broken {tail");
    }

    #[test]
    fn repeated_placeholder_fills_every_occurrence() {
        let out = fill("{n} and {n}", &[("n", "2".to_string())]);
        assert_eq!(out, "2 and 2");
    }
}
