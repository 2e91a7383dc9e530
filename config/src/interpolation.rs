//! # Environment Variable Interpolation
//!
//! Expands `${IDENT}` and `${IDENT:DEFAULT}` in string values:
//! - `${IDENT}` is replaced by the variable's value; an unset variable is an
//!   error.
//! - `${IDENT:DEFAULT}` falls back to `DEFAULT` (which may be empty) when the
//!   variable is unset.
//!
//! Expansion is single-pass. Substituted text is copied verbatim and never
//! scanned again, so a variable whose value contains `${...}` cannot trigger
//! further lookups. A lone `$` not followed by `{` is literal.

use errors::InterpolationError;

use crate::loader::Environment;

const OPEN: &str = "${";

fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `input` contains anything that looks like an interpolation.
pub fn has_interpolation(input: &str) -> bool {
    input.contains(OPEN)
}

/// Expand every `${...}` occurrence in `input` against `env`.
///
/// # Errors
///
/// - [`InterpolationError::MissingVariable`] when a variable without a
///   default clause is unset
/// - [`InterpolationError::Syntax`] for an unterminated `${`, an invalid
///   variable name, or a nested `${` inside an expression
pub fn interpolate(input: &str, env: &dyn Environment) -> Result<String, InterpolationError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);

        let position = offset + start;
        let body_start = start + OPEN.len();
        let Some(body_len) = rest[body_start..].find('}') else {
            return Err(InterpolationError::Syntax {
                position,
                reason: "unterminated '${'".to_string()
            });
        };
        let body = &rest[body_start..body_start + body_len];

        if body.contains(OPEN) {
            return Err(InterpolationError::Syntax {
                position,
                reason: "nested '${' is not supported".to_string()
            });
        }

        let (ident, default) = match body.split_once(':') {
            Some((ident, default)) => (ident, Some(default)),
            None => (body, None)
        };

        if !is_identifier(ident) {
            return Err(InterpolationError::Syntax {
                position,
                reason: format!("invalid variable name {ident:?}")
            });
        }

        match (env.var(ident), default) {
            (Some(value), _) => output.push_str(&value),
            (None, Some(default)) => output.push_str(default),
            (None, None) => {
                return Err(InterpolationError::MissingVariable {
                    variable: ident.to_string()
                });
            }
        }

        let consumed = body_start + body_len + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let env = env(&[]);
        assert_eq!(interpolate("sqlite.db", &env).unwrap(), "sqlite.db");
        assert_eq!(interpolate("cost: $5 {x}", &env).unwrap(), "cost: $5 {x}");
        assert_eq!(interpolate("", &env).unwrap(), "");
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(interpolate("${X:5758}", &env(&[])).unwrap(), "5758");
    }

    #[test]
    fn test_environment_wins_over_default() {
        assert_eq!(interpolate("${X:5758}", &env(&[("X", "8080")])).unwrap(), "8080");
    }

    #[test]
    fn test_empty_default() {
        assert_eq!(interpolate("a${X:}b", &env(&[])).unwrap(), "ab");
    }

    #[test]
    fn test_empty_variable_falls_back_to_default() {
        assert_eq!(interpolate("${X:fallback}", &env(&[("X", "")])).unwrap(), "fallback");
    }

    #[test]
    fn test_missing_variable_without_default_fails_closed() {
        let err = interpolate("${X}", &env(&[])).unwrap_err();
        assert_eq!(
            err,
            InterpolationError::MissingVariable {
                variable: "X".to_string()
            }
        );
    }

    #[test]
    fn test_multiple_expressions_and_surrounding_text() {
        let env = env(&[("HOST", "db.internal"), ("PORT", "5432")]);
        assert_eq!(
            interpolate("postgres://${HOST}:${PORT}/${DB:terralist}", &env).unwrap(),
            "postgres://db.internal:5432/terralist"
        );
    }

    #[test]
    fn test_default_may_contain_colons() {
        assert_eq!(
            interpolate("${URL:http://localhost:5758}", &env(&[])).unwrap(),
            "http://localhost:5758"
        );
    }

    #[test]
    fn test_substitution_is_not_rescanned() {
        let env = env(&[("A", "${B}"), ("B", "secret")]);
        assert_eq!(interpolate("${A}", &env).unwrap(), "${B}");
    }

    #[test]
    fn test_unterminated_expression() {
        let err = interpolate("abc ${PORT", &env(&[])).unwrap_err();
        assert!(matches!(err, InterpolationError::Syntax { position: 4, .. }));
    }

    #[test]
    fn test_invalid_identifiers() {
        for input in ["${}", "${:x}", "${1X}", "${MY-VAR}", "${ X }"] {
            let err = interpolate(input, &env(&[])).unwrap_err();
            assert!(
                matches!(err, InterpolationError::Syntax { .. }),
                "{input:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_nested_expression_is_rejected() {
        let err = interpolate("${A:${B}}", &env(&[])).unwrap_err();
        assert!(matches!(err, InterpolationError::Syntax { position: 0, .. }));
    }

    #[test]
    fn test_error_position_accounts_for_previous_expressions() {
        let err = interpolate("${A:x}-${", &env(&[])).unwrap_err();
        assert!(matches!(err, InterpolationError::Syntax { position: 7, .. }));
    }

    #[test]
    fn test_has_interpolation() {
        assert!(has_interpolation("${X}"));
        assert!(!has_interpolation("$X"));
    }
}
