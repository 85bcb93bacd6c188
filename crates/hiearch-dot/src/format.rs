//! Label templates: `{name}` placeholders with `{{` and `}}` escapes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use hiearch_core::{Error, Result};
use regex::Regex;

/// Values available to a template.
pub type Substitutions = BTreeMap<String, String>;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("token pattern is valid")
});

/// Expand `template` with `values`.
///
/// Unknown placeholders and unmatched braces fail with `FormatFailed`.
pub fn format_label(template: &str, values: &Substitutions) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    for caps in TOKEN.captures_iter(template) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        output.push_str(&template[last..token.start()]);
        last = token.end();

        match (token.as_str(), caps.get(1)) {
            ("{{", _) => output.push('{'),
            ("}}", _) => output.push('}'),
            (_, Some(name)) => {
                let value = values.get(name.as_str()).ok_or_else(|| {
                    Error::format_failed(
                        template,
                        format!("unknown placeholder '{}'", name.as_str()),
                    )
                })?;
                output.push_str(value);
            }
            (brace, None) => {
                return Err(Error::format_failed(
                    template,
                    format!("single '{brace}' encountered in template"),
                ));
            }
        }
    }
    output.push_str(&template[last..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiearch_core::ErrorKind;

    fn values() -> Substitutions {
        Substitutions::from([
            ("label".to_string(), "Database".to_string()),
            ("id".to_string(), "db".to_string()),
        ])
    }

    #[test]
    fn placeholders_are_substituted() {
        assert_eq!(
            format_label("<b>{label}</b> ({id})", &values()).unwrap(),
            "<b>Database</b> (db)"
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        assert_eq!(format_label("{{{id}}}", &values()).unwrap(), "{db}");
    }

    #[test]
    fn unknown_placeholder_fails() {
        let err = format_label("{owner}", &values()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatFailed);
        assert_eq!(err.context_value("template"), Some("{owner}"));
    }

    #[test]
    fn unmatched_brace_fails() {
        let err = format_label("oops {label", &values()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatFailed);
    }
}
