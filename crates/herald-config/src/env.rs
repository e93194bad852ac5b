use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Substitute `{{ env.VAR }}` placeholders in raw config text
///
/// `{{ env.VAR | default("x") }}` falls back to `x` when `VAR` is unset.
/// Comment lines are copied verbatim so commented-out secrets never need
/// to be present in the environment.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
            continue;
        }

        let mut failure = None;
        let expanded = placeholder().replace_all(line, |captures: &Captures<'_>| {
            match resolve(&captures[1], captures.get(2).map(|m| m.as_str())) {
                Ok(value) => value,
                Err(e) => {
                    failure.get_or_insert(e);
                    String::new()
                }
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        lines.push(expanded.into_owned());
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_owned()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        let input = "[server]\nlisten_address = \"127.0.0.1:3000\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_base_url() {
        temp_env::with_var("STORE_API_URL", Some("http://stores.internal"), || {
            let result = expand_env("base_url = \"{{ env.STORE_API_URL }}\"").unwrap();
            assert_eq!(result, "base_url = \"http://stores.internal\"");
        });
    }

    #[test]
    fn missing_var_is_an_error() {
        temp_env::with_var_unset("STORE_API_KEY", || {
            let err = expand_env("key = \"{{ env.STORE_API_KEY }}\"").unwrap_err();
            assert!(err.contains("STORE_API_KEY"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("STORE_API_KEY", || {
            let result = expand_env("key = \"{{ env.STORE_API_KEY | default(\"dev\") }}\"").unwrap();
            assert_eq!(result, "key = \"dev\"");
        });

        temp_env::with_var("STORE_API_KEY", Some("prod"), || {
            let result = expand_env("key = \"{{ env.STORE_API_KEY | default(\"dev\") }}\"").unwrap();
            assert_eq!(result, "key = \"prod\"");
        });
    }

    #[test]
    fn unscoped_variable_is_rejected() {
        let err = expand_env("key = \"{{ vault.TOKEN }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comments_are_not_expanded() {
        temp_env::with_var_unset("UNSET_SECRET", || {
            let input = "  # key = \"{{ env.UNSET_SECRET }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
