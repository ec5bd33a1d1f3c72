//! `${NAME}` substitution for SQL scripts.
//!
//! Rendering is a single pass over the input: substituted values are not
//! scanned again, names are matched case-sensitively, and tokens whose
//! name is not in the variable set are left exactly as written.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Variable set used for rendering (process environment plus overrides)
pub type TemplateVariables = HashMap<String, String>;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex literal")
    })
}

/// Render `text`, replacing every `${NAME}` whose `NAME` is in `variables`.
pub fn render(text: &str, variables: &TemplateVariables) -> String {
    if variables.is_empty() {
        return text.to_string();
    }

    token_regex()
        .replace_all(text, |caps: &Captures<'_>| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Names referenced by `${NAME}` tokens in `text` that `variables` cannot resolve.
///
/// Logged when a script is rendered; unresolved tokens are never an error.
pub fn unresolved_names(text: &str, variables: &TemplateVariables) -> Vec<String> {
    let mut names: Vec<String> = token_regex()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| !variables.contains_key(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
