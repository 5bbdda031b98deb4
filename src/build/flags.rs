//! Flag parsing and merging for toolchain-mandated build flags
//!
//! The zig CGO toolchain mandates extra flags (static external linking on
//! linux, pie + stripped symbols on darwin). Those have to be merged into
//! whatever the user already declared without ever emitting the same flag
//! name twice. Flags are handled as name/value pairs and only rendered back
//! to strings at the subprocess boundary.

use std::collections::HashMap;

/// One compiler flag: `name` or `name=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub value: Option<String>,
}

impl Flag {
    /// Split a raw argument on the first `=`. Values may themselves contain
    /// `=` (e.g. `-ldflags="-linkmode=external"`), so only the first one
    /// separates name from value.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((name, value)) => Self {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => Self {
                name: raw.to_string(),
                value: None,
            },
        }
    }

    pub fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// Strip one level of matching quotes, reporting the quote character used.
fn unquote(value: &str) -> Option<(char, &str)> {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return Some((quote, &value[1..value.len() - 1]));
        }
    }
    None
}

/// Merge two quoted flag values token-by-token.
///
/// Tokens from `new` that are not already present in `old` are appended;
/// the result keeps `old`'s quote character. When either side is unquoted
/// the mandated value wins outright.
fn merge_values(old: &str, new: &str) -> String {
    let (Some((quote, old_inner)), Some((_, new_inner))) = (unquote(old), unquote(new)) else {
        return new.to_string();
    };

    let old_tokens: Vec<&str> = old_inner.split_whitespace().collect();
    let mut merged: Vec<&str> = old_tokens.clone();
    for token in new_inner.split_whitespace() {
        if !old_tokens.contains(&token) {
            merged.push(token);
        }
    }
    format!("{}{}{}", quote, merged.join(" "), quote)
}

/// Split a flags string on spaces, keeping quoted values intact.
///
/// `-ldflags="-linkmode=external -extldflags -static" -v` yields two
/// tokens, not four: spaces inside a `"…"` or `'…'` value do not separate
/// flags.
fn split_flags(raw: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in raw.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                ' ' => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                '"' | '\'' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                _ => current.push(ch),
            },
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Merge mandated `additional` flags (a space-separated string) into the
/// compiler argument vector, after the `build` subcommand token.
///
/// Existing flags keep their relative order; mandated flags that supersede
/// an existing one replace it in the merged block. No flag name appears
/// twice in the output.
pub fn merge_build_flags(base: &[String], additional: &str) -> Vec<String> {
    let Some(build_idx) = base.iter().position(|arg| arg == "build") else {
        return base.to_vec();
    };

    let existing: Vec<Flag> = base[build_idx + 1..].iter().map(|a| Flag::parse(a)).collect();
    let by_name: HashMap<&str, &Flag> =
        existing.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut merged_block: Vec<String> = Vec::new();
    let mut superseded: Vec<String> = Vec::new();

    for raw in split_flags(additional) {
        let flag = Flag::parse(&raw);
        match (by_name.get(flag.name.as_str()), &flag.value) {
            (None, _) => merged_block.push(raw),
            (Some(_), None) => {} // bare flag already present
            (Some(old), Some(new_value)) => {
                let old_value = old.value.as_deref().unwrap_or_default();
                let merged = Flag {
                    name: flag.name.clone(),
                    value: Some(merge_values(old_value, new_value)),
                };
                merged_block.push(merged.render());
                superseded.push(flag.name);
            }
        }
    }

    let mut result: Vec<String> = base[..=build_idx].to_vec();
    result.extend(merged_block);
    result.extend(
        existing
            .iter()
            .filter(|f| !superseded.contains(&f.name))
            .map(Flag::render),
    );
    result
}
