//! Numeric placeholder extraction shared by the parser and the resolver.
//!
//! A modifier line such as `+94 to maximum Life` is split into the lookup
//! text `# to maximum Life` and the value string `94`. Influence boss names
//! (optionally preceded by `The`) are treated like numbers so that one
//! dictionary entry covers every boss variant.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Placeholder character used by the stat dictionary.
pub const PLACEHOLDER: char = '#';

static VALUE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[+-]?\d+(?:\.\d{1,3})?|\b(?:The )?(?:Shaper|Elder|Crusader|Redeemer|Hunter|Warlord)\b",
    )
    .expect("value token pattern is valid")
});

/// Result of replacing value tokens in a modifier line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Line with each value token replaced by a single `#`.
    pub text: String,
    /// Comma-joined tokens in left-to-right order.
    pub value: String,
}

impl Extracted {
    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Replace every value token in `line` with `#` and collect the tokens.
///
/// A leading `+` is dropped from numeric tokens, a leading `-` is kept.
pub fn extract_placeholders(line: &str) -> Extracted {
    let mut text = String::with_capacity(line.len());
    let mut values: Vec<&str> = Vec::new();
    let mut last = 0;

    for m in VALUE_TOKEN.find_iter(line) {
        text.push_str(&line[last..m.start()]);
        text.push(PLACEHOLDER);
        values.push(m.as_str().trim_start_matches('+'));
        last = m.end();
    }
    text.push_str(&line[last..]);

    Extracted {
        text,
        value: values.join(","),
    }
}

/// Number of value tokens in `line`.
pub fn count_value_tokens(line: &str) -> usize {
    VALUE_TOKEN.find_iter(line).count()
}

/// Canonical lookup form of a dictionary or placeholder text.
///
/// The dictionary writes signed placeholders (`+#`, `-#`) while extraction
/// folds the sign into the value, so the sign in front of a placeholder is
/// dropped on both sides.
pub fn canonical_text(text: &str) -> String {
    text.trim().replace("+#", "#").replace("-#", "#")
}

/// Negate every numeric component of a comma-joined value string.
pub fn negate_value(value: &str) -> String {
    value
        .split(',')
        .map(|part| {
            let part = part.trim();
            if part.parse::<f64>().is_err() {
                part.to_string()
            } else if let Some(positive) = part.strip_prefix('-') {
                positive.to_string()
            } else {
                format!("-{}", part)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Strip a trailing annotation such as `(implicit)` from a line.
///
/// Returns `None` if the line does not end with the annotation.
pub fn strip_annotation<'a>(line: &'a str, annotation: &str) -> Option<&'a str> {
    line.trim_end()
        .strip_suffix(annotation)
        .map(|rest| rest.trim_end())
}
