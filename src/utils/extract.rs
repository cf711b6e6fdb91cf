//! Model output extraction
//!
//! Pulls the first well-formed JSON value out of raw model text, tolerating
//! markdown code fences and surrounding prose

use thiserror::Error;

/// Extraction failure, carrying a preview of the offending text
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No JSON value found in model output: {preview}")]
    NoJson { preview: String },

    #[error("Model output is not valid JSON: {source} - text: {preview}")]
    Parse {
        source: serde_json::Error,
        preview: String,
    },

    #[error("Model output does not match the expected schema: {source}")]
    Schema { source: serde_json::Error },
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Remove all triple-backtick fences, with or without a language tag
fn strip_fences(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            // Keep anything after the fence marker on the same line
            let rest = trimmed.trim_start_matches('`');
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            if !rest.trim().is_empty() {
                cleaned.push_str(rest.trim());
                cleaned.push('\n');
            }
            continue;
        }
        cleaned.push_str(line);
        cleaned.push('\n');
    }
    cleaned
}

/// Extract the first JSON object or array from raw model text.
///
/// Models wrap structured answers in fences and prose; the scan takes the
/// first `{` to the last `}` (or `[`..`]` when an array opens first, for
/// tasks that return a list) and parses that span.
pub fn extract_json(text: &str) -> Result<serde_json::Value, ExtractError> {
    let cleaned = strip_fences(text);

    let obj_start = cleaned.find('{');
    let arr_start = cleaned.find('[');

    let (start, end) = match (obj_start, arr_start) {
        (Some(o), Some(a)) if a < o => (a, cleaned.rfind(']')),
        (Some(o), _) => (o, cleaned.rfind('}')),
        (None, Some(a)) => (a, cleaned.rfind(']')),
        (None, None) => {
            return Err(ExtractError::NoJson {
                preview: preview(text),
            })
        }
    };

    let end = match end {
        Some(e) if e > start => e,
        _ => {
            return Err(ExtractError::NoJson {
                preview: preview(text),
            })
        }
    };

    let span = &cleaned[start..=end];
    serde_json::from_str(span).map_err(|source| ExtractError::Parse {
        source,
        preview: preview(span),
    })
}

/// Extract and coerce model output into a typed schema.
///
/// Any absent or wrong-typed field is an extraction failure here, so that
/// loosely-shaped provider output never travels deeper into the system.
pub fn extract_typed<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(|source| ExtractError::Schema { source })
}
