//! Front-matter parsing.
//!
//! A content file may open with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Launch day
//! date: 2024-01-15
//! tags: [release]
//! ---
//! # Body starts here
//! ```
//!
//! The block is split off and parsed into a [`FrontMatter`]: the fields the
//! pipeline relies on (`title`, `description`, `date`, `draft`) are typed, and
//! any other key is carried through in `extra` as an opaque JSON value. A file
//! without an opening fence has empty metadata and its whole text as body.
//!
//! ## Dates
//!
//! If `date` holds something that parses as a calendar date (`2024-01-15`,
//! `2024-01-15 09:30:00`, or an RFC 3339 timestamp) it is rewritten with the
//! configured strftime format. Anything else is passed through as written.
//! With the default `%Y-%m-%d` format the normalized strings sort
//! chronologically, which the collection assembler depends on.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use thiserror::Error;

/// Keys the resolver sets itself; a front-matter value for them is dropped.
const RESERVED_KEYS: &[&str] = &["slug", "content"];

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("front matter opened with `---` but never closed")]
    Unterminated,
    #[error("invalid YAML in front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a key/value mapping")]
    NotAMapping,
    #[error("front matter field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Parsed metadata block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: String,
    pub description: Option<String>,
    /// Normalized date, empty when absent.
    pub date: String,
    pub draft: Option<bool>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A file split into metadata and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Shape the YAML block is read into before normalization.
#[derive(Deserialize, Default)]
struct RawFrontMatter {
    #[serde(default)]
    title: Option<serde_yaml::Value>,
    #[serde(default)]
    description: Option<serde_yaml::Value>,
    #[serde(default)]
    date: Option<serde_yaml::Value>,
    #[serde(default)]
    draft: Option<serde_yaml::Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Split `raw` into front matter and body, normalizing dates with `date_format`.
pub fn parse(raw: &str, date_format: &str) -> Result<Document, FrontMatterError> {
    let (block, body) = match split(raw)? {
        Some(parts) => parts,
        None => {
            return Ok(Document {
                front_matter: FrontMatter::default(),
                body: strip_bom(raw).to_string(),
            });
        }
    };

    let raw_meta = parse_block(block)?;

    let mut extra = raw_meta.extra;
    for key in RESERVED_KEYS {
        extra.remove(*key);
    }

    let front_matter = FrontMatter {
        title: optional_scalar("title", raw_meta.title)?.unwrap_or_default(),
        description: optional_scalar("description", raw_meta.description)?,
        date: match optional_scalar("date", raw_meta.date)? {
            Some(date) => normalize_date(&date, date_format)?,
            None => String::new(),
        },
        draft: optional_bool("draft", raw_meta.draft)?,
        extra,
    };

    Ok(Document {
        front_matter,
        body: body.to_string(),
    })
}

/// Rewrite `value` with `format` if it parses as a date; otherwise return it unchanged.
pub fn normalize_date(value: &str, format: &str) -> Result<String, FrontMatterError> {
    let Some(date) = parse_date(value.trim()) else {
        return Ok(value.to_string());
    };
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| FrontMatterError::InvalidField {
        field: "date",
        reason: format!("invalid date format `{format}`"),
    })?;
    Ok(out)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Returns `(yaml_block, body)` or `None` when there is no opening fence.
fn split(raw: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let text = strip_bom(raw);
    let first_len = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    if !is_fence(&text[..first_len]) {
        return Ok(None);
    }

    let rest = &text[first_len..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) || line.trim_end() == "..." {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn parse_block(block: &str) -> Result<RawFrontMatter, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(RawFrontMatter::default());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(block)?;
    match value {
        serde_yaml::Value::Null => Ok(RawFrontMatter::default()),
        serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        _ => Err(FrontMatterError::NotAMapping),
    }
}

/// Accept any YAML scalar as text; `null` counts as absent.
fn optional_scalar(
    field: &'static str,
    value: Option<serde_yaml::Value>,
) -> Result<Option<String>, FrontMatterError> {
    use serde_yaml::Value;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(FrontMatterError::InvalidField {
            field,
            reason: "expected a scalar value".into(),
        }),
    }
}

fn optional_bool(
    field: &'static str,
    value: Option<serde_yaml::Value>,
) -> Result<Option<bool>, FrontMatterError> {
    use serde_yaml::Value;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(FrontMatterError::InvalidField {
            field,
            reason: format!("expected true or false, got {other:?}"),
        }),
    }
}
