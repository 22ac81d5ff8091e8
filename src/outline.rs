//! Slide outlines as returned by the model: a JSON array whose first element
//! is the title slide and whose remaining elements are content slides.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("invalid model response: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("model response contains no slides")]
    Empty,

    #[error("slide {index} is not a JSON object")]
    NotAnObject { index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleSlide {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSlide {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_text: String,
    /// Top-level bullet points.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_strings")]
    pub text: Vec<String>,
    /// Second-level detail line shown under the bullets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub img_path: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_table")]
    pub table: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub title: TitleSlide,
    pub slides: Vec<ContentSlide>,
}

impl Outline {
    /// Parse a raw model response, tolerating a surrounding markdown code fence.
    pub fn from_response(response: &str) -> Result<Self, OutlineError> {
        Self::from_json(strip_code_fence(response))
    }

    pub fn from_json(json: &str) -> Result<Self, OutlineError> {
        let items: Vec<Value> = serde_json::from_str(json)?;
        let mut items = items.into_iter().enumerate();

        let (_, first) = items.next().ok_or(OutlineError::Empty)?;
        let title = match first {
            first @ Value::Object(_) => serde_json::from_value(first)?,
            _ => return Err(OutlineError::NotAnObject { index: 0 }),
        };

        let slides = items
            .map(|(index, item)| match item {
                item @ Value::Object(_) => Ok(serde_json::from_value(item)?),
                _ => Err(OutlineError::NotAnObject { index }),
            })
            .collect::<Result<Vec<ContentSlide>, OutlineError>>()?;

        Ok(Outline { title, slides })
    }

    /// Render back to the JSON array shape the model produces.
    pub fn to_json(&self) -> Result<String, OutlineError> {
        let mut items = Vec::with_capacity(self.slides.len() + 1);
        items.push(serde_json::to_value(&self.title)?);
        for slide in &self.slides {
            items.push(serde_json::to_value(slide)?);
        }
        Ok(serde_json::to_string_pretty(&items)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read outline: {}", path.display()))?;
        Self::from_response(&json)
            .with_context(|| format!("Failed to parse outline: {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write outline: {}", path.display()))
    }
}

/// Strip a ```` ``` ```` or ```` ```json ```` fence wrapping the payload.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // language tag runs to the end of the opening line
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        _ => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn scalar_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        single => vec![scalar_to_string(single)],
    })
}

fn lenient_table<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Vec<String>>>, D::Error> {
    let rows = match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows,
        _ => return Ok(None),
    };
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => cells.into_iter().map(scalar_to_string).collect(),
            cell => vec![scalar_to_string(cell)],
        })
        .collect();
    Ok(if rows.is_empty() { None } else { Some(rows) })
}
