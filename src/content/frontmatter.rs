//! Front-matter parsing

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Deserializer for the `categories` field that accepts a bare string as
/// well as a sequence, so `categories: rust` and `categories: [rust, go]`
/// both parse. An explicit null stays `None` (same as an absent key).
fn string_or_seq<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrSeq;

    impl<'de> Visitor<'de> for StringOrSeq {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a category name or a sequence of category names")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value]))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(Some(items))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrSeq)
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    /// Legacy single-category field, still accepted from older posts
    pub category: Option<String>,
    /// Multi-category field; wins over `category` when present
    #[serde(deserialize_with = "string_or_seq")]
    pub categories: Option<Vec<String>>,

    /// Whatever else the author wrote, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string.
    /// Returns (front_matter, remaining_content).
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start();

        // YAML front-matter (---)
        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        // JSON front-matter (;;; or a leading object)
        if content.starts_with(";;;") || content.starts_with('{') {
            return Self::parse_json(content);
        }

        // No front-matter present
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str)> {
        let body = content.strip_prefix("---").unwrap_or(content);
        let body = body.trim_start_matches(['\r', '\n']);

        let Some((meta, tail)) = body.split_once("\n---") else {
            return Err(anyhow!("front-matter block is missing its closing ---"));
        };
        let remaining = tail.trim_start_matches(['\n', '\r']);

        if meta.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        let fm = serde_yaml::from_str(meta)
            .map_err(|e| anyhow!("invalid YAML front-matter: {}", e))?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str)> {
        // ;;;-delimited JSON
        if let Some(body) = content.strip_prefix(";;;") {
            let Some((meta, tail)) = body.split_once(";;;") else {
                return Err(anyhow!("front-matter block is missing its closing ;;;"));
            };
            let fm = serde_json::from_str(meta)
                .map_err(|e| anyhow!("invalid JSON front-matter: {}", e))?;
            return Ok((fm, tail.trim_start_matches(['\n', '\r'])));
        }

        // A bare JSON object leading the file
        let close = matching_brace(content)
            .ok_or_else(|| anyhow!("front-matter object is missing its closing brace"))?;
        let fm = serde_json::from_str(&content[..=close])
            .map_err(|e| anyhow!("invalid JSON front-matter: {}", e))?;
        Ok((fm, content[close + 1..].trim_start_matches(['\n', '\r'])))
    }

    /// Parse the date string into a NaiveDateTime
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// The post's category labels under the normalized model: `categories`
    /// when the field is present, otherwise the legacy `category` as a
    /// one-element list, otherwise empty. Labels are trimmed and
    /// de-duplicated, first occurrence wins.
    pub fn normalized_categories(&self) -> Vec<String> {
        let raw: Vec<&str> = match (&self.categories, &self.category) {
            (Some(list), _) => list.iter().map(|s| s.as_str()).collect(),
            (None, Some(single)) => vec![single.as_str()],
            (None, None) => Vec::new(),
        };

        let mut out: Vec<String> = Vec::with_capacity(raw.len());
        for label in raw {
            let label = label.trim();
            if !label.is_empty() && !out.iter().any(|seen| seen == label) {
                out.push(label.to_string());
            }
        }
        out
    }
}

/// Byte offset of the brace closing the object that starts the input
fn matching_brace(content: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in content.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a date string in the formats posts actually use
fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 as a last resort; keep the wall-clock time
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    None
}
