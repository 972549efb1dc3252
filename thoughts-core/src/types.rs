//! Domain types for the thoughts collection.
//!
//! An [`Entry`] is decoded from a generic YAML record (`serde_yaml::Value`)
//! rather than derived, so that a single bad field produces a precise
//! [`EntryError`] and unknown fields survive untouched in [`Entry::extra`].

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::EntryError;

/// On-disk date format (`2025-09-28`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MINUTES_PER_DAY: i64 = 24 * 60;

// ---------------------------------------------------------------------------
// EntryTime
// ---------------------------------------------------------------------------

/// Same-day clock time of an entry.
///
/// Written back as `HH:MM`, or `HH:MM:SS` when seconds are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryTime(NaiveTime);

impl EntryTime {
    /// Sort position for entries that carry no time at all.
    pub const MIDNIGHT: EntryTime = EntryTime(NaiveTime::MIN);

    /// Parse `H:MM`, `HH:MM` or `HH:MM:SS`.
    pub fn parse(text: &str) -> Result<Self, EntryError> {
        let trimmed = text.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(Self)
            .map_err(|_| EntryError::InvalidTime {
                value: text.to_owned(),
            })
    }

    /// YAML 1.1 loaders read a bare `02:40` as the base-60 integer `160`.
    /// Undo that reading: `minutes` is minutes since midnight.
    pub fn from_minutes(minutes: i64) -> Result<Self, EntryError> {
        if !(0..MINUTES_PER_DAY).contains(&minutes) {
            return Err(EntryError::InvalidTime {
                value: minutes.to_string(),
            });
        }
        NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
            .map(Self)
            .ok_or_else(|| EntryError::InvalidTime {
                value: minutes.to_string(),
            })
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for EntryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

impl Serialize for EntryTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Names of the fields the reconciler understands, in output order.
pub const KNOWN_FIELDS: &[&str] = &[
    "date",
    "time",
    "content",
    "images",
    "link",
    "link_title",
    "source_link",
    "topic",
];

/// One logged event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub date: Option<NaiveDate>,
    pub time: Option<EntryTime>,
    pub content: Option<String>,
    /// Ordered resource references. `None` when absent or empty.
    pub images: Option<Vec<String>>,
    pub link: Option<String>,
    pub link_title: Option<String>,
    pub source_link: Option<String>,
    pub topic: Option<String>,
    /// Fields outside [`KNOWN_FIELDS`], in their original order.
    pub extra: Mapping,
}

impl Entry {
    /// Decode one record of the collection.
    pub fn from_value(value: Value) -> Result<Self, EntryError> {
        let Value::Mapping(map) = value else {
            return Err(EntryError::NotAMapping);
        };

        let mut entry = Entry::default();
        for (key, value) in map {
            let name = key.as_str().map(str::to_owned);
            match name.as_deref() {
                Some("date") => entry.date = decode_date(value)?,
                Some("time") => entry.time = decode_time(value)?,
                Some(field @ "content") => entry.content = decode_text(field, value)?,
                Some(field @ "images") => entry.images = decode_list(field, value)?,
                Some(field @ "link") => entry.link = decode_text(field, value)?,
                Some(field @ "link_title") => entry.link_title = decode_text(field, value)?,
                Some(field @ "source_link") => entry.source_link = decode_text(field, value)?,
                Some(field @ "topic") => entry.topic = decode_text(field, value)?,
                _ => {
                    entry.extra.insert(key, value);
                }
            }
        }
        Ok(entry)
    }

    /// Encode back into a YAML record, known fields first in [`KNOWN_FIELDS`] order.
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        if let Some(date) = self.date {
            map.insert("date".into(), date.format(DATE_FORMAT).to_string().into());
        }
        if let Some(time) = self.time {
            map.insert("time".into(), time.to_string().into());
        }
        insert_text(&mut map, "content", &self.content);
        if let Some(images) = self.images.as_ref().filter(|i| !i.is_empty()) {
            let seq = images.iter().cloned().map(Value::String).collect();
            map.insert("images".into(), Value::Sequence(seq));
        }
        insert_text(&mut map, "link", &self.link);
        insert_text(&mut map, "link_title", &self.link_title);
        insert_text(&mut map, "source_link", &self.source_link);
        insert_text(&mut map, "topic", &self.topic);
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        Value::Mapping(map)
    }

    /// The authoritative external identifier: `source_link`, else `link`.
    /// Blank values do not count.
    pub fn identifier(&self) -> Option<&str> {
        non_blank(&self.source_link).or_else(|| non_blank(&self.link))
    }

    /// `date time` label for log lines and reports.
    pub fn label(&self) -> String {
        let date = self
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "????-??-??".to_string());
        match self.time {
            Some(time) => format!("{date} {time}"),
            None => date,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn insert_text(map: &mut Mapping, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.into(), Value::String(value.clone()));
    }
}

// ---------------------------------------------------------------------------
// Field decoders
// ---------------------------------------------------------------------------

/// Scalars of any kind become text; `null` means absent.
fn scalar_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn decode_text(field: &str, value: Value) -> Result<Option<String>, EntryError> {
    scalar_text(&value).ok_or_else(|| EntryError::WrongType {
        field: field.to_owned(),
        expected: "a scalar",
    })
}

/// A `null` item names no file, so it is not a reference and is skipped.
/// A list with nothing left is absent.
fn decode_list(field: &str, value: Value) -> Result<Option<Vec<String>>, EntryError> {
    let wrong = || EntryError::WrongType {
        field: field.to_owned(),
        expected: "a list of scalars",
    };
    let items = match value {
        Value::Null => return Ok(None),
        Value::Sequence(items) => items,
        _ => return Err(wrong()),
    };
    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        match scalar_text(item) {
            Some(Some(text)) => out.push(text),
            Some(None) => {}
            None => return Err(wrong()),
        }
    }
    Ok(if out.is_empty() { None } else { Some(out) })
}

fn decode_date(value: Value) -> Result<Option<NaiveDate>, EntryError> {
    let text = match scalar_text(&value) {
        Some(Some(text)) => text,
        Some(None) => return Ok(None),
        None => {
            return Err(EntryError::WrongType {
                field: "date".to_owned(),
                expected: "a date string",
            })
        }
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map(Some)
        .map_err(|_| EntryError::InvalidDate { value: text })
}

fn decode_time(value: Value) -> Result<Option<EntryTime>, EntryError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(minutes) => EntryTime::from_minutes(minutes).map(Some),
            None => Err(EntryError::InvalidTime {
                value: n.to_string(),
            }),
        },
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => EntryTime::parse(&s).map(Some),
        Value::Tagged(tagged) => decode_time(tagged.value),
        _ => Err(EntryError::WrongType {
            field: "time".to_owned(),
            expected: "a clock time",
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).expect("yaml")
    }

    #[test]
    fn time_display_drops_zero_seconds() {
        assert_eq!(EntryTime::parse("2:40").unwrap().to_string(), "02:40");
        assert_eq!(EntryTime::parse("02:40:07").unwrap().to_string(), "02:40:07");
    }

    #[test]
    fn sexagesimal_integer_time_is_recovered() {
        let entry = Entry::from_value(yaml("date: '2025-09-28'\ntime: 160\n")).unwrap();
        assert_eq!(entry.time.unwrap().to_string(), "02:40");
    }

    #[test]
    fn out_of_range_integer_time_is_rejected() {
        let err = Entry::from_value(yaml("time: 1440\n")).unwrap_err();
        assert!(matches!(err, EntryError::InvalidTime { .. }));
    }

    #[test]
    fn unknown_fields_are_kept_in_order() {
        let entry = Entry::from_value(yaml("date: '2025-01-01'\nzeta: 1\nalpha: [a, b]\n")).unwrap();
        let keys: Vec<_> = entry.extra.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn empty_image_list_decodes_as_absent() {
        let entry = Entry::from_value(yaml("images: []\n")).unwrap();
        assert!(entry.images.is_none());
    }

    #[test]
    fn null_image_items_are_not_references() {
        let entry = Entry::from_value(yaml("images: [~, /a.jpg, null]\n")).unwrap();
        assert_eq!(entry.images, Some(vec!["/a.jpg".to_string()]));

        let entry = Entry::from_value(yaml("images: [null]\n")).unwrap();
        assert!(entry.images.is_none());
    }

    #[test]
    fn list_content_is_wrong_type() {
        let err = Entry::from_value(yaml("content: [a]\n")).unwrap_err();
        assert_eq!(
            err,
            EntryError::WrongType {
                field: "content".into(),
                expected: "a scalar"
            }
        );
    }

    #[test]
    fn identifier_prefers_source_link_and_ignores_blank() {
        let entry = Entry {
            source_link: Some("  ".into()),
            link: Some("https://x/2".into()),
            ..Entry::default()
        };
        assert_eq!(entry.identifier(), Some("https://x/2"));
    }

    #[test]
    fn to_value_orders_known_fields_first() {
        let entry = Entry::from_value(yaml(
            "topic: t\nextra: 1\ncontent: hi\ntime: '10:00'\ndate: '2025-01-02'\n",
        ))
        .unwrap();
        let Value::Mapping(map) = entry.to_value() else {
            panic!("mapping expected")
        };
        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["date", "time", "content", "topic", "extra"]);
    }
}
