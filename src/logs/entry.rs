//! A single element of a log events file
//!
//! Files hold a JSON array whose elements are either plain strings or JSON
//! objects. The element kind is decided by looking at the JSON token before
//! committing to a variant, so objects keep their key order (serde_json is
//! built with `preserve_order`).

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};

/// One log event as it appears in the input file
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// A JSON string, used as the message verbatim
    Text(String),
    /// A JSON object, re-encoded as compact JSON
    Object(Map<String, Value>),
    /// A number or boolean, rendered as its literal text
    Literal(String),
}

impl LogEntry {
    /// Render the entry as the message text sent to CloudWatch Logs
    pub fn into_message(self) -> Result<String, serde_json::Error> {
        match self {
            LogEntry::Text(text) | LogEntry::Literal(text) => Ok(text),
            LogEntry::Object(map) => serde_json::to_string(&map),
        }
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LogEntryVisitor)
    }
}

struct LogEntryVisitor;

impl<'de> Visitor<'de> for LogEntryVisitor {
    type Value = LogEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a log string or a JSON object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LogEntry, E> {
        Ok(LogEntry::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<LogEntry, E> {
        Ok(LogEntry::Text(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<LogEntry, E> {
        Ok(LogEntry::Literal(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LogEntry, E> {
        Ok(LogEntry::Literal(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LogEntry, E> {
        Ok(LogEntry::Literal(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LogEntry, E> {
        Ok(LogEntry::Literal(v.to_string()))
    }

    fn visit_map<A>(self, map: A) -> Result<LogEntry, A::Error>
    where
        A: MapAccess<'de>,
    {
        let object = Map::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(LogEntry::Object(object))
    }
}
