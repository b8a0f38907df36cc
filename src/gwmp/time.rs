//! `time` field rendering
//!
//! The forwarder uses two textual layouts for UTC instants:
//! - rxpk/txpk: ISO 8601 "compact", microsecond precision
//!   (`2013-03-31T16:21:17.528002Z`)
//! - stat: ISO 8601 "expanded" with a GMT suffix (`2014-01-12 08:59:28 GMT`)
//!
//! A [`Timestamp`] carries its layout alongside the instant, so the same
//! record type can be rendered either way.

use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::ser::Error as _;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const EXPANDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S GMT";

/// Textual layout of a [`Timestamp`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLayout {
    /// RFC 3339 in UTC with the fraction trimmed of trailing zeros
    /// (omitted entirely when the instant falls on a whole second)
    Rfc3339Nano,
    /// RFC 3339 in UTC, whole seconds
    Rfc3339,
    /// `YYYY-MM-DD hh:mm:ss GMT`
    Expanded,
    /// Any strftime layout, built through [`TimeLayout::custom`]
    Custom(CustomLayout),
}

/// A strftime layout that parsed without errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomLayout(String);

impl CustomLayout {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TimeLayout {
    /// Build a custom strftime layout, rejecting unknown specifiers
    pub fn custom(layout: &str) -> anyhow::Result<Self> {
        if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow::anyhow!("Invalid time layout: {:?}", layout));
        }
        Ok(TimeLayout::Custom(CustomLayout(layout.to_string())))
    }
}

/// A UTC instant paired with the layout it is rendered in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    layout: TimeLayout,
    instant: DateTime<Utc>,
}

impl Timestamp {
    pub fn new(instant: DateTime<Utc>, layout: TimeLayout) -> Self {
        Self { layout, instant }
    }

    /// rxpk/txpk style (`Rfc3339Nano`)
    pub fn compact(instant: DateTime<Utc>) -> Self {
        Self::new(instant, TimeLayout::Rfc3339Nano)
    }

    /// stat style (`Expanded`)
    pub fn expanded(instant: DateTime<Utc>) -> Self {
        Self::new(instant, TimeLayout::Expanded)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn layout(&self) -> &TimeLayout {
        &self.layout
    }

    /// Parse a received `time` value, recognising the layouts the forwarder emits
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
            return Ok(Self::compact(instant.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, EXPANDED_FORMAT) {
            return Ok(Self::expanded(Utc.from_utc_datetime(&naive)));
        }
        Err(anyhow::anyhow!("Unrecognized time layout: {:?}", text))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.layout {
            TimeLayout::Rfc3339Nano => {
                write!(f, "{}", self.instant.format("%Y-%m-%dT%H:%M:%S"))?;
                // Leap seconds are reported as nanos >= 1e9
                let nanos = self.instant.timestamp_subsec_nanos() % 1_000_000_000;
                if nanos != 0 {
                    let fraction = format!("{:09}", nanos);
                    write!(f, ".{}", fraction.trim_end_matches('0'))?;
                }
                f.write_str("Z")
            }
            TimeLayout::Rfc3339 => write!(f, "{}", self.instant.format("%Y-%m-%dT%H:%M:%SZ")),
            TimeLayout::Expanded => write!(f, "{}", self.instant.format(EXPANDED_FORMAT)),
            TimeLayout::Custom(layout) => write!(f, "{}", self.instant.format(layout.as_str())),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Render first so a formatting failure surfaces as an encoder error
        let mut text = String::new();
        write!(text, "{}", self)
            .map_err(|_| S::Error::custom(format!("Failed to render time {:?}", self)))?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(de::Error::custom)
    }
}
