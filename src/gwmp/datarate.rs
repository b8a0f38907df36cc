//! `datr` field: FSK bitrate or LoRa datarate identifier
//!
//! The protocol overloads one key with two JSON types. FSK packets carry the
//! bitrate as a bare unsigned number (`"datr":50000`), LoRa packets carry a
//! spreading-factor/bandwidth string (`"datr":"SF7BW125"`).

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Datarate of a radio packet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datarate {
    /// FSK datarate in bits per second, encoded as a JSON number
    Numeric(u32),
    /// LoRa datarate identifier (e.g. "SF12BW500"), encoded as a JSON string
    Identifier(String),
}

impl Datarate {
    /// LoRa datarate from spreading factor and bandwidth in kHz
    pub fn lora(spreading_factor: u8, bandwidth_khz: u16) -> Self {
        Datarate::Identifier(format!("SF{}BW{}", spreading_factor, bandwidth_khz))
    }

    /// FSK datarate in bits per second
    pub fn fsk(bits_per_second: u32) -> Self {
        Datarate::Numeric(bits_per_second)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Datarate::Numeric(_))
    }
}

impl fmt::Display for Datarate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datarate::Numeric(bps) => write!(f, "{}", bps),
            Datarate::Identifier(id) => f.write_str(id),
        }
    }
}

impl Serialize for Datarate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Datarate::Numeric(bps) => serializer.serialize_u32(*bps),
            Datarate::Identifier(id) => serializer.serialize_str(id),
        }
    }
}

struct DatarateVisitor;

impl<'de> Visitor<'de> for DatarateVisitor {
    type Value = Datarate;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an unsigned bitrate or a datarate identifier string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Datarate, E> {
        u32::try_from(value)
            .map(Datarate::Numeric)
            .map_err(|_| E::custom(format!("FSK datarate out of range: {}", value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Datarate, E> {
        u64::try_from(value)
            .map_err(|_| E::custom(format!("negative datarate: {}", value)))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Datarate, E> {
        Ok(Datarate::Identifier(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Datarate, E> {
        Ok(Datarate::Identifier(value))
    }
}

impl<'de> Deserialize<'de> for Datarate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DatarateVisitor)
    }
}
