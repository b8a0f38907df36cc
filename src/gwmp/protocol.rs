//! Packet-forwarder JSON message types
//!
//! Reference: https://github.com/Lora-net/packet_forwarder/blob/master/PROTOCOL.TXT
//!
//! Every field is optional. A field is written only when it is present *and*
//! differs from its type's zero value (0, 0.0, "", false). The reference
//! forwarder tooling cannot tell "explicitly zero" from "not reported", so
//! `Some(0)` goes out on the wire exactly like `None`.

use base64::Engine;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::datarate::Datarate;
use super::time::Timestamp;

/// Omission rule: absent or equal to the type's zero value
fn omitted<T: Default + PartialEq>(field: &Option<T>) -> bool {
    field.as_ref().map_or(true, |value| *value == T::default())
}

/// Floats with no fractional part go out as integers (`"ackr":100`)
///
/// Integral values below 1e21 are exact in an `i128`. Everything else goes
/// through ryu, which writes exponents without padding or sign (`1e-6`,
/// `1e21`) where the reference encoder writes `0.000001` and `1e+21`.
fn float<S: Serializer>(field: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match field {
        Some(value) if !value.is_finite() => Err(S::Error::custom(format!(
            "Non-finite float cannot be encoded: {}",
            value
        ))),
        Some(value) if value.fract() == 0.0 && value.abs() < 1e21 => {
            serializer.serialize_i128(*value as i128)
        }
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_none(),
    }
}

/// Modulation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modulation {
    Lora,
    Fsk,
}

/// CRC status of a received packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrcStatus {
    /// `1`
    Ok,
    /// `-1`
    Fail,
    /// `0`, never written
    #[default]
    NoCrc,
}

impl Serialize for CrcStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let code: i8 = match self {
            CrcStatus::Ok => 1,
            CrcStatus::Fail => -1,
            CrcStatus::NoCrc => 0,
        };
        serializer.serialize_i8(code)
    }
}

impl<'de> Deserialize<'de> for CrcStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i64::deserialize(deserializer)? {
            1 => Ok(CrcStatus::Ok),
            -1 => Ok(CrcStatus::Fail),
            0 => Ok(CrcStatus::NoCrc),
            other => Err(D::Error::custom(format!("Unknown CRC status: {}", other))),
        }
    }
}

/// Gateway status report (`stat`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    /// Percentage of upstream datagrams that were acknowledged
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub ackr: Option<f64>,
    /// GPS altitude in meters
    #[serde(default, skip_serializing_if = "omitted")]
    pub alti: Option<i32>,
    /// Downlink datagrams received
    #[serde(default, skip_serializing_if = "omitted")]
    pub dwnb: Option<u32>,
    /// GPS latitude in degrees (N is +)
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub lati: Option<f64>,
    /// GPS longitude in degrees (E is +)
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub long: Option<f64>,
    /// Radio packets forwarded
    #[serde(default, skip_serializing_if = "omitted")]
    pub rxfw: Option<u32>,
    /// Radio packets received
    #[serde(default, skip_serializing_if = "omitted")]
    pub rxnb: Option<u32>,
    /// Radio packets received with a valid PHY CRC
    #[serde(default, skip_serializing_if = "omitted")]
    pub rxok: Option<u32>,
    /// Gateway system time, usually `Expanded` layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// Packets emitted
    #[serde(default, skip_serializing_if = "omitted")]
    pub txnb: Option<u32>,
}

/// Received packet (`rxpk`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rxpk {
    /// Concentrator IF channel
    #[serde(default, skip_serializing_if = "omitted")]
    pub chan: Option<u8>,
    /// LoRa coding rate (e.g., "4/5")
    #[serde(default, skip_serializing_if = "omitted")]
    pub codr: Option<String>,
    /// Base64 encoded RF packet payload
    #[serde(default, skip_serializing_if = "omitted")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datr: Option<Datarate>,
    /// Frequency in MHz
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub freq: Option<f64>,
    /// LoRa signal-to-noise ratio in dB
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub lsnr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modu: Option<Modulation>,
    /// Concentrator RF chain
    #[serde(default, skip_serializing_if = "omitted")]
    pub rfch: Option<u8>,
    /// RSSI in dBm
    #[serde(default, skip_serializing_if = "omitted")]
    pub rssi: Option<i32>,
    /// RF packet payload size in bytes
    #[serde(default, skip_serializing_if = "omitted")]
    pub size: Option<u16>,
    #[serde(default, skip_serializing_if = "omitted")]
    pub stat: Option<CrcStatus>,
    /// UTC time of reception, usually `Rfc3339Nano` layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// Concentrator timestamp of the "RX finished" event (microseconds)
    #[serde(default, skip_serializing_if = "omitted")]
    pub tmst: Option<u32>,
}

/// Packet to transmit (`txpk`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Txpk {
    /// LoRa coding rate
    #[serde(default, skip_serializing_if = "omitted")]
    pub codr: Option<String>,
    /// Base64 encoded RF packet payload
    #[serde(default, skip_serializing_if = "omitted")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datr: Option<Datarate>,
    /// FSK frequency deviation in Hz
    #[serde(default, skip_serializing_if = "omitted")]
    pub fdev: Option<u32>,
    /// TX frequency in MHz
    #[serde(default, skip_serializing_if = "omitted", serialize_with = "float")]
    pub freq: Option<f64>,
    /// Send immediately, ignoring `tmst` and `time`
    #[serde(default, skip_serializing_if = "omitted")]
    pub imme: Option<bool>,
    /// LoRa polarization inversion
    #[serde(default, skip_serializing_if = "omitted")]
    pub ipol: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modu: Option<Modulation>,
    /// Disable the physical layer CRC
    #[serde(default, skip_serializing_if = "omitted")]
    pub ncrc: Option<bool>,
    /// TX output power in dBm
    #[serde(default, skip_serializing_if = "omitted")]
    pub powe: Option<u8>,
    /// RF preamble size
    #[serde(default, skip_serializing_if = "omitted")]
    pub prea: Option<u16>,
    /// Concentrator RF chain
    #[serde(default, skip_serializing_if = "omitted")]
    pub rfch: Option<u8>,
    /// RF packet payload size in bytes
    #[serde(default, skip_serializing_if = "omitted")]
    pub size: Option<u16>,
    /// Send at this GPS-synchronized time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// Send at this concentrator timestamp (ignores `time`)
    #[serde(default, skip_serializing_if = "omitted")]
    pub tmst: Option<u32>,
}

fn payload_fields(payload: &[u8]) -> anyhow::Result<(String, u16)> {
    let size = u16::try_from(payload.len())
        .map_err(|_| anyhow::anyhow!("RF payload too large: {} bytes", payload.len()))?;
    Ok((base64::engine::general_purpose::STANDARD.encode(payload), size))
}

fn decode_data(data: Option<&str>) -> anyhow::Result<Vec<u8>> {
    let data = data.ok_or_else(|| anyhow::anyhow!("Packet has no data field"))?;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| anyhow::anyhow!("Base64 decode error: {}", e))
}

impl Rxpk {
    /// Set `data` and `size` from a raw RF payload
    pub fn with_payload(mut self, payload: &[u8]) -> anyhow::Result<Self> {
        let (data, size) = payload_fields(payload)?;
        self.data = Some(data);
        self.size = Some(size);
        Ok(self)
    }

    /// Decode `data` back to the raw RF payload
    pub fn payload(&self) -> anyhow::Result<Vec<u8>> {
        decode_data(self.data.as_deref())
    }
}

impl Txpk {
    /// Set `data` and `size` from a raw RF payload
    pub fn with_payload(mut self, payload: &[u8]) -> anyhow::Result<Self> {
        let (data, size) = payload_fields(payload)?;
        self.data = Some(data);
        self.size = Some(size);
        Ok(self)
    }

    /// Decode `data` back to the raw RF payload
    pub fn payload(&self) -> anyhow::Result<Vec<u8>> {
        decode_data(self.data.as_deref())
    }
}

/// Top-level JSON object of PUSH_DATA / PULL_RESP
///
/// `rxpk` is written whenever it is `Some`, even as an empty array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rxpk: Option<Vec<Rxpk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<Stat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txpk: Option<Txpk>,
}

impl Payload {
    /// Uplink batch only
    pub fn uplink(rxpk: Vec<Rxpk>) -> Self {
        Self {
            rxpk: Some(rxpk),
            ..Default::default()
        }
    }

    /// Status report only
    pub fn status(stat: Stat) -> Self {
        Self {
            stat: Some(stat),
            ..Default::default()
        }
    }

    /// Downlink instruction only
    pub fn downlink(txpk: Txpk) -> Self {
        Self {
            txpk: Some(txpk),
            ..Default::default()
        }
    }

    pub fn with_stat(mut self, stat: Stat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rxpk.is_none() && self.stat.is_none() && self.txpk.is_none()
    }
}
