//! Packet-forwarder JSON codec
//!
//! [`encode`] turns a [`Payload`] into the bytes that follow the GWMP header
//! of a PUSH_DATA or PULL_RESP datagram; [`decode`] is its counterpart for
//! received datagrams.

pub mod datarate;
pub mod protocol;
pub mod time;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

pub use datarate::Datarate;
pub use protocol::{CrcStatus, Modulation, Payload, Rxpk, Stat, Txpk};
pub use time::{TimeLayout, Timestamp};

/// Encode a payload to compact JSON
pub fn encode(payload: &Payload) -> anyhow::Result<Bytes> {
    let mut writer = BytesMut::with_capacity(256).writer();
    serde_json::to_writer(&mut writer, payload)
        .map_err(|e| anyhow::anyhow!("Failed to encode JSON payload: {}", e))?;

    let encoded = writer.into_inner().freeze();
    debug!("Encoded payload: {} bytes", encoded.len());
    Ok(encoded)
}

/// Decode a received JSON payload
pub fn decode(data: &[u8]) -> anyhow::Result<Payload> {
    serde_json::from_slice(data).map_err(|e| anyhow::anyhow!("Failed to parse JSON payload: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn rxpk(tmst: u32) -> Rxpk {
        Rxpk {
            chan: Some(2),
            freq: Some(868.1),
            rssi: Some(-60),
            datr: Some(Datarate::lora(7, 125)),
            tmst: Some(tmst),
            time: Some(Timestamp::compact(
                DateTime::parse_from_rfc3339("2013-03-31T16:21:17.528002Z")
                    .unwrap()
                    .with_timezone(&Utc),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_envelope() {
        assert_eq!(&encode(&Payload::default()).unwrap()[..], b"{}");
    }

    #[test]
    fn test_uplink_batch_has_only_rxpk_key() {
        let encoded = encode(&Payload::uplink(vec![rxpk(1), rxpk(2)])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let batch = object["rxpk"].as_array().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0]["datr"], "SF7BW125");
        assert_eq!(batch[0]["time"], "2013-03-31T16:21:17.528002Z");
        assert_eq!(batch[1]["tmst"], 2);
    }

    #[test]
    fn test_uplink_and_stat_do_not_interfere() {
        let stat = Stat {
            rxnb: Some(2),
            ..Default::default()
        };
        let combined = encode(&Payload::uplink(vec![rxpk(7)]).with_stat(stat.clone())).unwrap();
        let only_rxpk = encode(&Payload::uplink(vec![rxpk(7)])).unwrap();
        let only_stat = encode(&Payload::status(stat)).unwrap();

        let combined: serde_json::Value = serde_json::from_slice(&combined).unwrap();
        let only_rxpk: serde_json::Value = serde_json::from_slice(&only_rxpk).unwrap();
        let only_stat: serde_json::Value = serde_json::from_slice(&only_stat).unwrap();

        assert_eq!(combined["rxpk"], only_rxpk["rxpk"]);
        assert_eq!(combined["stat"], only_stat["stat"]);
        assert!(combined.get("txpk").is_none());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let payload = Payload::uplink(vec![rxpk(3512348611)]);
        assert_eq!(encode(&payload).unwrap(), encode(&payload).unwrap());
    }

    #[test]
    fn test_decode_recovers_set_fields() {
        let payload = Payload::uplink(vec![rxpk(42)]);
        let decoded = decode(&encode(&payload).unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_explicit_zero_decodes_as_absent() {
        let payload = Payload::downlink(Txpk {
            rfch: Some(0),
            ipol: Some(false),
            powe: Some(14),
            ..Default::default()
        });
        let encoded = encode(&payload).unwrap();
        let decoded = decode(&encoded).unwrap();

        let txpk = decoded.txpk.as_ref().unwrap();
        assert_eq!(txpk.rfch, None);
        assert_eq!(txpk.ipol, None);
        assert_eq!(txpk.powe, Some(14));
        assert_eq!(encode(&decoded).unwrap(), encoded);
    }

    #[test]
    fn test_decode_invalid_json_fails() {
        assert!(decode(b"{\"rxpk\":").is_err());
        assert!(decode(b"{\"stat\":{\"time\":\"noon\"}}").is_err());
    }

    #[test]
    fn test_decode_forwarder_stat() {
        let json = br#"{"stat":{"time":"2014-01-12 08:59:28 GMT","lati":46.24000,"long":3.25230,"alti":145,"rxnb":2,"rxok":2,"rxfw":2,"ackr":100.0,"dwnb":2,"txnb":2}}"#;
        let payload = decode(json).unwrap();
        let stat = payload.stat.unwrap();
        assert_eq!(stat.alti, Some(145));
        assert_eq!(stat.ackr, Some(100.0));
        assert_eq!(
            stat.time.unwrap().to_string(),
            "2014-01-12 08:59:28 GMT"
        );
        assert!(payload.rxpk.is_none());
    }
}
