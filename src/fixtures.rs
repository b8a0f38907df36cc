//! Sample packet-forwarder payloads
//!
//! Four canonical messages (the samples from the forwarder's PROTOCOL.TXT)
//! used as golden fixtures by downstream decoders. Building a sample is pure;
//! only [`write_fixture`] touches the filesystem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::gwmp::{
    CrcStatus, Datarate, Modulation, Payload, Rxpk, Stat, Timestamp, Txpk,
};

/// Fixture scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Gateway status only
    Stat,
    /// Uplink batch only
    Rxpk,
    /// Uplink batch plus gateway status
    RxpkStat,
    /// Downlink only
    Txpk,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Stat,
        Scenario::Rxpk,
        Scenario::RxpkStat,
        Scenario::Txpk,
    ];

    /// Artifact file name
    pub fn file_name(&self) -> &'static str {
        match self {
            Scenario::Stat => "marshal_stat",
            Scenario::Rxpk => "marshal_rxpk",
            Scenario::RxpkStat => "marshal_rxpk_stat",
            Scenario::Txpk => "marshal_txpk",
        }
    }

    /// Label for the human-readable dump
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Stat => "Stat",
            Scenario::Rxpk => "RXPKs",
            Scenario::RxpkStat => "RXPKsStats",
            Scenario::Txpk => "TXPK",
        }
    }

    pub fn build(&self) -> anyhow::Result<Payload> {
        Ok(match self {
            Scenario::Stat => Payload::status(sample_stat()?),
            Scenario::Rxpk => Payload::uplink(sample_rxpks()?),
            Scenario::RxpkStat => Payload::uplink(sample_rxpks()?).with_stat(sample_stat()?),
            Scenario::Txpk => Payload::downlink(sample_txpk()),
        })
    }
}

fn utc(text: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Invalid sample time {:?}: {}", text, e))
}

fn sample_stat() -> anyhow::Result<Stat> {
    Ok(Stat {
        ackr: Some(100.0),
        alti: Some(145),
        long: Some(3.25230),
        rxok: Some(2),
        rxfw: Some(2),
        rxnb: Some(2),
        lati: Some(46.24),
        dwnb: Some(2),
        txnb: Some(2),
        time: Some(Timestamp::expanded(utc("2014-01-12T08:59:28Z")?)),
    })
}

fn sample_rxpks() -> anyhow::Result<Vec<Rxpk>> {
    Ok(vec![
        Rxpk {
            time: Some(Timestamp::compact(utc("2013-03-31T16:21:17.528002Z")?)),
            tmst: Some(3512348611),
            chan: Some(2),
            rfch: Some(0),
            freq: Some(866.349812),
            stat: Some(CrcStatus::Ok),
            modu: Some(Modulation::Lora),
            datr: Some(Datarate::lora(7, 125)),
            codr: Some("4/6".to_string()),
            rssi: Some(-35),
            lsnr: Some(5.1),
            size: Some(32),
            data: Some("-DS4CGaDCdG+48eJNM3Vai-zDpsR71Pn9CPA9uCON84".to_string()),
        },
        Rxpk {
            chan: Some(9),
            datr: Some(Datarate::fsk(50000)),
            freq: Some(869.1),
            modu: Some(Modulation::Fsk),
            rfch: Some(1),
            rssi: Some(-75),
            stat: Some(CrcStatus::Ok),
            time: Some(Timestamp::compact(utc("2013-03-31T16:21:17.530974Z")?)),
            tmst: Some(3512348514),
            ..Default::default()
        }
        .with_payload(b"TEST_PACKET_1234")?,
    ])
}

fn sample_txpk() -> Txpk {
    Txpk {
        imme: Some(true),
        freq: Some(864.123456),
        rfch: Some(0),
        powe: Some(14),
        modu: Some(Modulation::Lora),
        datr: Some(Datarate::lora(11, 125)),
        codr: Some("4/6".to_string()),
        ipol: Some(false),
        size: Some(32),
        data: Some("H3P3N2i9qc4yt7rK7ldqoeCVJGBybzPY5h1Dd7P7p8v".to_string()),
        ..Default::default()
    }
}

/// Byte-per-item hex dump (`0x7b,0x22,...`), no zero padding (`0xa`)
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|byte| {
            let digits = hex::encode([*byte]);
            format!("0x{},", digits.strip_prefix('0').unwrap_or(&digits))
        })
        .collect()
}

/// Write an encoded fixture to `dir`, creating it if needed
pub async fn write_fixture(dir: &Path, scenario: Scenario, encoded: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create fixture dir {:?}: {}", dir, e))?;

    let path = dir.join(scenario.file_name());
    tokio::fs::write(&path, encoded)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write fixture {:?}: {}", path, e))?;

    info!("Wrote {} ({} bytes)", path.display(), encoded.len());
    Ok(path)
}
