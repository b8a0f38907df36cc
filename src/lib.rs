//! JSON codec for the Semtech UDP packet-forwarder protocol.
//!
//! Reference: https://github.com/Lora-net/packet_forwarder/blob/master/PROTOCOL.TXT
//!
//! Only the JSON body is handled here: the `rxpk` uplink batch, the `stat`
//! gateway report and the `txpk` downlink instruction. The binary GWMP header
//! and the UDP transport live elsewhere.

pub mod fixtures;
pub mod gwmp;

pub use gwmp::{decode, encode};
