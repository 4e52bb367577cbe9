//! ChannelScope Core — domain types, indicators, channel strategies, consensus.
//!
//! This crate contains the heart of the channel classification engine:
//! - Domain types (bars, series, timeframes)
//! - Indicator layer (SMA, ADX, Bollinger, Donchian, regression fits)
//! - Four channel strategies behind a closed dispatch enum
//! - Strategy selection by name with a canonical report order
//! - Consensus aggregation across strategy verdicts
//! - Series provider trait plus CSV-backed and synthetic implementations

pub mod consensus;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod strategies;
