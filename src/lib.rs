//! ESP32-S3 CO2/environment telemetry station.
//!
//! Hardware adapters and network plumbing around the `airlog-core` pipeline:
//! an MG-811 gas sensor behind an ADS1115 ADC, a BME280 environmental sensor,
//! and a ThingSpeak feed upload over Wi-Fi.

#![no_std]

extern crate alloc;

pub mod hardware;
pub mod net;
