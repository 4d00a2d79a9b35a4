//! Hardware-independent core of the airlog station.
//!
//! Everything in here runs without the ESP32: the CO2 curve fit, the ADS1115
//! sampling configuration, the shared readings store, the periodic-task and
//! lifecycle state machines and the per-fire pipeline bodies. The binary crate
//! supplies real drivers behind the traits in [`traits`]; the tests here drive
//! the same code with mocks.

#![cfg_attr(not(test), no_std)]

pub mod adc;
pub mod convert;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod pipeline;
pub mod readings;
pub mod schedule;
pub mod traits;

pub use convert::{Co2Sample, convert_co2};
pub use error::Error;
pub use feed::FeedRecord;
pub use lifecycle::{Lifecycle, Phase};
pub use readings::{Readings, ReadingsStore};
pub use schedule::PeriodicTask;
