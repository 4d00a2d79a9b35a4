//! Driver-facing abstraction traits.
//!
//! The binary crate implements these over real hardware and the network; the
//! pipeline tests implement them with mocks.

#![allow(async_fn_in_trait)]

use crate::error::Error;
use crate::feed::FeedRecord;

/// The CO2 ADC: a single channel converted continuously once started.
pub trait Co2Adc {
    /// One-time handshake: configure the device and start continuous
    /// conversion. Must complete before the first `read_latest`.
    async fn start_continuous(&mut self) -> Result<(), Error>;

    /// Latest completed conversion code. Does not trigger a new conversion.
    fn read_latest(&mut self) -> Result<i16, Error>;
}

/// The environmental sensor (temperature / humidity / pressure / altitude).
pub trait EnvironmentSensor {
    /// One-time asynchronous initialization.
    async fn initialize(&mut self) -> Result<(), Error>;

    /// Temperature in degrees Celsius.
    async fn read_temperature(&mut self) -> Result<f32, Error>;

    /// Relative humidity in percent.
    async fn read_humidity(&mut self) -> Result<f32, Error>;

    /// Pressure in pascals.
    async fn read_pressure(&mut self) -> Result<f32, Error>;

    /// Pressure-derived altitude in meters for the given sea-level reference
    /// in hectopascals.
    async fn read_altitude(&mut self, sea_level_hpa: f32) -> Result<f32, Error>;
}

/// The telemetry endpoint.
pub trait TelemetryClient {
    /// Push one feed record under the given write key.
    async fn update_feed(&mut self, api_key: &str, feed: &FeedRecord) -> Result<(), Error>;
}
