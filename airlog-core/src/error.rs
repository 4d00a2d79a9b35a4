use core::fmt;

/// Application error type.
///
/// Per-fire failures carry a static message describing what went wrong at the
/// hardware or network boundary; the task loops log them and skip the fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// ADC or environmental-sensor initialization/read failure.
    Driver(&'static str),

    /// Telemetry upload failure.
    Network(&'static str),

    /// Invalid or missing startup configuration.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Driver(msg) => write!(f, "driver error: {msg}"),
            Error::Network(msg) => write!(f, "network error: {msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl core::error::Error for Error {}
