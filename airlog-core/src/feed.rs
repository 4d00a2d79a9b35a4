//! Telemetry feed record: the wire-format payload of one upload.

use core::fmt::Write;

use crate::readings::Readings;

/// One formatted feed value. Readings that have not been sampled yet render
/// as the empty string.
pub type FeedValue = heapless::String<24>;

/// Field mapping of the telemetry feed: field1 = CO2 ppm, field2 =
/// temperature, field3 = pressure, field4 = humidity. Altitude is sampled but
/// intentionally never uploaded.
///
/// Constructed fresh for every upload; never stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    pub field1: FeedValue,
    pub field2: FeedValue,
    pub field3: FeedValue,
    pub field4: FeedValue,
}

impl FeedRecord {
    pub fn from_readings(readings: &Readings) -> Self {
        Self {
            field1: format_value(readings.co2_ppm),
            field2: format_value(readings.temperature_c),
            field3: format_value(readings.pressure_pa),
            field4: format_value(readings.humidity_pct),
        }
    }
}

fn format_value<T: core::fmt::Display>(value: Option<T>) -> FeedValue {
    let mut out = FeedValue::new();
    if let Some(value) = value {
        // A value wider than the buffer is truncated, not dropped.
        let _ = write!(out, "{value:.2}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_readings_give_empty_fields() {
        let feed = FeedRecord::from_readings(&Readings::default());
        assert_eq!(feed.field1, "");
        assert_eq!(feed.field2, "");
        assert_eq!(feed.field3, "");
        assert_eq!(feed.field4, "");
    }

    #[test]
    fn field_mapping() {
        let readings = Readings {
            co2_ppm: Some(715.25),
            co2_voltage: Some(1.2),
            temperature_c: Some(21.5),
            humidity_pct: Some(40.0),
            pressure_pa: Some(101_300.0),
            altitude_m: Some(12.0),
        };
        let feed = FeedRecord::from_readings(&readings);
        assert_eq!(feed.field1, "715.25");
        assert_eq!(feed.field2, "21.50");
        assert_eq!(feed.field3, "101300.00");
        assert_eq!(feed.field4, "40.00");
    }

    #[test]
    fn altitude_is_not_uploaded() {
        let readings = Readings {
            altitude_m: Some(450.0),
            ..Readings::default()
        };
        let feed = FeedRecord::from_readings(&readings);
        assert_eq!(feed, FeedRecord::default());
    }
}
