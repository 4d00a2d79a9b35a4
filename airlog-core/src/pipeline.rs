//! Per-fire bodies of the three periodic tasks.
//!
//! Each body returns a `Result` instead of letting a failure tear down the
//! schedule; the task loops in the binary log errors and skip the fire. The
//! readings store is passed in explicitly so the same code runs against mocks
//! on the host.

use crate::convert::{Co2Sample, convert_co2};
use crate::error::Error;
use crate::feed::FeedRecord;
use crate::lifecycle::SEA_LEVEL_PRESSURE_HPA;
use crate::readings::ReadingsStore;
use crate::traits::{Co2Adc, EnvironmentSensor, TelemetryClient};

/// One CO2 sampling fire: latest continuous conversion code, curve fit,
/// store. Requires that the ADC's continuous handshake has completed.
pub fn sample_co2(adc: &mut impl Co2Adc, store: &ReadingsStore) -> Result<Co2Sample, Error> {
    let raw = adc.read_latest()?;
    let sample = convert_co2(raw);
    store.set_co2(sample);
    Ok(sample)
}

/// One environmental sampling fire: four sequential reads, then four
/// independent field writes. No atomicity across the store; an interleaved
/// snapshot may observe a partial update.
pub async fn sample_environment(
    sensor: &mut impl EnvironmentSensor,
    store: &ReadingsStore,
) -> Result<(), Error> {
    let temperature = sensor.read_temperature().await?;
    let humidity = sensor.read_humidity().await?;
    let pressure = sensor.read_pressure().await?;
    let altitude = sensor.read_altitude(SEA_LEVEL_PRESSURE_HPA).await?;

    store.set_temperature(temperature);
    store.set_humidity(humidity);
    store.set_pressure(pressure);
    store.set_altitude(altitude);

    log::debug!(
        "environment: {temperature:.2} C, {humidity:.2} %, {pressure:.2} Pa, {altitude:.2} m"
    );
    Ok(())
}

/// One upload fire: snapshot the store, build the feed record, push it. A
/// failed upload's data is simply lost; the next fire sends the then-current
/// snapshot.
pub async fn upload_snapshot(
    client: &mut impl TelemetryClient,
    store: &ReadingsStore,
    api_key: &str,
) -> Result<FeedRecord, Error> {
    let feed = FeedRecord::from_readings(&store.snapshot());
    client.update_feed(api_key, &feed).await?;
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Lifecycle, UPLOAD_INTERVAL};

    use embassy_futures::block_on;
    use embassy_time::Instant;

    struct MockAdc {
        raw: i16,
        fail_read: bool,
        started: bool,
    }

    impl MockAdc {
        fn returning(raw: i16) -> Self {
            Self {
                raw,
                fail_read: false,
                started: false,
            }
        }
    }

    impl Co2Adc for MockAdc {
        async fn start_continuous(&mut self) -> Result<(), Error> {
            self.started = true;
            Ok(())
        }

        fn read_latest(&mut self) -> Result<i16, Error> {
            if self.fail_read {
                return Err(Error::Driver("continuous read has failed"));
            }
            Ok(self.raw)
        }
    }

    struct MockEnvironment {
        temperature: f32,
        humidity: f32,
        pressure: f32,
        fail_pressure: bool,
        sea_level_seen: Option<f32>,
    }

    impl MockEnvironment {
        fn healthy() -> Self {
            Self {
                temperature: 21.5,
                humidity: 40.0,
                pressure: 101_300.0,
                fail_pressure: false,
                sea_level_seen: None,
            }
        }
    }

    impl EnvironmentSensor for MockEnvironment {
        async fn initialize(&mut self) -> Result<(), Error> {
            Ok(())
        }

        async fn read_temperature(&mut self) -> Result<f32, Error> {
            Ok(self.temperature)
        }

        async fn read_humidity(&mut self) -> Result<f32, Error> {
            Ok(self.humidity)
        }

        async fn read_pressure(&mut self) -> Result<f32, Error> {
            if self.fail_pressure {
                return Err(Error::Driver("pressure read failed"));
            }
            Ok(self.pressure)
        }

        async fn read_altitude(&mut self, sea_level_hpa: f32) -> Result<f32, Error> {
            self.sea_level_seen = Some(sea_level_hpa);
            Ok(77.5)
        }
    }

    struct MockClient {
        sent: Vec<FeedRecord>,
        fail_next: bool,
    }

    impl MockClient {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                fail_next: false,
            }
        }
    }

    impl TelemetryClient for MockClient {
        async fn update_feed(&mut self, _api_key: &str, feed: &FeedRecord) -> Result<(), Error> {
            if self.fail_next {
                self.fail_next = false;
                return Err(Error::Network("sending data has failed"));
            }
            self.sent.push(feed.clone());
            Ok(())
        }
    }

    #[test]
    fn co2_fire_stores_converted_sample() {
        let store = ReadingsStore::new();
        let mut adc = MockAdc::returning(8192);
        block_on(adc.start_continuous()).unwrap();

        let sample = sample_co2(&mut adc, &store).unwrap();
        let expected = convert_co2(8192);
        assert_eq!(sample, expected);
        assert_eq!(store.snapshot().co2_ppm, Some(expected.ppm));
        assert_eq!(store.snapshot().co2_voltage, Some(expected.voltage));
    }

    #[test]
    fn co2_read_failure_leaves_store_untouched() {
        let store = ReadingsStore::new();
        let mut adc = MockAdc::returning(8192);
        adc.fail_read = true;

        assert_eq!(
            sample_co2(&mut adc, &store),
            Err(Error::Driver("continuous read has failed"))
        );
        assert_eq!(store.snapshot().co2_ppm, None);
    }

    #[test]
    fn environment_fire_stores_all_four_quantities() {
        let store = ReadingsStore::new();
        let mut sensor = MockEnvironment::healthy();

        block_on(sample_environment(&mut sensor, &store)).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.temperature_c, Some(21.5));
        assert_eq!(snapshot.humidity_pct, Some(40.0));
        assert_eq!(snapshot.pressure_pa, Some(101_300.0));
        assert_eq!(snapshot.altitude_m, Some(77.5));
        // Altitude derivation uses the configured sea-level reference.
        assert_eq!(sensor.sea_level_seen, Some(SEA_LEVEL_PRESSURE_HPA));
    }

    #[test]
    fn environment_failure_propagates_without_partial_write() {
        let store = ReadingsStore::new();
        let mut sensor = MockEnvironment::healthy();
        sensor.fail_pressure = true;

        let result = block_on(sample_environment(&mut sensor, &store));
        assert_eq!(result, Err(Error::Driver("pressure read failed")));
        // Reads happen before any write, so nothing landed.
        assert_eq!(store.snapshot(), crate::readings::Readings::default());
    }

    #[test]
    fn first_upload_before_any_sensor_sends_empty_fields() {
        let store = ReadingsStore::new();
        let mut client = MockClient::new();

        let feed = block_on(upload_snapshot(&mut client, &store, "key")).unwrap();
        assert_eq!(feed, FeedRecord::default());
        assert_eq!(client.sent.len(), 1);
        assert_eq!(client.sent[0].field1, "");
    }

    #[test]
    fn upload_failure_does_not_halt_the_schedule() {
        let store = ReadingsStore::new();
        store.set_temperature(20.0);
        let mut client = MockClient::new();
        client.fail_next = true;

        let mut lc = Lifecycle::new();
        lc.activate(Instant::from_ticks(0));

        // First fire fails; the schedule keeps going.
        let t1 = Instant::from_ticks(0) + UPLOAD_INTERVAL;
        assert!(lc.upload_task_mut().try_fire(t1));
        let first = block_on(upload_snapshot(&mut client, &store, "key"));
        assert_eq!(first, Err(Error::Network("sending data has failed")));

        // Next interval fires again and succeeds with the current snapshot.
        let t2 = t1 + UPLOAD_INTERVAL;
        assert!(lc.upload_task_mut().try_fire(t2));
        let second = block_on(upload_snapshot(&mut client, &store, "key")).unwrap();
        assert_eq!(second.field2, "20.00");
        assert_eq!(client.sent.len(), 1);
    }

    #[test]
    fn uploader_reads_latest_value_of_each_field() {
        let store = ReadingsStore::new();
        let mut adc = MockAdc::returning(4096);
        sample_co2(&mut adc, &store).unwrap();

        // A later environment fire does not disturb the CO2 field.
        let mut sensor = MockEnvironment::healthy();
        block_on(sample_environment(&mut sensor, &store)).unwrap();

        let mut client = MockClient::new();
        let feed = block_on(upload_snapshot(&mut client, &store, "key")).unwrap();
        assert!(!feed.field1.is_empty());
        assert_eq!(feed.field2, "21.50");
    }
}
