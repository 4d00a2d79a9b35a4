//! Shared store for the latest value of each measured quantity.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::convert::Co2Sample;

/// Snapshot of the latest readings. Every field stays `None` until the first
/// successful sample of that quantity; each field is last-writer-wins on its
/// own, with no ordering across fields. A snapshot taken while the sampling
/// tasks are interleaving may therefore mix readings from different instants.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Readings {
    /// CO2 concentration in ppm.
    pub co2_ppm: Option<f64>,

    /// Voltage at the ADC input the ppm value was derived from.
    pub co2_voltage: Option<f64>,

    /// Temperature in degrees Celsius.
    pub temperature_c: Option<f32>,

    /// Relative humidity in percent.
    pub humidity_pct: Option<f32>,

    /// Pressure in pascals.
    pub pressure_pa: Option<f32>,

    /// Pressure-derived altitude in meters. Sampled but never uploaded.
    pub altitude_m: Option<f32>,
}

/// Owned, injectable readings store shared between the sampling tasks
/// (writers) and the uploader (reader).
///
/// Writes are independent scalar fields, never a composite transaction; the
/// lock is held only for the field update, so no task blocks another across a
/// fire.
pub struct ReadingsStore {
    inner: Mutex<CriticalSectionRawMutex, Cell<Readings>>,
}

impl ReadingsStore {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(Readings {
                co2_ppm: None,
                co2_voltage: None,
                temperature_c: None,
                humidity_pct: None,
                pressure_pa: None,
                altitude_m: None,
            })),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Readings)) {
        self.inner.lock(|cell| {
            let mut readings = cell.get();
            f(&mut readings);
            cell.set(readings);
        });
    }

    pub fn set_co2(&self, sample: Co2Sample) {
        self.update(|r| {
            r.co2_ppm = Some(sample.ppm);
            r.co2_voltage = Some(sample.voltage);
        });
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.update(|r| r.temperature_c = Some(celsius));
    }

    pub fn set_humidity(&self, percent: f32) {
        self.update(|r| r.humidity_pct = Some(percent));
    }

    pub fn set_pressure(&self, pascals: f32) {
        self.update(|r| r.pressure_pa = Some(pascals));
    }

    pub fn set_altitude(&self, meters: f32) {
        self.update(|r| r.altitude_m = Some(meters));
    }

    /// Copy of the current readings.
    pub fn snapshot(&self) -> Readings {
        self.inner.lock(|cell| cell.get())
    }
}

impl Default for ReadingsStore {
    fn default() -> Self {
        Self::new()
    }
}
