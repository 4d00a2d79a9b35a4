use airlog_core::Error;
use airlog_core::adc::{ADS1115_ADDR_GND, AdcSettings};
use airlog_core::traits::{Co2Adc, EnvironmentSensor};
use bme280::i2c::BME280;
use embassy_time::{Duration, Timer};
use esp_hal::gpio::AnyPin;
use esp_hal::{
    delay::Delay,
    i2c::master::{Config as I2cConfig, I2c},
    peripherals::{I2C0, I2C1},
    time::Rate,
};

const ADS1115_REG_CONVERSION: u8 = 0x00;
const ADS1115_REG_CONFIG: u8 = 0x01;

/// Settling time before the first continuous conversion is valid. One 128 SPS
/// conversion takes just under 8 ms.
const ADS1115_FIRST_CONVERSION_MS: u64 = 10;

/// ADS1115 ADC carrying the MG-811 gas sensor on channel A0.
///
/// Owns the I2C bus peripheral, so only one device handle can exist at a
/// time. The sampling settings are fixed at construction and written to the
/// config register once, during the continuous-conversion handshake.
pub struct Ads1115Hardware<'a> {
    i2c: I2c<'a, esp_hal::Blocking>,
    settings: AdcSettings,
    address: u8,
}

impl<'a> Ads1115Hardware<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C0<'a>, sda: SDA, scl: SCL, settings: AdcSettings) -> Self
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(100)),
        )
        .unwrap()
        .with_sda(sda.into())
        .with_scl(scl.into());

        Self {
            i2c,
            settings,
            address: ADS1115_ADDR_GND,
        }
    }

    fn write_config(&mut self) -> Result<(), Error> {
        let word = self.settings.config_word();
        self.i2c
            .write(
                self.address,
                &[ADS1115_REG_CONFIG, (word >> 8) as u8, (word & 0xFF) as u8],
            )
            .map_err(|_| Error::Driver("ADS1115 config write failed"))
    }

    fn read_register(&mut self, register: u8) -> Result<u16, Error> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|_| Error::Driver("ADS1115 register read failed"))?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl Co2Adc for Ads1115Hardware<'_> {
    async fn start_continuous(&mut self) -> Result<(), Error> {
        self.write_config()?;

        // Read the config back; the OS bit reflects conversion state, so it
        // is masked off the comparison.
        let readback = self.read_register(ADS1115_REG_CONFIG)?;
        if readback & 0x7FFF != self.settings.config_word() & 0x7FFF {
            return Err(Error::Driver("ADS1115 config readback mismatch"));
        }

        Timer::after(Duration::from_millis(ADS1115_FIRST_CONVERSION_MS)).await;
        Ok(())
    }

    fn read_latest(&mut self) -> Result<i16, Error> {
        let raw = self.read_register(ADS1115_REG_CONVERSION)?;
        Ok(raw as i16)
    }
}

/// BME280 environmental sensor on the second I2C bus.
///
/// Every read is its own bus transaction against the `bme280` driver;
/// altitude is derived from pressure with the barometric formula.
pub struct Bme280Hardware<'a> {
    bme: BME280<I2c<'a, esp_hal::Blocking>>,
    delay: Delay,
}

impl<'a> Bme280Hardware<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C1<'a>, sda: SDA, scl: SCL) -> Self
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(100)),
        )
        .unwrap()
        .with_sda(sda.into())
        .with_scl(scl.into());

        Self {
            bme: BME280::new_primary(i2c),
            delay: Delay::new(),
        }
    }

    fn measure(&mut self) -> Result<bme280::Measurements<esp_hal::i2c::master::Error>, Error> {
        self.bme
            .measure(&mut self.delay)
            .map_err(|_| Error::Driver("BME280 measurement failed"))
    }
}

impl EnvironmentSensor for Bme280Hardware<'_> {
    async fn initialize(&mut self) -> Result<(), Error> {
        self.bme
            .init(&mut self.delay)
            .map_err(|_| Error::Driver("BME280 initialization failed"))
    }

    async fn read_temperature(&mut self) -> Result<f32, Error> {
        Ok(self.measure()?.temperature)
    }

    async fn read_humidity(&mut self) -> Result<f32, Error> {
        Ok(self.measure()?.humidity)
    }

    async fn read_pressure(&mut self) -> Result<f32, Error> {
        Ok(self.measure()?.pressure)
    }

    async fn read_altitude(&mut self, sea_level_hpa: f32) -> Result<f32, Error> {
        let pressure_hpa = self.measure()?.pressure / 100.0;
        // International barometric formula, solved for altitude.
        Ok(44330.0 * (1.0 - libm::powf(pressure_hpa / sea_level_hpa, 0.190294)))
    }
}
