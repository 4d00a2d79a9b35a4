//! ADS1115 sampling configuration.
//!
//! The settings record is fixed before the ADC is brought up and never mutated
//! afterwards; the hardware layer turns it into the config-register image once
//! during the continuous-conversion handshake.

/// I2C address with the ADDR pin tied to ground.
pub const ADS1115_ADDR_GND: u8 = 0x48;

/// Operating mode (config register bit 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcMode {
    /// Convert continuously; reads return the latest completed conversion.
    Continuous,
    /// One conversion per trigger, then power down.
    SingleShot,
}

/// Input multiplexer (bits 14:12). Single-ended channels only; this board
/// feeds the gas sensor into A0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcInput {
    A0SingleEnded,
    A1SingleEnded,
    A2SingleEnded,
    A3SingleEnded,
}

/// Data rate in samples per second (bits 7:5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcDataRate {
    Sps8,
    Sps16,
    Sps32,
    Sps64,
    Sps128,
    Sps250,
    Sps475,
    Sps860,
}

/// Programmable gain amplifier setting (bits 11:9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcGain {
    /// Gain 2/3, ±6.144 V full scale.
    TwoThirds,
    /// Gain 1, ±4.096 V.
    One,
    /// Gain 2, ±2.048 V.
    Two,
    /// Gain 4, ±1.024 V.
    Four,
    /// Gain 8, ±0.512 V.
    Eight,
    /// Gain 16, ±0.256 V.
    Sixteen,
}

impl AdcGain {
    /// Full-scale input voltage for this gain setting.
    pub const fn full_scale_voltage(self) -> f64 {
        match self {
            AdcGain::TwoThirds => 6.144,
            AdcGain::One => 4.096,
            AdcGain::Two => 2.048,
            AdcGain::Four => 1.024,
            AdcGain::Eight => 0.512,
            AdcGain::Sixteen => 0.256,
        }
    }
}

/// Comparator mode (bit 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorMode {
    Traditional,
    Window,
}

/// Comparator alert polarity (bit 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorPolarity {
    ActiveLow,
    ActiveHigh,
}

/// Comparator latching behaviour (bit 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorLatching {
    NonLatching,
    Latching,
}

/// Comparator queue depth (bits 1:0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorQueue {
    AssertAfterOne,
    AssertAfterTwo,
    AssertAfterFour,
    Disabled,
}

/// Immutable ADS1115 sampling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcSettings {
    pub mode: AdcMode,
    pub input: AdcInput,
    pub data_rate: AdcDataRate,
    pub gain: AdcGain,
    pub comparator_mode: ComparatorMode,
    pub comparator_polarity: ComparatorPolarity,
    pub comparator_latching: ComparatorLatching,
    pub comparator_queue: ComparatorQueue,
}

impl AdcSettings {
    /// The wiring of this station: MG-811 on A0, continuous conversion at
    /// 128 SPS with the widest input range, comparator disabled.
    pub const fn station_default() -> Self {
        Self {
            mode: AdcMode::Continuous,
            input: AdcInput::A0SingleEnded,
            data_rate: AdcDataRate::Sps128,
            gain: AdcGain::TwoThirds,
            comparator_mode: ComparatorMode::Traditional,
            comparator_polarity: ComparatorPolarity::ActiveLow,
            comparator_latching: ComparatorLatching::Latching,
            comparator_queue: ComparatorQueue::Disabled,
        }
    }

    /// Config-register image for these settings.
    ///
    /// The OS bit (15) stays clear; in continuous mode the device converts as
    /// soon as the mode bit is written, no per-read trigger needed.
    pub fn config_word(&self) -> u16 {
        let mux: u16 = match self.input {
            AdcInput::A0SingleEnded => 0b100,
            AdcInput::A1SingleEnded => 0b101,
            AdcInput::A2SingleEnded => 0b110,
            AdcInput::A3SingleEnded => 0b111,
        };
        let pga: u16 = match self.gain {
            AdcGain::TwoThirds => 0b000,
            AdcGain::One => 0b001,
            AdcGain::Two => 0b010,
            AdcGain::Four => 0b011,
            AdcGain::Eight => 0b100,
            AdcGain::Sixteen => 0b101,
        };
        let mode: u16 = match self.mode {
            AdcMode::Continuous => 0,
            AdcMode::SingleShot => 1,
        };
        let dr: u16 = match self.data_rate {
            AdcDataRate::Sps8 => 0b000,
            AdcDataRate::Sps16 => 0b001,
            AdcDataRate::Sps32 => 0b010,
            AdcDataRate::Sps64 => 0b011,
            AdcDataRate::Sps128 => 0b100,
            AdcDataRate::Sps250 => 0b101,
            AdcDataRate::Sps475 => 0b110,
            AdcDataRate::Sps860 => 0b111,
        };
        let comp_mode: u16 = match self.comparator_mode {
            ComparatorMode::Traditional => 0,
            ComparatorMode::Window => 1,
        };
        let comp_pol: u16 = match self.comparator_polarity {
            ComparatorPolarity::ActiveLow => 0,
            ComparatorPolarity::ActiveHigh => 1,
        };
        let comp_lat: u16 = match self.comparator_latching {
            ComparatorLatching::NonLatching => 0,
            ComparatorLatching::Latching => 1,
        };
        let comp_que: u16 = match self.comparator_queue {
            ComparatorQueue::AssertAfterOne => 0b00,
            ComparatorQueue::AssertAfterTwo => 0b01,
            ComparatorQueue::AssertAfterFour => 0b10,
            ComparatorQueue::Disabled => 0b11,
        };

        (mux << 12)
            | (pga << 9)
            | (mode << 8)
            | (dr << 5)
            | (comp_mode << 4)
            | (comp_pol << 3)
            | (comp_lat << 2)
            | comp_que
    }
}

impl Default for AdcSettings {
    fn default() -> Self {
        Self::station_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_default_config_word() {
        // MUX=100, PGA=000, MODE=0, DR=100, COMP_MODE=0, POL=0, LAT=1, QUE=11
        assert_eq!(AdcSettings::station_default().config_word(), 0x4087);
    }

    #[test]
    fn gain_two_thirds_full_scale() {
        assert_eq!(AdcGain::TwoThirds.full_scale_voltage(), 6.144);
    }

    #[test]
    fn single_shot_sets_mode_bit() {
        let settings = AdcSettings {
            mode: AdcMode::SingleShot,
            ..AdcSettings::station_default()
        };
        assert_eq!(settings.config_word() & 0x0100, 0x0100);
    }
}
