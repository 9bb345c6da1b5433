// src/io/serial/utils.rs
//
// Line settings for serial ports and their serialport crate equivalents.

use serde::{Deserialize, Serialize};
use serialport::{DataBits, Parity as SpParity, StopBits};

/// Parity setting for serial port configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl Parity {
    /// Single-letter form used in `8N1` style summaries.
    pub fn letter(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        }
    }
}

impl From<Parity> for SpParity {
    fn from(p: Parity) -> Self {
        match p {
            Parity::None => SpParity::None,
            Parity::Odd => SpParity::Odd,
            Parity::Even => SpParity::Even,
        }
    }
}

/// Convert data bits count to serialport crate's DataBits type.
/// Returns None for counts a UART cannot be configured with.
pub fn to_serialport_data_bits(bits: u8) -> Option<DataBits> {
    match bits {
        5 => Some(DataBits::Five),
        6 => Some(DataBits::Six),
        7 => Some(DataBits::Seven),
        8 => Some(DataBits::Eight),
        _ => None,
    }
}

/// Convert stop bits count to serialport crate's StopBits type
pub fn to_serialport_stop_bits(bits: u8) -> Option<StopBits> {
    match bits {
        1 => Some(StopBits::One),
        2 => Some(StopBits::Two),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_default() {
        assert_eq!(Parity::default(), Parity::None);
        assert_eq!(Parity::Even.letter(), 'E');
    }

    #[test]
    fn test_parity_conversion() {
        assert!(matches!(SpParity::from(Parity::None), SpParity::None));
        assert!(matches!(SpParity::from(Parity::Odd), SpParity::Odd));
        assert!(matches!(SpParity::from(Parity::Even), SpParity::Even));
    }

    #[test]
    fn test_data_and_stop_bits() {
        assert!(matches!(to_serialport_data_bits(7), Some(DataBits::Seven)));
        assert!(matches!(to_serialport_data_bits(8), Some(DataBits::Eight)));
        assert!(to_serialport_data_bits(9).is_none());
        assert!(matches!(to_serialport_stop_bits(2), Some(StopBits::Two)));
        assert!(to_serialport_stop_bits(0).is_none());
    }
}
