//! GATT attribute table.
//!
//! Two primary services:
//!
//! - **Sensor** (vendor 128-bit UUID): the notify-only sample
//!   characteristic and the read/write data rate characteristic.
//! - **Device Information** (0x180A): manufacturer name and model number.
//!
//! Accesses are routed by [`Attribute`]; one that reaches an attribute
//! without the matching property is a routing bug (`Error::Unreachable`).

use crate::config::{
    DATA_RATE_CHAR_UUID_LE, MANUFACTURER_NAME_UUID16, MODEL_NUMBER_UUID16, SAMPLE_CHAR_UUID_LE,
};

/// Largest attribute value we ever produce.
pub const ATT_VALUE_MAX: usize = 32;

/// Buffer a read is appended into.
pub type AttValue = heapless::Vec<u8, ATT_VALUE_MAX>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Uuid {
    Uuid16(u16),
    /// Little-endian (on-air) byte order.
    Uuid128([u8; 16]),
}

/// Every characteristic the peripheral registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Attribute {
    Sample,
    DataRate,
    ManufacturerName,
    ModelNumber,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Sample,
        Attribute::DataRate,
        Attribute::ManufacturerName,
        Attribute::ModelNumber,
    ];

    pub const fn uuid(self) -> Uuid {
        match self {
            Attribute::Sample => Uuid::Uuid128(SAMPLE_CHAR_UUID_LE),
            Attribute::DataRate => Uuid::Uuid128(DATA_RATE_CHAR_UUID_LE),
            Attribute::ManufacturerName => Uuid::Uuid16(MANUFACTURER_NAME_UUID16),
            Attribute::ModelNumber => Uuid::Uuid16(MODEL_NUMBER_UUID16),
        }
    }

    pub const fn readable(self) -> bool {
        !matches!(self, Attribute::Sample)
    }

    pub const fn writable(self) -> bool {
        matches!(self, Attribute::DataRate)
    }

    pub const fn notifiable(self) -> bool {
        matches!(self, Attribute::Sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_distinct() {
        for (i, a) in Attribute::ALL.iter().enumerate() {
            for b in &Attribute::ALL[i + 1..] {
                assert_ne!(a.uuid(), b.uuid());
            }
        }
    }

    #[test]
    fn properties() {
        assert!(Attribute::Sample.notifiable());
        assert!(!Attribute::Sample.readable());
        assert!(Attribute::DataRate.readable() && Attribute::DataRate.writable());
        assert!(!Attribute::ModelNumber.writable());
        assert!(!Attribute::ManufacturerName.notifiable());
    }
}
