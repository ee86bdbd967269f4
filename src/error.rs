//! Unified error type for ble-sensor.
//!
//! We avoid `alloc` - all error variants are fieldless and `Copy`.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the peripheral logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A peer write did not carry exactly the attribute's fixed size.
    InvalidLength,

    /// The value could not be decoded, or the operation is not supported
    /// on this attribute.
    Unlikely,

    /// A transport buffer could not hold the value (notify or read path).
    ResourceExhausted,

    /// An access was routed to an attribute we never registered.
    Unreachable,
}

/// ATT protocol error codes reported back to the peer.
pub mod att {
    pub const INVALID_ATTRIBUTE_VALUE_LENGTH: u8 = 0x0D;
    pub const UNLIKELY_ERROR: u8 = 0x0E;
    pub const INSUFFICIENT_RESOURCES: u8 = 0x11;
}

impl Error {
    /// ATT error code to answer the peer with.
    pub const fn att_code(self) -> u8 {
        match self {
            Error::InvalidLength => att::INVALID_ATTRIBUTE_VALUE_LENGTH,
            Error::Unlikely | Error::Unreachable => att::UNLIKELY_ERROR,
            Error::ResourceExhausted => att::INSUFFICIENT_RESOURCES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn att_codes() {
        assert_eq!(Error::InvalidLength.att_code(), 0x0D);
        assert_eq!(Error::Unlikely.att_code(), 0x0E);
        assert_eq!(Error::Unreachable.att_code(), 0x0E);
        assert_eq!(Error::ResourceExhausted.att_code(), 0x11);
    }
}
