//! Peer-configurable notification period.
//!
//! The data rate is a fixed-width little-endian field: reads return
//! exactly [`DATA_RATE_LEN`] bytes and writes must carry exactly that many.
//! Accepted writes are raised to the configured minimum, never rejected
//! for being too small.

use crate::error::Error;

/// Notification period in milliseconds.
pub type DataRate = u16;

/// Wire width of [`DataRate`].
pub const DATA_RATE_LEN: usize = core::mem::size_of::<DataRate>();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataRateAttribute {
    value: DataRate,
    min: DataRate,
}

impl DataRateAttribute {
    /// Create the attribute. `initial` is clamped like any peer write.
    pub const fn new(initial: DataRate, min: DataRate) -> Self {
        let value = if initial > min { initial } else { min };
        Self { value, min }
    }

    /// Current period (ms).
    pub fn value(&self) -> DataRate {
        self.value
    }

    pub fn min(&self) -> DataRate {
        self.min
    }

    /// Encode for a peer read.
    pub fn read(&self) -> [u8; DATA_RATE_LEN] {
        self.value.to_le_bytes()
    }

    /// Append the encoded value to a transport buffer.
    pub fn read_into<const N: usize>(&self, out: &mut heapless::Vec<u8, N>) -> Result<(), Error> {
        out.extend_from_slice(&self.read())
            .map_err(|_| Error::ResourceExhausted)
    }

    /// Validate, decode, clamp and commit a peer write.
    ///
    /// Returns the committed value. The scheduler picks it up at its next
    /// re-arm; a countdown already in progress is not shortened.
    pub fn write(&mut self, bytes: &[u8]) -> Result<DataRate, Error> {
        if bytes.len() != DATA_RATE_LEN {
            return Err(Error::InvalidLength);
        }
        let raw: [u8; DATA_RATE_LEN] = bytes.try_into().map_err(|_| Error::Unlikely)?;
        let requested = DataRate::from_le_bytes(raw);
        self.value = requested.max(self.min);

        if self.value != requested {
            debug!("data rate {} ms raised to minimum {} ms", requested, self.min);
        }
        Ok(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr() -> DataRateAttribute {
        DataRateAttribute::new(1000, 100)
    }

    #[test]
    fn read_is_little_endian() {
        assert_eq!(attr().read(), [0xE8, 0x03]);
    }

    #[test]
    fn wrong_length_rejected_and_value_kept() {
        let mut a = attr();
        for len in [0usize, 1, 3, 4, 8] {
            let buf = [0x55u8; 8];
            assert_eq!(a.write(&buf[..len]), Err(Error::InvalidLength));
            assert_eq!(a.value(), 1000);
        }
    }

    #[test]
    fn valid_write_commits() {
        let mut a = attr();
        assert_eq!(a.write(&250u16.to_le_bytes()), Ok(250));
        assert_eq!(a.value(), 250);
        assert_eq!(a.read(), [0xFA, 0x00]);
    }

    #[test]
    fn low_write_is_clamped_not_rejected() {
        let mut a = attr();
        assert_eq!(a.write(&50u16.to_le_bytes()), Ok(100));
        assert_eq!(a.write(&0u16.to_le_bytes()), Ok(100));
        assert_eq!(a.write(&100u16.to_le_bytes()), Ok(100));
        assert_eq!(a.write(&101u16.to_le_bytes()), Ok(101));
    }

    #[test]
    fn max_value_accepted() {
        let mut a = attr();
        assert_eq!(a.write(&[0xFF, 0xFF]), Ok(u16::MAX));
    }

    #[test]
    fn initial_value_clamped() {
        assert_eq!(DataRateAttribute::new(10, 100).value(), 100);
    }

    #[test]
    fn read_into_reports_exhaustion() {
        let a = attr();
        let mut roomy: heapless::Vec<u8, 4> = heapless::Vec::new();
        assert_eq!(a.read_into(&mut roomy), Ok(()));
        assert_eq!(roomy.as_slice(), &[0xE8, 0x03]);

        let mut tight: heapless::Vec<u8, 1> = heapless::Vec::new();
        assert_eq!(a.read_into(&mut tight), Err(Error::ResourceExhausted));
    }
}
