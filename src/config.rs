//! Application-wide constants and compile-time configuration.
//!
//! Device identity, GATT UUIDs, timing parameters and advertising
//! settings live here so they can be tuned in one place.

use crate::data_rate::DataRate;

// Device identity

/// GAP device name, also carried in the advertising payload.
pub const DEVICE_NAME: &str = "ble_sensor_1.0";

/// Device Information Service strings (ASCII, sent without a terminator).
pub const MANUFACTURER_NAME: &str = "The Handy Company";
pub const MODEL_NUMBER: &str = "a01001";

// Sampling

/// Notification period after boot (ms).
pub const DEFAULT_DATA_RATE_MS: DataRate = 1000;

/// Floor for peer-written data rates (ms). Lower writes are raised to this.
pub const MIN_DATA_RATE_MS: DataRate = 100;

/// Sample counter value before the first subscription.
pub const INITIAL_SAMPLE: u8 = 90;

/// Size of each notified sample payload.
pub const SAMPLE_PAYLOAD_LEN: usize = 8;

// GATT UUIDs
//
// 128-bit vendor UUIDs are the ASCII bytes "qhehandycompany" plus a
// suffix letter, in little-endian (on-air) order.

/// Sensor service (suffix `A`).
pub const SENSOR_SERVICE_UUID: &str = "41796e61-706d-6f63-7964-6e6168656871";

/// Notify-only sample characteristic (suffix `a`).
pub const SAMPLE_CHAR_UUID: &str = "61796e61-706d-6f63-7964-6e6168656871";

/// Read/write data rate characteristic (suffix `b`).
pub const DATA_RATE_CHAR_UUID: &str = "62796e61-706d-6f63-7964-6e6168656871";

/// Same UUIDs in on-air (little-endian) byte order.
pub const SENSOR_SERVICE_UUID_LE: [u8; 16] = *b"qhehandycompanyA";
pub const SAMPLE_CHAR_UUID_LE: [u8; 16] = *b"qhehandycompanya";
pub const DATA_RATE_CHAR_UUID_LE: [u8; 16] = *b"qhehandycompanyb";

/// Bluetooth SIG assigned numbers for the Device Information Service.
pub const DEVICE_INFO_SERVICE_UUID16: u16 = 0x180A;
pub const MANUFACTURER_NAME_UUID16: u16 = 0x2A29;
pub const MODEL_NUMBER_UUID16: u16 = 0x2A24;

// Advertising

/// Advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const ADV_INTERVAL: u32 = 400;

/// Advertising timeout (in 10 ms units). 18000 = 3 minutes.
/// On expiry the router restarts advertising.
pub const ADV_TIMEOUT: u16 = 18_000;

/// Radiated TX power advertised in the payload (dBm).
pub const ADV_TX_POWER_DBM: i8 = 0;

/// Handling of CCCD writes for attributes other than the sample characteristic.
pub const FOREIGN_SUBSCRIBE_POLICY: ForeignSubscribePolicy = ForeignSubscribePolicy::Ignore;

/// What to do with a subscribe event that targets some other attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ForeignSubscribePolicy {
    /// Log and leave subscription and scheduler untouched.
    Ignore,
    /// Adopt the event's notify flag and stop the scheduler.
    StopScheduler,
}

/// Runtime-overridable subset of the constants above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeripheralConfig {
    pub initial_data_rate: DataRate,
    pub min_data_rate: DataRate,
    pub initial_sample: u8,
    pub foreign_subscribe: ForeignSubscribePolicy,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            initial_data_rate: DEFAULT_DATA_RATE_MS,
            min_data_rate: MIN_DATA_RATE_MS,
            initial_sample: INITIAL_SAMPLE,
            foreign_subscribe: FOREIGN_SUBSCRIBE_POLICY,
        }
    }
}
