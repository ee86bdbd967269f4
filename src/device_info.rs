//! Device Information Service (0x180A) - static, read-only strings.

use crate::config::{MANUFACTURER_NAME, MODEL_NUMBER};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer_name: &'static str,
    pub model_number: &'static str,
}

impl DeviceInfo {
    pub const fn new() -> Self {
        Self {
            manufacturer_name: MANUFACTURER_NAME,
            model_number: MODEL_NUMBER,
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::new()
    }
}
