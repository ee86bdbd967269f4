//! Legacy advertising payload builder.
//!
//! Payload (max 31 bytes), one AD structure per field:
//!
//! ```text
//! [len][0x01][flags]            LE General Discoverable | BR/EDR not supported
//! [len][0x0A][tx power dBm]
//! [len][0x09][name...]          complete local name, or
//! [len][0x08][name...]          shortened local name when it does not fit
//! ```

use crate::error::Error;

/// Legacy advertising PDU payload size.
pub const ADV_PAYLOAD_MAX: usize = 31;

pub type AdvPayload = heapless::Vec<u8, ADV_PAYLOAD_MAX>;

const AD_FLAGS: u8 = 0x01;
const AD_COMPLETE_128BIT_UUIDS: u8 = 0x07;
const AD_SHORTENED_LOCAL_NAME: u8 = 0x08;
const AD_COMPLETE_LOCAL_NAME: u8 = 0x09;
const AD_TX_POWER_LEVEL: u8 = 0x0A;

pub const LE_GENERAL_DISCOVERABLE: u8 = 0x02;
pub const BR_EDR_NOT_SUPPORTED: u8 = 0x04;

/// Build the advertising payload for `name`.
pub fn build(name: &str, tx_power_dbm: i8) -> Result<AdvPayload, Error> {
    let mut out = AdvPayload::new();
    push_field(&mut out, AD_FLAGS, &[LE_GENERAL_DISCOVERABLE | BR_EDR_NOT_SUPPORTED])?;
    push_field(&mut out, AD_TX_POWER_LEVEL, &[tx_power_dbm as u8])?;

    let room = ADV_PAYLOAD_MAX - out.len() - 2;
    let name = name.as_bytes();
    if name.len() <= room {
        push_field(&mut out, AD_COMPLETE_LOCAL_NAME, name)?;
    } else {
        debug!("device name truncated to {} bytes", room);
        push_field(&mut out, AD_SHORTENED_LOCAL_NAME, &name[..room])?;
    }
    Ok(out)
}

/// Build a scan response listing one 128-bit service UUID (on-air order).
pub fn build_scan_response(service_uuid_le: &[u8; 16]) -> Result<AdvPayload, Error> {
    let mut out = AdvPayload::new();
    push_field(&mut out, AD_COMPLETE_128BIT_UUIDS, service_uuid_le)?;
    Ok(out)
}

fn push_field(out: &mut AdvPayload, ad_type: u8, data: &[u8]) -> Result<(), Error> {
    out.push(data.len() as u8 + 1)
        .and_then(|_| out.push(ad_type))
        .map_err(|_| Error::ResourceExhausted)?;
    out.extend_from_slice(data)
        .map_err(|_| Error::ResourceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name_payload() {
        let p = build("ble_sensor_1.0", 0).unwrap();
        assert_eq!(&p[..6], &[0x02, 0x01, 0x06, 0x02, 0x0A, 0x00]);
        assert_eq!(p[6], 15);
        assert_eq!(p[7], AD_COMPLETE_LOCAL_NAME);
        assert_eq!(&p[8..], b"ble_sensor_1.0");
    }

    #[test]
    fn negative_tx_power_encoded_as_twos_complement() {
        let p = build("x", -8).unwrap();
        assert_eq!(p[5], 0xF8);
    }

    #[test]
    fn long_name_is_shortened_to_fit() {
        let long = "an-unreasonably-long-device-name";
        let p = build(long, 0).unwrap();
        assert_eq!(p.len(), ADV_PAYLOAD_MAX);
        assert_eq!(p[7], AD_SHORTENED_LOCAL_NAME);
        assert_eq!(p[6] as usize, ADV_PAYLOAD_MAX - 7);
        assert_eq!(&p[8..], &long.as_bytes()[..23]);
    }

    #[test]
    fn scan_response_carries_service_uuid() {
        let uuid = *b"qhehandycompanyA";
        let p = build_scan_response(&uuid).unwrap();
        assert_eq!(p.len(), 18);
        assert_eq!(&p[..2], &[0x11, 0x07]);
        assert_eq!(&p[2..], &uuid);
    }

    #[test]
    fn exact_fit_stays_complete() {
        let name = "abcdefghijklmnopqrstuvw"; // 23 bytes
        let p = build(name, 0).unwrap();
        assert_eq!(p.len(), ADV_PAYLOAD_MAX);
        assert_eq!(p[7], AD_COMPLETE_LOCAL_NAME);
    }
}
