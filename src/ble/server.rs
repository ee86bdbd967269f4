//! GATT attribute table as registered with the SoftDevice.

use ble_sensor::gatt::{AttValue, Attribute};
use ble_sensor::peripheral::WRITE_MAX;
use ble_sensor::router::GapEvent;
use ble_sensor::{Error, Event, PeripheralState};
use defmt::warn;
use heapless::Vec;

#[nrf_softdevice::gatt_service(uuid = "41796e61-706d-6f63-7964-6e6168656871")]
pub struct SensorService {
    // Eight consecutive counter values, notify only.
    #[characteristic(uuid = "61796e61-706d-6f63-7964-6e6168656871", notify)]
    pub sample: [u8; 8],
    // Notification period in ms, u16 little-endian.
    #[characteristic(uuid = "62796e61-706d-6f63-7964-6e6168656871", read, write)]
    pub data_rate: Vec<u8, WRITE_MAX>,
}

#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2a29", read)]
    pub manufacturer_name: Vec<u8, 32>,
    #[characteristic(uuid = "2a24", read)]
    pub model_number: Vec<u8, 32>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub sensor: SensorService,
    pub device_info: DeviceInformationService,
}

impl Server {
    /// Copy the current value of `attr` into the SoftDevice attribute table.
    ///
    /// Reads are served by the SoftDevice from that table, so this runs once
    /// at startup for every readable attribute and again after each write.
    pub fn publish(&self, state: &PeripheralState, attr: Attribute) -> Result<(), Error> {
        let mut value = AttValue::new();
        state.read_attribute(attr, &mut value)?;

        let res = match attr {
            Attribute::DataRate => {
                let v: Vec<u8, WRITE_MAX> =
                    Vec::from_slice(&value).map_err(|_| Error::ResourceExhausted)?;
                self.sensor.data_rate_set(&v)
            }
            Attribute::ManufacturerName => self.device_info.manufacturer_name_set(&value),
            Attribute::ModelNumber => self.device_info.model_number_set(&value),
            Attribute::Sample => return Err(Error::Unreachable),
        };
        res.map_err(|e| {
            warn!("attribute table update for {:?} failed: {:?}", attr, e);
            Error::ResourceExhausted
        })
    }
}

/// Map a server callback onto the peripheral's event set.
pub fn translate(event: ServerEvent) -> Event {
    match event {
        ServerEvent::Sensor(e) => match e {
            SensorServiceEvent::SampleCccdWrite { notifications } => {
                Event::Gap(GapEvent::Subscribe {
                    attr: Attribute::Sample,
                    notify: notifications,
                })
            }
            SensorServiceEvent::DataRateWrite(value) => Event::Write {
                attr: Attribute::DataRate,
                value,
            },
        },
        ServerEvent::DeviceInfo(e) => match e {},
    }
}
