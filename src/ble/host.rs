//! SoftDevice-backed host capabilities and the peripheral event loop.

use core::cell::RefCell;

use ble_sensor::config::PeripheralConfig;
use ble_sensor::connection::ConnHandle;
use ble_sensor::data_rate::DataRate;
use ble_sensor::gatt::Attribute;
use ble_sensor::scheduler::{SamplePayload, TickId};
use ble_sensor::{Advertise, Error, Notify, Outcome, PeripheralState, TickTimer};
use defmt::{error, trace, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::ble::Connection;

use super::gap::ADVERTISE;
use super::server::Server;
use super::timer::{TimerCommand, TIMER};
use super::EventReceiver;

/// The live link, if any. Written by the GAP task, read on notify.
static LINK: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

pub fn set_link(conn: Option<Connection>) {
    LINK.lock(|link| *link.borrow_mut() = conn);
}

fn link_for(handle: ConnHandle) -> Option<Connection> {
    LINK.lock(|link| {
        link.borrow()
            .as_ref()
            .filter(|c| c.handle() == Some(handle.0))
            .cloned()
    })
}

pub struct SoftdeviceHost {
    server: &'static Server,
}

impl SoftdeviceHost {
    pub const fn new(server: &'static Server) -> Self {
        Self { server }
    }
}

impl Advertise for SoftdeviceHost {
    fn start_advertising(&mut self) {
        ADVERTISE.signal(());
    }
}

impl TickTimer for SoftdeviceHost {
    fn arm(&mut self, tick: TickId, period_ms: DataRate) {
        TIMER.signal(TimerCommand::Arm { tick, period_ms });
    }

    fn cancel(&mut self) {
        TIMER.signal(TimerCommand::Cancel);
    }
}

impl Notify for SoftdeviceHost {
    fn notify(&mut self, conn: ConnHandle, payload: &SamplePayload) -> Result<(), Error> {
        let link = link_for(conn).ok_or(Error::ResourceExhausted)?;
        self.server.sensor.sample_notify(&link, payload).map_err(|e| {
            trace!("sample notify failed: {:?}", e);
            Error::ResourceExhausted
        })
    }
}

/// Owns the peripheral state and applies queued events one at a time.
pub async fn peripheral_task(server: &'static Server, events: EventReceiver) -> ! {
    let mut state = PeripheralState::new(PeripheralConfig::default());
    let mut host = SoftdeviceHost::new(server);

    for attr in [
        Attribute::DataRate,
        Attribute::ManufacturerName,
        Attribute::ModelNumber,
    ] {
        if let Err(e) = server.publish(&state, attr) {
            error!("initial value of {:?} not published: {:?}", attr, e);
        }
    }

    state.start(&mut host);

    loop {
        let event = events.receive().await;
        let outcome = state.handle(event, &mut host);
        if let Outcome::Rejected { attr, error } = outcome {
            warn!("write to {:?} rejected (att 0x{:02x})", attr, error.att_code());
        }
        if let Some(attr) = outcome.republish() {
            if let Err(e) = server.publish(&state, attr) {
                error!("value of {:?} not republished: {:?}", attr, e);
            }
        }
    }
}
