//! Advertising and connection lifecycle.
//!
//! Advertising is started on request only (see [`ADVERTISE`]); whether to
//! re-advertise after a disconnect, a failed connect or a timeout is the
//! peripheral's decision, reported back to it as a [`GapEvent`].

use ble_sensor::adv::AdvPayload;
use ble_sensor::config::{ADV_INTERVAL, ADV_TIMEOUT, ADV_TX_POWER_DBM};
use ble_sensor::connection::ConnHandle;
use ble_sensor::router::{hci, GapEvent};
use ble_sensor::Event;
use defmt::{debug, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use nrf_softdevice::ble::peripheral::{self, AdvertiseError};
use nrf_softdevice::ble::{gatt_server, TxPower};
use nrf_softdevice::{raw, Softdevice};

use super::server::{self, Server};
use super::{host, EventSender};

/// Raised by the peripheral whenever it wants to be discoverable.
pub static ADVERTISE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

pub async fn gap_task(
    sd: &'static Softdevice,
    server: &'static Server,
    adv_data: &'static AdvPayload,
    scan_data: &'static AdvPayload,
    events: EventSender,
) -> ! {
    let config = peripheral::Config {
        interval: ADV_INTERVAL,
        timeout: Some(ADV_TIMEOUT),
        tx_power: tx_power(ADV_TX_POWER_DBM),
        ..Default::default()
    };

    loop {
        ADVERTISE.wait().await;

        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data[..],
            scan_data: &scan_data[..],
        };
        debug!("advertising");
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(AdvertiseError::Timeout) => {
                events.send(Event::Gap(GapEvent::AdvComplete)).await;
                continue;
            }
            Err(e) => {
                warn!("advertising failed: {:?}", e);
                let status = match e {
                    AdvertiseError::Raw(err) => err as u32,
                    _ => raw::NRF_ERROR_CONN_COUNT,
                };
                events.send(Event::Gap(GapEvent::ConnectFailed { status })).await;
                continue;
            }
        };

        let Some(handle) = conn.handle().map(ConnHandle) else {
            let status = hci::UNKNOWN_CONNECTION_IDENTIFIER;
            events.send(Event::Gap(GapEvent::ConnectFailed { status })).await;
            continue;
        };

        host::set_link(Some(conn.clone()));
        events.send(Event::Gap(GapEvent::Connected(handle))).await;

        let res = gatt_server::run(&conn, server, |e| {
            if events.try_send(server::translate(e)).is_err() {
                warn!("event queue full, GATT event dropped");
            }
        })
        .await;
        info!("gatt server exited: {:?}", res);

        host::set_link(None);
        events.send(Event::Gap(GapEvent::Disconnected(handle))).await;
    }
}

fn tx_power(dbm: i8) -> TxPower {
    match dbm {
        i8::MIN..=-40 => TxPower::Minus40dBm,
        -39..=-20 => TxPower::Minus20dBm,
        -19..=-16 => TxPower::Minus16dBm,
        -15..=-12 => TxPower::Minus12dBm,
        -11..=-8 => TxPower::Minus8dBm,
        -7..=-4 => TxPower::Minus4dBm,
        -3..=0 => TxPower::ZerodBm,
        _ => TxPower::Plus4dBm,
    }
}
