//! BLE sensor firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Brings up the SoftDevice, registers the GATT server and spawns the
//! four tasks that make up the peripheral:
//!
//! | Task                | Role                                             |
//! |---------------------|--------------------------------------------------|
//! | `softdevice_task`   | SoftDevice event pump                            |
//! | `gap_task`          | advertising, connection, GATT server per link    |
//! | `timer_task`        | one-shot notification tick timer                 |
//! | `peripheral_task`   | owns `PeripheralState`, applies queued events    |

#![no_std]
#![no_main]

mod ble;

use ble::server::Server;
use ble_sensor::adv::{self, AdvPayload};
use ble_sensor::gatt::Attribute;
use ble_sensor::config::{
    ADV_TX_POWER_DBM, DEVICE_INFO_SERVICE_UUID16, DEVICE_NAME, SENSOR_SERVICE_UUID,
    SENSOR_SERVICE_UUID_LE,
};
use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::interrupt::Priority;
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ble-sensor starting");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let _p = embassy_nrf::init(nrf_config);

    let sd = enable_softdevice();

    static SERVER: StaticCell<Server> = StaticCell::new();
    let server: &'static Server = SERVER.init(unwrap!(Server::new(sd)));
    let sd: &'static Softdevice = sd;
    info!(
        "registered services: sensor {=str}, device information 0x{:04x}",
        SENSOR_SERVICE_UUID, DEVICE_INFO_SERVICE_UUID16
    );
    for attr in Attribute::ALL {
        info!(
            "  {:?} uuid={:?} read={=bool} write={=bool} notify={=bool}",
            attr,
            attr.uuid(),
            attr.readable(),
            attr.writable(),
            attr.notifiable()
        );
    }

    unwrap!(spawner.spawn(softdevice_task(sd)));

    let address = nrf_softdevice::ble::get_address(sd);
    info!("device address: {:?}", address);

    static ADV_DATA: StaticCell<AdvPayload> = StaticCell::new();
    static SCAN_DATA: StaticCell<AdvPayload> = StaticCell::new();
    let adv_data: &'static AdvPayload =
        ADV_DATA.init(unwrap!(adv::build(DEVICE_NAME, ADV_TX_POWER_DBM)));
    let scan_data: &'static AdvPayload =
        SCAN_DATA.init(unwrap!(adv::build_scan_response(&SENSOR_SERVICE_UUID_LE)));

    unwrap!(spawner.spawn(timer_task(ble::EVENTS.sender())));
    unwrap!(spawner.spawn(gap_task(
        sd,
        server,
        adv_data,
        scan_data,
        ble::EVENTS.sender()
    )));
    unwrap!(spawner.spawn(peripheral_task(server, ble::EVENTS.receiver())));
}

fn enable_softdevice() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        // One base per 128-bit UUID: they differ in the top byte.
        common_vs_uuid: Some(raw::ble_common_cfg_vs_uuid_t { vs_uuid_count: 3 }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as *const u8 as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };
    Softdevice::enable(&config)
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn timer_task(events: ble::EventSender) -> ! {
    ble::timer::timer_task(events).await
}

#[embassy_executor::task]
async fn gap_task(
    sd: &'static Softdevice,
    server: &'static Server,
    adv_data: &'static AdvPayload,
    scan_data: &'static AdvPayload,
    events: ble::EventSender,
) -> ! {
    ble::gap::gap_task(sd, server, adv_data, scan_data, events).await
}

#[embassy_executor::task]
async fn peripheral_task(server: &'static Server, events: ble::EventReceiver) -> ! {
    ble::host::peripheral_task(server, events).await
}
