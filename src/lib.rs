//! BLE sensor peripheral logic.
//!
//! Everything here is hardware-independent and runs on the host under
//! `cargo test`. The SoftDevice bindings live in the `embedded` binary
//! (`main.rs` + `ble/`), which drives [`peripheral::PeripheralState`]
//! through the capability traits below.
//!
//! Event flow:
//!
//! ```text
//! stack callbacks ─┐
//! GATT writes ─────┼─> Event queue ─> PeripheralState::handle ─┬─> Advertise
//! timer ticks ─────┘                                           ├─> TickTimer
//!                                                              └─> Notify
//! ```

#![cfg_attr(not(test), no_std)]

// Must stay first so the modules below see its macros.
mod fmt;

pub mod adv;
pub mod config;
pub mod connection;
pub mod data_rate;
pub mod device_info;
pub mod error;
pub mod gatt;
pub mod peripheral;
pub mod router;
pub mod scheduler;

pub use error::Error;
pub use peripheral::{Event, Host, Outcome, PeripheralState};
pub use router::{Advertise, GapEvent};
pub use scheduler::{Notify, TickTimer};
