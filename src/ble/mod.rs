//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GAP** - advertises, accepts one central and runs the GATT server
//!    on the link until it drops.
//! 2. **Server** - the attribute table registered with the SoftDevice.
//! 3. **Timer** - a one-shot tick timer the scheduler arms and cancels.
//! 4. **Host** - implements the peripheral's capability traits on top of
//!    the three above and owns the event loop.
//!
//! Every stack callback and timer expiry is funneled through [`EVENTS`]
//! and applied by a single task, so state transitions never interleave.

pub mod gap;
pub mod host;
pub mod server;
pub mod timer;

use ble_sensor::Event;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

/// Pending events the peripheral task has not applied yet.
pub const EVENT_QUEUE_DEPTH: usize = 8;

pub type EventSender = Sender<'static, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventReceiver = Receiver<'static, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;

/// Serialized input queue of the peripheral task.
pub static EVENTS: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH> = Channel::new();
