//! GAP event routing.
//!
//! The stack's lifecycle callbacks are modeled as a closed set of
//! [`GapEvent`] variants. [`handle_event`] applies one of them to the
//! peripheral state, starting or stopping the scheduler and re-arming
//! advertising whenever the link goes away, so the peripheral stays
//! discoverable while idle.

use crate::config::ForeignSubscribePolicy;
use crate::connection::ConnHandle;
use crate::gatt::Attribute;
use crate::peripheral::PeripheralState;
use crate::scheduler::TickTimer;

/// HCI status codes carried by [`GapEvent::ConnectFailed`].
pub mod hci {
    pub const SUCCESS: u32 = 0x00;
    /// The link was gone before a handle could be assigned.
    pub const UNKNOWN_CONNECTION_IDENTIFIER: u32 = 0x02;
}

/// Advertising-start capability.
pub trait Advertise {
    /// Begin (or resume) connectable, general-discoverable advertising.
    fn start_advertising(&mut self);
}

/// Connection lifecycle events delivered by the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GapEvent {
    /// A central connected.
    Connected(ConnHandle),
    /// A connection attempt failed with the given stack status.
    ConnectFailed { status: u32 },
    /// The link was terminated.
    Disconnected(ConnHandle),
    /// The peer wrote a CCCD.
    Subscribe { attr: Attribute, notify: bool },
    /// Advertising ended without a connection (timeout).
    AdvComplete,
    /// ATT MTU exchange finished.
    MtuUpdated { handle: ConnHandle, mtu: u16 },
    /// Connection parameters changed.
    ConnParamsUpdated { handle: ConnHandle },
}

pub fn handle_event<H>(state: &mut PeripheralState, event: GapEvent, host: &mut H)
where
    H: Advertise + TickTimer,
{
    match event {
        GapEvent::Connected(handle) => {
            info!("connection established; handle={:?}", handle);
            state.connection.on_connect(handle);
        }
        GapEvent::ConnectFailed { status } => {
            warn!("connection failed; status={}", status);
            advertise(host);
        }
        GapEvent::Disconnected(handle) => {
            info!("disconnect; handle={:?}", handle);
            state.connection.on_disconnect();
            state.scheduler.stop(host);
            advertise(host);
        }
        GapEvent::Subscribe { attr, notify } => on_subscribe(state, attr, notify, host),
        GapEvent::AdvComplete => {
            info!("adv complete");
            advertise(host);
        }
        GapEvent::MtuUpdated { handle, mtu } => {
            info!("mtu update; handle={:?} mtu={}", handle, mtu);
        }
        other => {
            debug!("ignored gap event {:?}", other);
        }
    }
}

fn on_subscribe<H>(state: &mut PeripheralState, attr: Attribute, notify: bool, host: &mut H)
where
    H: TickTimer,
{
    info!("subscribe event; attr={:?} notify={}", attr, notify);

    if attr != Attribute::Sample {
        match state.config.foreign_subscribe {
            ForeignSubscribePolicy::Ignore => {
                debug!("subscribe on {:?} ignored", attr);
            }
            ForeignSubscribePolicy::StopScheduler => {
                state.connection.set_subscribed(notify);
                state.scheduler.stop(host);
            }
        }
        return;
    }

    state.connection.set_subscribed(notify);
    if notify && state.connection.is_connected() {
        let rate = state.data_rate.value();
        state.scheduler.start(rate, host);
    } else {
        if notify {
            warn!("subscribe without a connection");
        }
        state.scheduler.stop(host);
    }
}

fn advertise<H: Advertise>(host: &mut H) {
    debug!("advertising restarted");
    host.start_advertising();
}
