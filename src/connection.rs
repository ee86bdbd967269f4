//! Single-link connection and subscription tracking.

/// Opaque identifier the stack assigns to the active link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnHandle(pub u16);

/// Connection handle plus the notify subscription of the sample characteristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    handle: Option<ConnHandle>,
    subscribed: bool,
}

impl ConnectionState {
    pub const fn new() -> Self {
        Self {
            handle: None,
            subscribed: false,
        }
    }

    /// Record a successful connection.
    pub fn on_connect(&mut self, handle: ConnHandle) {
        if let Some(old) = self.handle.replace(handle) {
            warn!("connect {:?} while {:?} still recorded", handle, old);
        }
    }

    /// Forget the link. Also drops the subscription, since CCCD state of an
    /// unbonded peer does not outlive the connection. No-op when idle.
    pub fn on_disconnect(&mut self) {
        self.handle = None;
        self.subscribed = false;
    }

    pub fn current(&self) -> Option<ConnHandle> {
        self.handle
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        self.subscribed = subscribed;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Handle to notify, if connected and subscribed.
    pub fn notify_target(&self) -> Option<ConnHandle> {
        self.handle.filter(|_| self.subscribed)
    }
}
