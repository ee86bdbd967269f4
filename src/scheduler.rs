//! Periodic sample notification scheduler.
//!
//! Two states, `Stopped` and `Running`. While running, each timer tick
//! builds an 8-byte payload from the sample counter, notifies it to the
//! connected peer and re-arms the timer with the *current* data rate.
//! Every arm is relative to "now", so a rate written mid-cycle applies
//! from the next tick on.
//!
//! Ticks are identified by a [`TickId`]. A tick that does not match the
//! latest arm, or that arrives after the scheduler stopped, is dropped,
//! so a tick racing a stop decision can never mutate state.

use crate::config::SAMPLE_PAYLOAD_LEN;
use crate::connection::{ConnHandle, ConnectionState};
use crate::data_rate::DataRate;
use crate::error::Error;

/// Sample payload notified on every tick.
pub type SamplePayload = [u8; SAMPLE_PAYLOAD_LEN];

/// The counter wraps back to zero when it reaches this value.
const COUNTER_WRAP: u8 = 255;

/// Identity of one timer arm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickId(pub u32);

impl TickId {
    fn next(self) -> Self {
        TickId(self.0.wrapping_add(1))
    }
}

/// One-shot timer capability. Arming replaces any pending arm.
pub trait TickTimer {
    /// Deliver `tick` once, `period_ms` from now.
    fn arm(&mut self, tick: TickId, period_ms: DataRate);

    /// Drop any pending arm.
    fn cancel(&mut self);
}

/// Notify-send capability. Must not block on peer I/O.
pub trait Notify {
    fn notify(&mut self, conn: ConnHandle, payload: &SamplePayload) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Result of feeding one tick to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Old or unexpected tick; nothing happened.
    Stale,
    /// Subscription was gone; the scheduler stopped instead of notifying.
    Stopped,
    /// Payload was handed to the stack.
    Sent(SamplePayload),
    /// Notify failed; the timer was re-armed and the counter kept, so the
    /// next tick resends the same sample.
    Dropped(Error),
}

#[derive(Debug)]
pub struct NotificationScheduler {
    state: SchedulerState,
    counter: u8,
    armed: TickId,
}

impl NotificationScheduler {
    pub const fn new(initial_sample: u8) -> Self {
        Self {
            state: SchedulerState::Stopped,
            counter: initial_sample,
            armed: TickId(0),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Sample counter value the next payload starts from.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Enter (or restart) `Running`, counting down `rate` from now.
    /// The counter is left as is.
    pub fn start<T: TickTimer>(&mut self, rate: DataRate, timer: &mut T) {
        if self.is_running() {
            debug!("scheduler restarted, period {} ms", rate);
        } else {
            info!("notifications started, period {} ms", rate);
        }
        self.state = SchedulerState::Running;
        self.rearm(rate, timer);
    }

    /// Enter `Stopped` and cancel the timer. Leaving `Running` resets the
    /// counter to 0; stopping an idle scheduler keeps it.
    pub fn stop<T: TickTimer>(&mut self, timer: &mut T) {
        if self.is_running() {
            info!("notifications stopped");
            self.counter = 0;
        }
        timer.cancel();
        // Orphan anything already in flight.
        self.armed = self.armed.next();
        self.state = SchedulerState::Stopped;
    }

    /// Handle an expired timer.
    pub fn on_tick<H>(
        &mut self,
        tick: TickId,
        conn: &ConnectionState,
        rate: DataRate,
        host: &mut H,
    ) -> TickOutcome
    where
        H: TickTimer + Notify,
    {
        if !self.is_running() || tick != self.armed {
            trace!("stale tick {:?} ignored", tick);
            return TickOutcome::Stale;
        }

        let Some(target) = conn.notify_target() else {
            debug!("tick without subscription, stopping");
            self.stop(host);
            return TickOutcome::Stopped;
        };

        let payload = self.payload();
        let outcome = match host.notify(target, &payload) {
            Ok(()) => {
                trace!("notified {:?}: {:?}", target, payload);
                self.advance();
                TickOutcome::Sent(payload)
            }
            Err(e) => {
                warn!("notify to {:?} failed: {:?}, dropping tick", target, e);
                TickOutcome::Dropped(e)
            }
        };

        self.rearm(rate, host);
        outcome
    }

    fn payload(&self) -> SamplePayload {
        let mut payload = [0u8; SAMPLE_PAYLOAD_LEN];
        for (i, b) in payload.iter_mut().enumerate() {
            *b = self.counter.wrapping_add(i as u8);
        }
        payload
    }

    fn advance(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        if self.counter >= COUNTER_WRAP {
            self.counter = 0;
        }
    }

    fn rearm<T: TickTimer>(&mut self, rate: DataRate, timer: &mut T) {
        self.armed = self.armed.next();
        timer.arm(self.armed, rate);
    }
}
