//! One-shot tick timer.
//!
//! The scheduler arms it with a [`TickId`] and a period; on expiry the id
//! is posted to the event queue. Re-arming or cancelling replaces whatever
//! was pending, so at most one tick is ever outstanding.

use ble_sensor::data_rate::DataRate;
use ble_sensor::scheduler::TickId;
use ble_sensor::Event;
use defmt::{trace, Format};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

use super::EventSender;

#[derive(Clone, Copy, Format)]
pub enum TimerCommand {
    Arm { tick: TickId, period_ms: DataRate },
    Cancel,
}

/// Latest command wins.
pub static TIMER: Signal<CriticalSectionRawMutex, TimerCommand> = Signal::new();

pub async fn timer_task(events: EventSender) -> ! {
    let mut pending = None;
    loop {
        let command = match pending.take() {
            Some(c) => c,
            None => TIMER.wait().await,
        };
        let TimerCommand::Arm { tick, period_ms } = command else {
            trace!("tick timer cancelled");
            continue;
        };

        match select(TIMER.wait(), Timer::after_millis(u64::from(period_ms))).await {
            Either::First(next) => pending = Some(next),
            Either::Second(()) => events.send(Event::Tick(tick)).await,
        }
    }
}
