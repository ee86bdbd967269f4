//! Integration tests for the host-testable peripheral logic.
//!
//! A simulated host stands in for the BLE stack: it records adverts and
//! notifications and keeps a virtual clock, so timer arms can be fired
//! in order and their expiry times checked.

use ble_sensor::config::{
    ForeignSubscribePolicy, PeripheralConfig, DEFAULT_DATA_RATE_MS, INITIAL_SAMPLE,
    MIN_DATA_RATE_MS,
};
use ble_sensor::connection::ConnHandle;
use ble_sensor::data_rate::DataRate;
use ble_sensor::gatt::{AttValue, Attribute};
use ble_sensor::router::hci;
use ble_sensor::scheduler::{SamplePayload, SchedulerState, TickId, TickOutcome};
use ble_sensor::{
    Advertise, Error, Event, GapEvent, Notify, Outcome, PeripheralState, TickTimer,
};

const LINK: ConnHandle = ConnHandle(1);

#[derive(Default)]
struct SimHost {
    now_ms: u64,
    pending: Option<(TickId, u64)>,
    adverts: usize,
    sent: Vec<(u64, SamplePayload)>,
    fail_notify: bool,
}

impl SimHost {
    /// Advance the clock to the pending expiry and hand back its tick.
    fn fire(&mut self) -> Event {
        let (tick, at) = self.pending.take().expect("no timer armed");
        self.now_ms = at;
        Event::Tick(tick)
    }
}

impl Advertise for SimHost {
    fn start_advertising(&mut self) {
        self.adverts += 1;
    }
}

impl TickTimer for SimHost {
    fn arm(&mut self, tick: TickId, period_ms: DataRate) {
        self.pending = Some((tick, self.now_ms + u64::from(period_ms)));
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Notify for SimHost {
    fn notify(&mut self, _conn: ConnHandle, payload: &SamplePayload) -> Result<(), Error> {
        if self.fail_notify {
            return Err(Error::ResourceExhausted);
        }
        self.sent.push((self.now_ms, *payload));
        Ok(())
    }
}

fn subscribed(host: &mut SimHost) -> PeripheralState {
    let mut p = PeripheralState::new(PeripheralConfig::default());
    p.start(host);
    p.handle(Event::Gap(GapEvent::Connected(LINK)), host);
    p.handle(sub(Attribute::Sample, true), host);
    p
}

fn sub(attr: Attribute, notify: bool) -> Event {
    Event::Gap(GapEvent::Subscribe { attr, notify })
}

fn write(bytes: &[u8]) -> Event {
    Event::Write {
        attr: Attribute::DataRate,
        value: heapless::Vec::from_slice(bytes).unwrap(),
    }
}

fn run(start: u8) -> SamplePayload {
    core::array::from_fn(|i| start.wrapping_add(i as u8))
}

#[test]
fn three_ticks_then_rate_change_applies_from_next_arm() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    assert_eq!(p.data_rate(), DEFAULT_DATA_RATE_MS);

    for _ in 0..3 {
        let tick = host.fire();
        p.handle(tick, &mut host);
    }
    assert_eq!(
        host.sent,
        vec![(1000, run(90)), (2000, run(91)), (3000, run(92))]
    );

    // Mid-cycle write: the pending expiry at 4000 is left alone.
    let out = p.handle(write(&50u16.to_le_bytes()), &mut host);
    assert_eq!(out, Outcome::Written(Attribute::DataRate));
    assert_eq!(p.data_rate(), MIN_DATA_RATE_MS);
    assert_eq!(host.pending.map(|(_, at)| at), Some(4000));

    let tick = host.fire();
    p.handle(tick, &mut host);
    let tick = host.fire();
    p.handle(tick, &mut host);
    assert_eq!(&host.sent[3..], &[(4000, run(93)), (4100, run(94))]);
}

#[test]
fn reconnect_resumes_from_zero() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    let tick = host.fire();
    p.handle(tick, &mut host);
    assert_eq!(host.sent[0].1, run(INITIAL_SAMPLE));

    p.handle(Event::Gap(GapEvent::Disconnected(LINK)), &mut host);
    assert_eq!(p.scheduler().state(), SchedulerState::Stopped);
    assert!(host.pending.is_none());
    assert!(!p.connection().is_subscribed());

    p.handle(Event::Gap(GapEvent::Connected(ConnHandle(2))), &mut host);
    p.handle(sub(Attribute::Sample, true), &mut host);
    let tick = host.fire();
    p.handle(tick, &mut host);
    assert_eq!(host.sent[1].1, run(0));
}

#[test]
fn idle_link_keeps_initial_sample() {
    let mut host = SimHost::default();
    let mut p = PeripheralState::new(PeripheralConfig::default());
    p.start(&mut host);
    p.handle(Event::Gap(GapEvent::Connected(LINK)), &mut host);
    p.handle(Event::Gap(GapEvent::Disconnected(LINK)), &mut host);
    p.handle(sub(Attribute::Sample, false), &mut host);
    assert_eq!(p.scheduler().counter(), INITIAL_SAMPLE);

    p.handle(Event::Gap(GapEvent::Connected(ConnHandle(2))), &mut host);
    p.handle(sub(Attribute::Sample, true), &mut host);
    let tick = host.fire();
    p.handle(tick, &mut host);
    assert_eq!(host.sent, vec![(1000, run(INITIAL_SAMPLE))]);
}

#[test]
fn advertising_restarts_after_every_link_loss() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    assert_eq!(host.adverts, 1);

    p.handle(Event::Gap(GapEvent::Disconnected(LINK)), &mut host);
    assert_eq!(host.adverts, 2);

    p.handle(Event::Gap(GapEvent::AdvComplete), &mut host);
    assert_eq!(host.adverts, 3);

    p.handle(Event::Gap(GapEvent::ConnectFailed {
            status: hci::UNKNOWN_CONNECTION_IDENTIFIER,
        }), &mut host);
    assert_eq!(host.adverts, 4);
}

#[test]
fn tick_after_unsubscribe_is_stale() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    let (tick, _) = host.pending.unwrap();

    p.handle(sub(Attribute::Sample, false), &mut host);
    let out = p.handle(Event::Tick(tick), &mut host);
    assert_eq!(out, Outcome::Tick(TickOutcome::Stale));
    assert!(host.sent.is_empty());
    assert_eq!(p.scheduler().counter(), 0);
}

#[test]
fn tick_racing_disconnect_sends_nothing() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    let (tick, _) = host.pending.unwrap();

    p.handle(Event::Gap(GapEvent::Disconnected(LINK)), &mut host);
    p.handle(Event::Tick(tick), &mut host);
    assert!(host.sent.is_empty());
}

#[test]
fn notify_failure_skips_tick_and_keeps_running() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);

    host.fail_notify = true;
    let tick = host.fire();
    let out = p.handle(tick, &mut host);
    assert_eq!(
        out,
        Outcome::Tick(TickOutcome::Dropped(Error::ResourceExhausted))
    );
    assert!(p.scheduler().is_running());

    host.fail_notify = false;
    let tick = host.fire();
    p.handle(tick, &mut host);
    // The dropped sample is sent on the next tick.
    assert_eq!(host.sent, vec![(2000, run(90))]);
}

#[test]
fn bad_length_write_keeps_rate() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);

    for bad in [&[][..], &[1][..], &[1, 2, 3][..]] {
        let out = p.handle(write(bad), &mut host);
        assert_eq!(
            out,
            Outcome::Rejected {
                attr: Attribute::DataRate,
                error: Error::InvalidLength
            }
        );
    }
    assert_eq!(p.data_rate(), DEFAULT_DATA_RATE_MS);

    let mut value = AttValue::new();
    p.read_attribute(Attribute::DataRate, &mut value).unwrap();
    assert_eq!(&value[..], &DEFAULT_DATA_RATE_MS.to_le_bytes());
}

#[test]
fn foreign_subscribe_follows_policy() {
    let mut host = SimHost::default();
    let mut p = subscribed(&mut host);
    p.handle(sub(Attribute::DataRate, true), &mut host);
    assert!(p.scheduler().is_running());

    let config = PeripheralConfig {
        foreign_subscribe: ForeignSubscribePolicy::StopScheduler,
        ..PeripheralConfig::default()
    };
    let mut host = SimHost::default();
    let mut p = PeripheralState::new(config);
    p.handle(Event::Gap(GapEvent::Connected(LINK)), &mut host);
    p.handle(sub(Attribute::Sample, true), &mut host);
    p.handle(sub(Attribute::DataRate, true), &mut host);
    assert!(!p.scheduler().is_running());
    assert!(host.pending.is_none());
}
