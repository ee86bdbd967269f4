//! Owned peripheral state and the serialized event entry point.
//!
//! Everything that changes at runtime (link, subscription, data rate,
//! sample counter, armed tick) lives in one [`PeripheralState`]. All
//! inputs reach it as an [`Event`] through [`PeripheralState::handle`],
//! which callers run from a single task, so transitions never interleave.

use crate::config::PeripheralConfig;
use crate::connection::ConnectionState;
use crate::data_rate::{DataRate, DataRateAttribute};
use crate::device_info::DeviceInfo;
use crate::error::Error;
use crate::gatt::{Attribute, AttValue};
use crate::router::{self, Advertise, GapEvent};
use crate::scheduler::{NotificationScheduler, Notify, TickId, TickOutcome, TickTimer};

/// Largest GATT write we accept from the stack before validation.
pub const WRITE_MAX: usize = 4;

/// Everything the peripheral reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Gap(GapEvent),
    /// Peer wrote a characteristic value.
    Write {
        attr: Attribute,
        value: heapless::Vec<u8, WRITE_MAX>,
    },
    /// The scheduler's timer fired.
    Tick(TickId),
}

/// What a single event produced, for the caller to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Tick(TickOutcome),
    /// A write committed this value.
    Written(Attribute),
    /// A write was rejected; answer the peer with `Error::att_code`.
    Rejected { attr: Attribute, error: Error },
}

impl Outcome {
    /// Attribute whose stored value must be rewritten after this outcome.
    ///
    /// The stack keeps the raw bytes of every write, so both committed and
    /// rejected writes put the value in effect back.
    pub fn republish(self) -> Option<Attribute> {
        match self {
            Outcome::Written(attr) | Outcome::Rejected { attr, .. } if attr.readable() => {
                Some(attr)
            }
            _ => None,
        }
    }
}

/// Capabilities the stack must provide.
pub trait Host: Advertise + TickTimer + Notify {}

impl<T: Advertise + TickTimer + Notify> Host for T {}

pub struct PeripheralState {
    pub(crate) config: PeripheralConfig,
    pub(crate) connection: ConnectionState,
    pub(crate) data_rate: DataRateAttribute,
    pub(crate) scheduler: NotificationScheduler,
    device_info: DeviceInfo,
}

impl PeripheralState {
    pub fn new(config: PeripheralConfig) -> Self {
        Self {
            config,
            connection: ConnectionState::new(),
            data_rate: DataRateAttribute::new(config.initial_data_rate, config.min_data_rate),
            scheduler: NotificationScheduler::new(config.initial_sample),
            device_info: DeviceInfo::new(),
        }
    }

    /// Stack is synced: begin advertising.
    pub fn start<H: Advertise>(&mut self, host: &mut H) {
        info!(
            "peripheral up; data rate {} ms (min {} ms)",
            self.data_rate.value(),
            self.data_rate.min()
        );
        host.start_advertising();
    }

    pub fn handle<H: Host>(&mut self, event: Event, host: &mut H) -> Outcome {
        match event {
            Event::Gap(gap) => {
                router::handle_event(self, gap, host);
                Outcome::Handled
            }
            Event::Write { attr, value } => match self.write_attribute(attr, &value) {
                Ok(()) => Outcome::Written(attr),
                Err(error) => Outcome::Rejected { attr, error },
            },
            Event::Tick(tick) => {
                let rate = self.data_rate.value();
                Outcome::Tick(self.scheduler.on_tick(tick, &self.connection, rate, host))
            }
        }
    }

    /// Serve a peer read by appending the value to `out`.
    pub fn read_attribute(&self, attr: Attribute, out: &mut AttValue) -> Result<(), Error> {
        let result = match attr {
            Attribute::DataRate => self.data_rate.read_into(out),
            Attribute::ManufacturerName => append(out, self.device_info.manufacturer_name),
            Attribute::ModelNumber => append(out, self.device_info.model_number),
            Attribute::Sample => {
                error!("read routed to notify-only {:?}", attr);
                Err(Error::Unreachable)
            }
        };
        if let Err(e) = result {
            warn!("read of {:?} failed: {:?}", attr, e);
        }
        result
    }

    /// Apply a peer write.
    pub fn write_attribute(&mut self, attr: Attribute, value: &[u8]) -> Result<(), Error> {
        match attr {
            Attribute::DataRate => match self.data_rate.write(value) {
                Ok(rate) => {
                    info!("data rate set to {} ms", rate);
                    Ok(())
                }
                Err(e) => {
                    warn!("data rate write of {} bytes rejected: {:?}", value.len(), e);
                    Err(e)
                }
            },
            Attribute::ManufacturerName | Attribute::ModelNumber => {
                warn!("write to read-only {:?}", attr);
                Err(Error::Unlikely)
            }
            Attribute::Sample => {
                error!("write routed to notify-only {:?}", attr);
                Err(Error::Unreachable)
            }
        }
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn data_rate(&self) -> DataRate {
        self.data_rate.value()
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }
}

fn append(out: &mut AttValue, s: &str) -> Result<(), Error> {
    out.extend_from_slice(s.as_bytes())
        .map_err(|_| Error::ResourceExhausted)
}
