//! In-memory PWM driver.
//!
//! Stands in for real hardware on hosts without PWM support: every call is
//! recorded so callers can inspect exactly what a servo asked of its channel.
//! Clones share the same log and fault switches.

use crate::pwm::{PwmChannel, PwmController, PwmError, PwmProvider};
use futures::channel::oneshot;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    SetFrequency { controller: usize, hz: u32 },
    OpenChannel { controller: usize, pin: u32 },
    Start { pin: u32 },
    Stop { pin: u32 },
    DutyCycle { pin: u32, percentage: f64 },
    ReleaseChannel { pin: u32 },
    ReleaseController { controller: usize },
}

#[derive(Debug, Default)]
struct SimState {
    events: Vec<SimEvent>,
    fail_open_channel: bool,
    fail_stop: bool,
    reject_frequency: bool,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Debug, Clone)]
pub struct SimulatedPwm {
    controller_count: usize,
    available: bool,
    shared: Arc<Mutex<SimState>>,
}

impl SimulatedPwm {
    pub fn new(controller_count: usize) -> Self {
        SimulatedPwm {
            controller_count,
            available: true,
            shared: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Reports no PWM support, as on a platform without a PWM driver.
    pub fn with_unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn fail_open_channel(&self) {
        self.shared.lock().fail_open_channel = true;
    }

    pub fn fail_stop(&self) {
        self.shared.lock().fail_stop = true;
    }

    pub fn reject_frequency(&self) {
        self.shared.lock().reject_frequency = true;
    }

    pub fn clear_faults(&self) {
        let mut state = self.shared.lock();
        state.fail_open_channel = false;
        state.fail_stop = false;
        state.reject_frequency = false;
    }

    /// Makes the next controller enumeration wait until the returned sender
    /// fires or is dropped.
    pub fn hold_enumeration(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.shared.lock().gate = Some(rx);
        tx
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.shared.lock().events.clone()
    }

    /// Duty cycles written so far, oldest first.
    pub fn duty_cycles(&self) -> Vec<f64> {
        self.shared
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SimEvent::DutyCycle { percentage, .. } => Some(*percentage),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&SimEvent) -> bool) -> usize {
        self.shared.lock().events.iter().filter(|&event| matches(event)).count()
    }
}

fn record(shared: &Mutex<SimState>, event: SimEvent) {
    shared.lock().events.push(event);
}

impl PwmProvider for SimulatedPwm {
    type Controller = SimController;

    fn is_available(&self) -> bool {
        self.available
    }

    fn controllers(&self) -> impl Future<Output = Result<Vec<SimController>, PwmError>> + Send {
        let shared = Arc::clone(&self.shared);
        let count = self.controller_count;
        async move {
            let gate = shared.lock().gate.take();
            if let Some(gate) = gate {
                // A dropped sender releases the gate too
                let _ = gate.await;
            }
            Ok((0..count)
                .map(|index| SimController {
                    index,
                    shared: Arc::clone(&shared),
                })
                .collect())
        }
    }
}

#[derive(Debug)]
pub struct SimController {
    index: usize,
    shared: Arc<Mutex<SimState>>,
}

impl PwmController for SimController {
    type Channel = SimChannel;

    fn open_channel(&mut self, pin: u32) -> Result<SimChannel, PwmError> {
        if self.shared.lock().fail_open_channel {
            return Err(PwmError::ChannelUnavailable { pin });
        }
        record(&self.shared, SimEvent::OpenChannel { controller: self.index, pin });
        Ok(SimChannel {
            pin,
            shared: Arc::clone(&self.shared),
        })
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), PwmError> {
        if self.shared.lock().reject_frequency {
            return Err(PwmError::UnsupportedFrequency { hz });
        }
        record(&self.shared, SimEvent::SetFrequency { controller: self.index, hz });
        Ok(())
    }
}

impl Drop for SimController {
    fn drop(&mut self) {
        record(&self.shared, SimEvent::ReleaseController { controller: self.index });
    }
}

#[derive(Debug)]
pub struct SimChannel {
    pin: u32,
    shared: Arc<Mutex<SimState>>,
}

impl PwmChannel for SimChannel {
    fn start(&mut self) -> Result<(), PwmError> {
        record(&self.shared, SimEvent::Start { pin: self.pin });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PwmError> {
        if self.shared.lock().fail_stop {
            return Err(PwmError::Device(format!("channel {} did not stop", self.pin)));
        }
        record(&self.shared, SimEvent::Stop { pin: self.pin });
        Ok(())
    }

    fn set_duty_cycle(&mut self, percentage: f64) -> Result<(), PwmError> {
        if !(0.0..=1.0).contains(&percentage) {
            return Err(PwmError::DutyCycleOutOfRange { percentage });
        }
        record(&self.shared, SimEvent::DutyCycle { pin: self.pin, percentage });
        Ok(())
    }
}

impl Drop for SimChannel {
    fn drop(&mut self) {
        record(&self.shared, SimEvent::ReleaseChannel { pin: self.pin });
    }
}
