use crate::{
    calibration::Calibration,
    constants::DEFAULT_CONTROLLER_INDEX,
    error::ServoError,
    mapper::PositionMapper,
    notify::ChangeNotifier,
    pwm::{PwmChannel, PwmController, PwmError, PwmProvider},
    types::{LifecycleState, Position, PropertyChange},
};
use futures::channel::mpsc::UnboundedReceiver;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

// Fields drop in order, so the channel goes before its controller
struct Hardware<C: PwmController> {
    channel: C::Channel,
    _controller: C,
}

impl<C: PwmController> Hardware<C> {
    fn release(mut self, pin: u32) {
        if let Err(e) = self.channel.stop() {
            warn!("Failed to stop PWM channel {}: {}. Releasing it anyway", pin, e);
        }
        debug!("Releasing PWM channel {}", pin);
    }
}

fn write_duty_cycle<Ch: PwmChannel>(
    channel: &mut Ch,
    mapper: &PositionMapper,
    pulse_width: f64,
) -> Result<(), PwmError> {
    let percentage = mapper.duty_cycle(pulse_width);
    debug!(
        "PWM channel {}: {}ms -> duty cycle {}",
        mapper.calibration().pin_number(),
        pulse_width,
        percentage
    );
    channel.set_duty_cycle(percentage)
}

// Puts an abandoned `Initializing` back to `Uninitialized`, e.g. when the
// `initialize` future is dropped while awaiting the provider
struct InitializeGuard<'a, C: PwmController> {
    inner: &'a Mutex<Inner<C>>,
    armed: bool,
}

impl<C: PwmController> InitializeGuard<'_, C> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<C: PwmController> Drop for InitializeGuard<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.state == LifecycleState::Initializing {
            debug!("Initialization abandoned");
            inner.state = LifecycleState::Uninitialized;
        }
    }
}

struct Inner<C: PwmController> {
    state: LifecycleState,
    position: Option<Position>,
    auto_follow: bool,
    hardware: Option<Hardware<C>>,
    notifier: ChangeNotifier,
}

impl<C: PwmController> Inner<C> {
    fn ready_position(&self) -> Result<Position, ServoError> {
        match (self.state, self.position) {
            (LifecycleState::Ready, Some(position)) => Ok(position),
            (LifecycleState::Disposed, _) => {
                warn!("Rejected operation on a disposed servo");
                Err(ServoError::Disposed)
            }
            _ => Err(ServoError::NotInitialized),
        }
    }

    fn apply_to_hardware(&mut self, mapper: &PositionMapper, pulse_width: f64) -> Result<(), ServoError> {
        let hardware = self.hardware.as_mut().ok_or(ServoError::NotInitialized)?;
        write_duty_cycle(&mut hardware.channel, mapper, pulse_width).map_err(ServoError::Hardware)
    }
}

/// A single servo on one PWM channel.
///
/// Keeps the desired angle and the desired pulse width consistent with each
/// other and, while auto-follow is on, with the duty cycle of the channel.
/// All methods take `&self`; one lock serializes every state change, so the
/// controller can be shared between tasks behind an `Arc`.
pub struct ServoController<P: PwmProvider> {
    provider: P,
    mapper: PositionMapper,
    controller_index: usize,
    inner: Mutex<Inner<P::Controller>>,
}

impl<P: PwmProvider> ServoController<P> {
    pub fn new(provider: P, calibration: Calibration) -> Result<Self, ServoError> {
        calibration.validate()?;
        Ok(ServoController {
            provider,
            mapper: PositionMapper::new(calibration),
            controller_index: DEFAULT_CONTROLLER_INDEX,
            inner: Mutex::new(Inner {
                state: LifecycleState::Uninitialized,
                position: None,
                auto_follow: true,
                hardware: None,
                notifier: ChangeNotifier::new(),
            }),
        })
    }

    /// Selects which of the provider's enumerated controllers drives the servo.
    pub fn with_controller_index(mut self, index: usize) -> Self {
        self.controller_index = index;
        self
    }

    pub fn calibration(&self) -> &Calibration {
        self.mapper.calibration()
    }

    pub fn mapper(&self) -> &PositionMapper {
        &self.mapper
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    /// Last position set, `None` until the servo has been initialized.
    pub fn position(&self) -> Option<Position> {
        self.inner.lock().position
    }

    pub fn desired_angle(&self) -> Option<i32> {
        self.position().map(|p| p.angle)
    }

    pub fn desired_pulse_width(&self) -> Option<f64> {
        self.position().map(|p| p.pulse_width)
    }

    pub fn auto_follow(&self) -> bool {
        self.inner.lock().auto_follow
    }

    /// Only flips the flag; use `move_to_current_position` to catch the
    /// hardware up after turning it back on.
    pub fn set_auto_follow(&self, enabled: bool) {
        self.inner.lock().auto_follow = enabled;
    }

    /// Feed of `DesiredAngle` and `DesiredPulseWidth` changes.
    pub fn subscribe(&self) -> UnboundedReceiver<PropertyChange> {
        self.inner.lock().notifier.subscribe()
    }

    /// Acquires the PWM channel, starts it and centres the servo.
    pub async fn initialize(&self) -> Result<(), ServoError> {
        let pulse_width = self.calibration().middle_pulse_width();
        let centre = Position {
            angle: self.mapper.pulse_width_to_angle(pulse_width)?,
            pulse_width,
        };

        self.begin_initialize()?;
        let mut guard = InitializeGuard {
            inner: &self.inner,
            armed: true,
        };
        let acquired = self.acquire().await;
        let pin = self.calibration().pin_number();

        guard.disarm();
        let mut inner = self.inner.lock();
        if inner.state == LifecycleState::Disposed {
            if let Ok(hardware) = acquired {
                hardware.release(pin);
            }
            return Err(ServoError::Disposed);
        }

        let mut hardware = match acquired {
            Ok(hardware) => hardware,
            Err(e) => {
                inner.state = LifecycleState::Uninitialized;
                return Err(e);
            }
        };
        if let Err(e) = write_duty_cycle(&mut hardware.channel, &self.mapper, centre.pulse_width) {
            hardware.release(pin);
            inner.state = LifecycleState::Uninitialized;
            return Err(ServoError::InitializationFailed(e));
        }

        inner.hardware = Some(hardware);
        inner.position = Some(centre);
        inner.state = LifecycleState::Ready;
        inner.notifier.emit(PropertyChange::DesiredAngle(centre.angle));
        inner.notifier.emit(PropertyChange::DesiredPulseWidth(centre.pulse_width));

        info!(
            "Servo on PWM channel {} initialized at {}ms ({} degrees)",
            pin, centre.pulse_width, centre.angle
        );
        Ok(())
    }

    fn begin_initialize(&self) -> Result<(), ServoError> {
        let mut inner = self.inner.lock();
        match inner.state {
            LifecycleState::Uninitialized => {}
            LifecycleState::Initializing | LifecycleState::Ready => {
                return Err(ServoError::AlreadyInitialized)
            }
            LifecycleState::Disposed => return Err(ServoError::Disposed),
        }
        if !self.provider.is_available() {
            return Err(ServoError::ProviderUnavailable);
        }
        inner.state = LifecycleState::Initializing;
        Ok(())
    }

    async fn acquire(&self) -> Result<Hardware<P::Controller>, ServoError> {
        let mut controllers = self
            .provider
            .controllers()
            .await
            .map_err(ServoError::InitializationFailed)?;

        let available = controllers.len();
        if self.controller_index >= available {
            return Err(ServoError::InitializationFailed(PwmError::ControllerNotFound {
                index: self.controller_index,
                available,
            }));
        }
        let mut controller = controllers.swap_remove(self.controller_index);
        drop(controllers);

        let calibration = self.calibration();
        let mut channel = controller
            .open_channel(calibration.pin_number())
            .map_err(ServoError::InitializationFailed)?;
        controller
            .set_frequency(calibration.frequency())
            .map_err(ServoError::InitializationFailed)?;
        channel.start().map_err(ServoError::InitializationFailed)?;

        Ok(Hardware {
            channel,
            _controller: controller,
        })
    }

    pub fn set_desired_angle(&self, angle: i32) -> Result<(), ServoError> {
        let mut inner = self.inner.lock();
        let current = inner.ready_position()?;
        let pulse_width = self.mapper.angle_to_pulse_width(angle)?;

        inner.position = Some(Position { angle, pulse_width });
        if angle != current.angle {
            inner.notifier.emit(PropertyChange::DesiredPulseWidth(pulse_width));
            inner.notifier.emit(PropertyChange::DesiredAngle(angle));
        }

        if inner.auto_follow {
            inner.apply_to_hardware(&self.mapper, pulse_width)?;
        }
        Ok(())
    }

    pub fn set_desired_pulse_width(&self, pulse_width: f64) -> Result<(), ServoError> {
        let mut inner = self.inner.lock();
        let current = inner.ready_position()?;
        let angle = self.mapper.pulse_width_to_angle(pulse_width)?;

        inner.position = Some(Position { angle, pulse_width });
        if pulse_width != current.pulse_width {
            inner.notifier.emit(PropertyChange::DesiredAngle(angle));
            inner.notifier.emit(PropertyChange::DesiredPulseWidth(pulse_width));
        }

        if inner.auto_follow {
            inner.apply_to_hardware(&self.mapper, pulse_width)?;
        }
        Ok(())
    }

    /// Writes the stored pulse width to the channel, whatever auto-follow says.
    pub fn move_to_current_position(&self) -> Result<(), ServoError> {
        let mut inner = self.inner.lock();
        let current = inner.ready_position()?;
        inner.apply_to_hardware(&self.mapper, current.pulse_width)
    }

    /// Stops and releases the channel. Only the first call touches hardware.
    pub fn dispose(&self) {
        let hardware = {
            let mut inner = self.inner.lock();
            if inner.state == LifecycleState::Disposed {
                debug!("Servo already disposed");
                return;
            }
            inner.state = LifecycleState::Disposed;
            inner.hardware.take()
        };

        let pin = self.calibration().pin_number();
        if let Some(hardware) = hardware {
            hardware.release(pin);
        }
        info!("Servo on PWM channel {} disposed", pin);
    }
}

impl<P: PwmProvider> Drop for ServoController<P> {
    fn drop(&mut self) {
        let pin = self.mapper.calibration().pin_number();
        if let Some(hardware) = self.inner.get_mut().hardware.take() {
            hardware.release(pin);
        }
    }
}
