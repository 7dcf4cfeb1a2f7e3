use futures::StreamExt;
use pwm_servo::{sim::SimulatedPwm, Calibration, ServoController};
use std::error::Error;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;

async fn sweep(servo: &ServoController<SimulatedPwm>) -> Result<(), Box<dyn Error>> {
    let max_angle = servo.calibration().max_angle();
    for angle in (0..=max_angle).step_by(30) {
        servo.set_desired_angle(angle)?;
        println!(
            "Angle {} -> pulse width {:.3}ms",
            angle,
            servo.desired_pulse_width().unwrap_or_default()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pwm = SimulatedPwm::new(1);
    let servo = ServoController::new(pwm.clone(), Calibration::new(18))?;

    let mut changes = servo.subscribe();
    let watcher = tokio::spawn(async move {
        while let Some(change) = changes.next().await {
            println!("{} = {:?}", change.property(), change);
        }
    });

    servo.initialize().await?;
    sweep(&servo).await?;

    // Stage a position without moving, then push it
    servo.set_auto_follow(false);
    servo.set_desired_pulse_width(1.25)?;
    servo.move_to_current_position()?;

    servo.dispose();
    drop(servo);
    watcher.await?;

    println!("Duty cycles written: {:?}", pwm.duty_cycles());
    Ok(())
}
