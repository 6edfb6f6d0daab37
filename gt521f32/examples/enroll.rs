//! Enroll a finger
//!
//! Usage: `GT521_PORT=/dev/ttyUSB0 cargo run --example enroll -- <id> [--save-images]`

use gt521f32::{Device, EnrollOutcome};
use tracing_subscriber::EnvFilter;

fn main() -> gt521f32::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port = std::env::var("GT521_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let mut args = std::env::args().skip(1);
    let id: u32 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(0);
    let save_images = args.any(|arg| arg == "--save-images");

    let mut device = Device::new(&port)?;
    device.open()?;

    if device.is_id_enrolled(id)? {
        println!("Id {} is taken, deleting it first", id);
        device.delete_id(id)?;
    }

    println!("Place your finger on the sensor three times...");

    match device.enroll_user(id, save_images)? {
        EnrollOutcome::Enrolled => println!("Enrolled id {}", id),
        EnrollOutcome::StartRejected(e) => println!("Could not start: {}", e),
        EnrollOutcome::StepFailed { step, outcome } => {
            println!("Step {} failed: {:?}", step, outcome)
        }
    }

    Ok(())
}
