//! Identify one finger, giving up after ten seconds

use std::thread;
use std::time::Duration;

use gt521f32::Device;
use tracing_subscriber::EnvFilter;

fn main() -> gt521f32::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port = std::env::var("GT521_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let mut device = Device::new(&port)?;
    device.open()?;

    let session = device.session();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(10));
        session.cancel();
    });

    println!("Place your finger on the sensor...");

    match device.identify() {
        Ok(Some(id)) => println!("Hello, user {}", id),
        Ok(None) => println!("Finger not recognized"),
        Err(e) if e.is_cancelled() => println!("No finger pressed"),
        Err(e) => return Err(e),
    }

    Ok(())
}
