//! Print device and module information

use gt521f32::Device;
use tracing_subscriber::EnvFilter;

fn main() -> gt521f32::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port = std::env::var("GT521_PORT").unwrap_or_else(|_| "/dev/ttyUSB0".to_string());

    let mut device = Device::new(&port)?;
    let info = device.open()?;

    println!("Device connected on {} ({})", port, device.transport_kind());
    println!("  Firmware:    {}", info.firmware_version);
    println!("  Serial:      {}", info.serial_number);
    println!("  ISO area:    {}", info.iso_area_max_size);

    let module = device.module_info()?;
    println!("  Sensor:      {}", module.sensor);
    println!("  Engine:      {}", module.engine_version);
    println!(
        "  Image:       {}x{} (raw {}x{})",
        module.image_width, module.image_height, module.raw_image_width, module.raw_image_height
    );

    match device.enrolled_count()? {
        Some(count) => println!("  Enrolled:    {}", count),
        None => println!("  Enrolled:    unknown"),
    }

    device.close();
    Ok(())
}
