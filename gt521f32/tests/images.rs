//! Image download and BMP export

mod common;

use common::*;
use gt521f32::{Command, NackCode};
use pretty_assertions::assert_eq;

#[test]
fn test_capture_and_get_image() {
    let (mut device, log) = device(cooperative);

    let image = device.capture_and_get_image().unwrap().unwrap();

    assert_eq!((image.width(), image.height()), (202, 258));
    assert!(image.pixels().iter().all(|&p| p == 0x80));
    assert_eq!(log.count(Command::GetImage), 1);
}

#[test]
fn test_get_image_refused() {
    let (mut device, _log) = device(|command, parameter| match command {
        Command::GetImage => nack(NackCode::DevErr),
        other => cooperative(other, parameter),
    });

    assert_eq!(device.get_image().unwrap(), None);
}

#[test]
fn test_raw_image_safe_holds_led() {
    let (mut device, log) = device(cooperative);

    let image = device.raw_image_safe().unwrap().unwrap();

    assert_eq!((image.width(), image.height()), (160, 120));
    assert_eq!(
        log.commands(),
        vec![
            (Command::CmosLed, 1),
            (Command::GetRawImage, 0),
            (Command::CmosLed, 0),
        ]
    );
}

#[test]
fn test_raw_image_safe_led_off_on_failure() {
    let (mut device, log) = device(|command, parameter| match command {
        // Announce a frame but never send it
        Command::GetRawImage => Reply::Ack(0),
        other => cooperative(other, parameter),
    });

    assert!(device.raw_image_safe().unwrap_err().is_fatal());
    assert_eq!(log.led_commands(), vec![1, 0]);
}

#[test]
fn test_save_image_to_bmp() {
    let path = std::env::temp_dir().join(format!("gt521f32-capture-{}.bmp", std::process::id()));

    let (mut device, _log) = device(cooperative);
    assert!(device.save_image_to_bmp(&path).unwrap());

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"BM");
    assert_eq!(bytes.len(), 1078 + 204 * 258);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_save_image_without_finger_image() {
    let path = std::env::temp_dir().join(format!("gt521f32-missing-{}.bmp", std::process::id()));

    let (mut device, _log) = device(|command, parameter| match command {
        Command::Capture => nack(NackCode::BadFinger),
        other => cooperative(other, parameter),
    });

    assert!(!device.save_image_to_bmp(&path).unwrap());
    assert!(!path.exists());
}
