//! Enrollment retries and outcomes

mod common;

use common::*;
use gt521f32::{Command, EnrollOutcome, EnrollStepOutcome, Error, NackCode};
use pretty_assertions::assert_eq;

/// Cooperative sensor refusing ENROLL1 `failures` times before accepting
fn flaky_enroll1(failures: usize) -> impl FnMut(Command, u32) -> Reply + Send + 'static {
    let mut refused = 0;
    move |command, parameter| match command {
        Command::Enroll1 if refused < failures => {
            refused += 1;
            nack(NackCode::EnrollFailed)
        }
        other => cooperative(other, parameter),
    }
}

#[test]
fn test_step_succeeds_on_third_attempt() {
    let (mut device, log) = device(flaky_enroll1(2));

    let outcome = device.enroll_step(1, false).unwrap();

    assert_eq!(outcome, EnrollStepOutcome::Accepted);
    assert_eq!(log.count(Command::Enroll1), 3);
    assert_eq!(log.count(Command::Capture), 3);
}

#[test]
fn test_step_gives_up_after_three_attempts() {
    let (mut device, log) = device(flaky_enroll1(usize::MAX));

    let outcome = device.enroll_step(1, false).unwrap();

    match outcome {
        EnrollStepOutcome::Rejected(e) => assert_eq!(e.kind(), Some(NackCode::EnrollFailed)),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(log.count(Command::Enroll1), 3);
}

#[test]
fn test_duplicate_id_fails_fast() {
    let (mut device, log) = device(|command, parameter| match command {
        Command::Enroll1 => Reply::Nack(7),
        other => cooperative(other, parameter),
    });

    let outcome = device.enroll_step(1, false).unwrap();

    assert_eq!(outcome, EnrollStepOutcome::DuplicateId(7));
    assert_eq!(log.count(Command::Enroll1), 1);
}

#[test]
fn test_refused_capture_is_retried() {
    let mut captures = 0;
    let (mut device, log) = device(move |command, parameter| match command {
        Command::Capture => {
            captures += 1;
            if captures == 1 {
                nack(NackCode::FingerIsNotPressed)
            } else {
                Reply::Ack(0)
            }
        }
        other => cooperative(other, parameter),
    });

    let outcome = device.enroll_step(2, false).unwrap();

    assert_eq!(outcome, EnrollStepOutcome::Accepted);
    assert_eq!(log.count(Command::Capture), 2);
    assert_eq!(log.count(Command::Enroll2), 1);
}

#[test]
fn test_configured_attempts() {
    let (device, log) = device(flaky_enroll1(usize::MAX));
    let mut device = device.with_enroll_attempts(5);

    device.enroll_step(1, false).unwrap();

    assert_eq!(log.count(Command::Enroll1), 5);
}

#[test]
fn test_invalid_step() {
    let (mut device, log) = device(cooperative);

    let err = device.enroll_step(4, false).unwrap_err();

    assert!(matches!(err, Error::InvalidEnrollStep(4)));
    assert!(log.commands().is_empty());
}

#[test]
fn test_cancelled_step_is_not_retried() {
    let (mut device, log) = device(cooperative);
    device.cancel();

    let outcome = device.enroll_step(1, false).unwrap();

    assert_eq!(outcome, EnrollStepOutcome::Cancelled);
    assert_eq!(log.count(Command::Capture), 0);
    assert_eq!(log.count(Command::Enroll1), 0);
    assert_eq!(log.led_commands(), vec![1, 0]);
}

#[test]
fn test_enroll_user() {
    let (mut device, log) = device(cooperative);

    let outcome = device.enroll_user(7, false).unwrap();

    assert!(outcome.is_success());
    let enrollment: Vec<_> = log
        .commands()
        .into_iter()
        .filter(|(command, _)| {
            matches!(
                command,
                Command::EnrollStart | Command::Enroll1 | Command::Enroll2 | Command::Enroll3
            )
        })
        .collect();
    assert_eq!(
        enrollment,
        vec![
            (Command::EnrollStart, 7),
            (Command::Enroll1, 0),
            (Command::Enroll2, 0),
            (Command::Enroll3, 0),
        ]
    );
}

#[test]
fn test_enroll_user_start_rejected() {
    let (mut device, log) = device(|command, parameter| match command {
        Command::EnrollStart => nack(NackCode::IsAlreadyUsed),
        other => cooperative(other, parameter),
    });

    let outcome = device.enroll_user(7, false).unwrap();

    match outcome {
        EnrollOutcome::StartRejected(e) => assert_eq!(e.kind(), Some(NackCode::IsAlreadyUsed)),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(log.count(Command::Capture), 0);
}

#[test]
fn test_enroll_user_aborts_on_duplicate() {
    let (mut device, log) = device(|command, parameter| match command {
        Command::Enroll2 => Reply::Nack(3),
        other => cooperative(other, parameter),
    });

    let outcome = device.enroll_user(7, false).unwrap();

    assert_eq!(
        outcome,
        EnrollOutcome::StepFailed {
            step: 2,
            outcome: EnrollStepOutcome::DuplicateId(3),
        }
    );
    assert_eq!(log.count(Command::Enroll3), 0);
}

#[test]
fn test_enroll_saves_images() {
    let dir = std::env::temp_dir().join(format!("gt521f32-enroll-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let (device, log) = device(cooperative);
    let mut device = device.with_image_dir(&dir);

    assert!(device.enroll_user(1, true).unwrap().is_success());

    for n in 1..=3 {
        let path = dir.join(format!("Enroll{}.bmp", n));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(bytes.len(), 1078 + 204 * 258);
    }
    assert_eq!(log.count(Command::GetImage), 3);

    std::fs::remove_dir_all(&dir).unwrap();
}
