//! Finger prompt: light the sensor, wait for a finger, run an action
//!
//! ```text
//! Idle ──LED on──▶ Illuminated ──press──▶ Pressed
//!                       │
//!                       └──cancel──▶ Cancelled
//! ```
//!
//! The LED is switched off again on every way out, including failures of
//! the poll or of the action.

use std::thread;
use std::time::Duration;

use gt521f32_core::{Command, Session};
use tracing::{debug, info, warn};

use crate::channel::CommandChannel;
use crate::error::{Error, Result};

/// Prompt progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    Idle,
    Illuminated,
    Pressed,
    Cancelled,
}

/// Result of an action run behind a finger prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome<T> {
    /// A finger was pressed and the action ran
    Completed(T),

    /// The prompt was cancelled before a finger was pressed
    Cancelled,
}

impl<T> PromptOutcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Turn cancellation into [`Error::Cancelled`]
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Cancelled => Err(Error::Cancelled),
        }
    }
}

/// Switch the sensor backlight
pub fn set_led(channel: &mut CommandChannel<'_>, on: bool) -> Result<bool> {
    let response = channel.send(Command::CmosLed, u32::from(on))?;
    if let Err(e) = response.check(Command::CmosLed) {
        warn!("{}", e);
        return Ok(false);
    }
    Ok(true)
}

/// Check if a finger rests on the sensor
///
/// The module answers with parameter 0 while a finger is pressed. A refused
/// poll is logged and reads as no finger.
pub fn is_finger_pressed(channel: &mut CommandChannel<'_>) -> Result<bool> {
    match channel.send(Command::IsPressFinger, 0)?.check(Command::IsPressFinger) {
        Ok(parameter) => Ok(parameter == 0),
        Err(e) => {
            warn!("{}", e);
            Ok(false)
        }
    }
}

/// One finger prompt bound to a session's cancel flag
pub struct FingerPrompt<'s> {
    session: &'s Session,
    interval: Duration,
    state: PromptState,
}

impl<'s> FingerPrompt<'s> {
    pub fn new(session: &'s Session, interval: Duration) -> Self {
        Self {
            session,
            interval,
            state: PromptState::Idle,
        }
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Poll until a finger is pressed or cancellation is requested
    ///
    /// Returns `true` on a press. A pending cancel request is consumed.
    pub fn wait(&mut self, channel: &mut CommandChannel<'_>) -> Result<bool> {
        loop {
            if self.session.take_cancel() {
                info!("Finger prompt cancelled");
                self.state = PromptState::Cancelled;
                return Ok(false);
            }

            if is_finger_pressed(channel)? {
                debug!("Finger pressed");
                self.state = PromptState::Pressed;
                return Ok(true);
            }

            thread::sleep(self.interval);
        }
    }

    /// Light the sensor, wait for a finger and run `action`
    ///
    /// `action` is skipped when the prompt is cancelled. The LED is off
    /// when this returns, whatever the outcome.
    pub fn run<T>(
        &mut self,
        channel: &mut CommandChannel<'_>,
        action: impl FnOnce(&mut CommandChannel<'_>) -> Result<T>,
    ) -> Result<PromptOutcome<T>> {
        let outcome = self.illuminated(channel, action);

        match (outcome, set_led(channel, false)) {
            (Ok(outcome), Ok(_)) => Ok(outcome),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), led) => {
                if let Err(led_err) = led {
                    warn!("Could not switch the LED off: {}", led_err);
                }
                Err(e)
            }
        }
    }

    fn illuminated<T>(
        &mut self,
        channel: &mut CommandChannel<'_>,
        action: impl FnOnce(&mut CommandChannel<'_>) -> Result<T>,
    ) -> Result<PromptOutcome<T>> {
        set_led(channel, true)?;
        self.state = PromptState::Illuminated;

        if !self.wait(channel)? {
            return Ok(PromptOutcome::Cancelled);
        }

        action(channel).map(PromptOutcome::Completed)
    }
}
