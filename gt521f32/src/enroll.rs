//! Three-step enrollment

use gt521f32_core::{Command, DeviceError, constants::ENROLL_STEPS};
use tracing::{debug, error, info, warn};

use crate::device::Device;
use crate::error::{Error, Result};
use crate::prompt::PromptOutcome;
use crate::retry::{RetryPolicy, Verdict};

/// How one enrollment step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollStepOutcome {
    /// Template part stored
    Accepted,

    /// Capture or ENROLLn refused with a known error, worth retrying
    Rejected(DeviceError),

    /// The finger is already enrolled under this id
    DuplicateId(u32),

    /// The finger prompt was cancelled
    Cancelled,
}

impl EnrollStepOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    fn verdict(&self) -> Verdict {
        match self {
            Self::Accepted => Verdict::Success,
            Self::Rejected(_) => Verdict::Retry,
            Self::DuplicateId(_) | Self::Cancelled => Verdict::Stop,
        }
    }
}

/// How a complete enrollment ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// All steps accepted
    Enrolled,

    /// ENROLL_START was refused
    StartRejected(DeviceError),

    /// A step failed after its retries
    StepFailed { step: u8, outcome: EnrollStepOutcome },
}

impl EnrollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Enrolled)
    }
}

impl Device {
    /// Begin enrolling `id`
    pub fn enroll_start(&mut self, id: u32) -> Result<bool> {
        Ok(self.try_enroll_start(id)?.is_ok())
    }

    fn try_enroll_start(&mut self, id: u32) -> Result<std::result::Result<(), DeviceError>> {
        let response = self.channel().send(Command::EnrollStart, id)?;

        Ok(response
            .check(Command::EnrollStart)
            .map(|_| ())
            .inspect_err(|e| error!("Enroll start for id {} failed: {}", id, e)))
    }

    /// Capture a finger and run enrollment step `n` (1 to 3)
    ///
    /// A step is attempted up to the configured number of times and the
    /// first acceptance wins. An unrecognized error code from ENROLLn means
    /// the finger is already enrolled; that ends the step without retrying.
    /// With `save_image` the captured image is written to
    /// `Enroll<n>.bmp` in the configured image directory.
    pub fn enroll_step(&mut self, n: u8, save_image: bool) -> Result<EnrollStepOutcome> {
        let command = Command::enroll_step(n).ok_or(Error::InvalidEnrollStep(n))?;
        let policy = RetryPolicy::new(self.config().enroll_attempts);

        let outcome = policy.run(
            |attempt| {
                debug!("{} attempt {}/{}", command, attempt, policy.max_attempts());
                self.enroll_attempt(command, n, save_image)
            },
            EnrollStepOutcome::verdict,
        )?;

        Ok(outcome.value)
    }

    fn enroll_attempt(
        &mut self,
        command: Command,
        n: u8,
        save_image: bool,
    ) -> Result<EnrollStepOutcome> {
        let captured = match self.prompt_and_capture(false)? {
            PromptOutcome::Completed(captured) => captured,
            PromptOutcome::Cancelled => return Ok(EnrollStepOutcome::Cancelled),
        };
        if let Err(e) = captured {
            warn!("{}", e);
            return Ok(EnrollStepOutcome::Rejected(e));
        }

        if save_image {
            self.save_enroll_image(n)?;
        }

        let response = self.channel().send(command, 0)?;
        match response.check(command) {
            Ok(_) => {
                debug!("{} succeeded", command);
                Ok(EnrollStepOutcome::Accepted)
            }
            Err(e) if e.is_unrecognized() => {
                error!("{} failed: duplicate id {}", command, e.code);
                Ok(EnrollStepOutcome::DuplicateId(e.code))
            }
            Err(e) => {
                error!("{}", e);
                Ok(EnrollStepOutcome::Rejected(e))
            }
        }
    }

    fn save_enroll_image(&mut self, n: u8) -> Result<()> {
        let path = self.config().image_dir.join(format!("Enroll{}.bmp", n));

        match self.get_image()? {
            Some(image) => {
                info!("Saving enrollment image {} to {}", n, path.display());
                image.save_bmp(&path)?;
            }
            None => warn!("No image to save for enrollment step {}", n),
        }
        Ok(())
    }

    /// Enroll `id` with all three steps
    pub fn enroll_user(&mut self, id: u32, save_images: bool) -> Result<EnrollOutcome> {
        if let Err(e) = self.try_enroll_start(id)? {
            return Ok(EnrollOutcome::StartRejected(e));
        }

        for step in 1..=ENROLL_STEPS {
            let outcome = self.enroll_step(step, save_images)?;
            if !outcome.is_accepted() {
                debug!("Enrollment of id {} failed at step {}, aborting", id, step);
                return Ok(EnrollOutcome::StepFailed { step, outcome });
            }
        }

        info!("Enrolled id {}", id);
        Ok(EnrollOutcome::Enrolled)
    }
}
