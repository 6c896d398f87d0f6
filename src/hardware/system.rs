//! Production implementations of the hardware capability traits.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result};

use super::{CommandRunner, ConfirmationProvider, Gpio, IoLevel, SerialLink, SerialOpener};

/// Runs external commands via `std::process::Command`, capturing stdout.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute {program}"))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Console y/n prompt on stdin/stdout.
pub struct ConsoleConfirmation;

impl ConfirmationProvider for ConsoleConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        print!("[QUESTION] {prompt} (y/n): ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(matches!(answer.trim(), "y" | "Y"))
    }
}

/// GPIO stand-in for hosts without a usable GPIO subsystem. Reports
/// uninitialized, so every LED/switch check short-circuits to failure.
pub struct NullGpio;

impl Gpio for NullGpio {
    fn is_initialized(&self) -> bool {
        false
    }

    fn is_test_mode(&self) -> bool {
        false
    }

    fn set_test_mode(&self, _enabled: bool) {}

    fn add_switch(&self, _name: &str, _pin: u8) -> Result<()> {
        anyhow::bail!("GPIO subsystem not available")
    }

    fn add_led(&self, _name: &str, _pin: u8) -> Result<()> {
        anyhow::bail!("GPIO subsystem not available")
    }

    fn set_led(&self, _name: &str, _level: IoLevel) -> Result<()> {
        anyhow::bail!("GPIO subsystem not available")
    }

    fn switch_state(&self, _name: &str) -> Result<bool> {
        anyhow::bail!("GPIO subsystem not available")
    }
}

#[cfg(feature = "hardware_serial")]
mod serial {
    use std::io::Read;
    use std::time::Duration;

    use anyhow::{Context, Result};

    use crate::hardware::{SerialLink, SerialOpener};

    /// An open serialport-backed link. Reads use a short timeout so the
    /// checker's own polling loop stays in control of the deadline.
    pub struct SystemSerialLink {
        port: Box<dyn serialport::SerialPort>,
    }

    impl SerialLink for SystemSerialLink {
        fn is_open(&self) -> bool {
            // serialport has no liveness query; an open handle that still
            // answers a baud-rate request is treated as open.
            self.port.baud_rate().is_ok()
        }

        fn read_byte(&mut self) -> Result<Option<u8>> {
            let mut buffer = [0u8; 1];
            match self.port.read(&mut buffer) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(buffer[0])),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }

    /// Opens serial links with the serialport crate.
    pub struct SystemSerialOpener;

    impl SerialOpener for SystemSerialOpener {
        fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>> {
            let port = serialport::new(path, baud_rate)
                .timeout(Duration::from_millis(10))
                .open()
                .with_context(|| format!("failed to open serial port {path}"))?;
            Ok(Box::new(SystemSerialLink { port }))
        }
    }
}

#[cfg(feature = "hardware_serial")]
pub use serial::{SystemSerialLink, SystemSerialOpener};

/// Serial opener used when the crate is built without serial support; every
/// open attempt fails, so serial checks report failure instead of probing.
#[cfg(not(feature = "hardware_serial"))]
pub struct SystemSerialOpener;

#[cfg(not(feature = "hardware_serial"))]
impl SerialOpener for SystemSerialOpener {
    fn open(&self, _path: &str, _baud_rate: u32) -> Result<Box<dyn SerialLink>> {
        Err(crate::error::CheckError::SerialFeatureDisabled.into())
    }
}
