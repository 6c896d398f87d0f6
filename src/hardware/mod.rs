//! Hardware capability traits.
//!
//! The checker never touches hardware or the OS directly; every seam is a
//! small trait injected at construction time:
//!
//! - `Gpio` - switch and LED control (one subsystem handle, explicitly owned
//!   by the orchestrator instead of a process-wide singleton)
//! - `SerialLink` / `SerialOpener` - an open serial connection and the
//!   factory that produces one from a device path
//! - `CommandRunner` - external process invocation (`lsusb`, `systemctl`)
//! - `ConfirmationProvider` - the yes/no prompt for the human-in-the-loop
//!   LED check
//!
//! Traits are synchronous: the whole run is single-threaded and blocking,
//! and checks hold exclusive hardware resources, so there is nothing to
//! overlap. Each trait focuses on one concern and each has a mock in
//! [`mock`], which is what makes the full suite runnable without hardware.

use anyhow::Result;

pub mod mock;
pub mod system;

#[cfg(feature = "gpio_rpi")]
pub mod gpio_rpi;

pub use system::{ConsoleConfirmation, NullGpio, SystemCommandRunner};

/// Logic level for a GPIO output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoLevel {
    High,
    Low,
}

/// Capability: switch and LED control.
///
/// Lines are addressed by the name they were registered under. Methods take
/// `&self`; implementations use interior mutability since the GPIO subsystem
/// is one shared piece of hardware state.
pub trait Gpio {
    /// Whether the GPIO subsystem is usable at all. When false, every
    /// LED/switch check short-circuits to failure without touching pins.
    fn is_initialized(&self) -> bool;

    /// Test mode disables physical pin access; LED/switch checks are skipped
    /// while it is set.
    fn is_test_mode(&self) -> bool;

    fn set_test_mode(&self, enabled: bool);

    /// Register an input line under `name` on BCM pin `pin`.
    fn add_switch(&self, name: &str, pin: u8) -> Result<()>;

    /// Register an output line under `name` on BCM pin `pin`.
    fn add_led(&self, name: &str, pin: u8) -> Result<()>;

    fn set_led(&self, name: &str, level: IoLevel) -> Result<()>;

    /// Current state of a registered switch; true is pressed/ON.
    fn switch_state(&self, name: &str) -> Result<bool>;
}

/// Capability: one open serial connection.
pub trait SerialLink {
    fn is_open(&self) -> bool;

    /// Attempts to read a single byte without blocking past the link's own
    /// short read timeout. `Ok(None)` means no byte was available.
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// Capability: opening serial links from device paths.
pub trait SerialOpener {
    fn open(&self, path: &str, baud_rate: u32) -> Result<Box<dyn SerialLink>>;
}

/// Capability: running an external command and capturing its stdout.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Capability: asking the operator a yes/no question.
///
/// The LED check cannot be measured automatically; its result is whatever
/// the operator answers. Production wires this to the console, tests inject
/// a scripted provider.
pub trait ConfirmationProvider {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}
