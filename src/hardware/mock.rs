//! Mock hardware implementations.
//!
//! Simulated devices for running the full check suite without physical
//! hardware. Time-dependent mocks (serial byte arrival, switch toggling) key
//! their behavior off the first poll, so tests can assert that checks succeed
//! at the simulated event time and fail at the configured deadline.
//!
//! Every mock records the interactions it sees; tests use those records to
//! prove that gated-off checks never touch the hardware seam.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::Result;

use super::{CommandRunner, ConfirmationProvider, Gpio, IoLevel, SerialLink, SerialOpener};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// MockGpio
// =============================================================================

/// Simulated GPIO subsystem.
///
/// The mission switch flips once, `flip_after` past the first state poll,
/// mimicking an operator toggling it partway through the check window.
pub struct MockGpio {
    initialized: bool,
    test_mode: AtomicBool,
    switch_initial: bool,
    flip_after: Option<Duration>,
    first_poll: Mutex<Option<Instant>>,
    switches: Mutex<Vec<(String, u8)>>,
    leds: Mutex<Vec<(String, u8)>>,
    led_writes: Mutex<Vec<(String, IoLevel)>>,
    pin_accesses: AtomicU32,
}

impl MockGpio {
    /// A healthy subsystem whose switch toggles `flip_after` into the check.
    pub fn healthy(flip_after: Duration) -> Self {
        Self {
            initialized: true,
            flip_after: Some(flip_after),
            ..Self::base()
        }
    }

    /// A healthy subsystem whose switch never changes state.
    pub fn with_static_switch() -> Self {
        Self {
            initialized: true,
            ..Self::base()
        }
    }

    /// A subsystem that failed to come up.
    pub fn uninitialized() -> Self {
        Self::base()
    }

    fn base() -> Self {
        Self {
            initialized: false,
            test_mode: AtomicBool::new(false),
            switch_initial: false,
            flip_after: None,
            first_poll: Mutex::new(None),
            switches: Mutex::new(Vec::new()),
            leds: Mutex::new(Vec::new()),
            led_writes: Mutex::new(Vec::new()),
            pin_accesses: AtomicU32::new(0),
        }
    }

    /// Every `set_led` and `switch_state` call seen so far.
    pub fn pin_accesses(&self) -> u32 {
        self.pin_accesses.load(Ordering::Relaxed)
    }

    pub fn registered_switches(&self) -> Vec<(String, u8)> {
        lock(&self.switches).clone()
    }

    pub fn registered_leds(&self) -> Vec<(String, u8)> {
        lock(&self.leds).clone()
    }

    pub fn led_writes(&self) -> Vec<(String, IoLevel)> {
        lock(&self.led_writes).clone()
    }
}

impl Gpio for MockGpio {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::Relaxed)
    }

    fn set_test_mode(&self, enabled: bool) {
        self.test_mode.store(enabled, Ordering::Relaxed);
    }

    fn add_switch(&self, name: &str, pin: u8) -> Result<()> {
        lock(&self.switches).push((name.to_owned(), pin));
        Ok(())
    }

    fn add_led(&self, name: &str, pin: u8) -> Result<()> {
        lock(&self.leds).push((name.to_owned(), pin));
        Ok(())
    }

    fn set_led(&self, name: &str, level: IoLevel) -> Result<()> {
        self.pin_accesses.fetch_add(1, Ordering::Relaxed);
        lock(&self.led_writes).push((name.to_owned(), level));
        Ok(())
    }

    fn switch_state(&self, _name: &str) -> Result<bool> {
        self.pin_accesses.fetch_add(1, Ordering::Relaxed);
        let mut first = lock(&self.first_poll);
        let started = *first.get_or_insert_with(Instant::now);
        match self.flip_after {
            Some(after) if started.elapsed() >= after => Ok(!self.switch_initial),
            _ => Ok(self.switch_initial),
        }
    }
}

// =============================================================================
// MockSerialLink / MockSerialOpener
// =============================================================================

/// Simulated serial connection delivering at most one byte.
pub struct MockSerialLink {
    open: bool,
    /// Byte arrival time relative to the first read attempt; `None` means
    /// the line stays silent.
    deliver_after: Option<Duration>,
    first_read: Option<Instant>,
    reads: u32,
}

impl MockSerialLink {
    pub fn delivering_after(delay: Duration) -> Self {
        Self {
            open: true,
            deliver_after: Some(delay),
            first_read: None,
            reads: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            open: true,
            deliver_after: None,
            first_read: None,
            reads: 0,
        }
    }

    pub fn closed() -> Self {
        Self {
            open: false,
            deliver_after: None,
            first_read: None,
            reads: 0,
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl SerialLink for MockSerialLink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.reads += 1;
        let started = *self.first_read.get_or_insert_with(Instant::now);
        match self.deliver_after {
            Some(after) if started.elapsed() >= after => Ok(Some(0x55)),
            _ => Ok(None),
        }
    }
}

/// Behavior of one mocked serial device path.
#[derive(Debug, Clone, Copy)]
pub enum MockLinkSpec {
    DeliveringAfter(Duration),
    Silent,
    Closed,
}

/// Hands out `MockSerialLink`s per device path and records which paths were
/// opened.
pub struct MockSerialOpener {
    specs: HashMap<String, MockLinkSpec>,
    opened: Mutex<Vec<String>>,
}

impl MockSerialOpener {
    pub fn new(specs: impl IntoIterator<Item = (String, MockLinkSpec)>) -> Self {
        Self {
            specs: specs.into_iter().collect(),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Opener with no configured paths; every open attempt fails.
    pub fn empty() -> Self {
        Self::new([])
    }

    pub fn opened_paths(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }
}

impl SerialOpener for MockSerialOpener {
    fn open(&self, path: &str, _baud_rate: u32) -> Result<Box<dyn SerialLink>> {
        lock(&self.opened).push(path.to_owned());
        match self.specs.get(path) {
            Some(MockLinkSpec::DeliveringAfter(delay)) => {
                Ok(Box::new(MockSerialLink::delivering_after(*delay)))
            }
            Some(MockLinkSpec::Silent) => Ok(Box::new(MockSerialLink::silent())),
            Some(MockLinkSpec::Closed) => Ok(Box::new(MockSerialLink::closed())),
            None => anyhow::bail!("no mock serial device at {path}"),
        }
    }
}

// =============================================================================
// MockCommandRunner
// =============================================================================

/// Scripted command runner for `lsusb` and `systemctl` queries.
pub struct MockCommandRunner {
    usb_output: String,
    substates: HashMap<String, String>,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockCommandRunner {
    pub fn new(usb_output: impl Into<String>) -> Self {
        Self {
            usb_output: usb_output.into(),
            substates: HashMap::new(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scripts the SubState reply for one service. Unscripted services
    /// report "dead".
    pub fn with_substate(mut self, service: &str, substate: &str) -> Self {
        self.substates.insert(service.to_owned(), substate.to_owned());
        self
    }

    /// A runner whose every invocation fails, as when the shell pipe cannot
    /// be opened.
    pub fn failing() -> Self {
        Self {
            usb_output: String::new(),
            substates: HashMap::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Command lines seen so far, program and arguments joined by spaces.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let mut line = program.to_owned();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        lock(&self.calls).push(line);

        if self.fail {
            anyhow::bail!("mock command failure");
        }
        match program {
            "lsusb" => Ok(self.usb_output.clone()),
            "systemctl" => {
                let service = args.get(1).copied().unwrap_or_default();
                Ok(self
                    .substates
                    .get(service)
                    .cloned()
                    .unwrap_or_else(|| "dead\n".to_owned()))
            }
            other => anyhow::bail!("mock has no script for {other}"),
        }
    }
}

// =============================================================================
// ScriptedConfirmation
// =============================================================================

/// Confirmation provider answering every prompt with a fixed response.
pub struct ScriptedConfirmation {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl ConfirmationProvider for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        lock(&self.prompts).push(prompt.to_owned());
        Ok(self.answer)
    }
}
