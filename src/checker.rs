//! Component health-check orchestrator.
//!
//! `ComponentHealthChecker` owns the registry, the GPIO handle, and the
//! serial links, and runs the linear pipeline: prerequisite gate once, then
//! the selected checks, then the report. Everything is synchronous and
//! blocking; checks execute one at a time because they hold exclusive
//! hardware resources.
//!
//! Checks never return errors. A check's outcome is a boolean written into
//! the registry: unavailable resources, timeouts, and failed shell commands
//! all read as `false`. The single fatal condition is a conflicting service
//! found running during the gate, which aborts the whole run.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{error, info};

use crate::config::CheckConfig;
use crate::error::{CheckError, CheckResult};
use crate::hardware::{
    CommandRunner, ConfirmationProvider, Gpio, IoLevel, SerialLink, SerialOpener,
};
use crate::registry::{ComponentId, Registry};
use crate::report;

/// LED selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Green,
    Blue,
}

impl LedColor {
    fn component(self) -> ComponentId {
        match self {
            LedColor::Red => ComponentId::RedLed,
            LedColor::Green => ComponentId::GreenLed,
            LedColor::Blue => ComponentId::BlueLed,
        }
    }
}

/// Which check(s) a single invocation executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSelection {
    /// Full battery: serial1, serial2, camera, then LEDs and the mission
    /// button when GPIO is usable.
    All,
    Serial1,
    Serial2,
    Realsense,
    Led(LedColor),
    MissionButton,
    /// Conflicting-service scan only; runs no hardware checks.
    Services,
}

pub struct ComponentHealthChecker {
    config: CheckConfig,
    registry: Registry,
    gpio: Arc<dyn Gpio>,
    runner: Arc<dyn CommandRunner>,
    confirmation: Arc<dyn ConfirmationProvider>,
    opener: Arc<dyn SerialOpener>,
    port1: Option<Box<dyn SerialLink>>,
    port2: Option<Box<dyn SerialLink>>,
}

impl ComponentHealthChecker {
    pub fn new(
        config: CheckConfig,
        gpio: Arc<dyn Gpio>,
        runner: Arc<dyn CommandRunner>,
        confirmation: Arc<dyn ConfirmationProvider>,
        opener: Arc<dyn SerialOpener>,
    ) -> Self {
        let registry = Registry::new(
            &config.serial1_path,
            &config.serial2_path,
            &config.camera_match,
        );
        gpio.set_test_mode(false);
        Self {
            config,
            registry,
            gpio,
            runner,
            confirmation,
            opener,
            port1: None,
            port2: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prerequisite gate. Aborts on a conflicting service; everything else
    /// only marks components unavailable.
    pub fn initialize(&mut self) -> CheckResult<()> {
        self.verify_no_conflicting_services()?;

        let serial1_ok = serial_port_available(&self.registry.get(ComponentId::Serial1).target);
        let serial2_ok = serial_port_available(&self.registry.get(ComponentId::Serial2).target);
        self.registry.set_initialized(ComponentId::Serial1, serial1_ok);
        self.registry.set_initialized(ComponentId::Serial2, serial2_ok);

        let gpio_ok = self.gpio.is_initialized();
        for id in [
            ComponentId::Mission,
            ComponentId::RedLed,
            ComponentId::GreenLed,
            ComponentId::BlueLed,
        ] {
            self.registry.set_initialized(id, gpio_ok);
        }

        if gpio_ok {
            for switch in &self.config.switches {
                if let Err(e) = self.gpio.add_switch(switch.name, switch.pin) {
                    error!("Failed to register switch {}: {e:#}", switch.name);
                }
            }
            for led in &self.config.leds {
                if let Err(e) = self.gpio.add_led(led.name, led.pin) {
                    error!("Failed to register LED {}: {e:#}", led.name);
                }
            }
            for led in &self.config.leds {
                if let Err(e) = self.gpio.set_led(led.name, IoLevel::Low) {
                    error!("Failed to turn off LED {}: {e:#}", led.name);
                }
            }
        }

        if self.registry.get(ComponentId::Serial1).initialized {
            self.port1 = self.open_port(ComponentId::Serial1);
        }
        if self.registry.get(ComponentId::Serial2).initialized {
            self.port2 = self.open_port(ComponentId::Serial2);
        }

        Ok(())
    }

    fn open_port(&self, id: ComponentId) -> Option<Box<dyn SerialLink>> {
        let path = &self.registry.get(id).target;
        match self.opener.open(path, self.config.baud_rate) {
            Ok(port) => Some(port),
            Err(e) => {
                error!("Failed to open serial port {path}: {e:#}");
                None
            }
        }
    }

    /// Fails with `CheckError::ConflictingService` if any configured service
    /// reports SubState `running`. A service holding the hardware under test
    /// would make every result meaningless.
    pub fn verify_no_conflicting_services(&self) -> CheckResult<()> {
        for service in &self.config.conflicting_services {
            if self.service_substate_running(service) {
                return Err(CheckError::ConflictingService(service.clone()));
            }
        }
        info!("All specified services are confirmed to be stopped.");
        Ok(())
    }

    /// Queries the init system for one service's SubState and compares the
    /// whitespace-stripped reply against the literal "running".
    pub fn service_substate_running(&self, service: &str) -> bool {
        let output = match self.runner.run(
            "systemctl",
            &["show", service, "--property=SubState", "--value"],
        ) {
            Ok(output) => output,
            Err(e) => {
                error!("systemctl query for {service} failed: {e:#}");
                return false;
            }
        };
        let substate: String = output.chars().filter(|c| !c.is_whitespace()).collect();
        substate == "running"
    }

    /// Runs the selected check(s) and records outcomes in the registry.
    pub fn run(&mut self, selection: CheckSelection) -> CheckResult<()> {
        match selection {
            CheckSelection::All => {
                self.check_serial(ComponentId::Serial1);
                self.check_serial(ComponentId::Serial2);
                self.check_camera();
                if self.gpio.is_initialized() && !self.gpio.is_test_mode() {
                    self.check_led(LedColor::Red);
                    self.check_led(LedColor::Green);
                    self.check_led(LedColor::Blue);
                    self.check_button();
                }
            }
            CheckSelection::Serial1 => {
                self.check_serial(ComponentId::Serial1);
            }
            CheckSelection::Serial2 => {
                self.check_serial(ComponentId::Serial2);
            }
            CheckSelection::Realsense => {
                self.check_camera();
            }
            CheckSelection::Led(color) => {
                self.check_led(color);
            }
            CheckSelection::MissionButton => {
                self.check_button();
            }
            CheckSelection::Services => self.verify_no_conflicting_services()?,
        }
        Ok(())
    }

    /// Serial presence check: success on the first byte received within the
    /// deadline. Any byte counts.
    pub fn check_serial(&mut self, id: ComponentId) -> bool {
        let path = self.registry.get(id).target.clone();
        info!(
            "Listening for incoming data on {path} (baudrate: {})...",
            self.config.baud_rate
        );

        let timeout = self.config.serial_timeout;
        let interval = self.config.poll_interval;
        let port = match id {
            ComponentId::Serial1 => self.port1.as_deref_mut(),
            ComponentId::Serial2 => self.port2.as_deref_mut(),
            _ => None,
        };

        let passed = match port {
            Some(port) if port.is_open() => {
                let start = Instant::now();
                let mut received = false;
                while start.elapsed() <= timeout {
                    match port.read_byte() {
                        Ok(Some(_)) => {
                            received = true;
                            break;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!("Serial read on {path} failed: {e:#}");
                            break;
                        }
                    }
                    thread::sleep(interval);
                }
                received
            }
            _ => {
                error!("Port is not open");
                false
            }
        };

        self.registry.set_running(id, passed);
        passed
    }

    /// Switch toggle check: snapshots the state at entry and succeeds when
    /// any later poll observes the opposite state.
    pub fn check_button(&mut self) -> bool {
        if !self.gpio.is_initialized() || self.gpio.is_test_mode() {
            self.registry.set_running(ComponentId::Mission, false);
            return false;
        }

        info!(
            "Toggle button: turn it ON and then OFF within {} seconds.",
            self.config.button_timeout.as_secs()
        );

        let name = self.registry.get(ComponentId::Mission).target.clone();
        let passed = match self.gpio.switch_state(&name) {
            Ok(initial) => {
                let start = Instant::now();
                let mut toggled = false;
                while start.elapsed() <= self.config.button_timeout {
                    match self.gpio.switch_state(&name) {
                        Ok(state) if state != initial => {
                            toggled = true;
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Failed to read switch {name}: {e:#}");
                            break;
                        }
                    }
                    thread::sleep(self.config.poll_interval);
                }
                toggled
            }
            Err(e) => {
                error!("Failed to read switch {name}: {e:#}");
                false
            }
        };

        self.registry.set_running(ComponentId::Mission, passed);
        passed
    }

    /// LED check: flashes the LED, forces it off, then asks the operator.
    /// The result is the human answer, not a measurement.
    pub fn check_led(&mut self, color: LedColor) -> bool {
        let id = color.component();
        if !self.gpio.is_initialized() || self.gpio.is_test_mode() {
            self.registry.set_running(id, false);
            return false;
        }

        let name = self.registry.get(id).target.clone();
        info!("Flashing LED");
        for i in 0..self.config.led_flash_count {
            let level = if i % 2 == 0 { IoLevel::High } else { IoLevel::Low };
            if let Err(e) = self.gpio.set_led(&name, level) {
                error!("Failed to drive LED {name}: {e:#}");
            }
            thread::sleep(self.config.led_flash_period);
        }
        if let Err(e) = self.gpio.set_led(&name, IoLevel::Low) {
            error!("Failed to turn off LED {name}: {e:#}");
        }

        let prompt = format!("Is the {name} LED currently flashing?");
        let passed = match self.confirmation.confirm(&prompt) {
            Ok(answer) => answer,
            Err(e) => {
                error!("Confirmation prompt failed: {e:#}");
                false
            }
        };

        self.registry.set_running(id, passed);
        passed
    }

    /// Camera presence check: substring match against USB enumeration output.
    pub fn check_camera(&mut self) -> bool {
        let needle = self.registry.get(ComponentId::Realsense).target.clone();
        let connected = match self.runner.run("lsusb", &[]) {
            Ok(output) => output.contains(&needle),
            Err(e) => {
                error!("\"lsusb\" command failed to execute: {e:#}");
                false
            }
        };
        self.registry.set_running(ComponentId::Realsense, connected);
        connected
    }

    /// Renders the final pass/fail table.
    pub fn render_report(&self) -> String {
        report::render(&self.registry)
    }
}

fn serial_port_available(path: &str) -> bool {
    if Path::new(path).exists() {
        true
    } else {
        error!("Serial port {path} does not exist.");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{
        MockCommandRunner, MockGpio, MockSerialOpener, ScriptedConfirmation,
    };

    fn checker_with_runner(runner: MockCommandRunner) -> ComponentHealthChecker {
        ComponentHealthChecker::new(
            CheckConfig::default(),
            Arc::new(MockGpio::uninitialized()),
            Arc::new(runner),
            Arc::new(ScriptedConfirmation::answering(true)),
            Arc::new(MockSerialOpener::empty()),
        )
    }

    #[test]
    fn service_substate_requires_exact_running() {
        let runner = MockCommandRunner::new("")
            .with_substate("a.service", "running\n")
            .with_substate("b.service", "dead\n")
            .with_substate("c.service", "failed")
            .with_substate("d.service", "")
            .with_substate("e.service", "  run ning  ")
            .with_substate("f.service", " running ");
        let checker = checker_with_runner(runner);

        assert!(checker.service_substate_running("a.service"));
        assert!(!checker.service_substate_running("b.service"));
        assert!(!checker.service_substate_running("c.service"));
        assert!(!checker.service_substate_running("d.service"));
        assert!(!checker.service_substate_running("e.service"));
        // Whitespace collapses, so a padded "running" still matches.
        assert!(checker.service_substate_running("f.service"));
    }

    #[test]
    fn service_query_failure_reads_as_not_running() {
        let checker = checker_with_runner(MockCommandRunner::failing());
        assert!(!checker.service_substate_running("any.service"));
    }

    #[test]
    fn conflicting_service_aborts_the_gate() {
        let runner = MockCommandRunner::new("").with_substate("commander.service", "running\n");
        let mut checker = checker_with_runner(runner);
        match checker.initialize() {
            Err(CheckError::ConflictingService(name)) => {
                assert_eq!(name, "commander.service");
            }
            other => panic!("expected ConflictingService, got {other:?}"),
        }
    }

    #[test]
    fn camera_check_matches_substring_anywhere() {
        let output = "Bus 002 Device 003: ID 8086:0b3a Intel Corp. \
                      RealSense(TM) Depth Module D430i\n";
        let mut checker = checker_with_runner(MockCommandRunner::new(output));
        assert!(checker.check_camera());
        assert!(checker.registry().get(ComponentId::Realsense).running);

        let mut checker =
            checker_with_runner(MockCommandRunner::new("Bus 001 Device 001: ID 1d6b:0002\n"));
        assert!(!checker.check_camera());
    }

    #[test]
    fn camera_check_fails_when_command_fails() {
        let mut checker = checker_with_runner(MockCommandRunner::failing());
        assert!(!checker.check_camera());
    }
}
