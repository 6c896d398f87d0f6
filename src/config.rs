//! Compiled-in deployment configuration.
//!
//! There is deliberately no config file: the component table is fixed per
//! deployment and ships with the binary. `CheckConfig` still exists as a
//! struct (rather than scattered constants) because the two things that vary
//! between deployments — the conflicting-service list and the exact device
//! paths — live here, and because tests shrink the timeouts to keep the
//! polling-deadline assertions fast.

use std::time::Duration;

/// A named GPIO line and its BCM pin number.
#[derive(Debug, Clone)]
pub struct PinAssignment {
    pub name: &'static str,
    pub pin: u8,
}

/// Deployment configuration for the self-test run.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Services that must NOT be running while hardware is under test.
    pub conflicting_services: Vec<String>,
    /// Device path for the first serial link (flight-controller agent).
    pub serial1_path: String,
    /// Device path for the second serial link (kill-switch board).
    pub serial2_path: String,
    /// Baud rate used when opening serial links.
    pub baud_rate: u32,
    /// Substring identifying the depth camera in USB enumeration output.
    pub camera_match: String,
    /// Switches registered with the GPIO subsystem during the gate phase.
    pub switches: Vec<PinAssignment>,
    /// LEDs registered with the GPIO subsystem during the gate phase.
    pub leds: Vec<PinAssignment>,
    /// Deadline for the serial presence check.
    pub serial_timeout: Duration,
    /// Deadline for the switch toggle check.
    pub button_timeout: Duration,
    /// Sampling interval inside polling loops.
    pub poll_interval: Duration,
    /// Interval between LED level transitions during the flash sequence.
    pub led_flash_period: Duration,
    /// Number of LED level transitions in the flash sequence.
    pub led_flash_count: u32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            conflicting_services: vec![
                "microxrceagent.service".into(),
                "commander.service".into(),
                "cam_recorder.service".into(),
            ],
            serial1_path: "/dev/ttyAMA0".into(),
            serial2_path: "/dev/ttyAMA1".into(),
            baud_rate: 115_200,
            camera_match: "RealSense(TM) Depth Module".into(),
            switches: vec![
                PinAssignment { name: "mission", pin: 17 },
                PinAssignment { name: "kamikaze", pin: 27 },
            ],
            leds: vec![
                PinAssignment { name: "red", pin: 22 },
                PinAssignment { name: "green", pin: 23 },
                PinAssignment { name: "blue", pin: 18 },
            ],
            serial_timeout: Duration::from_secs(10),
            button_timeout: Duration::from_secs(7),
            poll_interval: Duration::from_millis(10),
            led_flash_period: Duration::from_millis(250),
            led_flash_count: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_list_includes_cam_recorder() {
        let config = CheckConfig::default();
        assert_eq!(config.conflicting_services.len(), 3);
        assert!(config
            .conflicting_services
            .iter()
            .any(|s| s == "cam_recorder.service"));
    }

    #[test]
    fn default_timeouts_match_deployment_values() {
        let config = CheckConfig::default();
        assert_eq!(config.serial_timeout, Duration::from_secs(10));
        assert_eq!(config.button_timeout, Duration::from_secs(7));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.led_flash_count, 5);
    }
}
