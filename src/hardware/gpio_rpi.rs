//! Raspberry Pi GPIO backend using the rppal crate.
//!
//! Built only with the `gpio_rpi` feature. Lines are claimed lazily as the
//! gate phase registers them; switches are inputs with pull-down (a closed
//! switch pulls the line high).

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use rppal::gpio::{InputPin, OutputPin};

use super::{Gpio, IoLevel, NullGpio};

pub struct RpiGpio {
    chip: rppal::gpio::Gpio,
    test_mode: AtomicBool,
    switches: Mutex<HashMap<String, InputPin>>,
    leds: Mutex<HashMap<String, OutputPin>>,
}

impl RpiGpio {
    pub fn new() -> Result<Self> {
        let chip = rppal::gpio::Gpio::new().context("failed to open GPIO chip")?;
        Ok(Self {
            chip,
            test_mode: AtomicBool::new(false),
            switches: Mutex::new(HashMap::new()),
            leds: Mutex::new(HashMap::new()),
        })
    }

    /// Opens the on-board GPIO if present, falling back to a handle that
    /// reports uninitialized. Lets the same binary run on hosts without the
    /// Pi header.
    pub fn probe() -> Box<dyn Gpio> {
        match Self::new() {
            Ok(gpio) => Box::new(gpio),
            Err(e) => {
                log::warn!("GPIO unavailable: {e:#}");
                Box::new(NullGpio)
            }
        }
    }

    fn poisoned() -> anyhow::Error {
        anyhow!("GPIO line table poisoned")
    }
}

impl Gpio for RpiGpio {
    fn is_initialized(&self) -> bool {
        true
    }

    fn is_test_mode(&self) -> bool {
        self.test_mode.load(Ordering::Relaxed)
    }

    fn set_test_mode(&self, enabled: bool) {
        self.test_mode.store(enabled, Ordering::Relaxed);
    }

    fn add_switch(&self, name: &str, pin: u8) -> Result<()> {
        let line = self
            .chip
            .get(pin)
            .with_context(|| format!("failed to claim pin {pin} for switch {name}"))?
            .into_input_pulldown();
        self.switches
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(name.to_owned(), line);
        Ok(())
    }

    fn add_led(&self, name: &str, pin: u8) -> Result<()> {
        let line = self
            .chip
            .get(pin)
            .with_context(|| format!("failed to claim pin {pin} for LED {name}"))?
            .into_output();
        self.leds
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(name.to_owned(), line);
        Ok(())
    }

    fn set_led(&self, name: &str, level: IoLevel) -> Result<()> {
        let mut leds = self.leds.lock().map_err(|_| Self::poisoned())?;
        let led = leds
            .get_mut(name)
            .ok_or_else(|| anyhow!("LED {name} is not registered"))?;
        match level {
            IoLevel::High => led.set_high(),
            IoLevel::Low => led.set_low(),
        }
        Ok(())
    }

    fn switch_state(&self, name: &str) -> Result<bool> {
        let switches = self.switches.lock().map_err(|_| Self::poisoned())?;
        let switch = switches
            .get(name)
            .ok_or_else(|| anyhow!("switch {name} is not registered"))?;
        Ok(switch.is_high())
    }
}
