//! CLI entry point for hwcheck.
//!
//! Runs the prerequisite gate, the selected check(s), and prints the
//! pass/fail table. One optional selector flag picks a single check;
//! without one the full battery runs. `--services` only verifies that
//! conflicting services are stopped and prints no report.
//!
//! Exit code is 0 on normal completion and non-zero when the gate finds a
//! conflicting service running.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use log::warn;

use hwcheck::checker::LedColor;
use hwcheck::hardware::{ConsoleConfirmation, Gpio, SystemCommandRunner};
use hwcheck::hardware::system::SystemSerialOpener;
use hwcheck::{CheckConfig, CheckSelection, ComponentHealthChecker};

#[derive(Parser, Default)]
#[command(name = "hwcheck")]
#[command(about = "Hardware self-test for the companion computer", long_about = None)]
struct Cli {
    /// Run the full check battery (default)
    #[arg(long)]
    all: bool,

    /// Check the flight-controller serial link only
    #[arg(long)]
    serial1: bool,

    /// Check the kill-switch board serial link only
    #[arg(long)]
    serial2: bool,

    /// Check depth-camera USB presence only
    #[arg(long)]
    realsense: bool,

    /// Flash one LED and ask for visual confirmation
    #[arg(long, value_enum)]
    led: Option<LedArg>,

    /// Watch for a toggle of the named switch
    #[arg(long, value_enum)]
    button: Option<ButtonArg>,

    /// Only verify that conflicting services are stopped
    #[arg(long)]
    services: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum LedArg {
    Red,
    Green,
    Blue,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum ButtonArg {
    Mission,
}

impl Cli {
    fn selection(&self) -> CheckSelection {
        if self.all {
            CheckSelection::All
        } else if self.services {
            CheckSelection::Services
        } else if self.serial1 {
            CheckSelection::Serial1
        } else if self.serial2 {
            CheckSelection::Serial2
        } else if self.realsense {
            CheckSelection::Realsense
        } else if let Some(led) = self.led {
            CheckSelection::Led(match led {
                LedArg::Red => LedColor::Red,
                LedArg::Green => LedColor::Green,
                LedArg::Blue => LedColor::Blue,
            })
        } else if self.button.is_some() {
            CheckSelection::MissionButton
        } else {
            CheckSelection::All
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit();
        }
        Err(e) => {
            let _ = e.print();
            warn!("Unrecognized arguments; running the full check battery.");
            Cli::default()
        }
    };
    let selection = cli.selection();

    let gpio = open_gpio();
    let mut checker = ComponentHealthChecker::new(
        CheckConfig::default(),
        gpio,
        Arc::new(SystemCommandRunner),
        Arc::new(ConsoleConfirmation),
        Arc::new(SystemSerialOpener),
    );

    if selection == CheckSelection::Services {
        checker.verify_no_conflicting_services()?;
        return Ok(());
    }

    checker.initialize()?;
    checker.run(selection)?;
    print!("{}", checker.render_report());
    Ok(())
}

#[cfg(feature = "gpio_rpi")]
fn open_gpio() -> Arc<dyn Gpio> {
    Arc::from(hwcheck::hardware::gpio_rpi::RpiGpio::probe())
}

#[cfg(not(feature = "gpio_rpi"))]
fn open_gpio() -> Arc<dyn Gpio> {
    Arc::new(hwcheck::hardware::NullGpio)
}
