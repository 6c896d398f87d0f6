//! # hwcheck
//!
//! Hardware self-test library for a drone companion computer. It probes the
//! serial links, the depth camera, the status LEDs, the mission switch, and a
//! set of systemd services, then renders a pass/fail table.
//!
//! ## Crate Structure
//!
//! - **`checker`**: The `ComponentHealthChecker` orchestrator. Runs the
//!   prerequisite gate once, executes the selected checks, and records
//!   outcomes in the registry.
//! - **`config`**: Compiled-in deployment configuration (`CheckConfig`):
//!   conflicting-service list, device paths, pin assignments, timeouts.
//! - **`error`**: The `CheckError` enum and `CheckResult` alias.
//! - **`hardware`**: Capability traits at the hardware seams (`Gpio`,
//!   `SerialLink`, `CommandRunner`, `ConfirmationProvider`) plus production
//!   and mock implementations. All hardware access in the checker goes
//!   through these traits so the whole suite runs against mocks.
//! - **`registry`**: The closed set of testable components and their
//!   `initialized`/`running` flags.
//! - **`report`**: Renders the registry as a bordered pass/fail table.

pub mod checker;
pub mod config;
pub mod error;
pub mod hardware;
pub mod registry;
pub mod report;

pub use checker::{CheckSelection, ComponentHealthChecker};
pub use config::CheckConfig;
pub use error::{CheckError, CheckResult};
