#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core telemetry pipeline (hardware-agnostic).
//!
//! This crate converts raw sensor signals into physical units, folds them
//! into windowed cumulative totals, applies threshold alarms, and hands the
//! resulting metric vector to an upload collaborator. All hardware and
//! network interactions go through the `meterlink_traits` seams.
//!
//! ## Architecture
//!
//! - **Signal**: ACS712 raw-count → volts/amps transfer (`signal` module)
//! - **Pulse**: interrupt-safe flow edge counting (`pulse` module)
//! - **Windows**: fixed-length accumulation windows (`window` module)
//! - **Aggregation**: per-tick rates and monotonic totals (`aggregate`)
//! - **Alarms**: boundary-inclusive threshold checks (`alarm` module)
//! - **Reporting**: ordered metric vector to the uplink (`report` module)
//! - **Link**: bounded-retry connectivity state machine (`link` module)
//! - **Node**: the 1 Hz driver loop tying it together (`node` module)

pub mod aggregate;
pub mod alarm;
pub mod config;
pub mod conversions;
pub mod error;
pub mod link;
pub mod mocks;
pub mod node;
pub mod pulse;
pub mod report;
pub mod signal;
pub mod window;

pub use aggregate::{TickMetrics, UsageAggregator};
pub use alarm::{AlarmEvaluator, AlarmReport, is_over};
pub use config::{AlarmCfg, FlowCfg, LinkCfg, NodeConfig, SenseCfg, TimingCfg};
pub use error::{BuildError, Result, TelemetryError};
pub use link::{LinkState, LinkSupervisor};
pub use node::{BoxedNode, NodeBuilder, TelemetryNode, TickReport};
pub use pulse::{EdgePump, PulseCounter};
pub use report::TelemetryReporter;
pub use signal::{CalibratedSignal, CurrentSense};
pub use window::UsageWindow;
