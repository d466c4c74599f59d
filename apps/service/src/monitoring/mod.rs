/// Monitoring engine module - turns probes into transition records
///
/// This module is responsible for:
/// - Probing the configured endpoint (`checker`)
/// - Detecting healthy/failing transitions (`detector`)
/// - Driving both forever on a fixed cadence (`scheduler`)
/// - Validating probe settings (`validation`)
pub mod checker;
pub mod detector;
pub mod scheduler;
pub mod types;
pub mod validation;

pub use checker::{HttpProber, Prober};
pub use detector::TransitionDetector;
pub use scheduler::{MonitorLoop, initial_detector};
pub use types::{ConnectivityState, Outcome};
