//! Process-wide `tracing` setup shared by the netpinger binaries.

mod subscriber;

pub use subscriber::{Format, Profile, init_tracing};
