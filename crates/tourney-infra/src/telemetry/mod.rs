//! Tracing initialization
//!
//! Installs the global subscriber: `RUST_LOG` style filtering, human readable
//! output in development and JSON lines in production.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry};
