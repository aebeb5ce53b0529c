pub mod logging;

#[cfg(target_arch = "wasm32")]
pub use logging::ConsoleLogger;
pub use logging::{StdoutLogger, default_max_level, format_record, init_logger};

// Re-export log crate so downstream crates can use glimpse_base::log::*
pub use log;
