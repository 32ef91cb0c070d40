//! Error types
//!
//! The simulation itself never fails; degenerate geometry and runaway frame
//! times are handled in place. Only loading tuning data can go wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed tuning data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}
