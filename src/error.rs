//! Unified error handling for the horizon engine.
//!
//! Geometry operations never fail (degenerate inputs degrade to sentinel
//! positions or silence), so errors only exist at the API boundary: posting
//! work to a monitor whose task has ended, or constructing a monitor from an
//! unusable configuration.

use thiserror::Error;

/// Result type alias using [`HorizonError`].
pub type Result<T> = std::result::Result<T, HorizonError>;

/// Errors surfaced by the horizon monitoring API.
#[derive(Debug, Error)]
pub enum HorizonError {
    /// The background monitor task is no longer running, so commands can no
    /// longer be delivered.
    #[error("horizon monitor task is no longer running")]
    MonitorStopped,

    /// The supplied configuration cannot drive a monitoring session.
    #[error("invalid horizon configuration: {reason}")]
    InvalidConfig { reason: String },
}
