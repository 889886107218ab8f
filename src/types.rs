use serde::{Deserialize, Serialize};

pub use crate::engine::secp::EngineConfig;
pub use crate::utils::logging::{LogLevel, LoggingConfig};

/// Top-level configuration, loadable from JSON.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CtConfig {
    /// Log output settings
    pub logging: LoggingConfig,
    /// Settings for the bundled secp256k1 engine
    pub engine: EngineConfig,
}
