//! # liquid-ct
//!
//! Confidential transaction primitives for Liquid and other Elements-based
//! networks.
//!
//! - [`AssetId`]: a plain 32-byte asset tag or a 33-byte blinded asset
//!   commitment, with the byte-order rules of the wire format.
//! - [`ConfidentialAmount`]: an explicit satoshi amount, a 33-byte blinded
//!   value commitment, or a 9-byte explicit value.
//! - [`SignatureParameter`]: a signature plus sighash type, DER state and the
//!   public key it belongs to.
//!
//! Signature normalization, DER conversion and explicit amount encoding are
//! performed by a [`CryptoEngine`](engine::CryptoEngine). The crate ships
//! [`Secp256k1Engine`](engine::Secp256k1Engine); any other implementation can
//! be passed in its place.
//!
//! ```rust
//! use liquid_ct::engine::Secp256k1Engine;
//! use liquid_ct::{AssetId, ConfidentialAmount};
//!
//! let engine = Secp256k1Engine::new();
//!
//! let asset = AssetId::from_hex(&"aa".repeat(32)).unwrap();
//! assert!(!asset.has_blinding());
//!
//! let amount = ConfidentialAmount::from_satoshi(100_000);
//! assert_eq!(amount.to_hex(&engine).unwrap(), "0100000000000186a0");
//! ```
//!
//! ## Error Handling
//!
//! All fallible APIs return [`Result<T, CtError>`](error::CtError). Errors
//! are raised at the point of detection and never retried internally.

pub mod engine;
pub mod error;
pub mod primitives;
pub mod signature;
pub mod types;
pub mod utils;

pub use error::{CtError, CtErrorCode, ErrorContext, Result};
pub use primitives::{AssetId, ByteData, ConfidentialAmount};
pub use signature::{SigHashType, SignatureHashType, SignatureParameter};
pub use types::CtConfig;

use engine::Secp256k1Engine;
use std::path::Path;
use utils::config::{ConfigManager, ENV_PREFIX};

/// Initializes logging and returns an engine built from `config`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init(config: &CtConfig) -> Secp256k1Engine {
    // It's ok if this fails, it just means logging was already initialized.
    let _ = utils::logging::init_logging(&config.logging);

    log::info!("liquid-ct initialized with config: {:?}", config);
    Secp256k1Engine::with_config(config.engine)
}

/// Loads `core.json` from `config_dir` (with `LIQUID_CT_CORE_*` environment
/// overrides) and initializes from it.
pub fn init_from_dir(config_dir: &Path) -> Result<Secp256k1Engine> {
    let manager = ConfigManager::new(config_dir.to_path_buf(), ENV_PREFIX);
    let config: CtConfig = manager.load_config("core")?;
    Ok(init(&config))
}
