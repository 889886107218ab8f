//! Cryptographic engine boundary.
//!
//! Signature normalization, DER conversion and explicit amount encoding are
//! delegated to a [`CryptoEngine`]. Every call acquires an [`EngineHandle`]
//! for the duration of one operation; the handle is released by `Drop`, so it
//! is returned on success and failure alike.

pub mod secp;

pub use secp::Secp256k1Engine;

use crate::{CtError, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine status code for a rejected argument.
pub const ENGINE_ILLEGAL_ARGUMENT: i32 = 1;
/// Engine status code for a value outside its permitted range.
pub const ENGINE_OUT_OF_RANGE: i32 = 3;

/// Opaque failure reported by an engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("engine failure {code}: {message}")]
pub struct EngineFailure {
    pub code: i32,
    pub message: String,
}

impl EngineFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ENGINE_ILLEGAL_ARGUMENT, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ENGINE_OUT_OF_RANGE, message)
    }
}

impl From<EngineFailure> for CtError {
    fn from(failure: EngineFailure) -> Self {
        CtError::engine(failure.code, &failure.message)
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineFailure>;

/// Raw signature recovered from a DER encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSignature {
    pub signature_hex: String,
    pub sighash_code: u8,
    pub anyone_can_pay: bool,
}

/// Operations available while a handle is held.
pub trait EngineHandle {
    /// Force the signature into its canonical (low-S) form.
    fn normalize_signature_hex(&self, signature_hex: &str) -> EngineResult<String>;

    /// DER encode a signature and append the sighash byte.
    fn encode_der_hex(
        &self,
        signature_hex: &str,
        sighash_code: u8,
        anyone_can_pay: bool,
    ) -> EngineResult<String>;

    fn decode_der_hex(&self, der_hex: &str) -> EngineResult<DecodedSignature>;

    /// Serialize a plain amount as an explicit confidential value.
    fn amount_to_hex(&self, satoshi: i64, ignore_version_info: bool) -> EngineResult<String>;
}

/// A cryptographic backend that hands out scoped handles.
pub trait CryptoEngine: Send + Sync {
    /// Acquire a handle. Dropping the returned box releases it.
    fn acquire(&self) -> EngineResult<Box<dyn EngineHandle + '_>>;
}

/// Run one engine operation inside a freshly acquired handle.
pub(crate) fn with_handle<E, T, F>(engine: &E, operation: &str, f: F) -> Result<T>
where
    E: CryptoEngine + ?Sized,
    F: FnOnce(&dyn EngineHandle) -> EngineResult<T>,
{
    let handle = engine.acquire().map_err(|failure| {
        log::warn!("{}: failed to acquire engine handle: {}", operation, failure);
        CtError::from(failure).with_operation(operation)
    })?;

    log::debug!("{}: calling engine", operation);
    let outcome = f(handle.as_ref());
    drop(handle);

    outcome.map_err(|failure| {
        log::warn!("{}: {}", operation, failure);
        CtError::from(failure).with_operation(operation)
    })
}
