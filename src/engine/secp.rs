//! Engine implementation backed by libsecp256k1.

use super::{CryptoEngine, DecodedSignature, EngineFailure, EngineHandle, EngineResult};
use secp256k1::ecdsa::Signature;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Largest amount an explicit value may carry (21M BTC in satoshis).
pub const MAX_MONEY: i64 = 21_000_000 * 100_000_000;

/// Version prefix of an explicit (unblinded) confidential value.
pub const EXPLICIT_VALUE_PREFIX: u8 = 0x01;

const SIGHASH_ANYONECANPAY: u8 = 0x80;
const SIGHASH_BASE_MASK: u8 = 0x03;
// bits that no DER-appended sighash byte may carry
const SIGHASH_UNDEFINED_BITS: u8 = !(SIGHASH_ANYONECANPAY | SIGHASH_BASE_MASK);

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Force low-S before DER encoding
    pub normalize_before_der: bool,
    /// Reject non-canonical DER when decoding
    pub strict_der: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            normalize_before_der: false,
            strict_der: true,
        }
    }
}

/// ECDSA engine over secp256k1 compact (r || s) signatures.
#[derive(Debug, Default)]
pub struct Secp256k1Engine {
    config: EngineConfig,
    open: AtomicUsize,
}

impl Secp256k1Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            open: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of handles currently held.
    pub fn open_handles(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl CryptoEngine for Secp256k1Engine {
    fn acquire(&self) -> EngineResult<Box<dyn EngineHandle + '_>> {
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        log::trace!("secp256k1 engine handle acquired ({} open)", open);
        Ok(Box::new(SecpHandle { engine: self }))
    }
}

struct SecpHandle<'a> {
    engine: &'a Secp256k1Engine,
}

impl Drop for SecpHandle<'_> {
    fn drop(&mut self) {
        let open = self.engine.open.fetch_sub(1, Ordering::SeqCst) - 1;
        log::trace!("secp256k1 engine handle released ({} open)", open);
    }
}

fn parse_compact(signature_hex: &str) -> EngineResult<Signature> {
    let bytes = hex::decode(signature_hex)
        .map_err(|e| EngineFailure::illegal_argument(format!("Invalid signature hex: {}", e)))?;
    if bytes.len() != 64 {
        return Err(EngineFailure::illegal_argument(format!(
            "Invalid signature size: {} bytes, expected 64",
            bytes.len()
        )));
    }
    Signature::from_compact(&bytes)
        .map_err(|e| EngineFailure::illegal_argument(format!("Invalid signature: {}", e)))
}

impl EngineHandle for SecpHandle<'_> {
    fn normalize_signature_hex(&self, signature_hex: &str) -> EngineResult<String> {
        let mut signature = parse_compact(signature_hex)?;
        signature.normalize_s();
        Ok(hex::encode(signature.serialize_compact()))
    }

    fn encode_der_hex(
        &self,
        signature_hex: &str,
        sighash_code: u8,
        anyone_can_pay: bool,
    ) -> EngineResult<String> {
        if sighash_code == 0 || sighash_code > 0x03 {
            return Err(EngineFailure::illegal_argument(format!(
                "Sighash type {:#04x} has no DER form",
                sighash_code
            )));
        }

        let mut signature = parse_compact(signature_hex)?;
        if self.engine.config.normalize_before_der {
            signature.normalize_s();
        }

        let mut der = signature.serialize_der().to_vec();
        let flag = if anyone_can_pay { SIGHASH_ANYONECANPAY } else { 0 };
        der.push(sighash_code | flag);
        Ok(hex::encode(der))
    }

    fn decode_der_hex(&self, der_hex: &str) -> EngineResult<DecodedSignature> {
        let bytes = hex::decode(der_hex)
            .map_err(|e| EngineFailure::illegal_argument(format!("Invalid DER hex: {}", e)))?;
        let (sighash_byte, der) = bytes
            .split_last()
            .ok_or_else(|| EngineFailure::illegal_argument("Empty DER signature"))?;

        let sighash_code = sighash_byte & SIGHASH_BASE_MASK;
        if sighash_byte & SIGHASH_UNDEFINED_BITS != 0 || sighash_code == 0 {
            return Err(EngineFailure::illegal_argument(format!(
                "Unknown sighash byte {:#04x}",
                sighash_byte
            )));
        }

        let signature = if self.engine.config.strict_der {
            Signature::from_der(der)
        } else {
            Signature::from_der_lax(der)
        }
        .map_err(|e| EngineFailure::illegal_argument(format!("Failed to decode DER signature: {}", e)))?;

        Ok(DecodedSignature {
            signature_hex: hex::encode(signature.serialize_compact()),
            sighash_code,
            anyone_can_pay: sighash_byte & SIGHASH_ANYONECANPAY != 0,
        })
    }

    fn amount_to_hex(&self, satoshi: i64, ignore_version_info: bool) -> EngineResult<String> {
        if !(0..=MAX_MONEY).contains(&satoshi) {
            return Err(EngineFailure::out_of_range(format!(
                "Amount {} is outside 0..={}",
                satoshi, MAX_MONEY
            )));
        }

        let mut bytes = Vec::with_capacity(9);
        if !ignore_version_info {
            bytes.push(EXPLICIT_VALUE_PREFIX);
        }
        bytes.extend_from_slice(&(satoshi as u64).to_be_bytes());
        Ok(hex::encode(bytes))
    }
}
