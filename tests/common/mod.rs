#![allow(dead_code)]

use liquid_ct::engine::{CryptoEngine, DecodedSignature, EngineFailure, EngineHandle, EngineResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic stand-in for a real engine.
///
/// "DER" here is `30 || signature || sighash byte`, which is enough to
/// exercise every code path of the core without real curve math.
#[derive(Default)]
pub struct FakeEngine {
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_with: Option<EngineFailure>,
    fail_acquire: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails with `failure`.
    pub fn failing(failure: EngineFailure) -> Self {
        Self {
            fail_with: Some(failure),
            ..Self::default()
        }
    }

    /// Handles cannot be acquired at all.
    pub fn unavailable() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn check(&self) -> EngineResult<()> {
        match &self.fail_with {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

impl CryptoEngine for FakeEngine {
    fn acquire(&self) -> EngineResult<Box<dyn EngineHandle + '_>> {
        if self.fail_acquire {
            return Err(EngineFailure::new(-3, "no handle available"));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeHandle { engine: self }))
    }
}

struct FakeHandle<'a> {
    engine: &'a FakeEngine,
}

impl Drop for FakeHandle<'_> {
    fn drop(&mut self) {
        self.engine.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl EngineHandle for FakeHandle<'_> {
    fn normalize_signature_hex(&self, signature_hex: &str) -> EngineResult<String> {
        self.engine.check()?;
        Ok(signature_hex.to_lowercase())
    }

    fn encode_der_hex(
        &self,
        signature_hex: &str,
        sighash_code: u8,
        anyone_can_pay: bool,
    ) -> EngineResult<String> {
        self.engine.check()?;
        let byte = sighash_code | if anyone_can_pay { 0x80 } else { 0 };
        Ok(format!("30{}{:02x}", signature_hex, byte))
    }

    fn decode_der_hex(&self, der_hex: &str) -> EngineResult<DecodedSignature> {
        self.engine.check()?;
        if der_hex.len() < 4 || !der_hex.starts_with("30") {
            return Err(EngineFailure::illegal_argument("not a fake DER signature"));
        }
        let (body, sighash) = der_hex[2..].split_at(der_hex.len() - 4);
        let byte = u8::from_str_radix(sighash, 16)
            .map_err(|_| EngineFailure::illegal_argument("bad sighash byte"))?;
        Ok(DecodedSignature {
            signature_hex: body.to_string(),
            sighash_code: byte & 0x1f,
            anyone_can_pay: byte & 0x80 != 0,
        })
    }

    fn amount_to_hex(&self, satoshi: i64, ignore_version_info: bool) -> EngineResult<String> {
        self.engine.check()?;
        let body = format!("{:016x}", satoshi as u64);
        if ignore_version_info {
            Ok(body)
        } else {
            Ok(format!("01{}", body))
        }
    }
}

/// A 64-byte compact signature with recognisable content.
pub fn sample_signature() -> Vec<u8> {
    (1..=64).map(|i| i as u8).collect()
}
