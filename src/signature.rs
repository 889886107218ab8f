//! Signature parameters: a signature together with its sighash type, DER
//! state and the public key it verifies against.

use crate::engine::{with_handle, CryptoEngine};
use crate::primitives::ByteData;
use crate::{CtError, Result};
use secp256k1::PublicKey;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Base signature hash types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigHashType {
    /// Taproot default, signs everything; has no DER form
    Default = 0x00,
    /// Sign all inputs and outputs
    All = 0x01,
    /// Sign all inputs, no outputs
    None = 0x02,
    /// Sign all inputs, only the output with the same index
    Single = 0x03,
}

impl Default for SigHashType {
    fn default() -> Self {
        SigHashType::All
    }
}

impl SigHashType {
    /// Get the byte value of the signature hash type
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(SigHashType::Default),
            0x01 => Some(SigHashType::All),
            0x02 => Some(SigHashType::None),
            0x03 => Some(SigHashType::Single),
            _ => None,
        }
    }
}

/// A sighash type plus the ANYONECANPAY modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureHashType {
    pub sighash_type: SigHashType,
    pub anyone_can_pay: bool,
}

impl SignatureHashType {
    pub fn new(sighash_type: SigHashType, anyone_can_pay: bool) -> Self {
        Self {
            sighash_type,
            anyone_can_pay,
        }
    }

    /// SIGHASH_ALL without ANYONECANPAY
    pub fn all() -> Self {
        Self::default()
    }

    /// Build from a base code and flag as reported by an engine.
    pub fn from_parts(code: u8, anyone_can_pay: bool) -> Result<Self> {
        let sighash_type = SigHashType::from_u8(code).ok_or_else(|| {
            CtError::invalid_argument("Unknown sighash type")
                .with_context("sighash_code", &code.to_string())
        })?;
        Ok(Self::new(sighash_type, anyone_can_pay))
    }

    /// Split a serialized sighash byte.
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::from_parts(byte & !SIGHASH_ANYONECANPAY, byte & SIGHASH_ANYONECANPAY != 0)
    }

    /// Serialized sighash byte
    pub fn to_byte(self) -> u8 {
        let flag = if self.anyone_can_pay { SIGHASH_ANYONECANPAY } else { 0 };
        self.sighash_type.as_u8() | flag
    }
}

/// A signature as it moves through a signing workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureParameter {
    data: Vec<u8>,
    der_encoded: bool,
    sighash_type: SignatureHashType,
    related_pubkey: Option<PublicKey>,
}

impl SignatureParameter {
    /// Normalize a signature to low-S form.
    pub fn normalize_signature<E: CryptoEngine + ?Sized>(
        engine: &E,
        signature: &ByteData,
    ) -> Result<ByteData> {
        let signature_hex = signature.to_hex();
        let normalized = with_handle(engine, "SignatureParameter::normalize_signature", |handle| {
            handle.normalize_signature_hex(&signature_hex)
        })?;
        ByteData::from_hex(&normalized)
    }

    /// DER encode a signature and append its sighash byte.
    pub fn encode_to_der<E: CryptoEngine + ?Sized>(
        engine: &E,
        signature: &ByteData,
        sighash_type: SignatureHashType,
    ) -> Result<ByteData> {
        let signature_hex = signature.to_hex();
        let der = with_handle(engine, "SignatureParameter::encode_to_der", |handle| {
            handle.encode_der_hex(
                &signature_hex,
                sighash_type.sighash_type.as_u8(),
                sighash_type.anyone_can_pay,
            )
        })?;
        ByteData::from_hex(&der)
    }

    /// Decode a DER signature with trailing sighash byte.
    ///
    /// The result is flagged as DER encoded and carries the recovered
    /// sighash type.
    pub fn decode_from_der<E: CryptoEngine + ?Sized>(
        engine: &E,
        der_signature: &ByteData,
    ) -> Result<SignatureParameter> {
        let der_hex = der_signature.to_hex();
        let decoded = with_handle(engine, "SignatureParameter::decode_from_der", |handle| {
            handle.decode_der_hex(&der_hex)
        })?;

        let sighash_type = SignatureHashType::from_parts(decoded.sighash_code, decoded.anyone_can_pay)?;
        let mut parameter = SignatureParameter::from_hex(&decoded.signature_hex)?;
        parameter.set_der_encode(sighash_type);
        Ok(parameter)
    }

    pub fn from_hex(data: &str) -> Result<Self> {
        Ok(Self::from_bytes(&hex::decode(data)?))
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        SignatureParameter {
            data: data.to_vec(),
            ..Default::default()
        }
    }

    /// DER encode using the stored sighash type. Requires the DER flag.
    pub fn to_der_encode<E: CryptoEngine + ?Sized>(&self, engine: &E) -> Result<ByteData> {
        if !self.der_encoded {
            return Err(CtError::illegal_state("Failed to unset der encode flag.")
                .with_operation("SignatureParameter::to_der_encode"));
        }
        self.to_der_encode_with(engine, self.sighash_type)
    }

    /// DER encode using an explicit sighash type, regardless of the flag.
    pub fn to_der_encode_with<E: CryptoEngine + ?Sized>(
        &self,
        engine: &E,
        sighash_type: SignatureHashType,
    ) -> Result<ByteData> {
        Self::encode_to_der(engine, &self.as_byte_data(), sighash_type)
    }

    /// Mark the signature as DER encoded under `sighash_type`.
    pub fn set_der_encode(&mut self, sighash_type: SignatureHashType) {
        self.set_signature_hash_type(sighash_type);
        self.der_encoded = true;
    }

    pub fn set_signature_hash_type(&mut self, sighash_type: SignatureHashType) {
        self.sighash_type = sighash_type;
    }

    pub fn set_related_pubkey(&mut self, pubkey: PublicKey) {
        self.related_pubkey = Some(pubkey);
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.data)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn as_byte_data(&self) -> ByteData {
        ByteData::from(self.data.as_slice())
    }

    pub fn is_der_encode(&self) -> bool {
        self.der_encoded
    }

    pub fn signature_hash_type(&self) -> SignatureHashType {
        self.sighash_type
    }

    pub fn related_pubkey(&self) -> Option<&PublicKey> {
        self.related_pubkey.as_ref()
    }
}

impl TryFrom<Option<String>> for SignatureParameter {
    type Error = CtError;

    /// An absent signature is rejected as an invalid argument.
    fn try_from(data: Option<String>) -> Result<Self> {
        match data {
            None => Err(CtError::invalid_argument("Signature data is null.")
                .with_operation("SignatureParameter::try_from")),
            Some(text) => SignatureParameter::from_hex(&text),
        }
    }
}

impl fmt::Display for SignatureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for SignatureParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            data: String,
            sighash_type: SignatureHashType,
            der_encoded: bool,
            related_pubkey: Option<&'a PublicKey>,
        }

        Repr {
            data: self.to_hex(),
            sighash_type: self.sighash_type,
            der_encoded: self.der_encoded,
            related_pubkey: self.related_pubkey.as_ref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SignatureParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            data: Option<String>,
            #[serde(default)]
            sighash_type: SignatureHashType,
            #[serde(default)]
            der_encoded: bool,
            #[serde(default)]
            related_pubkey: Option<PublicKey>,
        }

        let repr = Repr::deserialize(deserializer)?;
        let mut parameter = SignatureParameter::try_from(repr.data).map_err(D::Error::custom)?;
        parameter.sighash_type = repr.sighash_type;
        parameter.der_encoded = repr.der_encoded;
        parameter.related_pubkey = repr.related_pubkey;
        Ok(parameter)
    }
}
