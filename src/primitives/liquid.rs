//! Liquid Network asset identifiers and confidential amounts.

use crate::engine::{with_handle, CryptoEngine};
use crate::{CtError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Size of a plain asset tag in bytes
pub const ASSET_TAG_SIZE: usize = 32;
/// Size of a blinded asset or value commitment in bytes
pub const COMMITMENT_SIZE: usize = 33;
/// Size of an explicit value with its version prefix
pub const UNBLINDED_VALUE_SIZE: usize = 9;

/// A plain 32-byte asset tag or a 33-byte blinded asset commitment.
///
/// A plain tag is displayed as hex in reversed byte order, the same way
/// transaction ids are; `to_bytes` returns the serialized order. Blinded
/// commitments are never reversed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "String")]
pub struct AssetId {
    bytes: Vec<u8>,
}

impl AssetId {
    /// The empty asset, as found on null outputs
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hex(asset: &str) -> Result<Self> {
        if asset.len() != ASSET_TAG_SIZE * 2 && asset.len() != COMMITMENT_SIZE * 2 {
            return Err(CtError::invalid_size("Failed to asset size.")
                .with_context("hex_length", &asset.len().to_string())
                .with_operation("AssetId::from_hex"));
        }

        let mut bytes = hex::decode(asset)?;
        if bytes.len() == ASSET_TAG_SIZE {
            bytes.reverse();
        }
        Ok(AssetId { bytes })
    }

    pub fn from_bytes(asset: &[u8]) -> Result<Self> {
        if asset.len() != ASSET_TAG_SIZE && asset.len() != COMMITMENT_SIZE {
            return Err(CtError::invalid_size("Failed to asset size.")
                .with_context("byte_length", &asset.len().to_string())
                .with_operation("AssetId::from_bytes"));
        }
        Ok(AssetId {
            bytes: asset.to_vec(),
        })
    }

    pub fn has_blinding(&self) -> bool {
        self.bytes.len() == COMMITMENT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        if self.bytes.len() == ASSET_TAG_SIZE {
            let mut display = self.bytes.clone();
            display.reverse();
            hex::encode(display)
        } else {
            hex::encode(&self.bytes)
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl FromStr for AssetId {
    type Err = CtError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<Option<String>> for AssetId {
    type Error = CtError;

    fn try_from(asset: Option<String>) -> Result<Self> {
        match asset {
            None => Err(CtError::null_input("asset").with_operation("AssetId::try_from")),
            Some(text) if text.is_empty() => Ok(AssetId::empty()),
            Some(text) => AssetId::from_hex(&text),
        }
    }
}

impl From<AssetId> for String {
    fn from(asset: AssetId) -> Self {
        asset.to_hex()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Output value: an explicit satoshi amount, a blinded value commitment or
/// an explicit value already serialized with its version prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfidentialAmount {
    commitment: Vec<u8>,
    satoshi: i64,
}

fn check_commitment_size(len: usize, operation: &str) -> Result<()> {
    if len != 0 && len != COMMITMENT_SIZE && len != UNBLINDED_VALUE_SIZE {
        return Err(CtError::invalid_size("Invalid commitment value size.")
            .with_context("byte_length", &len.to_string())
            .with_operation(operation));
    }
    Ok(())
}

impl ConfidentialAmount {
    /// Plain amount. No range check is applied here.
    pub fn from_satoshi(satoshi: i64) -> Self {
        ConfidentialAmount {
            commitment: Vec::new(),
            satoshi,
        }
    }

    pub fn from_commitment_hex(commitment: &str) -> Result<Self> {
        Self::from_commitment_hex_with_amount(commitment, 0)
    }

    /// Commitment together with the plain amount it is known to hide.
    ///
    /// The two values are stored side by side; nothing checks that the
    /// commitment actually opens to `satoshi`.
    pub fn from_commitment_hex_with_amount(commitment: &str, satoshi: i64) -> Result<Self> {
        if commitment.len() % 2 != 0 {
            return Err(CtError::invalid_size("Invalid commitment value size.")
                .with_context("hex_length", &commitment.len().to_string())
                .with_operation("ConfidentialAmount::from_commitment_hex"));
        }
        check_commitment_size(commitment.len() / 2, "ConfidentialAmount::from_commitment_hex")?;

        Ok(ConfidentialAmount {
            commitment: hex::decode(commitment)?,
            satoshi,
        })
    }

    pub fn from_commitment_bytes(commitment: &[u8]) -> Result<Self> {
        check_commitment_size(commitment.len(), "ConfidentialAmount::from_commitment_bytes")?;
        Ok(ConfidentialAmount {
            commitment: commitment.to_vec(),
            satoshi: 0,
        })
    }

    /// True only for a 33-byte blinded commitment.
    pub fn has_blinding(&self) -> bool {
        self.commitment.len() == COMMITMENT_SIZE
    }

    /// Unset, as opposed to an explicit zero carried by a commitment.
    pub fn is_empty(&self) -> bool {
        self.satoshi == 0 && self.commitment.is_empty()
    }

    pub fn satoshi_value(&self) -> i64 {
        self.satoshi
    }

    pub fn commitment_hex(&self) -> String {
        hex::encode(&self.commitment)
    }

    /// Serialized value. Plain amounts are encoded by the engine.
    pub fn to_hex<E: CryptoEngine + ?Sized>(&self, engine: &E) -> Result<String> {
        if !self.commitment.is_empty() {
            return Ok(self.commitment_hex());
        }
        let satoshi = self.satoshi;
        with_handle(engine, "ConfidentialAmount::to_hex", |handle| {
            handle.amount_to_hex(satoshi, false)
        })
    }

    pub fn to_bytes<E: CryptoEngine + ?Sized>(&self, engine: &E) -> Result<Vec<u8>> {
        Ok(hex::decode(self.to_hex(engine)?)?)
    }

    /// Human readable form: the commitment when blinded, otherwise
    /// `"<satoshi> (<commitment>)"`.
    pub fn describe(&self) -> String {
        if self.has_blinding() {
            self.commitment_hex()
        } else {
            format!("{} ({})", self.satoshi, self.commitment_hex())
        }
    }
}

impl fmt::Display for ConfidentialAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl Serialize for ConfidentialAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr {
            commitment: String,
            satoshi: i64,
        }

        Repr {
            commitment: self.commitment_hex(),
            satoshi: self.satoshi,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfidentialAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Repr {
            commitment: Option<String>,
            #[serde(default)]
            satoshi: i64,
        }

        let repr = Repr::deserialize(deserializer)?;
        let commitment = repr
            .commitment
            .ok_or_else(|| D::Error::custom(CtError::null_input("commitment")))?;
        ConfidentialAmount::from_commitment_hex_with_amount(&commitment, repr.satoshi)
            .map_err(D::Error::custom)
    }
}
