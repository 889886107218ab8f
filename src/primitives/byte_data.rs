//! Owned byte buffer with a hex text form.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::fmt;
use std::str::FromStr;

/// Raw bytes rendered as lowercase hex.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ByteData(#[serde_as(as = "Hex")] Vec<u8>);

impl ByteData {
    pub fn new(bytes: Vec<u8>) -> Self {
        ByteData(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        Ok(ByteData(hex::decode(hex_str)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ByteData {
    fn from(bytes: Vec<u8>) -> Self {
        ByteData(bytes)
    }
}

impl From<&[u8]> for ByteData {
    fn from(bytes: &[u8]) -> Self {
        ByteData(bytes.to_vec())
    }
}

impl AsRef<[u8]> for ByteData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ByteData {
    type Err = crate::CtError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for ByteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
