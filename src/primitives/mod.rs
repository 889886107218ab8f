//! Liquid confidential transaction primitives.

pub mod byte_data;
pub mod liquid;

pub use byte_data::ByteData;
pub use liquid::{AssetId, ConfidentialAmount};
