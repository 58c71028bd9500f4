//! Contract data-type tags.
//!
//! Defines the closed set of argument/return type tags the wallet SDK
//! accepts, parses them from their textual form, and maps them onto
//! alloy's dynamic ABI types for encoding and decoding.
//!
//! Accepted tags:
//! - `bool`, `address`, `string`, `bytes`
//! - `uint`, `uint8`..`uint256` and `int`, `int8`..`int256` (8-bit steps)
//! - `bytes1`..`bytes32`
//! - any of the above followed by the `[]` array marker (one level only)

use std::fmt;
use std::str::FromStr;

use alloy::dyn_abi::DynSolType;

use super::codec::EncodeError;

/// Named constants for every type tag understood by the wallet.
///
/// Mirrors the data-type table exposed to SDK users so tags can be
/// written without string literals.
pub struct DataType;

impl DataType {
    pub const ARRAY: &'static str = "[]";
    pub const BOOL: &'static str = "bool";
    pub const ADDRESS: &'static str = "address";
    pub const STRING: &'static str = "string";
    pub const UINT: &'static str = "uint";
    pub const UINT8: &'static str = "uint8";
    pub const UINT16: &'static str = "uint16";
    pub const UINT32: &'static str = "uint32";
    pub const UINT64: &'static str = "uint64";
    pub const UINT128: &'static str = "uint128";
    pub const UINT256: &'static str = "uint256";
    pub const INT: &'static str = "int";
    pub const INT8: &'static str = "int8";
    pub const INT16: &'static str = "int16";
    pub const INT32: &'static str = "int32";
    pub const INT64: &'static str = "int64";
    pub const INT128: &'static str = "int128";
    pub const INT256: &'static str = "int256";
    pub const BYTES: &'static str = "bytes";
    pub const BYTES1: &'static str = "bytes1";
    pub const BYTES2: &'static str = "bytes2";
    pub const BYTES3: &'static str = "bytes3";
    pub const BYTES4: &'static str = "bytes4";
    pub const BYTES5: &'static str = "bytes5";
    pub const BYTES6: &'static str = "bytes6";
    pub const BYTES7: &'static str = "bytes7";
    pub const BYTES8: &'static str = "bytes8";
    pub const BYTES9: &'static str = "bytes9";
    pub const BYTES10: &'static str = "bytes10";
    pub const BYTES11: &'static str = "bytes11";
    pub const BYTES12: &'static str = "bytes12";
    pub const BYTES13: &'static str = "bytes13";
    pub const BYTES14: &'static str = "bytes14";
    pub const BYTES15: &'static str = "bytes15";
    pub const BYTES16: &'static str = "bytes16";
    pub const BYTES17: &'static str = "bytes17";
    pub const BYTES18: &'static str = "bytes18";
    pub const BYTES19: &'static str = "bytes19";
    pub const BYTES20: &'static str = "bytes20";
    pub const BYTES21: &'static str = "bytes21";
    pub const BYTES22: &'static str = "bytes22";
    pub const BYTES23: &'static str = "bytes23";
    pub const BYTES24: &'static str = "bytes24";
    pub const BYTES25: &'static str = "bytes25";
    pub const BYTES26: &'static str = "bytes26";
    pub const BYTES27: &'static str = "bytes27";
    pub const BYTES28: &'static str = "bytes28";
    pub const BYTES29: &'static str = "bytes29";
    pub const BYTES30: &'static str = "bytes30";
    pub const BYTES31: &'static str = "bytes31";
    pub const BYTES32: &'static str = "bytes32";
    pub const STRING_ARRAY: &'static str = "string[]";
    pub const ADDRESS_ARRAY: &'static str = "address[]";

    /// Every complete tag above; `ARRAY` is only a suffix marker.
    pub const TAGS: &'static [&'static str] = &[
        Self::BOOL,
        Self::ADDRESS,
        Self::STRING,
        Self::UINT,
        Self::UINT8,
        Self::UINT16,
        Self::UINT32,
        Self::UINT64,
        Self::UINT128,
        Self::UINT256,
        Self::INT,
        Self::INT8,
        Self::INT16,
        Self::INT32,
        Self::INT64,
        Self::INT128,
        Self::INT256,
        Self::BYTES,
        Self::BYTES1,
        Self::BYTES2,
        Self::BYTES3,
        Self::BYTES4,
        Self::BYTES5,
        Self::BYTES6,
        Self::BYTES7,
        Self::BYTES8,
        Self::BYTES9,
        Self::BYTES10,
        Self::BYTES11,
        Self::BYTES12,
        Self::BYTES13,
        Self::BYTES14,
        Self::BYTES15,
        Self::BYTES16,
        Self::BYTES17,
        Self::BYTES18,
        Self::BYTES19,
        Self::BYTES20,
        Self::BYTES21,
        Self::BYTES22,
        Self::BYTES23,
        Self::BYTES24,
        Self::BYTES25,
        Self::BYTES26,
        Self::BYTES27,
        Self::BYTES28,
        Self::BYTES29,
        Self::BYTES30,
        Self::BYTES31,
        Self::BYTES32,
        Self::STRING_ARRAY,
        Self::ADDRESS_ARRAY,
    ];
}

/// A single supported ABI type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Bool,
    Address,
    String,
    /// Dynamic-length byte string.
    Bytes,
    /// Unsigned integer with bit width (8..=256, multiple of 8).
    Uint(usize),
    /// Signed integer with bit width (8..=256, multiple of 8).
    Int(usize),
    /// Fixed-width byte array (1..=32 bytes).
    FixedBytes(usize),
    /// Single-level dynamic array of a non-array element type.
    Array(Box<AbiType>),
}

impl AbiType {
    /// Parse a tag, rejecting anything outside the supported set.
    pub fn parse(tag: &str) -> Result<Self, EncodeError> {
        let tag = tag.trim();

        if let Some(inner) = tag.strip_suffix("[]") {
            let element = Self::parse_elementary(inner)
                .ok_or_else(|| EncodeError::UnsupportedType(tag.to_string()))?;
            return Ok(Self::Array(Box::new(element)));
        }

        Self::parse_elementary(tag).ok_or_else(|| EncodeError::UnsupportedType(tag.to_string()))
    }

    /// Parse a list of tags, failing on the first unsupported one.
    pub fn parse_all<S: AsRef<str>>(tags: &[S]) -> Result<Vec<Self>, EncodeError> {
        tags.iter().map(|t| Self::parse(t.as_ref())).collect()
    }

    fn parse_elementary(tag: &str) -> Option<Self> {
        match tag {
            "bool" => return Some(Self::Bool),
            "address" => return Some(Self::Address),
            "string" => return Some(Self::String),
            "bytes" => return Some(Self::Bytes),
            "uint" => return Some(Self::Uint(256)),
            "int" => return Some(Self::Int(256)),
            _ => {}
        }

        if let Some(bits) = tag.strip_prefix("uint") {
            return parse_width(bits, 8, 256, 8).map(Self::Uint);
        }
        if let Some(bits) = tag.strip_prefix("int") {
            return parse_width(bits, 8, 256, 8).map(Self::Int);
        }
        if let Some(len) = tag.strip_prefix("bytes") {
            return parse_width(len, 1, 32, 1).map(Self::FixedBytes);
        }
        None
    }

    /// Canonical name used in method signatures (`uint` becomes `uint256`).
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::Address => "address".to_string(),
            Self::String => "string".to_string(),
            Self::Bytes => "bytes".to_string(),
            Self::Uint(bits) => format!("uint{bits}"),
            Self::Int(bits) => format!("int{bits}"),
            Self::FixedBytes(len) => format!("bytes{len}"),
            Self::Array(inner) => format!("{}[]", inner.canonical_name()),
        }
    }

    /// Equivalent alloy dynamic type.
    pub fn to_sol_type(&self) -> DynSolType {
        match self {
            Self::Bool => DynSolType::Bool,
            Self::Address => DynSolType::Address,
            Self::String => DynSolType::String,
            Self::Bytes => DynSolType::Bytes,
            Self::Uint(bits) => DynSolType::Uint(*bits),
            Self::Int(bits) => DynSolType::Int(*bits),
            Self::FixedBytes(len) => DynSolType::FixedBytes(*len),
            Self::Array(inner) => DynSolType::Array(Box::new(inner.to_sol_type())),
        }
    }
}

/// Parse a decimal width and check it lies in `[min, max]` on `step`.
fn parse_width(digits: &str, min: usize, max: usize, step: usize) -> Option<usize> {
    // Reject "uint08" and similar non-canonical spellings.
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let width: usize = digits.parse().ok()?;
    (width >= min && width <= max && width % step == 0).then_some(width)
}

impl FromStr for AbiType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}
