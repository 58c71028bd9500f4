//! ABI Codec - Contract Call Encoding and Return Decoding
//!
//! Encodes a method name plus typed positional arguments into the
//! calldata understood by the Qtum contract VM (EVM-compatible ABI),
//! and decodes raw return payloads back into typed values.
//!
//! Both directions are pure functions. The encoded hex is also used by
//! the wallet for selector-based dispatch, so identical inputs must
//! always produce byte-identical output.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::hex;
use alloy::primitives::{I256, Selector, keccak256};
use thiserror::Error;

use super::abi_type::AbiType;

/// Width of one ABI head word.
const WORD_SIZE: usize = 32;

/// Errors raised while building calldata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The tag is not in the supported set.
    #[error("unsupported type tag: {0}")]
    UnsupportedType(String),
    /// Argument and type lists differ in length.
    #[error("argument count mismatch: {values} values for {types} types")]
    ArityMismatch { values: usize, types: usize },
    /// A value does not fit its declared type.
    #[error("argument {index} does not match declared type {expected}")]
    TypeMismatch { index: usize, expected: String },
    /// A textual argument could not be parsed as its declared type.
    #[error("invalid value for argument {index} ({expected}): {reason}")]
    InvalidValue {
        index: usize,
        expected: String,
        reason: String,
    },
}

/// Errors raised while decoding a return payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),
    /// Fewer bytes than the declared output types require.
    #[error("payload too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    /// A dynamic value's offset or length points past the payload end.
    #[error("payload of {actual} bytes ends inside a dynamic value")]
    Truncated { actual: usize },
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A fully encoded contract invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    /// First four bytes of keccak-256 over the method signature.
    pub selector: Selector,
    /// Standard ABI encoding of the positional arguments.
    pub arguments: Vec<u8>,
}

impl EncodedCall {
    /// Build calldata for `method` with the given arguments.
    ///
    /// # Errors
    /// Returns [`EncodeError`] on arity mismatch or when a value does not
    /// match its declared type.
    pub fn new(method: &str, values: &[DynSolValue], types: &[AbiType]) -> Result<Self, EncodeError> {
        if values.len() != types.len() {
            return Err(EncodeError::ArityMismatch {
                values: values.len(),
                types: types.len(),
            });
        }

        for (index, (value, ty)) in values.iter().zip(types).enumerate() {
            check_value(index, value, ty)?;
        }

        let selector = method_selector(method, types);
        let arguments = if values.is_empty() {
            Vec::new()
        } else {
            DynSolValue::Tuple(values.to_vec()).abi_encode_params()
        };

        Ok(Self { selector, arguments })
    }

    /// Selector followed by argument bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.arguments.len());
        out.extend_from_slice(self.selector.as_slice());
        out.extend_from_slice(&self.arguments);
        out
    }

    /// Lowercase hex without prefix, as the wallet expects it.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Method signature in canonical form, e.g. `transfer(address,uint256)`.
pub fn method_signature(method: &str, types: &[AbiType]) -> String {
    let params: Vec<String> = types.iter().map(AbiType::canonical_name).collect();
    format!("{method}({})", params.join(","))
}

/// Four-byte dispatch selector for a method.
pub fn method_selector(method: &str, types: &[AbiType]) -> Selector {
    let hash = keccak256(method_signature(method, types).as_bytes());
    Selector::from_slice(&hash[..4])
}

/// Encode a contract invocation to lowercase hex.
///
/// Zero arguments yield the selector alone.
pub fn encode(method: &str, values: &[DynSolValue], types: &[AbiType]) -> Result<String, EncodeError> {
    EncodedCall::new(method, values, types).map(|call| call.to_hex())
}

/// Encode using textual type tags, validating each tag first.
pub fn encode_with_tags<S: AsRef<str>>(
    method: &str,
    values: &[DynSolValue],
    tags: &[S],
) -> Result<String, EncodeError> {
    let types = AbiType::parse_all(tags)?;
    encode(method, values, &types)
}

/// Parse textual arguments into typed values.
///
/// Accepts the same loose literals wallet users pass around: decimal or
/// hex integers, `true`/`false`, addresses with or without `0x`.
pub fn coerce_args<S: AsRef<str>>(types: &[AbiType], args: &[S]) -> Result<Vec<DynSolValue>, EncodeError> {
    if args.len() != types.len() {
        return Err(EncodeError::ArityMismatch {
            values: args.len(),
            types: types.len(),
        });
    }

    types
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, arg))| {
            ty.to_sol_type()
                .coerce_str(arg.as_ref())
                .map_err(|e| EncodeError::InvalidValue {
                    index,
                    expected: ty.canonical_name(),
                    reason: e.to_string(),
                })
        })
        .collect()
}

/// Decode a raw return payload per `types`, in declaration order.
///
/// An empty `types` list means "do not decode" and yields no values.
///
/// # Errors
/// Returns [`DecodeError`] when the hex is invalid or the payload is
/// shorter than the declared types require.
pub fn decode(types: &[AbiType], output_hex: &str) -> Result<Vec<DynSolValue>, DecodeError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = hex::decode(output_hex.trim()).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;

    let expected = types.len() * WORD_SIZE;
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }

    let tuple = DynSolType::Tuple(types.iter().map(AbiType::to_sol_type).collect());
    match tuple.abi_decode_params(&bytes) {
        Ok(DynSolValue::Tuple(values)) => Ok(values),
        Ok(other) => Ok(vec![other]),
        Err(alloy::dyn_abi::Error::SolTypes(alloy::sol_types::Error::Overrun)) => {
            Err(DecodeError::Truncated { actual: bytes.len() })
        }
        Err(e) => Err(DecodeError::Malformed(e.to_string())),
    }
}

fn check_value(index: usize, value: &DynSolValue, ty: &AbiType) -> Result<(), EncodeError> {
    let mismatch = || EncodeError::TypeMismatch {
        index,
        expected: ty.canonical_name(),
    };

    if !ty.to_sol_type().matches(value) {
        return Err(mismatch());
    }

    match (ty, value) {
        (AbiType::Uint(bits), DynSolValue::Uint(v, _)) if v.bit_len() > *bits => Err(mismatch()),
        (AbiType::Int(bits), DynSolValue::Int(v, _)) if !int_fits(*v, *bits) => Err(mismatch()),
        (AbiType::FixedBytes(len), DynSolValue::FixedBytes(word, _)) if word.0[*len..].iter().any(|b| *b != 0) => {
            Err(mismatch())
        }
        (AbiType::Array(inner), DynSolValue::Array(items)) => items
            .iter()
            .try_for_each(|item| check_value(index, item, inner)),
        _ => Ok(()),
    }
}

/// Whether `v` lies in `[-2^(bits-1), 2^(bits-1) - 1]`.
fn int_fits(v: I256, bits: usize) -> bool {
    // Magnitude bits excluding the sign: `v` for non-negatives, `-v - 1` otherwise.
    let magnitude = if v.is_negative() { !v.into_raw() } else { v.into_raw() };
    magnitude.bit_len() < bits
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, B256, U256, address};

    use super::*;

    fn types(tags: &[&str]) -> Vec<AbiType> {
        AbiType::parse_all(tags).unwrap()
    }

    #[test]
    fn test_selector_matches_known_signatures() {
        // keccak256("transfer(address,uint256)")[..4]
        let sel = method_selector("transfer", &types(&["address", "uint256"]));
        assert_eq!(hex::encode(sel), "a9059cbb");

        // `uint` canonicalizes to `uint256` before hashing.
        let aliased = method_selector("transfer", &types(&["address", "uint"]));
        assert_eq!(sel, aliased);
    }

    #[test]
    fn test_zero_arguments_is_selector_only() {
        // keccak256("totalSupply()")[..4]
        let hex = encode("totalSupply", &[], &[]).unwrap();
        assert_eq!(hex, "18160ddd");
    }

    #[test]
    fn test_encode_static_arguments() {
        let to: Address = address!("a27225bcb75142b8f90dcf3365055899b7c091fd");
        let hex = encode(
            "transfer",
            &[DynSolValue::Address(to), DynSolValue::Uint(U256::from(1u64), 256)],
            &types(&["address", "uint256"]),
        )
        .unwrap();

        assert_eq!(hex.len(), 8 + 64 * 2);
        assert!(hex.starts_with("a9059cbb"));
        assert!(hex.contains("a27225bcb75142b8f90dcf3365055899b7c091fd"));
        assert!(hex.ends_with(&format!("{:064x}", 1)));
        assert_eq!(hex, hex.to_lowercase());
    }

    #[test]
    fn test_encode_rejects_arity_mismatch() {
        let err = encode("set", &[DynSolValue::Bool(true)], &[]).unwrap_err();
        assert_eq!(err, EncodeError::ArityMismatch { values: 1, types: 0 });
    }

    #[test]
    fn test_encode_rejects_type_mismatch() {
        let err = encode("set", &[DynSolValue::Bool(true)], &types(&["uint8"])).unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_encode_rejects_out_of_range_uint() {
        let err = encode(
            "set",
            &[DynSolValue::Uint(U256::from(256u64), 8)],
            &types(&["uint8"]),
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_encode_int_width_bounds() {
        let int8 = types(&["int8"]);
        let int = |v: i64| DynSolValue::Int(I256::try_from(v).unwrap(), 8);

        assert!(encode("set", &[int(127)], &int8).is_ok());
        assert!(encode("set", &[int(-128)], &int8).is_ok());
        for v in [128, -129, 1000] {
            let err = encode("set", &[int(v)], &int8).unwrap_err();
            assert!(matches!(err, EncodeError::TypeMismatch { index: 0, .. }), "{v} accepted");
        }

        let int256 = types(&["int256"]);
        assert!(encode("set", &[DynSolValue::Int(I256::MIN, 256)], &int256).is_ok());
        assert!(encode("set", &[DynSolValue::Int(I256::MAX, 256)], &int256).is_ok());
    }

    #[test]
    fn test_encode_negative_int_is_sign_extended() {
        let hex = encode("set", &[DynSolValue::Int(I256::MINUS_ONE, 16)], &types(&["int16"])).unwrap();
        assert!(hex.ends_with(&"f".repeat(64)));
    }

    #[test]
    fn test_encode_fixed_bytes_requires_zero_padding() {
        let bytes4 = types(&["bytes4"]);

        let mut clean = B256::ZERO;
        clean.0[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let hex = encode("set", &[DynSolValue::FixedBytes(clean, 4)], &bytes4).unwrap();
        assert!(hex.ends_with(&format!("deadbeef{}", "0".repeat(56))));

        let dirty = B256::repeat_byte(0xff);
        let err = encode("set", &[DynSolValue::FixedBytes(dirty, 4)], &bytes4).unwrap_err();
        assert!(matches!(err, EncodeError::TypeMismatch { index: 0, .. }));

        // bytes32 uses the whole word.
        assert!(encode("set", &[DynSolValue::FixedBytes(dirty, 32)], &types(&["bytes32"])).is_ok());
    }

    #[test]
    fn test_encode_checks_array_elements() {
        let tys = types(&["int8[]"]);
        let items = |v: i64| {
            DynSolValue::Array(vec![
                DynSolValue::Int(I256::ZERO, 8),
                DynSolValue::Int(I256::try_from(v).unwrap(), 8),
            ])
        };
        assert!(encode("set", &[items(-1)], &tys).is_ok());
        assert!(encode("set", &[items(300)], &tys).is_err());
    }

    #[test]
    fn test_encode_with_unsupported_tag() {
        let err = encode_with_tags("f", &[DynSolValue::Bool(true)], &["tuple"]).unwrap_err();
        assert_eq!(err, EncodeError::UnsupportedType("tuple".to_string()));
    }

    #[test]
    fn test_coerce_args_from_literals() {
        let tys = types(&["uint256", "string", "bool", "address"]);
        let values = coerce_args(
            &tys,
            &["1", "abc", "true", "a27225bcb75142b8f90dcf3365055899b7c091fd"],
        )
        .unwrap();

        assert_eq!(values[0], DynSolValue::Uint(U256::from(1u64), 256));
        assert_eq!(values[1], DynSolValue::String("abc".to_string()));
        assert_eq!(values[2], DynSolValue::Bool(true));
        assert!(encode("f", &values, &tys).is_ok());
    }

    #[test]
    fn test_coerce_args_invalid_literal() {
        let err = coerce_args(&types(&["bool"]), &["maybe"]).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidValue { index: 0, .. }));
    }

    #[test]
    fn test_decode_multiple_outputs() {
        let tys = types(&["string", "uint256", "bool"]);
        let values = vec![
            DynSolValue::String("abc".to_string()),
            DynSolValue::Uint(U256::from(42u64), 256),
            DynSolValue::Bool(true),
        ];
        let payload = DynSolValue::Tuple(values.clone()).abi_encode_params();

        let decoded = decode(&tys, &format!("0x{}", hex::encode(&payload))).unwrap();
        assert_eq!(decoded, values);

        // Prefix is optional.
        let decoded = decode(&tys, &hex::encode(&payload)).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_decode_empty_types_skips_payload() {
        assert!(decode(&[], "not even hex").unwrap().is_empty());
    }

    #[test]
    fn test_decode_short_payload() {
        let err = decode(&types(&["uint256", "uint256"]), &"00".repeat(32)).unwrap_err();
        assert_eq!(err, DecodeError::TooShort { expected: 64, actual: 32 });
    }

    #[test]
    fn test_decode_truncated_dynamic_tail() {
        // Offset word points at a tail that is missing.
        let payload = format!("{:064x}", 32);
        let err = decode(&types(&["string"]), &payload).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { actual: 32 });
    }

    #[test]
    fn test_decode_invalid_hex() {
        let err = decode(&types(&["bool"]), "zz").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHex(_)));
    }
}
