//! Constructor argument model and ABI encoding
//!
//! Arguments are kept as a small typed tree so that the exact same values are
//! used for the creation transaction and for explorer verification.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, U256};
use serde::Serialize;

/// A typed, ordered constructor argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstructorArg {
    Address(Address),
    Uint256(U256),
    Uint8(u8),
    String(String),
    /// Solidity struct / tuple, encoded in declaration order
    Tuple(Vec<ConstructorArg>),
}

impl ConstructorArg {
    fn to_sol_value(&self) -> DynSolValue {
        match self {
            Self::Address(address) => DynSolValue::Address(*address),
            Self::Uint256(value) => DynSolValue::Uint(*value, 256),
            Self::Uint8(value) => DynSolValue::Uint(U256::from(*value), 8),
            Self::String(value) => DynSolValue::String(value.clone()),
            Self::Tuple(items) => {
                DynSolValue::Tuple(items.iter().map(ConstructorArg::to_sol_value).collect())
            }
        }
    }

    /// Solidity type name, e.g. `(uint256,uint256)` for a tuple
    pub fn sol_type(&self) -> String {
        match self {
            Self::Address(_) => "address".to_string(),
            Self::Uint256(_) => "uint256".to_string(),
            Self::Uint8(_) => "uint8".to_string(),
            Self::String(_) => "string".to_string(),
            Self::Tuple(items) => format!(
                "({})",
                items
                    .iter()
                    .map(ConstructorArg::sol_type)
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

/// ABI-encode an ordered argument list as constructor parameters.
/// An empty list encodes to nothing.
pub fn encode_constructor_args(args: &[ConstructorArg]) -> Vec<u8> {
    if args.is_empty() {
        return Vec::new();
    }
    DynSolValue::Tuple(args.iter().map(ConstructorArg::to_sol_value).collect()).abi_encode_params()
}

/// 4-byte function selector for a canonical signature such as `deposit()`
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `signature` applied to `args`
pub fn encode_call(signature: &str, args: &[ConstructorArg]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode_constructor_args(args));
    data
}

/// Decode the payload of a reverted call: `Error(string)` yields its message,
/// `Panic(uint256)` its code. Custom errors are not decoded.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (head, payload) = data.split_at(4);
    if head == selector("Error(string)") {
        let value = DynSolType::String.abi_decode(payload).ok()?;
        return value.as_str().map(str::to_string);
    }
    if head == selector("Panic(uint256)") {
        let value = DynSolType::Uint(256).abi_decode(payload).ok()?;
        let (code, _) = value.as_uint()?;
        return Some(format!("panic 0x{:x}", code));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn word(bytes: &[u8], index: usize) -> &[u8] {
        &bytes[index * 32..(index + 1) * 32]
    }

    fn word_u64(value: u64) -> Vec<u8> {
        let mut w = vec![0u8; 24];
        w.extend(value.to_be_bytes());
        w
    }

    #[test]
    fn test_empty_args() {
        assert!(encode_constructor_args(&[]).is_empty());
    }

    #[test]
    fn test_static_tuple_is_inline() {
        let weth = Address::from_str("0x34D712337b07F5Fa983430A3906573981f368CeA").unwrap();
        let encoded = encode_constructor_args(&[
            ConstructorArg::Address(weth),
            ConstructorArg::Tuple(vec![
                ConstructorArg::Uint256(U256::from(1u64)),
                ConstructorArg::Uint256(U256::from(2u64)),
            ]),
        ]);
        assert_eq!(encoded.len(), 96);
        assert_eq!(&word(&encoded, 0)[12..], weth.as_slice());
        assert_eq!(word(&encoded, 1), word_u64(1).as_slice());
        assert_eq!(word(&encoded, 2), word_u64(2).as_slice());
    }

    #[test]
    fn test_dynamic_string_uses_offset() {
        let encoded = encode_constructor_args(&[
            ConstructorArg::String("A".to_string()),
            ConstructorArg::Uint8(6),
        ]);
        assert_eq!(encoded.len(), 128);
        assert_eq!(word(&encoded, 0), word_u64(0x40).as_slice());
        assert_eq!(word(&encoded, 1), word_u64(6).as_slice());
        assert_eq!(word(&encoded, 2), word_u64(1).as_slice());
        assert_eq!(word(&encoded, 3)[0], b'A');
    }

    #[test]
    fn test_selectors() {
        assert_eq!(hex::encode(selector("deposit()")), "d0e30db0");
        assert_eq!(
            hex::encode(selector("transfer(address,uint256)")),
            "a9059cbb"
        );
        assert_eq!(encode_call("deposit()", &[]), selector("deposit()").to_vec());
    }

    #[test]
    fn test_sol_type() {
        let option = ConstructorArg::Tuple(vec![
            ConstructorArg::Uint256(U256::ZERO),
            ConstructorArg::Uint8(0),
        ]);
        assert_eq!(option.sol_type(), "(uint256,uint8)");
    }

    #[test]
    fn test_revert_reasons() {
        let data = encode_call(
            "Error(string)",
            &[ConstructorArg::String("PreSale: softCap exceeds hardCap".into())],
        );
        assert_eq!(hex::encode(&data[..4]), "08c379a0");
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("PreSale: softCap exceeds hardCap")
        );

        let panic = encode_call("Panic(uint256)", &[ConstructorArg::Uint256(U256::from(0x11u64))]);
        assert_eq!(decode_revert_reason(&panic).as_deref(), Some("panic 0x11"));

        assert!(decode_revert_reason(&[0x08, 0xc3]).is_none());
        assert!(decode_revert_reason(&selector("Unauthorized()")).is_none());
    }
}
