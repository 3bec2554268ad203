//! JSON-RPC transaction requests (`eth_sendTransaction` and `eth_call` shape)

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::abi::{encode_constructor_args, ConstructorArg};

/// Unsigned transaction. Gas and nonce are left to the node, or filled in
/// before local signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    /// `None` for contract creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
}

impl TransactionRequest {
    /// Contract creation: init code followed by ABI-encoded constructor args
    pub fn create(from: Address, bytecode: &Bytes, args: &[ConstructorArg]) -> Self {
        let mut data = bytecode.to_vec();
        data.extend(encode_constructor_args(args));
        Self {
            from,
            to: None,
            data: Bytes::from(data),
            value: None,
        }
    }

    /// State-changing call against a deployed contract
    pub fn call(from: Address, to: Address, call: &ContractCall) -> Self {
        Self {
            from,
            to: Some(to),
            data: call.data.clone(),
            value: (call.value > U256::ZERO).then_some(call.value),
        }
    }

    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// One follow-up call issued after a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    /// Human-readable label for logs, e.g. `deposit()`
    pub description: String,
    pub data: Bytes,
    /// Native currency attached to the call (smallest unit)
    pub value: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_request_appends_args() {
        let code = Bytes::from(vec![0x60, 0x80]);
        let req = TransactionRequest::create(
            Address::ZERO,
            &code,
            &[ConstructorArg::Uint256(U256::from(7u64))],
        );
        assert!(req.is_creation());
        assert_eq!(req.data.len(), 2 + 32);
        assert_eq!(req.data[..2], [0x60, 0x80]);
        assert_eq!(req.data[33], 7);
    }

    #[test]
    fn test_creation_request_json_omits_to() {
        let req = TransactionRequest::create(Address::ZERO, &Bytes::from(vec![0x60]), &[]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("to").is_none());
        assert!(json.get("value").is_none());
        assert_eq!(json["data"], "0x60");
    }

    #[test]
    fn test_call_request_carries_value() {
        let call = ContractCall {
            description: "deposit()".into(),
            data: Bytes::from(vec![0xd0, 0xe3, 0x0d, 0xb0]),
            value: U256::from(1_000u64),
        };
        let to = Address::repeat_byte(0x11);
        let req = TransactionRequest::call(Address::ZERO, to, &call);
        assert_eq!(req.to, Some(to));
        assert_eq!(req.value, Some(U256::from(1_000u64)));

        let free = ContractCall {
            value: U256::ZERO,
            ..call
        };
        assert_eq!(TransactionRequest::call(Address::ZERO, to, &free).value, None);
    }
}
