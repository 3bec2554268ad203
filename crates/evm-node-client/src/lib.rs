//! evm-node-client: JSON-RPC client for EVM nodes
//!
//! This crate wraps the handful of `eth_*` calls the deployer needs and
//! provides [`wait_for_confirmation`], which turns a submitted transaction
//! into a typed Confirmed / Reverted result.

pub mod confirmation;
pub mod receipt;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use deploy_core::{BlockNumber, NodeError, TxHash};
use evm_tx::{decode_revert_reason, TransactionRequest};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

pub use confirmation::{wait_for_confirmation, Confirmation, ConfirmationPolicy, ReceiptSource};
pub use receipt::{parse_quantity, parse_wide_quantity, TransactionReceipt};

/// Default timeout for node API calls (30 seconds).
const NODE_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Result type for node client operations
pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcResponse {
    fn into_result<T: DeserializeOwned>(self, method: &str) -> Result<T> {
        if let Some(err) = self.error {
            // Revert payloads arrive in `data`
            let message = match err.data {
                Some(Value::String(data)) => match revert_text(&data) {
                    Some(reason) => format!("{}: {}", err.message, reason),
                    None => format!("{} ({})", err.message, data),
                },
                _ => err.message,
            };
            return Err(NodeError::Rpc {
                code: err.code,
                message,
            });
        }
        serde_json::from_value(self.result.unwrap_or(Value::Null))
            .map_err(|e| NodeError::ParseError(format!("{}: {}", method, e)))
    }
}

fn revert_text(data: &str) -> Option<String> {
    let bytes = data.parse::<Bytes>().ok()?;
    decode_revert_reason(&bytes)
}

fn quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    #[serde(default)]
    base_fee_per_gas: Option<String>,
}

/// JSON-RPC client bound to one node endpoint
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: Url,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    pub fn new(url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(NODE_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NodeError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            url,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue a raw JSON-RPC call
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "JSON-RPC request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeError::Unreachable {
                url: self.url.to_string(),
                reason: e.to_string(),
            })?;

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| NodeError::ParseError(format!("{}: {}", method, e)))?;

        envelope.into_result(method)
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }

    /// `eth_accounts`: accounts the node can sign for
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.request("eth_accounts", json!([])).await
    }

    /// `eth_blockNumber`
    pub async fn block_number(&self) -> Result<BlockNumber> {
        let raw: String = self.request("eth_blockNumber", json!([])).await?;
        parse_quantity(&raw)
    }

    /// `eth_sendTransaction`: the node (or its signer proxy) signs and broadcasts
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash> {
        self.request("eth_sendTransaction", json!([tx])).await
    }

    /// `eth_sendRawTransaction`: broadcast a transaction signed in-process
    pub async fn send_raw_transaction(&self, raw: &Bytes) -> Result<TxHash> {
        self.request("eth_sendRawTransaction", json!([raw])).await
    }

    /// `eth_getTransactionCount` including pending transactions
    pub async fn transaction_count(&self, address: Address) -> Result<u64> {
        let raw: String = self
            .request("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_quantity(&raw)
    }

    /// `eth_estimateGas`; fails with the revert reason when `tx` would revert
    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        let raw: String = self.request("eth_estimateGas", json!([tx])).await?;
        parse_quantity(&raw)
    }

    /// `eth_maxPriorityFeePerGas`
    pub async fn max_priority_fee(&self) -> Result<u128> {
        let raw: String = self.request("eth_maxPriorityFeePerGas", json!([])).await?;
        parse_wide_quantity(&raw)
    }

    /// Base fee of the latest block; `None` before London
    pub async fn latest_base_fee(&self) -> Result<Option<u128>> {
        let header: Option<BlockHeader> = self
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        header
            .and_then(|h| h.base_fee_per_gas)
            .map(|fee| parse_wide_quantity(&fee))
            .transpose()
    }

    /// `eth_call` against the state at `block`
    pub async fn call(&self, tx: &TransactionRequest, block: BlockNumber) -> Result<Bytes> {
        self.request("eth_call", json!([tx, quantity(block)])).await
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending
    pub async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    /// `eth_getCode` at the latest block; empty for accounts without code
    pub async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.request("eth_getCode", json!([address, "latest"])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_keeps_revert_data() {
        let envelope: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted","data":"0x08c379a0"}}"#,
        )
        .unwrap();
        let err = envelope.into_result::<String>("eth_sendTransaction").unwrap_err();
        match err {
            NodeError::Rpc { code, message } => {
                assert_eq!(code, 3);
                assert_eq!(message, "execution reverted (0x08c379a0)");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rpc_error_decodes_revert_string() {
        let data = evm_tx::encode_call(
            "Error(string)",
            &[evm_tx::ConstructorArg::String("PreSale: invalid rate".into())],
        );
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 3, "message": "execution reverted", "data": Bytes::from(data)},
        });
        let envelope: RpcResponse = serde_json::from_value(body).unwrap();
        let err = envelope.into_result::<Bytes>("eth_call").unwrap_err();
        assert!(
            matches!(&err, NodeError::Rpc { message, .. } if message == "execution reverted: PreSale: invalid rate"),
            "{:?}",
            err
        );
    }

    #[test]
    fn test_block_header_base_fee() {
        let envelope: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"number":"0x10","baseFeePerGas":"0x3b9aca00"}}"#,
        )
        .unwrap();
        let header: Option<BlockHeader> = envelope.into_result("eth_getBlockByNumber").unwrap();
        let fee = header.unwrap().base_fee_per_gas.unwrap();
        assert_eq!(parse_wide_quantity(&fee).unwrap(), 1_000_000_000);
        assert!(parse_wide_quantity("1000").is_err());
        assert_eq!(quantity(99), "0x63");
    }

    #[test]
    fn test_null_result_is_none() {
        let envelope: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        let receipt: Option<TransactionReceipt> =
            envelope.into_result("eth_getTransactionReceipt").unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_wrong_result_shape_is_parse_error() {
        let envelope: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":42}"#).unwrap();
        let err = envelope.into_result::<Vec<Address>>("eth_accounts").unwrap_err();
        assert!(matches!(err, NodeError::ParseError(msg) if msg.starts_with("eth_accounts")));
    }

    #[test]
    fn test_client_keeps_url() {
        let url = Url::parse("http://127.0.0.1:8545").unwrap();
        let client = RpcClient::new(url.clone()).unwrap();
        assert_eq!(client.url(), &url);
    }
}
