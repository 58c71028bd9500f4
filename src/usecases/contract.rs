//! Contract Use Case - Smart Contract Invocation Through the Wallet
//!
//! Composes the ABI codec with the wallet bridge:
//! - `send`: state-mutating call, signed and broadcast by the wallet,
//!   resolves to the transaction id
//! - `call`: read-only call, resolves to the decoded return values
//! - `send_and_confirm`: `send`, then poll until the transaction is final

use std::sync::Arc;
use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::config::ContractConfig;
use crate::domain::{AbiType, Confirmation, CorrelationId, TransactionStatus, codec};
use crate::error::{Result, SdkError};
use crate::ports::explorer::TransactionLookup;

use super::bridge::{Bridge, OutputBindings, methods};
use super::poller::ConfirmationPoller;

/// Optional parameters of a state-mutating call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SendOptions {
  /// QTUM sent along with the call; negative or absent means 0.
  pub amount: Option<f64>,
  /// Gas price in QTUM; defaults to the configured price.
  pub gas_price: Option<f64>,
  /// Gas limit; defaults to the configured limit.
  pub gas_limit: Option<u64>,
}

/// Decoded result of a read-only call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
  /// Exactly one output type was declared.
  Single(DynSolValue),
  /// Zero or several output types were declared.
  Multiple(Vec<DynSolValue>),
}

impl CallOutput {
  fn from_values(mut values: Vec<DynSolValue>) -> Self {
    if values.len() == 1 {
      Self::Single(values.remove(0))
    } else {
      Self::Multiple(values)
    }
  }

  /// All values in declaration order.
  pub fn into_vec(self) -> Vec<DynSolValue> {
    match self {
      Self::Single(value) => vec![value],
      Self::Multiple(values) => values,
    }
  }
}

/// A deployed contract reachable through the wallet.
pub struct Contract<L: TransactionLookup> {
  address: String,
  bridge: Arc<Bridge>,
  poller: Arc<ConfirmationPoller<L>>,
  defaults: ContractConfig,
  poll_interval: Duration,
}

impl<L: TransactionLookup> Contract<L> {
  pub fn new(
    address: impl Into<String>,
    bridge: Arc<Bridge>,
    poller: Arc<ConfirmationPoller<L>>,
    defaults: ContractConfig,
    poll_interval: Duration,
  ) -> Self {
    Self {
      address: address.into(),
      bridge,
      poller,
      defaults,
      poll_interval,
    }
  }

  pub fn address(&self) -> &str {
    &self.address
  }

  /// Send a state-mutating transaction to the contract.
  ///
  /// # Errors
  /// - `Encode` for bad arguments or type tags
  /// - `Wallet` when the wallet reports an error
  /// - `MalformedResponse` when no transaction id comes back
  #[instrument(skip(self, values, types), fields(contract = %self.address))]
  pub async fn send(
    &self,
    method: &str,
    values: &[DynSolValue],
    types: &[AbiType],
    options: SendOptions,
  ) -> Result<String> {
    let encoded_data = codec::encode(method, values, types)?;
    let payload = self.send_payload(method, encoded_data, options);

    let response = self.bridge.request(methods::SEND_TO_CONTRACT, payload).await?;
    check_wallet_error(&response)?;

    let txid = response
      .pointer("/tx/txid")
      .and_then(Value::as_str)
      .ok_or_else(|| SdkError::MalformedResponse("missing tx.txid".to_string()))?;

    info!(method, txid, "Contract transaction sent");
    Ok(txid.to_string())
  }

  /// Call a read-only contract method and decode its outputs.
  ///
  /// With exactly one output type the single value is returned as
  /// [`CallOutput::Single`].
  ///
  /// # Errors
  /// - `Encode` for bad arguments or type tags
  /// - `Wallet` when the wallet reports an error
  /// - `Decode` when the output does not match `output_types`
  #[instrument(skip(self, values, types, output_types), fields(contract = %self.address))]
  pub async fn call(
    &self,
    method: &str,
    values: &[DynSolValue],
    types: &[AbiType],
    output_types: &[AbiType],
  ) -> Result<CallOutput> {
    let encoded_data = codec::encode(method, values, types)?;
    let payload = json!({
      "address": self.address,
      "method": method,
      "encodedData": encoded_data,
      "txData": { "version": 0, "nonce": 1 },
    });

    let id = CorrelationId::random();
    let binding = BindingGuard::bind(self.bridge.bindings(), &id, output_types.to_vec());

    let response = self
      .bridge
      .request_as(id.clone(), methods::CALL_CONTRACT, payload)
      .await;
    let output_types = binding.take();
    let response = response?;
    check_wallet_error(&response)?;

    if output_types.is_empty() {
      return Ok(CallOutput::Multiple(Vec::new()));
    }

    let output = response
      .pointer("/executionResult/output")
      .and_then(Value::as_str)
      .ok_or_else(|| SdkError::MalformedResponse("missing executionResult.output".to_string()))?;

    let values = codec::decode(&output_types, output)?;
    Ok(CallOutput::from_values(values))
  }

  /// `send` with textual arguments and type tags.
  pub async fn send_literals<S: AsRef<str>, T: AsRef<str>>(
    &self,
    method: &str,
    args: &[S],
    tags: &[T],
    options: SendOptions,
  ) -> Result<String> {
    let types = AbiType::parse_all(tags)?;
    let values = codec::coerce_args(&types, args)?;
    self.send(method, &values, &types, options).await
  }

  /// `call` with textual arguments and type tags.
  pub async fn call_literals<S: AsRef<str>, T: AsRef<str>, U: AsRef<str>>(
    &self,
    method: &str,
    args: &[S],
    tags: &[T],
    output_tags: &[U],
  ) -> Result<CallOutput> {
    let types = AbiType::parse_all(tags)?;
    let outputs = AbiType::parse_all(output_tags)?;
    let values = codec::coerce_args(&types, args)?;
    self.call(method, &values, &types, &outputs).await
  }

  /// Send a transaction and wait until it is confirmed or failed.
  pub async fn send_and_confirm(
    &self,
    method: &str,
    values: &[DynSolValue],
    types: &[AbiType],
    options: SendOptions,
  ) -> Result<Confirmation> {
    let txid = self.send(method, values, types, options).await?;
    self.query_confirmation(&txid, None).await
  }

  /// Look up a transaction once.
  pub async fn query_transaction(&self, hash: &str) -> Result<TransactionStatus> {
    self.poller.query_once(hash).await
  }

  /// Poll a transaction until final, every `interval` (configured
  /// default when `None`).
  pub async fn query_confirmation(&self, hash: &str, interval: Option<Duration>) -> Result<Confirmation> {
    self.poller
      .await_confirmation(hash, interval.unwrap_or(self.poll_interval))
      .await
  }

  fn send_payload(&self, method: &str, encoded_data: String, options: SendOptions) -> Value {
    let amount = options.amount.filter(|a| *a > 0.0).unwrap_or(0.0);
    let gas_price = options.gas_price.unwrap_or(self.defaults.gas_price);
    let gas_limit = options.gas_limit.unwrap_or(self.defaults.gas_limit);

    json!({
      "address": self.address,
      "method": method,
      "amount": amount,
      "encodedData": encoded_data,
      "txData": {
        "version": 0,
        "nonce": 1,
        "gasPrice": gas_price,
        "gasLimit": gas_limit,
      },
    })
  }
}

/// Turn a truthy `error` field of a wallet response into `SdkError::Wallet`.
pub(crate) fn check_wallet_error(response: &Value) -> Result<()> {
  let message = match response.get("error") {
    None | Some(Value::Null | Value::Bool(false)) => return Ok(()),
    Some(Value::String(s)) if s.is_empty() => return Ok(()),
    Some(Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
  };
  warn!(error = %message, "Wallet rejected request");
  Err(SdkError::Wallet(message))
}

/// Output binding that is released even if the call future is dropped.
struct BindingGuard<'a> {
  bindings: &'a OutputBindings,
  id: CorrelationId,
}

impl<'a> BindingGuard<'a> {
  fn bind(bindings: &'a OutputBindings, id: &CorrelationId, types: Vec<AbiType>) -> Self {
    bindings.bind(id, types);
    Self {
      bindings,
      id: id.clone(),
    }
  }

  /// Consume the binding.
  fn take(self) -> Vec<AbiType> {
    self.bindings.take(&self.id).unwrap_or_default()
  }
}

impl Drop for BindingGuard<'_> {
  fn drop(&mut self) {
    self.bindings.take(&self.id);
  }
}
