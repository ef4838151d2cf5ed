use crate::error::PayError;
use alloy::primitives::{Address, TxHash, U256};
use futures::Stream;
use std::future::Future;

/// Handle to a broadcast-but-unconfirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle(pub TxHash);

impl std::fmt::Display for TxHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The connected wallet and its chain RPC: holds the payer account, signs
/// and broadcasts the ERC-20 approval, and reports confirmation depth.
pub trait WalletGateway: Send + Sync {
    /// Connected account, or `None` when no wallet is connected.
    fn address(&self) -> Option<Address>;

    /// Submit `approve(spender, amount)` against `token`. Resolves once the
    /// transaction is broadcast; it does not wait for inclusion.
    /// A declined signature surfaces as `ApprovalRejected`, transport and
    /// RPC errors as `ApprovalFailed`.
    fn approve_spend(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxHandle, PayError>> + Send;

    /// Lazy, restartable stream of increasing confirmation counts for a
    /// broadcast transaction. Unbounded; the consumer stops reading (and
    /// drops the stream) once its target depth is reached.
    fn watch_confirmations(
        &self,
        tx: TxHandle,
    ) -> impl Stream<Item = Result<u64, PayError>> + Send;
}
