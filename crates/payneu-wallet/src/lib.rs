//! Wallet/chain gateway backed by a local private-key signer.
//!
//! Implements [`payneu::WalletGateway`]: it holds the payer account, signs
//! and broadcasts the ERC-20 `approve` that precedes every settlement, and
//! reports confirmation depth as a lazy polled stream. "No wallet
//! connected" is simply the absence of a configured key — connection state
//! lives with the caller, not here.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{
    fillers::{
        BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
    },
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use futures::Stream;
use payneu::error::PayError;
use payneu::gateway::{TxHandle, WalletGateway};
use std::time::Duration;

sol! {
    #[sol(rpc)]
    interface ERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Concrete provider type from `ProviderBuilder::new().wallet(...).connect_http(...)`.
pub type WalletProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider,
>;

/// Default delay between confirmation polls.
const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// A connected wallet: local signer plus an HTTP provider for the chain.
#[derive(Clone)]
pub struct LocalWallet {
    address: Address,
    provider: WalletProvider,
    poll_interval: Duration,
}

impl LocalWallet {
    /// Parse a hex private key (with or without the `0x` prefix) and build
    /// a signing provider against `rpc_url`.
    pub fn connect(private_key: &str, rpc_url: &str) -> Result<Self, PayError> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| PayError::ConfigError(format!("invalid private key: {e}")))?;
        let address = signer.address();

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| PayError::ConfigError(format!("invalid RPC url {rpc_url:?}: {e}")))?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        Ok(Self {
            address,
            provider,
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The signing account.
    pub fn payer(&self) -> Address {
        self.address
    }

    /// Query the ERC-20 balance of `owner`.
    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, PayError> {
        let contract = ERC20::new(token, &self.provider);
        contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| PayError::ChainError(format!("balanceOf failed: {e}")))
    }

    /// Query the ERC-20 allowance `owner` has granted to `spender`.
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, PayError> {
        let contract = ERC20::new(token, &self.provider);
        contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| PayError::ChainError(format!("allowance failed: {e}")))
    }
}

impl WalletGateway for LocalWallet {
    fn address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn approve_spend(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHandle, PayError> {
        let contract = ERC20::new(token, &self.provider);
        let pending = contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(approval_error)?;
        Ok(TxHandle(*pending.tx_hash()))
    }

    fn watch_confirmations(
        &self,
        tx: TxHandle,
    ) -> impl Stream<Item = Result<u64, PayError>> + Send {
        confirmation_stream(self.provider.clone(), tx.0, self.poll_interval)
    }
}

fn approval_error(e: alloy::contract::Error) -> PayError {
    classify_approval(format!("approve send failed: {e}"))
}

/// A declined signature is a rejection; everything else is an RPC failure.
/// Classification works off the message text the transport surfaces, which
/// is all interactive signers (e.g. JSON-RPC accounts) give us.
fn classify_approval(msg: String) -> PayError {
    let lowered = msg.to_ascii_lowercase();
    if lowered.contains("rejected") || lowered.contains("denied") {
        PayError::ApprovalRejected(msg)
    } else {
        PayError::ApprovalFailed(msg)
    }
}

/// Confirmation count once a transaction is included: the including block
/// itself counts as the first confirmation.
fn confirmations_at(latest_block: u64, included_block: u64) -> u64 {
    latest_block.saturating_sub(included_block) + 1
}

struct WatchState {
    provider: WalletProvider,
    tx: TxHash,
    interval: Duration,
    last: u64,
    first_poll: bool,
}

/// Poll the chain for a transaction's confirmation count, yielding each
/// increase. Lazy (nothing happens until polled) and unbounded; callers
/// drop the stream once their target depth is reached. RPC failures are
/// yielded as `Err` items so the caller decides whether to abort.
fn confirmation_stream(
    provider: WalletProvider,
    tx: TxHash,
    interval: Duration,
) -> impl Stream<Item = Result<u64, PayError>> + Send {
    let state = WatchState {
        provider,
        tx,
        interval,
        last: 0,
        first_poll: true,
    };
    futures::stream::unfold(state, |mut state| async move {
        loop {
            if !state.first_poll {
                tokio::time::sleep(state.interval).await;
            }
            state.first_poll = false;

            let receipt = match state.provider.get_transaction_receipt(state.tx).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    let item = Err(PayError::ChainError(format!("receipt query failed: {e}")));
                    return Some((item, state));
                }
            };
            // Not yet included; keep polling.
            let Some(receipt) = receipt else { continue };
            let Some(included) = receipt.block_number else {
                continue;
            };

            let latest = match state.provider.get_block_number().await {
                Ok(n) => n,
                Err(e) => {
                    let item = Err(PayError::ChainError(format!("block query failed: {e}")));
                    return Some((item, state));
                }
            };

            let count = confirmations_at(latest, included);
            if count > state.last {
                tracing::debug!(tx = %state.tx, count, "confirmation depth advanced");
                state.last = count;
                return Some((Ok(count), state));
            }
        }
    })
}
