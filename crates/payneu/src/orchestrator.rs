//! The payment state machine.
//!
//! One orchestrator instance drives one invoice view, and at most one
//! payment attempt at a time:
//!
//! ```text
//! Idle -> ApprovalPending -> ApprovalConfirming -> Settling -> Succeeded
//!                 |                  |                 |
//!                 +------> Idle <----+             Failed
//! ```
//!
//! Approval-phase failures abort straight back to `Idle` (nothing reached
//! the backend). A settlement failure lands in `Failed` because chain state
//! has already changed: the approval spend stays on-chain and is not
//! revoked. Both `Succeeded` and `Failed` clear the in-flight marker, so a
//! fresh [`PaymentOrchestrator::initiate`] is accepted and re-runs approval
//! from scratch.
//!
//! The single ordering invariant the whole flow exists to enforce:
//! settlement is never invoked before the approval transaction reaches the
//! configured confirmation depth.

use crate::amount::approval_amount;
use crate::constants::ChainConfig;
use crate::directory::InvoiceDirectory;
use crate::error::PayError;
use crate::gateway::{TxHandle, WalletGateway};
use crate::invoice::{Invoice, SettlementReceipt};
use crate::path::PaymentPath;
use futures::StreamExt;

/// Lifecycle of the current payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// No attempt in flight; payment may be initiated.
    Idle,
    /// Approval handed to the wallet, awaiting broadcast.
    ApprovalPending,
    /// Approval broadcast; watching confirmations.
    ApprovalConfirming,
    /// Required depth reached; settlement call in flight.
    Settling,
    /// Settlement recorded by the backend.
    Succeeded,
    /// Settlement rejected after a confirmed approval.
    Failed,
}

impl AttemptState {
    /// States in which a second initiation must be rejected.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            AttemptState::ApprovalPending
                | AttemptState::ApprovalConfirming
                | AttemptState::Settling
        )
    }
}

/// The ephemeral record of one payment attempt. Created on initiation and
/// replaced wholesale by the next one.
#[derive(Debug, Clone)]
pub struct PaymentAttempt {
    pub path: PaymentPath,
    pub approval_tx: Option<TxHandle>,
    /// Highest confirmation count observed for the approval.
    pub confirmations: u64,
    /// Set once the backend records the settlement.
    pub receipt: Option<SettlementReceipt>,
}

/// Drives a payer's invoice settlement: approval request, confirmation
/// wait, then exactly one backend-mediated settlement call.
///
/// Constructed fresh per invoice view; the in-flight marker it owns is the
/// only mutable shared state in the flow and is never shared across views.
pub struct PaymentOrchestrator<D, W> {
    directory: D,
    wallet: W,
    config: ChainConfig,
    invoice: Invoice,
    state: AttemptState,
    attempt: Option<PaymentAttempt>,
}

impl<D: InvoiceDirectory, W: WalletGateway> PaymentOrchestrator<D, W> {
    pub fn new(directory: D, wallet: W, invoice: Invoice) -> Self {
        Self::with_config(directory, wallet, invoice, ChainConfig::default())
    }

    pub fn with_config(directory: D, wallet: W, invoice: Invoice, config: ChainConfig) -> Self {
        Self {
            directory,
            wallet,
            config,
            invoice,
            state: AttemptState::Idle,
            attempt: None,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// The current (or most recent) attempt.
    pub fn attempt(&self) -> Option<&PaymentAttempt> {
        self.attempt.as_ref()
    }

    /// Start a new payment attempt: compute the approval amount for `path`
    /// and submit the ERC-20 approval to the wallet.
    ///
    /// Rejected with `PreconditionFailed` when no wallet is connected or an
    /// attempt is already in flight for this invoice; in both cases nothing
    /// is submitted. A wallet or RPC failure during submission aborts the
    /// attempt back to `Idle` — it never reaches settlement.
    pub async fn initiate(&mut self, path: PaymentPath) -> Result<TxHandle, PayError> {
        if self.wallet.address().is_none() {
            return Err(PayError::PreconditionFailed(
                "no wallet connected".to_string(),
            ));
        }
        if self.state.is_in_flight() {
            return Err(PayError::PreconditionFailed(format!(
                "a payment attempt is already in flight for invoice {}",
                self.invoice.id
            )));
        }

        let amount = approval_amount(&self.invoice.amount, path)?;
        let token = match path {
            PaymentPath::Stable => self.config.token_address(self.invoice.token()),
            PaymentPath::AssetFallback => self.config.fallback_token,
        };

        self.state = AttemptState::ApprovalPending;
        self.attempt = Some(PaymentAttempt {
            path,
            approval_tx: None,
            confirmations: 0,
            receipt: None,
        });

        tracing::info!(
            invoice = self.invoice.id,
            ?path,
            %token,
            %amount,
            "submitting approval"
        );
        match self
            .wallet
            .approve_spend(token, self.config.payment_contract, amount)
            .await
        {
            Ok(tx) => {
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.approval_tx = Some(tx);
                }
                self.state = AttemptState::ApprovalConfirming;
                tracing::info!(invoice = self.invoice.id, %tx, "approval broadcast");
                Ok(tx)
            }
            Err(e) => {
                self.state = AttemptState::Idle;
                tracing::warn!(invoice = self.invoice.id, error = %e, "approval submission failed");
                Err(e)
            }
        }
    }

    /// Watch the approval transaction until it reaches the configured
    /// confirmation depth, then stop watching. A watch error or a stream
    /// that ends early aborts the attempt to `Idle`.
    pub async fn await_approval(&mut self) -> Result<(), PayError> {
        if self.state != AttemptState::ApprovalConfirming {
            return Err(PayError::PreconditionFailed(
                "no approval awaiting confirmation".to_string(),
            ));
        }
        let tx = self
            .attempt
            .as_ref()
            .and_then(|a| a.approval_tx)
            .ok_or_else(|| {
                PayError::PreconditionFailed("attempt has no approval transaction".to_string())
            })?;

        let depth = self.config.confirmation_depth;
        let stream = self.wallet.watch_confirmations(tx);
        futures::pin_mut!(stream);
        while let Some(observed) = stream.next().await {
            match observed {
                Ok(count) => {
                    if let Some(attempt) = self.attempt.as_mut() {
                        attempt.confirmations = count;
                    }
                    tracing::debug!(invoice = self.invoice.id, %tx, count, "confirmation observed");
                    if count >= depth {
                        // Reaching the target depth is the unsubscribe point.
                        self.state = AttemptState::Settling;
                        return Ok(());
                    }
                }
                Err(e) => {
                    self.state = AttemptState::Idle;
                    tracing::warn!(invoice = self.invoice.id, %tx, error = %e, "confirmation watch failed");
                    return Err(PayError::ApprovalFailed(e.to_string()));
                }
            }
        }
        self.state = AttemptState::Idle;
        Err(PayError::ApprovalFailed(format!(
            "confirmation watch ended before depth {depth}"
        )))
    }

    /// Trigger exactly one backend settlement call for the confirmed
    /// approval: the direct stable payment, or the convert-then-pay call
    /// with the fallback token, depending on the attempt's path.
    pub async fn settle(&mut self) -> Result<SettlementReceipt, PayError> {
        if self.state != AttemptState::Settling {
            return Err(PayError::PreconditionFailed(
                "approval is not confirmed".to_string(),
            ));
        }
        let payer = self.wallet.address().ok_or_else(|| {
            PayError::PreconditionFailed("no wallet connected".to_string())
        })?;
        let path = self
            .attempt
            .as_ref()
            .map(|a| a.path)
            .ok_or_else(|| PayError::PreconditionFailed("no attempt in flight".to_string()))?;

        let result = match path {
            PaymentPath::Stable => {
                self.directory
                    .send_stable_payment(payer, self.invoice.id)
                    .await
            }
            PaymentPath::AssetFallback => {
                self.directory
                    .convert_then_send_stable(payer, self.invoice.id, self.config.fallback_token)
                    .await
            }
        };

        match result {
            Ok(receipt) if receipt.success => {
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.receipt = Some(receipt.clone());
                }
                self.state = AttemptState::Succeeded;
                tracing::info!(
                    invoice = self.invoice.id,
                    amount = %self.invoice.amount,
                    token = %self.invoice.token(),
                    "payment settled"
                );
                Ok(receipt)
            }
            Ok(receipt) => {
                self.state = AttemptState::Failed;
                let reason = receipt
                    .error_reason
                    .unwrap_or_else(|| "backend rejected the payment".to_string());
                tracing::warn!(invoice = self.invoice.id, %reason, "settlement rejected");
                Err(PayError::SettlementFailed(reason))
            }
            Err(e) => {
                self.state = AttemptState::Failed;
                tracing::warn!(invoice = self.invoice.id, error = %e, "settlement call failed");
                Err(e)
            }
        }
    }

    /// Drive a full attempt: approval submission, confirmation wait,
    /// settlement. Retrying after any failure is a fresh call to this
    /// method and re-runs approval from scratch.
    pub async fn pay(&mut self, path: PaymentPath) -> Result<SettlementReceipt, PayError> {
        self.initiate(path).await?;
        self.await_approval().await?;
        self.settle().await
    }
}
