use crate::error::PayError;
use crate::invoice::{Invoice, PayerEligibility, SettlementReceipt};
use alloy::primitives::Address;
use std::future::Future;

/// Source of truth for invoice and payer-eligibility records, and the
/// mediator that records settlements. Owned by the REST backend; this
/// client only reads records and triggers the two settlement calls.
pub trait InvoiceDirectory: Send + Sync {
    /// Fetch one invoice. `NotFound` when the id is unknown, `FetchFailed`
    /// on transport errors.
    fn fetch_invoice(&self, id: u64) -> impl Future<Output = Result<Invoice, PayError>> + Send;

    /// Eligibility of `payer` for an invoice. `None` means the backend has
    /// no verdict yet; callers keep payment disabled rather than treating
    /// the absence as a failure.
    fn payer_eligibility(
        &self,
        payer: Address,
        invoice_id: u64,
    ) -> impl Future<Output = Result<Option<PayerEligibility>, PayError>> + Send;

    /// Settle an invoice directly in its own token. Must only be called
    /// after the corresponding approval is confirmed.
    fn send_stable_payment(
        &self,
        payer: Address,
        invoice_id: u64,
    ) -> impl Future<Output = Result<SettlementReceipt, PayError>> + Send;

    /// Settle an invoice by converting the payer's asset token. Must only
    /// be called after the corresponding approval is confirmed.
    fn convert_then_send_stable(
        &self,
        payer: Address,
        invoice_id: u64,
        asset: Address,
    ) -> impl Future<Output = Result<SettlementReceipt, PayError>> + Send;
}
