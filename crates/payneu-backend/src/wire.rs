//! Wire shapes of the backend's REST responses and request bodies.

use payneu::invoice::{InvoiceStatus, PayerEligibility};
use serde::{Deserialize, Serialize};

/// Backend responses wrap their payload in a `data` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Body of `GET /payment/payer-status`.
///
/// The backend reports eligibility as UI hints: `options.invoiceToken` says
/// whether the invoice's own token balance suffices, and
/// `options.tokenOptions.bazed` whether the BAZE fallback balance covers the
/// converted amount. A missing `options` block means the backend has no
/// verdict yet.
#[derive(Debug, Deserialize)]
pub(crate) struct PayerStatus {
    #[serde(default)]
    pub ui: Option<PayerStatusUi>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayerStatusUi {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub options: Option<PayerOptions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayerOptions {
    #[serde(rename = "invoiceToken", default = "default_true")]
    pub invoice_token: bool,
    #[serde(rename = "tokenOptions", default)]
    pub token_options: TokenOptions,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenOptions {
    #[serde(default)]
    pub bazed: bool,
}

fn default_true() -> bool {
    true
}

impl PayerStatus {
    /// Collapse the UI hints into an eligibility verdict, or `None` when
    /// the backend has not produced one.
    pub fn into_eligibility(self) -> Option<PayerEligibility> {
        let ui = self.ui?;
        let options = ui.options?;
        Some(PayerEligibility {
            invoice_token_usable: options.invoice_token,
            fallback_usable: options.token_options.bazed,
            status: ui.status.as_deref().map(InvoiceStatus::from_label),
        })
    }
}

/// Body of `POST /invoice`. Field names are the backend's snake_case; the
/// amount travels as a JSON number like the original admin form sends it.
#[derive(Debug, Clone, Serialize)]
pub struct CreateInvoiceRequest {
    pub details: String,
    pub merchant_id: u64,
    pub token_id: u64,
    pub amount: f64,
}

/// Body of `POST /token`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTokenRequest {
    pub address: String,
    pub name: String,
}
