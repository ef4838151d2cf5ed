use crate::wire::{CreateInvoiceRequest, CreateTokenRequest, Envelope, PayerStatus};
use alloy::primitives::Address;
use payneu::directory::InvoiceDirectory;
use payneu::error::PayError;
use payneu::invoice::{Invoice, PayerEligibility, SettlementReceipt};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the PayNeu invoice backend.
///
/// Wraps `reqwest::Client`; cheap to clone. The backend owns all durable
/// records — this client reads them, triggers the two settlement calls, and
/// forwards the pass-through admin operations (invoice creation, faucet
/// minting, token registration).
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /invoice/{id}`.
    pub async fn invoice(&self, id: u64) -> Result<Invoice, PayError> {
        let resp = self
            .http
            .get(self.url(&format!("/invoice/{id}")))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice request failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PayError::NotFound(id));
        }
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "invoice request returned {}",
                resp.status()
            )));
        }
        let envelope: Envelope<Invoice> = resp
            .json()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice body parse failed: {e}")))?;
        Ok(envelope.data)
    }

    /// `GET /invoice` — every invoice the backend knows.
    pub async fn invoices(&self) -> Result<Vec<Invoice>, PayError> {
        let resp = self
            .http
            .get(self.url("/invoice"))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice list request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "invoice list returned {}",
                resp.status()
            )));
        }
        let envelope: Envelope<Vec<Invoice>> = resp
            .json()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice list parse failed: {e}")))?;
        Ok(envelope.data)
    }

    /// `POST /invoice` — merchant invoice creation.
    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> Result<Invoice, PayError> {
        let resp = self
            .http
            .post(self.url("/invoice"))
            .timeout(REQUEST_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice create failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "invoice create returned {}",
                resp.status()
            )));
        }
        let envelope: Envelope<Invoice> = resp
            .json()
            .await
            .map_err(|e| PayError::FetchFailed(format!("invoice create parse failed: {e}")))?;
        Ok(envelope.data)
    }

    /// `GET /payment/payer-status` — the backend's eligibility verdict for
    /// (payer, invoice). `Ok(None)` when the backend has no verdict yet;
    /// that is not a failure and keeps payment disabled.
    pub async fn payer_status(
        &self,
        payer: Address,
        invoice_id: u64,
    ) -> Result<Option<PayerEligibility>, PayError> {
        let resp = self
            .http
            .get(self.url("/payment/payer-status"))
            .query(&[
                ("address", payer.to_string()),
                ("invoiceId", invoice_id.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("payer status request failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "payer status returned {}",
                resp.status()
            )));
        }
        let envelope: Envelope<PayerStatus> = match resp.json().await {
            Ok(envelope) => envelope,
            // An unreadable verdict is "no verdict", not a transport error.
            Err(e) => {
                tracing::debug!(invoice = invoice_id, error = %e, "unparseable payer status");
                return Ok(None);
            }
        };
        Ok(envelope.data.into_eligibility())
    }

    /// `POST /token/faucet` — mint test tokens to an address.
    pub async fn mint(&self, to: Address, amount: f64, token: Address) -> Result<(), PayError> {
        let resp = self
            .http
            .post(self.url("/token/faucet"))
            .query(&[
                ("to", to.to_string()),
                ("amount", amount.to_string()),
                ("tokenAddress", token.to_string()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("faucet request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "faucet returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// `POST /token` — register a new accepted token.
    pub async fn register_token(&self, request: &CreateTokenRequest) -> Result<(), PayError> {
        let resp = self
            .http
            .post(self.url("/token"))
            .timeout(REQUEST_TIMEOUT)
            .json(request)
            .send()
            .await
            .map_err(|e| PayError::FetchFailed(format!("token create failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PayError::FetchFailed(format!(
                "token create returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Shared settlement POST: any non-success response or an explicit
    /// `success: false` receipt is a settlement failure. A 2xx response
    /// without a parseable receipt counts as recorded.
    async fn settlement(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<SettlementReceipt, PayError> {
        let resp = self
            .http
            .post(self.url(path))
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PayError::SettlementFailed(format!("settlement request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(PayError::SettlementFailed(format!(
                "backend returned {}",
                resp.status()
            )));
        }
        let receipt = resp
            .json::<Envelope<SettlementReceipt>>()
            .await
            .map(|envelope| envelope.data)
            .unwrap_or(SettlementReceipt {
                success: true,
                transaction: None,
                error_reason: None,
            });
        if !receipt.success {
            return Err(PayError::SettlementFailed(
                receipt
                    .error_reason
                    .unwrap_or_else(|| "backend rejected the payment".to_string()),
            ));
        }
        Ok(receipt)
    }
}

impl InvoiceDirectory for BackendClient {
    async fn fetch_invoice(&self, id: u64) -> Result<Invoice, PayError> {
        self.invoice(id).await
    }

    async fn payer_eligibility(
        &self,
        payer: Address,
        invoice_id: u64,
    ) -> Result<Option<PayerEligibility>, PayError> {
        self.payer_status(payer, invoice_id).await
    }

    async fn send_stable_payment(
        &self,
        payer: Address,
        invoice_id: u64,
    ) -> Result<SettlementReceipt, PayError> {
        self.settlement(
            "/payment/send-stable",
            &[
                ("payer", payer.to_string()),
                ("invoiceId", invoice_id.to_string()),
            ],
        )
        .await
    }

    async fn convert_then_send_stable(
        &self,
        payer: Address,
        invoice_id: u64,
        asset: Address,
    ) -> Result<SettlementReceipt, PayError> {
        self.settlement(
            "/payment/convert-then-send-stable",
            &[
                ("payer", payer.to_string()),
                ("invoiceId", invoice_id.to_string()),
                ("assetAddress", asset.to_string()),
            ],
        )
        .await
    }
}
