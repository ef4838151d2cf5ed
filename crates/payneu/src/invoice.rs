use crate::token::TokenKind;
use serde::{Deserialize, Deserializer, Serialize};

/// Invoice lifecycle as reported by the backend. Only `open` and `pending`
/// invoices are payable; any other status closes the invoice to payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    #[default]
    Pending,
    Paid,
    Closed,
}

impl InvoiceStatus {
    pub fn is_payable(&self) -> bool {
        matches!(self, InvoiceStatus::Open | InvoiceStatus::Pending)
    }

    /// Map a backend status label; unrecognized labels close the invoice.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "open" => InvoiceStatus::Open,
            "pending" => InvoiceStatus::Pending,
            "paid" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Closed,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Closed => "closed",
        })
    }
}

impl<'de> Deserialize<'de> for InvoiceStatus {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(de)?;
        Ok(InvoiceStatus::from_label(&label))
    }
}

/// Invoice record owned by the backend. Read-only from the client's
/// perspective; the backend flips the status after a confirmed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    /// Token-denominated decimal amount, kept as text to avoid float drift.
    #[serde(deserialize_with = "de_decimal_string")]
    pub amount: String,
    #[serde(rename = "token_id", alias = "tokenId")]
    pub token_id: u64,
    #[serde(rename = "details", alias = "description", default)]
    pub description: String,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<Merchant>,
    #[serde(
        rename = "payment_tx_hash",
        alias = "paymentTxHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_tx_hash: Option<String>,
    #[serde(
        rename = "created_at",
        alias = "createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl Invoice {
    pub fn token(&self) -> TokenKind {
        TokenKind::from_id(self.token_id)
    }

    pub fn is_payable(&self) -> bool {
        self.status.is_payable()
    }

    pub fn merchant_name(&self) -> &str {
        self.merchant
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or("Unknown merchant")
    }
}

/// Merchant reference embedded in invoice records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
}

/// Whether the connected payer can fund an invoice, derived by the backend
/// from on-chain balances. Recomputed on every fetch; never cached across
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayerEligibility {
    /// The invoice's own token balance suffices.
    pub invoice_token_usable: bool,
    /// The BAZE fallback balance suffices for the converted amount.
    pub fallback_usable: bool,
    /// Fresher invoice status reported alongside the eligibility check,
    /// preferred over the invoice record's own status when present.
    pub status: Option<InvoiceStatus>,
}

/// Outcome of a backend-mediated settlement call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReceipt {
    pub success: bool,
    /// Settlement transaction hash, if the backend reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

/// Backends report amounts as either JSON numbers or strings.
fn de_decimal_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(serde_json::Number),
        Str(String),
    }
    Ok(match NumOrStr::deserialize(de)? {
        NumOrStr::Num(n) => n.to_string(),
        NumOrStr::Str(s) => s,
    })
}
