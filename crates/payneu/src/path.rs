use crate::invoice::{Invoice, PayerEligibility};

/// Payment path taken by an attempt once one is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPath {
    /// Pay directly in the invoice's own token.
    Stable,
    /// Pay with the BAZE fallback token, converted at the fixed rate.
    AssetFallback,
}

/// Outcome of the path decision for an (invoice, eligibility) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDecision {
    /// Invoice status is not payable; no payment is offered.
    Closed,
    /// Neither token balance suffices; no payment is offered.
    Unavailable,
    /// Pay with the fallback token.
    AssetFallback,
    /// Pay directly in the invoice token.
    Stable,
}

impl PathDecision {
    /// The concrete path to run, if any payment is offered at all.
    pub fn payable(&self) -> Option<PaymentPath> {
        match self {
            PathDecision::Stable => Some(PaymentPath::Stable),
            PathDecision::AssetFallback => Some(PaymentPath::AssetFallback),
            PathDecision::Closed | PathDecision::Unavailable => None,
        }
    }
}

/// Decide which payment path is legal. Pure and deterministic: the status
/// gate is checked first, then the eligibility flags in priority order.
pub fn determine_payment_path(invoice: &Invoice, eligibility: &PayerEligibility) -> PathDecision {
    if !invoice.is_payable() {
        return PathDecision::Closed;
    }
    match (
        eligibility.invoice_token_usable,
        eligibility.fallback_usable,
    ) {
        (false, false) => PathDecision::Unavailable,
        (false, true) => PathDecision::AssetFallback,
        (true, _) => PathDecision::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;

    fn invoice(status: InvoiceStatus) -> Invoice {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "amount": "100",
            "token_id": 1,
            "details": "Payment Request",
            "status": match status {
                InvoiceStatus::Open => "open",
                InvoiceStatus::Pending => "pending",
                InvoiceStatus::Paid => "paid",
                InvoiceStatus::Closed => "closed",
            },
        }))
        .unwrap()
    }

    fn eligibility(invoice_token: bool, fallback: bool) -> PayerEligibility {
        PayerEligibility {
            invoice_token_usable: invoice_token,
            fallback_usable: fallback,
            status: None,
        }
    }

    #[test]
    fn test_closed_statuses_always_win() {
        // Status gate beats every eligibility combination.
        for status in [InvoiceStatus::Paid, InvoiceStatus::Closed] {
            for invoice_token in [false, true] {
                for fallback in [false, true] {
                    assert_eq!(
                        determine_payment_path(
                            &invoice(status),
                            &eligibility(invoice_token, fallback)
                        ),
                        PathDecision::Closed,
                    );
                }
            }
        }
    }

    #[test]
    fn test_eligibility_table_on_open_invoice() {
        let open = invoice(InvoiceStatus::Open);
        assert_eq!(
            determine_payment_path(&open, &eligibility(false, false)),
            PathDecision::Unavailable
        );
        assert_eq!(
            determine_payment_path(&open, &eligibility(false, true)),
            PathDecision::AssetFallback
        );
        assert_eq!(
            determine_payment_path(&open, &eligibility(true, false)),
            PathDecision::Stable
        );
        assert_eq!(
            determine_payment_path(&open, &eligibility(true, true)),
            PathDecision::Stable
        );
    }

    #[test]
    fn test_pending_counts_as_open() {
        assert_eq!(
            determine_payment_path(&invoice(InvoiceStatus::Pending), &eligibility(true, false)),
            PathDecision::Stable
        );
    }

    #[test]
    fn test_decision_is_idempotent() {
        let inv = invoice(InvoiceStatus::Open);
        let elig = eligibility(false, true);
        let first = determine_payment_path(&inv, &elig);
        let second = determine_payment_path(&inv, &elig);
        assert_eq!(first, second);
    }

    #[test]
    fn test_payable_projection() {
        assert_eq!(PathDecision::Stable.payable(), Some(PaymentPath::Stable));
        assert_eq!(
            PathDecision::AssetFallback.payable(),
            Some(PaymentPath::AssetFallback)
        );
        assert_eq!(PathDecision::Closed.payable(), None);
        assert_eq!(PathDecision::Unavailable.payable(), None);
    }
}
