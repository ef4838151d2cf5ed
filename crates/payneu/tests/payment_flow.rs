//! End-to-end payment attempts against mock collaborators.

use alloy::primitives::{Address, B256, U256};
use futures::{stream, Stream};
use payneu::{
    determine_payment_path, AttemptState, Invoice, InvoiceDirectory, InvoiceStatus, Merchant,
    PathDecision, PayError, PayerEligibility, PaymentOrchestrator, PaymentPath,
    SettlementReceipt, TxHandle, WalletGateway, BAZE_TOKEN, MUSD_TOKEN, PAYMENT_CONTRACT,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn open_invoice() -> Invoice {
    Invoice {
        id: 1,
        amount: "100".to_string(),
        token_id: 1,
        description: "Payment Request".to_string(),
        status: InvoiceStatus::Open,
        merchant: Some(Merchant {
            id: Some(1),
            name: "PayNeu Technology".to_string(),
        }),
        payment_tx_hash: None,
        created_at: None,
    }
}

fn eligibility(invoice_token: bool, fallback: bool) -> PayerEligibility {
    PayerEligibility {
        invoice_token_usable: invoice_token,
        fallback_usable: fallback,
        status: None,
    }
}

fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

#[derive(Default)]
struct MockDirectory {
    stable_calls: AtomicUsize,
    convert_calls: AtomicUsize,
    convert_asset: Mutex<Option<Address>>,
    fail_settlement: bool,
}

impl MockDirectory {
    fn failing() -> Self {
        Self {
            fail_settlement: true,
            ..Self::default()
        }
    }
}

impl InvoiceDirectory for &MockDirectory {
    async fn fetch_invoice(&self, _id: u64) -> Result<Invoice, PayError> {
        Ok(open_invoice())
    }

    async fn payer_eligibility(
        &self,
        _payer: Address,
        _invoice_id: u64,
    ) -> Result<Option<PayerEligibility>, PayError> {
        Ok(Some(eligibility(true, false)))
    }

    async fn send_stable_payment(
        &self,
        _payer: Address,
        _invoice_id: u64,
    ) -> Result<SettlementReceipt, PayError> {
        self.stable_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_settlement {
            return Err(PayError::SettlementFailed(
                "backend rejected the payment".to_string(),
            ));
        }
        Ok(SettlementReceipt {
            success: true,
            transaction: Some("0xsettled".to_string()),
            error_reason: None,
        })
    }

    async fn convert_then_send_stable(
        &self,
        _payer: Address,
        _invoice_id: u64,
        asset: Address,
    ) -> Result<SettlementReceipt, PayError> {
        self.convert_calls.fetch_add(1, Ordering::SeqCst);
        *self.convert_asset.lock().unwrap() = Some(asset);
        if self.fail_settlement {
            return Err(PayError::SettlementFailed(
                "backend rejected the payment".to_string(),
            ));
        }
        Ok(SettlementReceipt {
            success: true,
            transaction: Some("0xsettled".to_string()),
            error_reason: None,
        })
    }
}

struct MockWallet {
    address: Option<Address>,
    reject_approval: bool,
    /// Confirmation counts the watch stream will yield, in order.
    confirmations: Vec<u64>,
    approvals: AtomicUsize,
    last_approval: Mutex<Option<(Address, Address, U256)>>,
}

impl MockWallet {
    fn confirming(confirmations: Vec<u64>) -> Self {
        Self {
            address: Some(Address::repeat_byte(0x42)),
            reject_approval: false,
            confirmations,
            approvals: AtomicUsize::new(0),
            last_approval: Mutex::new(None),
        }
    }

    fn rejecting() -> Self {
        Self {
            reject_approval: true,
            ..Self::confirming(vec![])
        }
    }

    fn disconnected() -> Self {
        Self {
            address: None,
            ..Self::confirming(vec![1, 2])
        }
    }
}

impl WalletGateway for &MockWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    async fn approve_spend(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHandle, PayError> {
        self.approvals.fetch_add(1, Ordering::SeqCst);
        if self.reject_approval {
            return Err(PayError::ApprovalRejected(
                "user rejected the signature".to_string(),
            ));
        }
        *self.last_approval.lock().unwrap() = Some((token, spender, amount));
        Ok(TxHandle(B256::repeat_byte(0xaa)))
    }

    fn watch_confirmations(
        &self,
        _tx: TxHandle,
    ) -> impl Stream<Item = Result<u64, PayError>> + Send {
        let items: Vec<Result<u64, PayError>> =
            self.confirmations.iter().map(|&count| Ok(count)).collect();
        stream::iter(items)
    }
}

#[tokio::test]
async fn test_stable_payment_end_to_end() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::confirming(vec![1, 2]);
    let invoice = open_invoice();

    assert_eq!(
        determine_payment_path(&invoice, &eligibility(true, false)),
        PathDecision::Stable
    );

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, invoice);
    let receipt = orchestrator.pay(PaymentPath::Stable).await.unwrap();

    assert!(receipt.success);
    assert_eq!(orchestrator.state(), AttemptState::Succeeded);
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 1);
    assert_eq!(directory.convert_calls.load(Ordering::SeqCst), 0);

    let attempt = orchestrator.attempt().unwrap();
    assert_eq!(attempt.confirmations, 2);

    // approve(payment contract, 100e18) against the invoice's own token
    let (token, spender, amount) = wallet.last_approval.lock().unwrap().unwrap();
    assert_eq!(token, MUSD_TOKEN);
    assert_eq!(spender, PAYMENT_CONTRACT);
    assert_eq!(amount, units(100));
}

#[tokio::test]
async fn test_asset_fallback_payment_end_to_end() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::confirming(vec![1, 2]);
    let invoice = open_invoice();

    assert_eq!(
        determine_payment_path(&invoice, &eligibility(false, true)),
        PathDecision::AssetFallback
    );

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, invoice);
    orchestrator.pay(PaymentPath::AssetFallback).await.unwrap();

    assert_eq!(directory.convert_calls.load(Ordering::SeqCst), 1);
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        *directory.convert_asset.lock().unwrap(),
        Some(BAZE_TOKEN),
        "conversion settles against the fallback token"
    );

    // Approval covers the converted amount against the BAZE contract.
    let (token, _, amount) = wallet.last_approval.lock().unwrap().unwrap();
    assert_eq!(token, BAZE_TOKEN);
    assert_eq!(amount, units(1000));
}

#[tokio::test]
async fn test_no_path_when_neither_balance_suffices() {
    // Neither token suffices: no payment is offered, so nothing reaches
    // the wallet or the backend.
    let invoice = open_invoice();
    let decision = determine_payment_path(&invoice, &eligibility(false, false));
    assert_eq!(decision, PathDecision::Unavailable);
    assert_eq!(decision.payable(), None);
}

#[tokio::test]
async fn test_wallet_rejection_aborts_before_settlement() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::rejecting();

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    let err = orchestrator.pay(PaymentPath::Stable).await.unwrap_err();

    assert!(matches!(err, PayError::ApprovalRejected(_)));
    assert_eq!(orchestrator.state(), AttemptState::Idle);
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 0);
    assert_eq!(directory.convert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_initiation_is_rejected_while_in_flight() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::confirming(vec![1, 2]);

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    orchestrator.initiate(PaymentPath::Stable).await.unwrap();
    assert_eq!(orchestrator.state(), AttemptState::ApprovalConfirming);

    let err = orchestrator
        .initiate(PaymentPath::Stable)
        .await
        .unwrap_err();
    assert!(matches!(err, PayError::PreconditionFailed(_)));
    assert_eq!(
        wallet.approvals.load(Ordering::SeqCst),
        1,
        "no second approval is submitted"
    );
}

#[tokio::test]
async fn test_settlement_requires_confirmation_depth() {
    // The watch ends after a single confirmation: the attempt aborts and
    // settlement is never reached.
    let directory = MockDirectory::default();
    let wallet = MockWallet::confirming(vec![1]);

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    let err = orchestrator.pay(PaymentPath::Stable).await.unwrap_err();

    assert!(matches!(err, PayError::ApprovalFailed(_)));
    assert_eq!(orchestrator.state(), AttemptState::Idle);
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_settle_cannot_be_forced_before_confirmation() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::confirming(vec![1, 2]);

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    orchestrator.initiate(PaymentPath::Stable).await.unwrap();

    // Still ApprovalConfirming: a direct settle call is refused.
    let err = orchestrator.settle().await.unwrap_err();
    assert!(matches!(err, PayError::PreconditionFailed(_)));
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_wallet_means_no_attempt() {
    let directory = MockDirectory::default();
    let wallet = MockWallet::disconnected();

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    let err = orchestrator.pay(PaymentPath::Stable).await.unwrap_err();

    assert!(matches!(err, PayError::PreconditionFailed(_)));
    assert_eq!(wallet.approvals.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_settlement_failure_allows_fresh_attempt() {
    let directory = MockDirectory::failing();
    let wallet = MockWallet::confirming(vec![1, 2]);

    let mut orchestrator = PaymentOrchestrator::new(&directory, &wallet, open_invoice());
    let err = orchestrator.pay(PaymentPath::Stable).await.unwrap_err();
    assert!(matches!(err, PayError::SettlementFailed(_)));
    assert_eq!(orchestrator.state(), AttemptState::Failed);

    // Retry is a fresh attempt and re-runs approval from scratch.
    let err = orchestrator.pay(PaymentPath::Stable).await.unwrap_err();
    assert!(matches!(err, PayError::SettlementFailed(_)));
    assert_eq!(wallet.approvals.load(Ordering::SeqCst), 2);
    assert_eq!(directory.stable_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_closed_invoice_offers_no_payment() {
    let mut invoice = open_invoice();
    invoice.status = InvoiceStatus::Paid;
    for elig in [
        eligibility(true, true),
        eligibility(true, false),
        eligibility(false, true),
        eligibility(false, false),
    ] {
        assert_eq!(
            determine_payment_path(&invoice, &elig),
            PathDecision::Closed
        );
    }
}
