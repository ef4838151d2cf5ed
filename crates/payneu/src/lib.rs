//! Invoice payment orchestration for the PayNeu payment system.
//!
//! A merchant issues invoices denominated in an ERC-20 token; a payer
//! settles them either directly ("stable") or by converting the BAZE asset
//! token at a fixed 10:1 rate. This crate owns the client-side flow: read
//! the invoice and the payer's eligibility, decide which payment path is
//! legal, request the ERC-20 approval, wait for confirmation depth, then
//! trigger the backend-mediated settlement.
//!
//! # Collaborators
//!
//! The two external systems are abstracted behind traits so the flow is
//! testable without a backend or a chain:
//!
//! - [`InvoiceDirectory`] — the REST backend owning invoice, merchant and
//!   eligibility records (see the `payneu-backend` crate)
//! - [`WalletGateway`] — the connected wallet and chain RPC (see the
//!   `payneu-wallet` crate)
//!
//! # Quick example
//!
//! ```no_run
//! # async fn pay<D, W>(directory: D, wallet: W) -> Result<(), payneu::PayError>
//! # where D: payneu::InvoiceDirectory, W: payneu::WalletGateway {
//! use payneu::{determine_payment_path, InvoiceDirectory, PaymentOrchestrator, WalletGateway};
//!
//! let invoice = directory.fetch_invoice(1).await?;
//! let payer = wallet.address().expect("wallet connected");
//! let eligibility = directory.payer_eligibility(payer, 1).await?.expect("verdict ready");
//!
//! if let Some(path) = determine_payment_path(&invoice, &eligibility).payable() {
//!     let mut orchestrator = PaymentOrchestrator::new(directory, wallet, invoice);
//!     let receipt = orchestrator.pay(path).await?;
//!     println!("settled: {:?}", receipt.transaction);
//! }
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod constants;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod invoice;
pub mod orchestrator;
pub mod path;
pub mod token;

pub use constants::ChainConfig;
pub use constants::*;
pub use directory::InvoiceDirectory;
pub use error::PayError;
pub use gateway::{TxHandle, WalletGateway};
pub use invoice::{Invoice, InvoiceStatus, Merchant, PayerEligibility, SettlementReceipt};
pub use orchestrator::{AttemptState, PaymentAttempt, PaymentOrchestrator};
pub use path::{determine_payment_path, PathDecision, PaymentPath};
pub use token::TokenKind;
