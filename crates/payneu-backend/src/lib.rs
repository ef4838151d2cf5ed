//! REST client for the PayNeu invoice backend.
//!
//! The backend owns invoice, merchant and token records and mediates
//! settlement; this crate is the typed client the payment flow talks to.
//! [`BackendClient`] implements [`payneu::InvoiceDirectory`], and also
//! exposes the pass-through admin endpoints (invoice creation and listing,
//! faucet minting, token registration) that sit outside the payment flow.

mod client;
mod wire;

pub use client::BackendClient;
pub use wire::{CreateInvoiceRequest, CreateTokenRequest};
