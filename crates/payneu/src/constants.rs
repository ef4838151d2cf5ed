use alloy::primitives::Address;

/// Base Sepolia chain ID.
pub const CHAIN_ID: u64 = 84532;

/// CAIP-2 network identifier for Base Sepolia.
pub const NETWORK: &str = "eip155:84532";

/// Payment contract granted spend approval before every settlement.
pub const PAYMENT_CONTRACT: Address = Address::new([
    0x00, 0xc8, 0xc5, 0x29, 0xad, 0x8c, 0x6d, 0xc3, 0x69, 0x34, 0x92, 0x72, 0x52, 0xc6, 0x9d, 0xf1,
    0xc0, 0x03, 0xf7, 0x97,
]);

/// mUSD stable token on Base Sepolia.
pub const MUSD_TOKEN: Address = Address::new([
    0x35, 0x43, 0x51, 0x20, 0xc2, 0xcf, 0x51, 0xf7, 0xf1, 0x22, 0xf2, 0xb3, 0x7b, 0xda, 0x3b, 0xbc,
    0x68, 0x68, 0x31, 0xde,
]);

/// BAZE asset token on Base Sepolia, accepted as the conversion fallback.
pub const BAZE_TOKEN: Address = Address::new([
    0x8e, 0xc7, 0xd8, 0x93, 0xf5, 0x7b, 0x6a, 0x7c, 0x83, 0x7b, 0xc9, 0x3c, 0xfb, 0x4c, 0x01, 0xb8,
    0x0f, 0x58, 0xba, 0x6b,
]);

/// Both accepted tokens carry 18 decimal places.
pub const TOKEN_DECIMALS: u8 = 18;

/// Confirmation depth an approval must reach before settlement is triggered.
pub const CONFIRMATION_DEPTH: u64 = 2;

/// Fixed conversion rate for the asset path: 1 invoice-token unit = 10 BAZE.
pub const ASSET_UNITS_PER_STABLE: u64 = 10;

/// Default RPC endpoint for Base Sepolia.
pub const RPC_URL: &str = "https://sepolia.base.org";

/// Block explorer base URL.
pub const EXPLORER_BASE: &str = "https://sepolia.basescan.org";

/// Default invoice backend endpoint.
pub const BACKEND_URL: &str = "http://localhost:3000";

/// Runtime chain configuration. Decouples the payment flow from
/// compile-time constants so test and alternate deployments can override
/// addresses and the confirmation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub network: String,
    pub payment_contract: Address,
    pub stable_token: Address,
    pub fallback_token: Address,
    pub token_decimals: u8,
    pub confirmation_depth: u64,
    pub rpc_url: String,
    pub explorer_base: String,
}

impl Default for ChainConfig {
    /// Defaults to the Base Sepolia deployment.
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID,
            network: NETWORK.to_string(),
            payment_contract: PAYMENT_CONTRACT,
            stable_token: MUSD_TOKEN,
            fallback_token: BAZE_TOKEN,
            token_decimals: TOKEN_DECIMALS,
            confirmation_depth: CONFIRMATION_DEPTH,
            rpc_url: RPC_URL.to_string(),
            explorer_base: EXPLORER_BASE.to_string(),
        }
    }
}

impl ChainConfig {
    /// Contract address used as the approval target for a token.
    /// Unrecognized tokens fall back to the stable (mUSD) contract.
    pub fn token_address(&self, token: crate::token::TokenKind) -> Address {
        use crate::token::TokenKind;
        match token {
            TokenKind::Baze => self.fallback_token,
            TokenKind::MUsd | TokenKind::Neu | TokenKind::Unknown => self.stable_token,
        }
    }
}
