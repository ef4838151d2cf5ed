use alloy::primitives::Address;
use payneu::ChainConfig;
use std::env;

/// Application configuration, read from the environment (and `.env` via
/// dotenvy in `main`). Everything has a sensible default except the payer
/// key, whose absence simply means no wallet is connected.
#[derive(Clone)]
pub struct AppConfig {
    /// Invoice backend base URL.
    pub backend_url: String,
    /// Chain RPC endpoint.
    pub rpc_url: String,
    /// Payer private key; `None` = no wallet connected.
    pub private_key: Option<String>,
    /// Payment contract granted spend approval.
    pub payment_contract: Address,
    /// Confirmation depth required before settlement.
    pub confirmation_depth: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_url", &self.backend_url)
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("payment_contract", &self.payment_contract)
            .field("confirmation_depth", &self.confirmation_depth)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url =
            env::var("BACKEND_URL").unwrap_or_else(|_| payneu::BACKEND_URL.to_string());
        url::Url::parse(&backend_url).map_err(|_| ConfigError::InvalidUrl(backend_url.clone()))?;

        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| payneu::RPC_URL.to_string());
        url::Url::parse(&rpc_url).map_err(|_| ConfigError::InvalidUrl(rpc_url.clone()))?;

        let private_key = env::var("EVM_PRIVATE_KEY").ok().filter(|s| !s.is_empty());

        let payment_contract = match env::var("PAYMENT_CONTRACT") {
            Ok(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(s))?,
            Err(_) => payneu::PAYMENT_CONTRACT,
        };

        let confirmation_depth = env::var("CONFIRMATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(payneu::CONFIRMATION_DEPTH);

        Ok(Self {
            backend_url,
            rpc_url,
            private_key,
            payment_contract,
            confirmation_depth,
        })
    }

    /// Chain configuration with this app's overrides applied.
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            payment_contract: self.payment_contract,
            confirmation_depth: self.confirmation_depth,
            rpc_url: self.rpc_url.clone(),
            ..ChainConfig::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
