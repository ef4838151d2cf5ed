use crate::constants::{BAZE_TOKEN, MUSD_TOKEN};
use alloy::primitives::Address;

/// Accepted payment tokens, identified by the backend's numeric token id.
///
/// Ids outside the registry map to [`TokenKind::Unknown`]; an unrecognized
/// id is not a currency and is never silently relabeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    MUsd,
    Baze,
    Neu,
    Unknown,
}

impl TokenKind {
    pub fn from_id(id: u64) -> Self {
        match id {
            1 => TokenKind::MUsd,
            2 => TokenKind::Baze,
            3 => TokenKind::Neu,
            _ => TokenKind::Unknown,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TokenKind::MUsd => "mUSD",
            TokenKind::Baze => "BAZE",
            TokenKind::Neu => "NEU",
            TokenKind::Unknown => "Unknown",
        }
    }

    /// Contract address used as the approval target. Tokens without their
    /// own deployed contract fall back to the stable (mUSD) address.
    pub fn address(&self) -> Address {
        match self {
            TokenKind::Baze => BAZE_TOKEN,
            TokenKind::MUsd | TokenKind::Neu | TokenKind::Unknown => MUSD_TOKEN,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
