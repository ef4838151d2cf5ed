use crate::constants::{ASSET_UNITS_PER_STABLE, TOKEN_DECIMALS};
use crate::error::PayError;
use crate::path::PaymentPath;
use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::U256;

/// Convert an invoice's decimal amount into the ERC-20 approval amount in
/// smallest units (18 fractional digits).
///
/// The asset path applies the fixed conversion first: 1 invoice-token unit
/// costs 10 BAZE, so the approval covers amount x 10. The multiplication is
/// exact integer arithmetic on the scaled value; no floating point is
/// involved.
pub fn approval_amount(amount: &str, path: PaymentPath) -> Result<U256, PayError> {
    let scaled = match parse_units(amount.trim(), TOKEN_DECIMALS)
        .map_err(|e| PayError::InvalidAmount(format!("{amount:?}: {e}")))?
    {
        ParseUnits::U256(value) => value,
        ParseUnits::I256(_) => {
            return Err(PayError::InvalidAmount(format!(
                "{amount:?}: amount must not be negative"
            )))
        }
    };
    match path {
        PaymentPath::Stable => Ok(scaled),
        PaymentPath::AssetFallback => scaled
            .checked_mul(U256::from(ASSET_UNITS_PER_STABLE))
            .ok_or_else(|| PayError::InvalidAmount(format!("{amount:?}: conversion overflow"))),
    }
}
