use thiserror::Error;

/// Quote currencies recognized when a pair is typed without a separator,
/// in match priority order.
pub const QUOTE_SUFFIXES: [&str; 7] = ["USDT", "BUSD", "USDC", "BTC", "ETH", "USD", "EUR"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized pair format '{0}', use a form like BTC/USDT")]
pub struct UnrecognizedPair(pub String);

/// Turns `BTCUSDT` into `BTC/USDT`. Input that already contains `/` is
/// returned unchanged.
pub fn normalize_symbol(raw: &str) -> Result<String, UnrecognizedPair> {
    if raw.contains('/') {
        return Ok(raw.to_string());
    }
    if raw.len() <= 3 {
        return Err(UnrecognizedPair(raw.to_string()));
    }

    QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            let base = raw.strip_suffix(suffix)?;
            (!base.is_empty()).then(|| format!("{}/{}", base, suffix))
        })
        .ok_or_else(|| UnrecognizedPair(raw.to_string()))
}
