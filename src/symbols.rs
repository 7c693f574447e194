// =============================================================================
// Symbol helpers
// =============================================================================

use crate::error::CoreError;

/// Upper bound on securities compared side by side.
pub const MAX_SYMBOLS: usize = 10;

/// Crypto bases quoted as `BASE-COUNTER` rather than `BASECOUNTER=X`.
const CRYPTO_BASES: [&str; 3] = ["BTC", "ETH", "USDT"];

/// Parse a comma-separated symbol list typed by a user.
///
/// Blank entries are dropped, symbols are upper-cased and de-duplicated
/// (first occurrence wins), and at most [`MAX_SYMBOLS`] are kept.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for sym in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if sym.is_empty() || out.contains(&sym) {
            continue;
        }
        out.push(sym);
        if out.len() == MAX_SYMBOLS {
            break;
        }
    }
    out
}

/// Build the provider symbol for a currency pair.
pub fn forex_symbol(base: &str, counter: &str) -> Result<String, CoreError> {
    let base = base.trim().to_uppercase();
    let counter = counter.trim().to_uppercase();
    if base.is_empty() || counter.is_empty() {
        return Err(CoreError::invalid("currency", "base and counter must be non-empty"));
    }
    if base == counter {
        return Err(CoreError::invalid(
            "currency",
            format!("base and counter are both `{base}`"),
        ));
    }

    if CRYPTO_BASES.contains(&base.as_str()) {
        Ok(format!("{base}-{counter}"))
    } else {
        Ok(format!("{base}{counter}=X"))
    }
}
