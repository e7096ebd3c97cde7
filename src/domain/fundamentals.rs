//! Point-in-time fundamentals and the default-substitution policy.
//!
//! Every field of a [`FundamentalsSnapshot`] may be absent. [`FundamentalsSnapshot::resolve`]
//! turns the snapshot into concrete values:
//! - numeric ratios and amounts default to 0
//! - sector defaults to `"N/A"`
//! - market cap defaults to `latest_close * shares_outstanding` (0 if that is missing too)
//! - dividend yield and payout ratio are rescaled from fractions to percentages

use tracing::debug;

pub const SECTOR_UNKNOWN: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundamentalsSnapshot {
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub beta: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFundamentals {
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub eps: f64,
    /// Percent.
    pub dividend_yield: f64,
    /// Percent.
    pub dividend_payout_ratio: f64,
    pub beta: f64,
    pub pb_ratio: f64,
    pub de_ratio: f64,
    pub free_cash_flow: f64,
    pub sector: String,
}

impl FundamentalsSnapshot {
    pub fn resolve(&self, latest_close: f64) -> ResolvedFundamentals {
        let market_cap = match self.market_cap {
            Some(cap) if cap.is_finite() => cap,
            _ => {
                let shares = or_zero("sharesOutstanding", self.shares_outstanding);
                debug!(latest_close, shares, "marketCap missing, derived from close");
                latest_close * shares
            }
        };

        let sector = match &self.sector {
            Some(s) => s.clone(),
            None => {
                debug!(field = "sector", "fundamentals field missing, using N/A");
                SECTOR_UNKNOWN.to_string()
            }
        };

        ResolvedFundamentals {
            market_cap,
            pe_ratio: or_zero("trailingPE", self.trailing_pe),
            eps: or_zero("trailingEps", self.trailing_eps),
            dividend_yield: or_zero("dividendYield", self.dividend_yield) * 100.0,
            dividend_payout_ratio: or_zero("payoutRatio", self.payout_ratio) * 100.0,
            beta: or_zero("beta", self.beta),
            pb_ratio: or_zero("priceToBook", self.price_to_book),
            de_ratio: or_zero("debtToEquity", self.debt_to_equity),
            free_cash_flow: or_zero("freeCashflow", self.free_cash_flow),
            sector,
        }
    }
}

/// Non-finite provider values are treated the same as missing ones.
fn or_zero(field: &'static str, value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => {
            debug!(field, "fundamentals field missing, using 0");
            0.0
        }
    }
}
