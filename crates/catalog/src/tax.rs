//! Tax-aware derivation between base (pre-tax) and sell (post-tax) prices.
//!
//! Tax codes are opaque `"<code>@<percent>"` labels; only the percentage
//! matters here. Nothing in this module is jurisdiction-aware.

use serde::{Deserialize, Serialize};

use dailyround_core::ValueObject;

/// A parsed `"<code>@<percent>"` token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCode {
    pub code: String,
    pub percent: f64,
}

impl ValueObject for TaxCode {}

impl TaxCode {
    /// Parse a token, returning `None` for malformed input: missing `@`,
    /// blank code, non-numeric, negative or non-finite percent.
    pub fn parse(token: &str) -> Option<Self> {
        let (code, percent) = token.rsplit_once('@')?;
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        let percent: f64 = percent.trim().parse().ok()?;
        if !percent.is_finite() || percent < 0.0 {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            percent,
        })
    }

    pub fn token(&self) -> String {
        format!("{}@{}", self.code, self.percent)
    }
}

/// Sum of the percentages of every well-formed token. Malformed tokens
/// contribute nothing.
pub fn aggregate_tax_rate<S: AsRef<str>>(tax_codes: &[S]) -> f64 {
    tax_codes
        .iter()
        .filter_map(|token| {
            let parsed = TaxCode::parse(token.as_ref());
            if parsed.is_none() {
                tracing::warn!(token = token.as_ref(), "skipping malformed tax code");
            }
            parsed
        })
        .map(|code| code.percent)
        .sum()
}

pub fn derive_sell_from_base(base: f64, tax_rate_percent: f64) -> f64 {
    base * (1.0 + tax_rate_percent / 100.0)
}

pub fn derive_base_from_sell(sell: f64, tax_rate_percent: f64) -> f64 {
    sell / (1.0 + tax_rate_percent / 100.0)
}

/// The price field a user is editing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Base,
    Sell,
}

/// A base/sell pair kept consistent at one tax rate.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPrices {
    pub base: f64,
    pub sell: f64,
}

/// Derive the other price from the one being edited.
///
/// The edited value is returned untouched; only the opposite field is
/// computed. Pure, so repeated calls with the same inputs agree, and there is
/// no path by which its output feeds back into another derivation.
pub fn recompute_linked_price(
    edited: PriceField,
    edited_value: f64,
    tax_rate_percent: f64,
) -> LinkedPrices {
    match edited {
        PriceField::Base => LinkedPrices {
            base: edited_value,
            sell: derive_sell_from_base(edited_value, tax_rate_percent),
        },
        PriceField::Sell => LinkedPrices {
            base: derive_base_from_sell(edited_value, tax_rate_percent),
            sell: edited_value,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_tokens() {
        let code = TaxCode::parse("GST@5").unwrap();
        assert_eq!(code.code, "GST");
        assert_eq!(code.percent, 5.0);
        assert_eq!(TaxCode::parse("CESS@0.5").unwrap().percent, 0.5);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(TaxCode::parse("GST5"), None);
        assert_eq!(TaxCode::parse("GST@five"), None);
        assert_eq!(TaxCode::parse("GST@-3"), None);
        assert_eq!(TaxCode::parse("GST@NaN"), None);
        assert_eq!(TaxCode::parse("GST@inf"), None);
    }

    #[test]
    fn blank_codes_are_malformed() {
        assert_eq!(TaxCode::parse("@5"), None);
        assert_eq!(TaxCode::parse("  @5"), None);
        assert_eq!(aggregate_tax_rate(&["@5", "GST@5"]), 5.0);
    }

    #[test]
    fn aggregate_skips_malformed_tokens() {
        let codes = ["CGST@2.5", "SGST@2.5", "broken", "X@y"];
        assert_eq!(aggregate_tax_rate(&codes), 5.0);
        assert_eq!(aggregate_tax_rate::<&str>(&[]), 0.0);
    }

    #[test]
    fn derives_sell_and_base() {
        assert!((derive_sell_from_base(100.0, 18.0) - 118.0).abs() < 1e-9);
        assert!((derive_base_from_sell(118.0, 18.0) - 100.0).abs() < 1e-9);
        assert_eq!(derive_sell_from_base(50.0, 0.0), 50.0);
    }

    #[test]
    fn recompute_never_touches_the_edited_field() {
        let from_base = recompute_linked_price(PriceField::Base, 100.0, 12.0);
        assert_eq!(from_base.base, 100.0);
        assert!((from_base.sell - 112.0).abs() < 1e-9);

        let from_sell = recompute_linked_price(PriceField::Sell, 112.0, 12.0);
        assert_eq!(from_sell.sell, 112.0);
        assert!((from_sell.base - 100.0).abs() < 1e-9);
    }

    #[test]
    fn recompute_is_idempotent() {
        let a = recompute_linked_price(PriceField::Sell, 99.99, 7.5);
        let b = recompute_linked_price(PriceField::Sell, 99.99, 7.5);
        assert_eq!(a, b);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: base -> sell -> base returns the original base.
            #[test]
            fn base_sell_base_is_identity(base in 0.0f64..1_000_000.0, rate in 0.0f64..100.0) {
                let back = derive_base_from_sell(derive_sell_from_base(base, rate), rate);
                prop_assert!((back - base).abs() <= 1e-9 * base.max(1.0));
            }

            /// Property: the edited side is preserved bit-for-bit.
            #[test]
            fn edited_value_is_preserved(value in 0.0f64..1_000_000.0, rate in 0.0f64..100.0) {
                prop_assert_eq!(recompute_linked_price(PriceField::Base, value, rate).base, value);
                prop_assert_eq!(recompute_linked_price(PriceField::Sell, value, rate).sell, value);
            }
        }
    }
}
