use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of the progressive rate schedule.
///
/// `upper_bound` is `None` for the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Width of the band (`upper_bound - lower_bound`), or `None` for the
    /// unbounded top bracket.
    pub fn band_width(&self) -> Option<Decimal> {
        self.upper_bound.map(|upper| upper - self.lower_bound)
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_bound.is_none()
    }
}
