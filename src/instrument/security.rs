use serde::{Deserialize, Serialize};

//a tradable listing, e.g. jp.stock.3405
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    //full symbol (eg jp.stock.3405)
    symbol: String,

    //listing code, the last dotted segment (eg 3405)
    code: String,

    //minimum tradable share multiple
    unit: i64,
}

impl Security {
    pub fn new(symbol: impl Into<String>, unit: i64) -> Self {
        let symbol = symbol.into();
        let code = match symbol.rsplit_once('.') {
            Some((_, code)) => code.to_string(),
            None => symbol.clone(),
        };

        Security {
            symbol,
            code,
            unit: unit.max(1),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn unit(&self) -> i64 {
        self.unit
    }

    //rounds a share count toward zero onto a multiple of the unit;
    //none when the count is not finite or does not fit in an i64
    pub fn round_to_unit(&self, shares: f64) -> Option<i64> {
        let lots = (shares / self.unit as f64).trunc();
        if !lots.is_finite() || lots.abs() >= i64::MAX as f64 {
            return None;
        }
        (lots as i64).checked_mul(self.unit)
    }
}
