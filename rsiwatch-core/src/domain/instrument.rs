use serde::{Deserialize, Serialize};

/// The watched instrument: provider symbol plus the name used in messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub display_name: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
        }
    }

    /// Instrument whose display name is its raw symbol.
    pub fn bare(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            display_name: symbol.clone(),
            symbol,
        }
    }
}
