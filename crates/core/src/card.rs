use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Card issuers whose exports the import layer normalizes. The engine only
/// needs a stable identifier per card; format differences are resolved
/// upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Amex,
    Chase,
    CapitalOne,
    Citi,
    Discover,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Amex => write!(f, "Amex"),
            Card::Chase => write!(f, "Chase"),
            Card::CapitalOne => write!(f, "CapitalOne"),
            Card::Citi => write!(f, "Citi"),
            Card::Discover => write!(f, "Discover"),
        }
    }
}

impl FromStr for Card {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amex" | "american express" => Ok(Card::Amex),
            "chase" => Ok(Card::Chase),
            "capitalone" | "capital one" => Ok(Card::CapitalOne),
            "citi" | "citibank" => Ok(Card::Citi),
            "discover" => Ok(Card::Discover),
            other => Err(EngineError::UnknownCard(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("AMEX".parse::<Card>().unwrap(), Card::Amex);
        assert_eq!("chase".parse::<Card>().unwrap(), Card::Chase);
        assert_eq!("Capital One".parse::<Card>().unwrap(), Card::CapitalOne);
    }

    #[test]
    fn display_round_trips() {
        for card in [Card::Amex, Card::Chase, Card::CapitalOne, Card::Citi, Card::Discover] {
            assert_eq!(card.to_string().parse::<Card>().unwrap(), card);
        }
    }

    #[test]
    fn unknown_card_is_an_error() {
        assert!(matches!(
            "monzo".parse::<Card>(),
            Err(EngineError::UnknownCard(_))
        ));
    }
}
