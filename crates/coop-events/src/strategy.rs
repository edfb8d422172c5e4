//! Strategy and Trust Types
//!
//! The two strategies a node can hold and the sign of a trust edge.
//!
//! # Example
//!
//! ```
//! use coop_events::{Strategy, TrustSign};
//!
//! assert_eq!(Strategy::Cooperate.flipped(), Strategy::Defect);
//! assert_eq!(TrustSign::Distrusted.value(), -1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy held by a node for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Cooperate,
    Defect,
}

impl Strategy {
    /// Returns the opposite strategy.
    pub fn flipped(self) -> Self {
        match self {
            Strategy::Cooperate => Strategy::Defect,
            Strategy::Defect => Strategy::Cooperate,
        }
    }

    /// Returns true for `Cooperate`.
    pub fn is_cooperator(self) -> bool {
        matches!(self, Strategy::Cooperate)
    }

    /// Numeric code used by graph exports (1 = cooperate, 0 = defect).
    pub fn code(self) -> u8 {
        match self {
            Strategy::Cooperate => 1,
            Strategy::Defect => 0,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Cooperate => write!(f, "cooperate"),
            Strategy::Defect => write!(f, "defect"),
        }
    }
}

/// Sign of a directed trust edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustSign {
    /// +1
    Trusted,
    /// -1
    Distrusted,
}

impl TrustSign {
    /// Parses the integer label used by signed edge lists.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            1 => Some(TrustSign::Trusted),
            -1 => Some(TrustSign::Distrusted),
            _ => None,
        }
    }

    /// Returns +1.0 or -1.0.
    pub fn value(self) -> f64 {
        match self {
            TrustSign::Trusted => 1.0,
            TrustSign::Distrusted => -1.0,
        }
    }

    /// Returns the integer label (+1 / -1).
    pub fn label(self) -> i8 {
        match self {
            TrustSign::Trusted => 1,
            TrustSign::Distrusted => -1,
        }
    }

    /// Strategy this sign pushes a node toward in the trust game.
    pub fn preferred_strategy(self) -> Strategy {
        match self {
            TrustSign::Trusted => Strategy::Cooperate,
            TrustSign::Distrusted => Strategy::Defect,
        }
    }
}

impl fmt::Display for TrustSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.label())
    }
}
