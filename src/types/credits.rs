//! Credit balance

use serde::Serialize;
use std::fmt;

use crate::error::{Result, SunoError};

/// Remaining account credits, always finite and non-negative
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CreditBalance(f64);

impl CreditBalance {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(SunoError::Parse(format!(
                "credit balance must be a non-negative number, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for CreditBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(CreditBalance::new(-1.0).is_err());
        assert!(CreditBalance::new(f64::NAN).is_err());
        assert!(CreditBalance::new(0.0).is_ok());
    }

    #[test]
    fn displays_whole_numbers_without_fraction() {
        assert_eq!(CreditBalance::new(120.0).unwrap().to_string(), "120");
        assert_eq!(CreditBalance::new(7.5).unwrap().to_string(), "7.50");
    }
}
