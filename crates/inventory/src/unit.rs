//! Fixed packaging multipliers. The base unit is the piece ("pcs").

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wholesale_core::{DomainError, DomainResult};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pcs,
    Cartons,
    Crates,
}

impl Unit {
    pub const fn multiplier(self) -> i64 {
        match self {
            Unit::Pcs => 1,
            Unit::Cartons => 10,
            Unit::Crates => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Pcs => "pcs",
            Unit::Cartons => "cartons",
            Unit::Crates => "crates",
        }
    }

    /// Convert a raw quantity in this unit to base units.
    pub fn to_base_units(self, raw: i64) -> DomainResult<i64> {
        raw.checked_mul(self.multiplier())
            .ok_or_else(|| DomainError::validation(format!("quantity {raw} {self} is too large")))
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pcs" => Ok(Unit::Pcs),
            "cartons" => Ok(Unit::Cartons),
            "crates" => Ok(Unit::Crates),
            other => Err(DomainError::validation(format!(
                "unit must be one of: pcs, cartons, crates (got '{other}')"
            ))),
        }
    }
}

/// A base-unit quantity split greedily into crates, cartons and pieces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitBreakdown {
    pub crates: i64,
    pub cartons: i64,
    pub pcs: i64,
}

impl UnitBreakdown {
    pub fn from_pcs(total: i64) -> Self {
        let crates = total / Unit::Crates.multiplier();
        let rest = total % Unit::Crates.multiplier();
        Self {
            crates,
            cartons: rest / Unit::Cartons.multiplier(),
            pcs: rest % Unit::Cartons.multiplier(),
        }
    }

    /// Sum back into base units (used for mixed-unit stock receipts).
    pub fn total_pcs(&self) -> DomainResult<i64> {
        let crates = Unit::Crates.to_base_units(self.crates)?;
        let cartons = Unit::Cartons.to_base_units(self.cartons)?;
        crates
            .checked_add(cartons)
            .and_then(|v| v.checked_add(self.pcs))
            .ok_or_else(|| DomainError::validation("quantity is too large"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_are_fixed() {
        assert_eq!(Unit::Pcs.to_base_units(7).unwrap(), 7);
        assert_eq!(Unit::Cartons.to_base_units(3).unwrap(), 30);
        assert_eq!(Unit::Crates.to_base_units(2).unwrap(), 1000);
    }

    #[test]
    fn overflow_is_a_validation_error() {
        assert!(matches!(
            Unit::Crates.to_base_units(i64::MAX),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn breakdown_is_greedy() {
        assert_eq!(
            UnitBreakdown::from_pcs(1234),
            UnitBreakdown { crates: 2, cartons: 23, pcs: 4 }
        );
        assert_eq!(UnitBreakdown::from_pcs(1234).total_pcs().unwrap(), 1234);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("cartons".parse::<Unit>().unwrap(), Unit::Cartons);
        assert!("boxes".parse::<Unit>().is_err());
    }
}
