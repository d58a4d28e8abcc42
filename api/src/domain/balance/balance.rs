use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;

pub const MIN_CHARGE: i64 = 10_000;
pub const MAX_CHARGE: i64 = 1_000_000;
pub const CHARGE_UNIT: i64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub user_id: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Balance {
            user_id: user_id.to_string(),
            amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn covers(&self, amount: i64) -> bool {
        self.amount >= amount
    }
}

pub fn validate_charge_amount(amount: i64) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation("charge amount must be positive"));
    }
    if amount < MIN_CHARGE {
        return Err(DomainError::validation(format!(
            "minimum charge amount is {MIN_CHARGE}"
        )));
    }
    if amount > MAX_CHARGE {
        return Err(DomainError::validation(format!(
            "maximum charge amount is {MAX_CHARGE}"
        )));
    }
    if amount % CHARGE_UNIT != 0 {
        return Err(DomainError::validation(format!(
            "charge amount must be a multiple of {CHARGE_UNIT}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_rules() {
        assert!(validate_charge_amount(MIN_CHARGE).is_ok());
        assert!(validate_charge_amount(MAX_CHARGE).is_ok());
        assert!(validate_charge_amount(55_000).is_ok());
        assert!(validate_charge_amount(0).is_err());
        assert!(validate_charge_amount(-10_000).is_err());
        assert!(validate_charge_amount(9_000).is_err());
        assert!(validate_charge_amount(MAX_CHARGE + CHARGE_UNIT).is_err());
        assert_eq!(
            validate_charge_amount(10_500),
            Err(DomainError::validation("charge amount must be a multiple of 1000"))
        );
    }
}
