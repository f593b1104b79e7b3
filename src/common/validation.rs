// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações customizadas para valores monetários (Decimal não implementa as regras de `range`)
// ---

fn error(code: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.message = Some(code.into());
    err
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        return Err(error("not_negative"));
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        return Err(error("positive"));
    }
    Ok(())
}

pub fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE_HUNDRED {
        return Err(error("percentage"));
    }
    check_scale(val, MONEY_SCALE)
}

// Casas decimais aceitas por cada coluna NUMERIC. Acima disso o Postgres arredonda.
pub const QUANTITY_SCALE: u32 = 3;
pub const MONEY_SCALE: u32 = 2;
pub const COST_SCALE: u32 = 4;

fn check_scale(val: &Decimal, max: u32) -> Result<(), ValidationError> {
    if val.normalize().scale() > max {
        return Err(error("too_many_decimals"));
    }
    Ok(())
}

/// Quantidade de uma linha: maior que zero, até 3 casas.
pub fn validate_quantity(val: &Decimal) -> Result<(), ValidationError> {
    validate_positive(val)?;
    check_scale(val, QUANTITY_SCALE)
}

/// Estoque e limites de estoque: zero ou mais, até 3 casas.
pub fn validate_stock(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    check_scale(val, QUANTITY_SCALE)
}

/// Valor em dinheiro que precisa ser positivo (depósito, pagamento).
pub fn validate_amount(val: &Decimal) -> Result<(), ValidationError> {
    validate_positive(val)?;
    check_scale(val, MONEY_SCALE)
}

/// Preço, desconto ou valor pago: zero ou mais, em centavos.
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    check_scale(val, MONEY_SCALE)
}

/// Valor sinalizado (ajuste de saldo): só confere os centavos.
pub fn validate_cents(val: &Decimal) -> Result<(), ValidationError> {
    check_scale(val, MONEY_SCALE)
}

/// Delta de ajuste de estoque: sinalizado, até 3 casas.
pub fn validate_stock_delta(val: &Decimal) -> Result<(), ValidationError> {
    check_scale(val, QUANTITY_SCALE)
}

pub fn validate_unit_cost(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val)?;
    check_scale(val, COST_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn negative_zero_is_not_negative() {
        assert!(validate_not_negative(&dec("-0")).is_ok());
        assert!(validate_not_negative(&dec("0")).is_ok());
        assert!(validate_not_negative(&dec("-0.01")).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(&dec("0")).is_err());
        assert!(validate_positive(&dec("0.5")).is_ok());
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert!(validate_percentage(&dec("0")).is_ok());
        assert!(validate_percentage(&dec("100")).is_ok());
        assert!(validate_percentage(&dec("100.01")).is_err());
    }

    #[test]
    fn quantity_below_column_precision_is_rejected() {
        let err = validate_quantity(&dec("0.0004")).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("too_many_decimals"));

        assert!(validate_quantity(&dec("0.001")).is_ok());
        // Zeros à direita não contam
        assert!(validate_quantity(&dec("2.50000")).is_ok());
    }

    #[test]
    fn money_accepts_cents_only() {
        assert!(validate_amount(&dec("10.25")).is_ok());
        assert_eq!(
            validate_amount(&dec("0.001")).unwrap_err().message.as_deref(),
            Some("too_many_decimals")
        );
        assert_eq!(validate_amount(&dec("0")).unwrap_err().message.as_deref(), Some("positive"));
        assert!(validate_money(&dec("0")).is_ok());
        assert!(validate_money(&dec("-1")).is_err());
    }

    #[test]
    fn signed_amount_checks_only_cents() {
        assert!(validate_cents(&dec("-12.30")).is_ok());
        assert!(validate_cents(&dec("-0.005")).is_err());
    }

    #[test]
    fn unit_cost_keeps_four_places() {
        assert!(validate_unit_cost(&dec("1.2345")).is_ok());
        assert!(validate_unit_cost(&dec("1.23456")).is_err());
    }

    #[test]
    fn error_message_is_a_translation_code() {
        let err = validate_positive(&dec("-3")).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("positive"));
    }
}
