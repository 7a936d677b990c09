//! Fuel reconciliation arithmetic using rust_decimal for precision
//!
//! Pure functions: declared versus expected remaining stock at close
//! time. Variance is informational only; nothing here classifies a
//! variance as acceptable - that threshold belongs to the presentation
//! layer.

use rust_decimal::Decimal;
use serde::Serialize;

use shared::models::{RefuelEntry, Shift};

/// Expected remaining stock: starting + intake - total dispensed.
///
/// Not clamped at zero: a negative result means over-dispensing and
/// must be surfaced, not hidden.
pub fn expected_closing(
    starting_stock: Decimal,
    fuel_intake: Decimal,
    entries: &[RefuelEntry],
) -> Decimal {
    let dispensed: Decimal = entries.iter().map(|e| e.quantity).sum();
    starting_stock + fuel_intake - dispensed
}

/// Absolute difference between declared and expected closing stock
pub fn variance(declared: Decimal, expected: Decimal) -> Decimal {
    (declared - expected).abs()
}

/// Reconciliation computed at close time - derived, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_closing: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub variance: Decimal,
}

/// Reconcile a shift against the declared closing stock
pub fn reconcile(shift: &Shift, declared: Decimal) -> ReconciliationResult {
    let expected = expected_closing(shift.starting_stock, shift.fuel_intake, &shift.entries);
    ReconciliationResult {
        expected_closing: expected,
        variance: variance(declared, expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn entry(quantity: Decimal) -> RefuelEntry {
        RefuelEntry {
            id: None,
            equipment_id: 1,
            equipment_name: "Loader".to_string(),
            asset_code: None,
            quantity,
            meter_reading: None,
            sign_off: None,
        }
    }

    #[test]
    fn empty_entry_list_yields_starting_plus_intake() {
        let expected = expected_closing(Decimal::from(100), Decimal::from(50), &[]);
        assert_eq!(expected, Decimal::from(150));
    }

    #[test]
    fn entries_subtract_from_expected() {
        let entries = vec![entry(Decimal::from(30)), entry(Decimal::from(20))];
        let expected = expected_closing(Decimal::from(100), Decimal::from(50), &entries);
        assert_eq!(expected, Decimal::from(100));
    }

    #[test]
    fn negative_expected_is_not_clamped() {
        let entries = vec![entry(Decimal::from(80))];
        let expected = expected_closing(Decimal::from(50), Decimal::ZERO, &entries);
        assert_eq!(expected, Decimal::from(-30));
    }

    #[test]
    fn variance_is_symmetric() {
        let a = Decimal::new(1035, 1); // 103.5
        let b = Decimal::from(90);
        assert_eq!(variance(a, b), variance(b, a));
        assert_eq!(variance(a, b), Decimal::new(135, 1));
    }

    #[test]
    fn variance_of_equal_values_is_zero() {
        let v = Decimal::new(725, 2);
        assert_eq!(variance(v, v), Decimal::ZERO);
    }

    #[test]
    fn fractional_litres_reconcile_exactly() {
        // 100.5 + 0 - (30.2 + 20.3) = 50.0
        let entries = vec![entry(Decimal::new(302, 1)), entry(Decimal::new(203, 1))];
        let expected = expected_closing(Decimal::new(1005, 1), Decimal::ZERO, &entries);
        assert_eq!(expected, Decimal::from(50));
    }
}
