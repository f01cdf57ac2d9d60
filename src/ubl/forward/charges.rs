use rust_decimal::Decimal;

use super::category_percent;
use crate::core::{Charge, Invoice, TaxCombo};
use crate::ubl::document::{AllowanceCharge, Amount, Document, IdType, TaxCategory, TaxScheme};

/// Document-level charges followed by discounts. The invoice sum is the
/// base for percentage fragments.
pub(super) fn add_charges(doc: &mut Document, invoice: &Invoice) {
    let currency = &invoice.currency;
    let base = Some(invoice.totals.sum);
    doc.allowance_charges = invoice
        .charges
        .iter()
        .map(|c| allowance_charge(c, true, currency, base, true))
        .chain(
            invoice
                .discounts
                .iter()
                .map(|d| allowance_charge(d, false, currency, base, true)),
        )
        .collect();
}

/// One `AllowanceCharge`. `BaseAmount` is only written alongside a
/// percentage, and only when a base is known.
pub(super) fn allowance_charge(
    charge: &Charge,
    is_charge: bool,
    currency: &str,
    base: Option<Decimal>,
    with_taxes: bool,
) -> AllowanceCharge {
    let mut ac = AllowanceCharge {
        charge_indicator: is_charge,
        reason_code: charge.reason_code.clone().filter(|c| !c.is_empty()),
        reason: charge.reason.clone().filter(|r| !r.is_empty()),
        amount: Amount::new(charge.amount, currency),
        ..Default::default()
    };
    if let Some(percent) = &charge.percent {
        ac.multiplier_factor_numeric = Some(percent.to_string_without_symbol());
        ac.base_amount = base.map(|b| Amount::new(b, currency));
    }
    if with_taxes {
        ac.tax_categories = tax_categories(&charge.taxes);
    }
    ac
}

/// One `TaxCategory` per tax in the set.
pub(crate) fn tax_categories(taxes: &[TaxCombo]) -> Vec<TaxCategory> {
    taxes
        .iter()
        .map(|t| {
            let code = t.tax_code.as_deref().filter(|c| !c.is_empty());
            TaxCategory {
                id: code.map(IdType::new),
                percent: category_percent(t.percent.as_ref(), code),
                tax_scheme: Some(TaxScheme::new(&t.category)),
                ..Default::default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Percentage;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_charge_carries_base() {
        let charge = Charge {
            reason: Some("Freight".into()),
            reason_code: Some("FC".into()),
            percent: Some(Percentage::new(dec!(10))),
            amount: dec!(100.00),
            ..Default::default()
        };
        let ac = allowance_charge(&charge, true, "EUR", Some(dec!(1000.00)), true);
        assert!(ac.charge_indicator);
        assert_eq!(ac.multiplier_factor_numeric.as_deref(), Some("10"));
        assert_eq!(ac.base_amount.unwrap().value, "1000.00");
        assert_eq!(ac.amount.value, "100.00");
        assert_eq!(ac.reason_code.as_deref(), Some("FC"));
    }

    #[test]
    fn fixed_charge_has_no_base() {
        let charge = Charge {
            amount: dec!(5),
            ..Default::default()
        };
        let ac = allowance_charge(&charge, false, "EUR", Some(dec!(1000.00)), true);
        assert!(ac.base_amount.is_none());
        assert!(ac.multiplier_factor_numeric.is_none());
        assert!(ac.tax_categories.is_empty());
    }

    #[test]
    fn tax_category_percent_rule() {
        let taxes = vec![
            TaxCombo {
                tax_code: Some("O".into()),
                ..TaxCombo::new("VAT")
            },
            TaxCombo {
                tax_code: Some("E".into()),
                ..TaxCombo::new("VAT")
            },
        ];
        let cats = tax_categories(&taxes);
        assert_eq!(cats[0].percent, None);
        assert_eq!(cats[1].percent.as_deref(), Some("0"));
        assert_eq!(cats[1].scheme_value(), Some("VAT"));
    }
}
