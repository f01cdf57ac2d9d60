use rust_decimal::Decimal;

use super::parse_optional_amount;
use crate::core::num::{keep_parsed_percent, parse_amount, parse_percentage};
use crate::core::{CategoryTotal, RateTotal, TaxBreakdown, Totals, UblError};
use crate::ubl::document::{Document, TaxTotal};

/// Totals as stated in `LegalMonetaryTotal` and the document-currency
/// `TaxTotal`.
pub(super) fn read_totals(doc: &Document) -> Result<Totals, UblError> {
    let lmt = &doc.legal_monetary_total;
    let required = |a: &crate::ubl::document::Amount| -> Result<Decimal, UblError> {
        if a.value.trim().is_empty() {
            Ok(Decimal::ZERO)
        } else {
            parse_amount(&a.value)
        }
    };

    let tax_total = document_tax_total(doc);
    let tax = match tax_total {
        Some(t) => required(&t.tax_amount)?,
        None => Decimal::ZERO,
    };
    let payable = parse_optional_amount(lmt.payable_amount.as_ref())?.unwrap_or_default();

    Ok(Totals {
        sum: required(&lmt.line_extension_amount)?,
        discount: parse_optional_amount(lmt.allowance_total_amount.as_ref())?,
        charge: parse_optional_amount(lmt.charge_total_amount.as_ref())?,
        total: required(&lmt.tax_exclusive_amount)?,
        taxes: tax_total.map(breakdown).transpose()?.flatten(),
        tax,
        total_with_tax: required(&lmt.tax_inclusive_amount)?,
        rounding: parse_optional_amount(lmt.payable_rounding_amount.as_ref())?,
        payable,
        advances: parse_optional_amount(lmt.prepaid_amount.as_ref())?,
        due: None,
    })
}

/// The tax total in the document currency. A second total in the tax
/// currency carries no subtotals and is skipped.
fn document_tax_total(doc: &Document) -> Option<&TaxTotal> {
    let currency = doc.document_currency_code.as_deref();
    doc.tax_totals
        .iter()
        .find(|t| currency.is_none() || t.tax_amount.currency_id.as_deref() == currency)
        .or_else(|| doc.tax_totals.first())
}

/// Subtotals grouped per tax scheme, in document order.
fn breakdown(total: &TaxTotal) -> Result<Option<TaxBreakdown>, UblError> {
    let mut categories: Vec<CategoryTotal> = Vec::new();
    for st in &total.tax_subtotals {
        let cat = &st.tax_category;
        let code = cat.scheme_value().unwrap_or_default();
        let tax_code = cat.id_value().map(str::to_string);
        let percent = match cat.percent.as_deref() {
            Some(p) => {
                let p = parse_percentage(p)?;
                keep_parsed_percent(&p, tax_code.as_deref()).then_some(p)
            }
            None => None,
        };
        let amount = parse_amount(&st.tax_amount.value)?;
        let rate = RateTotal {
            base: parse_optional_amount(st.taxable_amount.as_ref())?,
            percent,
            amount,
            tax_code,
            exemption_code: cat
                .tax_exemption_reason_code
                .clone()
                .filter(|c| !c.is_empty()),
        };

        match categories.iter_mut().find(|c| c.code == code) {
            Some(c) => {
                c.amount += amount;
                c.rates.push(rate);
            }
            None => categories.push(CategoryTotal {
                code: code.to_string(),
                rates: vec![rate],
                amount,
            }),
        }
    }
    Ok((!categories.is_empty()).then_some(TaxBreakdown { categories }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ubl::document::{
        Amount, IdType, MonetaryTotal, TaxCategory, TaxScheme, TaxSubtotal,
    };
    use rust_decimal_macros::dec;

    fn subtotal(base: &str, amount: &str, code: &str, percent: &str) -> TaxSubtotal {
        TaxSubtotal {
            taxable_amount: Some(Amount::new(base, "EUR")),
            tax_amount: Amount::new(amount, "EUR"),
            tax_category: TaxCategory {
                id: Some(IdType::new(code)),
                percent: Some(percent.into()),
                tax_scheme: Some(TaxScheme::new("VAT")),
                ..Default::default()
            },
        }
    }

    fn doc() -> Document {
        Document {
            document_currency_code: Some("EUR".into()),
            tax_totals: vec![
                TaxTotal {
                    tax_amount: Amount::new("1400.00", "DKK"),
                    tax_subtotals: Vec::new(),
                },
                TaxTotal {
                    tax_amount: Amount::new("190.00", "EUR"),
                    tax_subtotals: vec![
                        subtotal("1000.00", "190.00", "S", "19"),
                        subtotal("200.00", "0.00", "E", "0"),
                    ],
                },
            ],
            legal_monetary_total: MonetaryTotal {
                line_extension_amount: Amount::new("1200.00", "EUR"),
                tax_exclusive_amount: Amount::new("1200.00", "EUR"),
                tax_inclusive_amount: Amount::new("1390.00", "EUR"),
                prepaid_amount: Some(Amount::new("390.00", "EUR")),
                payable_amount: Some(Amount::new("1000.00", "EUR")),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn totals_from_document_currency() {
        let t = read_totals(&doc()).unwrap();
        assert_eq!(t.sum, dec!(1200.00));
        assert_eq!(t.tax, dec!(190.00));
        assert_eq!(t.total_with_tax, dec!(1390.00));
        assert_eq!(t.advances, Some(dec!(390.00)));
        assert_eq!(t.payable, dec!(1000.00));
        assert!(t.discount.is_none());

        let cats = t.taxes.unwrap().categories;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].code, "VAT");
        assert_eq!(cats[0].amount, dec!(190.00));
        assert_eq!(cats[0].rates.len(), 2);
        assert_eq!(cats[0].rates[1].percent, None);
    }

    #[test]
    fn no_tax_total() {
        let mut d = doc();
        d.tax_totals.clear();
        let t = read_totals(&d).unwrap();
        assert_eq!(t.tax, Decimal::ZERO);
        assert!(t.taxes.is_none());
    }
}
