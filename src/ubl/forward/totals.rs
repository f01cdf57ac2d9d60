use super::category_percent;
use crate::core::Invoice;
use crate::ubl::document::{
    Amount, Document, IdType, MonetaryTotal, TaxCategory, TaxScheme, TaxSubtotal, TaxTotal,
};

/// `LegalMonetaryTotal` and the single document `TaxTotal`.
pub(super) fn add_totals(doc: &mut Document, invoice: &Invoice) {
    let t = &invoice.totals;
    let ccy = invoice.currency.as_str();
    let amount = |v| Amount::new(v, ccy);

    doc.legal_monetary_total = MonetaryTotal {
        line_extension_amount: amount(t.sum),
        tax_exclusive_amount: amount(t.total),
        tax_inclusive_amount: amount(t.total_with_tax),
        allowance_total_amount: t.discount.map(amount),
        charge_total_amount: t.charge.map(amount),
        prepaid_amount: t.advances.map(amount),
        payable_rounding_amount: t.rounding.map(amount),
        payable_amount: Some(amount(t.due.unwrap_or(t.payable))),
    };

    let exemption_reason = invoice.legal_note().map(|n| n.text.clone());
    let subtotals = t
        .taxes
        .iter()
        .flat_map(|b| &b.categories)
        .flat_map(|cat| cat.rates.iter().map(move |r| (cat, r)))
        .map(|(cat, rate)| {
            let code = rate.tax_code.as_deref().filter(|c| !c.is_empty());
            TaxSubtotal {
                taxable_amount: rate.base.map(amount),
                tax_amount: amount(rate.amount),
                tax_category: TaxCategory {
                    id: code.map(IdType::new),
                    percent: category_percent(rate.percent.as_ref(), code),
                    tax_exemption_reason_code: rate
                        .exemption_code
                        .clone()
                        .filter(|c| !c.is_empty()),
                    tax_exemption_reason: exemption_reason.clone(),
                    tax_scheme: (!cat.code.is_empty()).then(|| TaxScheme::new(&cat.code)),
                },
            }
        })
        .collect();

    doc.tax_totals = vec![TaxTotal {
        tax_amount: amount(t.tax),
        tax_subtotals: subtotals,
    }];
}
