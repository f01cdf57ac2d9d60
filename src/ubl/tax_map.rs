//! Tax category reconciliation between totals and finer-grained fragments.
//!
//! Line and charge tax categories frequently omit the exemption reason
//! code that the document-level `TaxTotal` carries. [`TaxCategoryMap`]
//! indexes the totals by `(scheme, category)` so the reverse mapper can
//! backfill it. [`line_tax_total`] goes the other way and synthesizes a
//! line-level `TaxTotal` from the canonical line taxes.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::document::{Amount, IdType, TaxCategory, TaxScheme, TaxSubtotal, TaxTotal};
use crate::core::num::rescale_half_up;
use crate::core::{Line, UblError};

/// Lookup key: tax scheme id and category id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxCategoryKey(pub String, pub String);

impl TaxCategoryKey {
    pub fn new(scheme_id: &str, category_id: &str) -> Self {
        Self(scheme_id.to_string(), category_id.to_string())
    }

    /// Key for a tax category fragment that has both an id and a scheme.
    pub fn of(category: &TaxCategory) -> Option<Self> {
        Some(Self::new(category.scheme_value()?, category.id_value()?))
    }
}

/// What the totals know about a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxCategoryInfo {
    pub exemption_reason_code: Option<String>,
}

/// Side table built from the document-level tax totals.
#[derive(Debug, Clone, Default)]
pub struct TaxCategoryMap(HashMap<TaxCategoryKey, TaxCategoryInfo>);

impl TaxCategoryMap {
    /// Index every subtotal category that has an id and a scheme.
    /// A later subtotal with the same key replaces an earlier one.
    pub fn build(tax_totals: &[TaxTotal]) -> Self {
        let map = tax_totals
            .iter()
            .flat_map(|t| &t.tax_subtotals)
            .filter_map(|st| {
                let key = TaxCategoryKey::of(&st.tax_category)?;
                let info = TaxCategoryInfo {
                    exemption_reason_code: st.tax_category.tax_exemption_reason_code.clone(),
                };
                Some((key, info))
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, key: &TaxCategoryKey) -> Option<&TaxCategoryInfo> {
        self.0.get(key)
    }

    /// Exemption code for a fragment: its own, else the one from the totals.
    pub fn exemption_code(&self, category: &TaxCategory) -> Option<String> {
        if let Some(code) = category
            .tax_exemption_reason_code
            .as_ref()
            .filter(|c| !c.is_empty())
        {
            return Some(code.clone());
        }
        let key = TaxCategoryKey::of(category)?;
        self.get(&key)
            .and_then(|info| info.exemption_reason_code.clone())
            .filter(|c| !c.is_empty())
    }
}

/// Line-level `TaxTotal` for OIOUBL-family profiles.
///
/// The taxable base is the line total, else its sum. Each tax with a
/// percent contributes `percent × base` rounded to the base's scale; the
/// others contribute zero. A line whose taxes add up to exactly zero gets
/// no tax total at all.
pub fn line_tax_total(line: &Line, currency: &str) -> Result<Option<TaxTotal>, UblError> {
    if line.taxes.is_empty() {
        return Ok(None);
    }
    let Some(base) = line.total.or(line.sum) else {
        return Ok(None);
    };

    let mut total = rescale_half_up(Decimal::ZERO, base.scale());
    let mut subtotals = Vec::with_capacity(line.taxes.len());
    for tax in &line.taxes {
        let amount = match &tax.percent {
            Some(p) => {
                let raw = p
                    .of(base)
                    .ok_or_else(|| UblError::numeric(base.to_string(), "tax amount overflow"))?;
                let amount = rescale_half_up(raw, base.scale());
                total += amount;
                Amount::new(amount, currency)
            }
            None => Amount::new("0", currency),
        };
        subtotals.push(TaxSubtotal {
            taxable_amount: Some(Amount::new(base, currency)),
            tax_amount: amount,
            tax_category: TaxCategory {
                id: tax
                    .tax_code
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .map(IdType::new),
                percent: tax.percent.map(|p| p.to_string_without_symbol()),
                tax_scheme: (!tax.category.is_empty()).then(|| TaxScheme::new(&tax.category)),
                ..Default::default()
            },
        });
    }

    if total.is_zero() {
        return Ok(None);
    }
    Ok(Some(TaxTotal {
        tax_amount: Amount::new(total, currency),
        tax_subtotals: subtotals,
    }))
}
