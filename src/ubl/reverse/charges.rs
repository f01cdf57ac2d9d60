use super::{parse_optional_amount, tax_combo};
use crate::core::num::{parse_amount, parse_percentage};
use crate::core::{Charge, UblError};
use crate::ubl::clean_string;
use crate::ubl::document::AllowanceCharge;
use crate::ubl::tax_map::TaxCategoryMap;

type ChargesAndDiscounts = (Vec<Charge>, Vec<Charge>);

/// Document-level allowances and charges, split by `ChargeIndicator`.
pub(super) fn read_charges(
    acs: &[AllowanceCharge],
    tax_map: &TaxCategoryMap,
) -> Result<ChargesAndDiscounts, UblError> {
    split(acs, Some(tax_map))
}

/// Line-level allowances and charges. These carry no tax categories.
pub(super) fn read_line_charges(acs: &[AllowanceCharge]) -> Result<ChargesAndDiscounts, UblError> {
    split(acs, None)
}

fn split(
    acs: &[AllowanceCharge],
    tax_map: Option<&TaxCategoryMap>,
) -> Result<ChargesAndDiscounts, UblError> {
    let mut charges = Vec::new();
    let mut discounts = Vec::new();
    for ac in acs {
        let charge = read_charge(ac, tax_map)?;
        if ac.charge_indicator {
            charges.push(charge);
        } else {
            discounts.push(charge);
        }
    }
    Ok((charges, discounts))
}

fn read_charge(ac: &AllowanceCharge, tax_map: Option<&TaxCategoryMap>) -> Result<Charge, UblError> {
    let amount = if ac.amount.value.trim().is_empty() {
        Default::default()
    } else {
        parse_amount(&ac.amount.value)?
    };
    let mut charge = Charge {
        reason: ac
            .reason
            .as_deref()
            .map(clean_string)
            .filter(|r| !r.is_empty()),
        reason_code: ac.reason_code.clone().filter(|c| !c.is_empty()),
        percent: ac
            .multiplier_factor_numeric
            .as_deref()
            .map(parse_percentage)
            .transpose()?,
        base: parse_optional_amount(ac.base_amount.as_ref())?,
        amount,
        taxes: Vec::new(),
    };
    if let (Some(map), Some(cat)) = (tax_map, ac.tax_categories.first()) {
        charge.taxes = tax_combo(cat, map)?.into_iter().collect();
    }
    Ok(charge)
}
