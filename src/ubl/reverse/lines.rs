use log::{trace, warn};
use rust_decimal::Decimal;

use super::charges::read_line_charges;
use super::tax_combo;
use crate::core::num::{divide_by_base_quantity, parse_amount};
use crate::core::units::from_unece;
use crate::core::{Identity, Item as CanonicalItem, Line, Note, UblError};
use crate::ubl::{clean_string, format_key};
use crate::ubl::document::{Document, DocumentLine, Item};
use crate::ubl::tax_map::TaxCategoryMap;

/// Lines without a `Price` are skipped.
pub(super) fn read_lines(doc: &Document, tax_map: &TaxCategoryMap) -> Result<Vec<Line>, UblError> {
    let currency = doc.document_currency_code.as_deref().unwrap_or_default();
    let mut lines = Vec::with_capacity(doc.lines.len());
    for (i, dl) in doc.lines.iter().enumerate() {
        match read_line(dl, currency, tax_map, i as u32 + 1)? {
            Some(line) => lines.push(line),
            None => warn!("line {} has no price and is skipped", dl.id),
        }
    }
    Ok(lines)
}

fn read_line(
    dl: &DocumentLine,
    currency: &str,
    tax_map: &TaxCategoryMap,
    position: u32,
) -> Result<Option<Line>, UblError> {
    let Some(price) = &dl.price else {
        return Ok(None);
    };
    let mut unit_price = parse_amount(&price.price_amount.value)?;
    if let Some(bq) = &price.base_quantity {
        let base = parse_amount(&bq.value)?;
        unit_price = divide_by_base_quantity(unit_price, base)?;
        trace!("line {}: price per {base} is {unit_price} per unit", dl.id);
    }

    let mut line = Line {
        index: dl.id.trim().parse().unwrap_or(position),
        quantity: Decimal::ONE,
        item: CanonicalItem {
            price: Some(unit_price),
            ..Default::default()
        },
        ..Default::default()
    };

    if let Some(q) = &dl.quantity {
        line.quantity = parse_amount(&q.value)?;
        if let Some(unit) = q.unit_code.as_deref().filter(|u| !u.is_empty()) {
            line.item.unit = Some(from_unece(unit).to_string());
        }
    }

    if let Some(item) = &dl.item {
        read_item(item, &mut line.item);
        if let Some(ctc) = &item.classified_tax_category {
            line.taxes = tax_combo(ctc, tax_map)?.into_iter().collect();
        }
    }

    let line_currency = dl.line_extension_amount.currency_id.as_deref();
    if let Some(ccy) = line_currency.filter(|c| !c.is_empty() && *c != currency) {
        line.item.currency = Some(ccy.to_string());
    }

    line.notes = dl
        .notes
        .iter()
        .map(|n| clean_string(n))
        .filter(|n| !n.is_empty())
        .map(Note::new)
        .collect();
    line.cost = dl.accounting_cost.clone().filter(|c| !c.is_empty());
    line.order = dl.order_line_reference.clone().filter(|o| !o.is_empty());

    (line.charges, line.discounts) = read_line_charges(&dl.allowance_charges)?;

    let total = parse_amount(&dl.line_extension_amount.value)?;
    line.total = Some(total);
    line.sum = line
        .charges
        .iter()
        .chain(&line.discounts)
        .find_map(|c| c.base)
        .or(Some(total));

    Ok(Some(line))
}

fn read_item(di: &Item, item: &mut CanonicalItem) {
    item.name = clean_string(&di.name);
    item.description = di
        .description
        .as_deref()
        .map(clean_string)
        .filter(|d| !d.is_empty());
    item.origin = di.origin_country.clone().filter(|o| !o.is_empty());
    item.reference = di
        .sellers_item_identification
        .as_ref()
        .map(|id| id.value.clone())
        .filter(|r| !r.is_empty());

    if let Some(id) = &di.buyers_item_identification {
        item.identities.push(Identity {
            label: id.label().map(str::to_string),
            ..Identity::new(&id.value)
        });
    }
    if let Some(id) = &di.standard_item_identification {
        if let Some(scheme) = &id.scheme_id {
            item.identities
                .push(Identity::new(&id.value).with_scheme(scheme));
        }
    }
    item.identities
        .extend(di.commodity_classifications.iter().map(|c| Identity {
            label: c.label().map(str::to_string),
            ..Identity::new(&c.value)
        }));

    for prop in &di.additional_item_properties {
        if !prop.name.is_empty() && !prop.value.is_empty() {
            item.meta
                .insert(format_key(&prop.name), clean_string(&prop.value));
        }
    }
}
