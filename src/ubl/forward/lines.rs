use log::trace;
use rust_decimal::Decimal;

use super::category_percent;
use super::charges::allowance_charge;
use crate::core::units::to_unece;
use crate::core::{Invoice, Item as CanonicalItem, Line, NOTE_KEY_BUYER_ACCOUNTING_REF, UblError};
use crate::ubl::context::Context;
use crate::ubl::document::{
    Amount, Document, DocumentLine, IdType, Item, ItemProperty, Price, Quantity, TaxCategory,
    TaxScheme,
};
use crate::ubl::tax_map::line_tax_total;

pub(super) fn add_lines(doc: &mut Document, invoice: &Invoice, context: &Context) -> Result<(), UblError> {
    doc.lines = invoice
        .lines
        .iter()
        .map(|l| build_line(l, &invoice.currency, context))
        .collect::<Result<_, _>>()?;
    Ok(())
}

fn build_line(line: &Line, invoice_currency: &str, context: &Context) -> Result<DocumentLine, UblError> {
    let ccy = line
        .item
        .currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(invoice_currency);
    trace!("line {} in {ccy}", line.index);

    let mut notes = Vec::new();
    let mut accounting_cost = line.cost.clone().filter(|c| !c.is_empty());
    for note in &line.notes {
        if note.key.as_deref() == Some(NOTE_KEY_BUYER_ACCOUNTING_REF) {
            accounting_cost = Some(note.text.clone());
        } else {
            notes.push(note.text.clone());
        }
    }

    let charges = line
        .charges
        .iter()
        .map(|c| allowance_charge(c, true, ccy, line.sum, false))
        .chain(
            line.discounts
                .iter()
                .map(|d| allowance_charge(d, false, ccy, line.sum, false)),
        )
        .collect();

    let tax_totals = if context.flags.line_tax_totals {
        line_tax_total(line, ccy)?.into_iter().collect()
    } else {
        Vec::new()
    };

    Ok(DocumentLine {
        id: line.index.to_string(),
        notes,
        quantity: Some(Quantity {
            value: line.quantity.to_string(),
            unit_code: line
                .item
                .unit
                .as_deref()
                .filter(|u| !u.is_empty())
                .map(|u| to_unece(u).to_string()),
        }),
        line_extension_amount: Amount::new(
            line.total.or(line.sum).unwrap_or(Decimal::ZERO),
            ccy,
        ),
        accounting_cost,
        invoice_period: None,
        order_line_reference: line.order.clone().filter(|o| !o.is_empty()),
        allowance_charges: charges,
        tax_totals,
        item: Some(build_item(line)),
        price: line.item.price.map(|p| Price {
            price_amount: Amount::new(p, ccy),
            ..Default::default()
        }),
    })
}

fn build_item(line: &Line) -> Item {
    let it: &CanonicalItem = &line.item;
    let mut item = Item {
        description: it.description.clone().filter(|d| !d.is_empty()),
        name: it.name.clone(),
        origin_country: it.origin.clone().filter(|o| !o.is_empty()),
        sellers_item_identification: it
            .reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(IdType::new),
        additional_item_properties: it
            .meta
            .iter()
            .map(|(k, v)| ItemProperty {
                name: k.clone(),
                value: v.clone(),
            })
            .collect(),
        ..Default::default()
    };

    if let Some(tax) = line.taxes.first().filter(|t| !t.category.is_empty()) {
        let code = tax.tax_code.as_deref().filter(|c| !c.is_empty());
        item.classified_tax_category = Some(TaxCategory {
            id: code.map(IdType::new),
            percent: category_percent(tax.percent.as_ref(), code),
            tax_scheme: Some(TaxScheme::new(&tax.category)),
            ..Default::default()
        });
    }

    // First unqualified identity to the buyer's id, first qualified one to the standard id.
    for id in &it.identities {
        match id.scheme.as_deref().filter(|s| !s.is_empty()) {
            None if item.buyers_item_identification.is_none() => {
                item.buyers_item_identification = Some(IdType::new(&id.code));
            }
            Some(scheme) if item.standard_item_identification.is_none() => {
                item.standard_item_identification = Some(IdType::with_scheme(&id.code, scheme));
            }
            _ => {}
        }
    }
    item
}
