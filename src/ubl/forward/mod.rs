//! Forward mapper: canonical invoice → UBL document tree.
//!
//! The mapper only relocates values that are already on the invoice. Each
//! section of the document lives in its own submodule; this module builds
//! the header and ties the sections together.

mod charges;
mod lines;
mod payment;
mod refs;
mod totals;

use log::{debug, warn};

use super::context::{Context, missing_addons, resolve_output_profile};
use super::document::{Document, DocumentKind, IdType};
use super::party::build_party;
use super::UBL_VERSION_ID;
use crate::core::num::OUTSIDE_SCOPE_CODE;
use crate::core::{Invoice, NOTE_KEY_LEGAL, Percentage, UblError, invoice_number};

/// Separator for notes joined into one element.
const NOTE_SEPARATOR: &str = "\n\n";

/// Build the document for `invoice` under `context`.
///
/// Fails when the invoice lacks a document type code, or when it has
/// payment instructions without a payment means code.
pub fn build_document(invoice: &Invoice, context: &Context) -> Result<Document, UblError> {
    let type_code = invoice
        .document_type()
        .ok_or_else(|| UblError::required("tax.ext.untdid-document-type"))?;

    let missing = missing_addons(invoice, context);
    if !missing.is_empty() {
        warn!(
            "invoice {} lacks addons {:?} expected by {}",
            invoice.code, missing, context
        );
    }

    let (customization_id, profile_id) = resolve_output_profile(invoice, context);
    let kind = if invoice.is_credit_note() {
        DocumentKind::CreditNote
    } else {
        DocumentKind::Invoice
    };
    debug!(
        "building {} {} for {customization_id}",
        kind.root_name(),
        invoice_number(invoice.series.as_deref(), &invoice.code)
    );

    let mut doc = Document {
        kind,
        customization_id: Some(customization_id.to_string()),
        profile_id: (!profile_id.is_empty()).then(|| IdType::new(profile_id)),
        id: invoice_number(invoice.series.as_deref(), &invoice.code),
        issue_date: invoice.issue_date.to_string(),
        type_code: Some(IdType::new(type_code)),
        document_currency_code: Some(invoice.currency.clone()),
        accounting_cost: invoice
            .ordering
            .as_ref()
            .and_then(|o| o.cost.clone())
            .filter(|c| !c.is_empty()),
        notes: notes(invoice, context),
        ..Default::default()
    };

    if context.flags.emits_version_uuid {
        doc.ubl_version_id = Some(UBL_VERSION_ID.to_string());
        doc.uuid = invoice.uuid.clone().filter(|u| !u.is_empty());
    }

    let seller = invoice.ordering.as_ref().and_then(|o| o.seller.as_ref());
    match seller {
        Some(seller) => {
            doc.supplier_party = Some(build_party(seller));
            doc.tax_representative_party = Some(build_party(&invoice.supplier));
        }
        None => doc.supplier_party = Some(build_party(&invoice.supplier)),
    }
    doc.customer_party = invoice.customer.as_ref().map(build_party);

    refs::add_preceding(&mut doc, invoice);
    refs::add_ordering(&mut doc, invoice);
    refs::add_exchange_rate(&mut doc, invoice);
    charges::add_charges(&mut doc, invoice);
    totals::add_totals(&mut doc, invoice);
    lines::add_lines(&mut doc, invoice, context)?;
    refs::add_attachments(&mut doc, invoice);
    payment::add_payment(&mut doc, invoice, context)?;
    refs::add_delivery(&mut doc, invoice);

    Ok(doc)
}

/// Non-legal notes, joined into one for single-note profiles.
fn notes(invoice: &Invoice, context: &Context) -> Vec<String> {
    let texts: Vec<String> = invoice
        .notes
        .iter()
        .filter(|n| n.key.as_deref() != Some(NOTE_KEY_LEGAL))
        .map(|n| n.text.clone())
        .collect();
    if context.flags.single_note && texts.len() > 1 {
        vec![texts.join(NOTE_SEPARATOR)]
    } else {
        texts
    }
}

/// `Percent` for a tax category: the given rate, else `"0"` unless the
/// category is outside the scope of tax.
pub(crate) fn category_percent(percent: Option<&Percentage>, code: Option<&str>) -> Option<String> {
    match percent {
        Some(p) => Some(p.to_string_without_symbol()),
        None if code == Some(OUTSIDE_SCOPE_CODE) => None,
        None => Some("0".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn category_percent_defaults() {
        let p = Percentage::new(dec!(19));
        assert_eq!(category_percent(Some(&p), Some("S")).as_deref(), Some("19"));
        assert_eq!(category_percent(None, Some("E")).as_deref(), Some("0"));
        assert_eq!(category_percent(None, None).as_deref(), Some("0"));
        assert_eq!(category_percent(None, Some("O")), None);
    }
}
