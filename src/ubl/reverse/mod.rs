//! Reverse mapper: UBL document tree → canonical invoice.
//!
//! Values are read back as written; the only arithmetic is the unit price
//! derived from a price `BaseQuantity`. Context detection picks the addons
//! the canonical invoice is tagged with and falls back to EN 16931.

mod charges;
mod lines;
mod payment;
mod refs;
mod totals;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::clean_string;
use super::context::{self, Context, EN16931};
use super::document::{Amount, Document, DocumentKind, TaxCategory};
use super::party::read_party;
use super::tax_map::TaxCategoryMap;
use crate::core::num::{keep_parsed_percent, parse_amount, parse_percentage};
use crate::core::{
    Invoice, InvoiceTag, InvoiceTax, InvoiceType, META_KEY_UBL_PROFILE, Note, Ordering, TaxCombo,
    UblError,
};

impl Document {
    /// Map this document to a canonical invoice.
    pub fn to_invoice(&self) -> Result<Invoice, UblError> {
        read_invoice(self)
    }
}

/// Map `doc` to a canonical invoice, detecting its context.
pub fn read_invoice(doc: &Document) -> Result<Invoice, UblError> {
    let customization_id = doc.customization_id.as_deref().unwrap_or_default();
    let profile_id = doc.profile_id.as_ref().map(|p| p.value.as_str());
    let context: &Context = context::find(customization_id, profile_id).unwrap_or(&EN16931);
    debug!("reading {} {} as {}", doc.kind.root_name(), doc.id, context);

    let (invoice_type, tags) = match doc.type_code_value() {
        Some(code) => type_from_code(code),
        None if doc.kind == DocumentKind::CreditNote => (InvoiceType::CreditNote, Vec::new()),
        None => (InvoiceType::Other, Vec::new()),
    };

    let mut invoice = Invoice {
        uuid: doc.uuid.clone(),
        invoice_type,
        tags,
        series: None,
        code: doc.id.trim().to_string(),
        issue_date: parse_date(&doc.issue_date)?,
        currency: doc
            .document_currency_code
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        addons: context.addons.iter().map(|a| a.to_string()).collect(),
        tax: doc.type_code_value().map(|code| InvoiceTax {
            document_type: Some(code.to_string()),
        }),
        supplier: doc
            .supplier_party
            .as_ref()
            .map(read_party)
            .unwrap_or_default(),
        customer: doc.customer_party.as_ref().map(read_party),
        preceding: Vec::new(),
        ordering: None,
        delivery: None,
        payment: None,
        lines: Vec::new(),
        charges: Vec::new(),
        discounts: Vec::new(),
        totals: Default::default(),
        notes: doc
            .notes
            .iter()
            .map(|n| clean_string(n))
            .filter(|n| !n.is_empty())
            .map(Note::new)
            .collect(),
        attachments: Vec::new(),
        exchange_rates: Vec::new(),
        meta: Default::default(),
    };

    if let Some(p) = profile_id.filter(|p| !p.is_empty() && *p != context.profile_id) {
        invoice
            .meta
            .insert(META_KEY_UBL_PROFILE.to_string(), p.to_string());
    }

    let tax_map = TaxCategoryMap::build(&doc.tax_totals);

    invoice.lines = lines::read_lines(doc, &tax_map)?;
    (invoice.charges, invoice.discounts) = charges::read_charges(&doc.allowance_charges, &tax_map)?;
    invoice.totals = totals::read_totals(doc)?;
    invoice.preceding = refs::read_preceding(doc)?;
    invoice.ordering = refs::read_ordering(doc)?;
    invoice.delivery = refs::read_delivery(doc)?;
    invoice.attachments = refs::read_attachments(doc);
    invoice.exchange_rates = refs::read_exchange_rates(doc)?;
    invoice.payment = payment::read_payment(doc, &invoice.supplier)?;

    if let Some(rep) = &doc.tax_representative_party {
        let seller = std::mem::replace(&mut invoice.supplier, read_party(rep));
        invoice
            .ordering
            .get_or_insert_with(Ordering::default)
            .seller = Some(seller);
    }
    Ok(invoice)
}

/// Canonical type and tags for a UNTDID 1001 code.
pub fn type_from_code(code: &str) -> (InvoiceType, Vec<InvoiceTag>) {
    match code.trim() {
        "325" => (InvoiceType::Proforma, Vec::new()),
        "380" => (InvoiceType::Standard, Vec::new()),
        "381" => (InvoiceType::CreditNote, Vec::new()),
        "383" => (InvoiceType::DebitNote, Vec::new()),
        "384" => (InvoiceType::Corrective, Vec::new()),
        "389" => (InvoiceType::Standard, vec![InvoiceTag::SelfBilled]),
        "326" => (InvoiceType::Standard, vec![InvoiceTag::Partial]),
        "261" => (InvoiceType::CreditNote, vec![InvoiceTag::SelfBilled]),
        _ => (InvoiceType::Other, Vec::new()),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, UblError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| UblError::Date(format!("'{s}': {e}")))
}

fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, UblError> {
    s.filter(|d| !d.trim().is_empty()).map(parse_date).transpose()
}

fn parse_optional_amount(amount: Option<&Amount>) -> Result<Option<Decimal>, UblError> {
    amount.map(|a| parse_amount(&a.value)).transpose()
}

/// Canonical tax entry for a tax category fragment. Needs a tax scheme.
///
/// A missing exemption code is backfilled from the document totals. A
/// parsed `0` percent is dropped unless the category is zero-rated.
fn tax_combo(category: &TaxCategory, map: &TaxCategoryMap) -> Result<Option<TaxCombo>, UblError> {
    let Some(scheme) = category.scheme_value() else {
        return Ok(None);
    };
    let tax_code = category.id_value().map(str::to_string);
    let percent = match category.percent.as_deref() {
        Some(p) => {
            let p = parse_percentage(p)?;
            keep_parsed_percent(&p, tax_code.as_deref()).then_some(p)
        }
        None => None,
    };
    Ok(Some(TaxCombo {
        category: scheme.to_string(),
        percent,
        exemption_code: tax_code.as_ref().and_then(|_| map.exemption_code(category)),
        tax_code,
    }))
}
