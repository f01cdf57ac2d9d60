//! OIOUBL 2.1 overlay.
//!
//! The 2.1 schematron predates several choices the general mapper makes.
//! [`apply`] takes a finished document and returns a copy patched for that
//! validator: Danish scheme identifiers, structured addresses, the fixed
//! VAT scheme and a handful of relocated values.

use log::debug;

use super::document::{
    Contact, Document, EndpointId, IdType, Party, PostalAddress, TaxCategory, TaxScheme,
};
use super::party::SCHEME_ID_GLN;

const AGENCY_ID: &str = "320";
const DK: &str = "DK";

const PROFILE_SCHEME_ID: &str = "urn:oioubl:id:profileid-1.4";
const TYPE_CODE_LIST_ID: &str = "urn:oioubl:codelist:invoicetypecode-1.1";
const ADDRESS_FORMAT_LIST_ID: &str = "urn:oioubl:codelist:addressformatcode-1.1";
const ADDRESS_FORMAT_STRUCTURED: &str = "StructuredDK";
const PAYMENT_CHANNEL_LIST_ID: &str = "urn:oioubl:codelist:paymentchannelcode-1.1";
const CHANNEL_IBAN: &str = "IBAN";
const TAX_CATEGORY_SCHEME_ID: &str = "urn:oioubl:id:taxcategoryid-1.1";
const TAX_SCHEME_SCHEME_ID: &str = "urn:oioubl:id:taxschemeid-1.2";
const TAX_SCHEME_VAT_CODE: &str = "63";
const TAX_SCHEME_VAT_NAME: &str = "Moms";

const SCHEME_GLN: &str = "GLN";
const SCHEME_DK_CVR: &str = "DK:CVR";
const SCHEME_DK_SE: &str = "DK:SE";
const DEFAULT_BUILDING_NUMBER: &str = "1";
const DEFAULT_CONTACT_ID: &str = "1";

/// Patch `doc` for the OIOUBL 2.1 validator.
pub fn apply(mut doc: Document) -> Document {
    debug!("applying OIOUBL 2.1 overlay to {}", doc.id);

    if let Some(profile) = doc.profile_id.as_mut() {
        profile.scheme_agency_id = Some(AGENCY_ID.to_string());
        profile.scheme_id = Some(PROFILE_SCHEME_ID.to_string());
    }
    if let Some(type_code) = doc.type_code.as_mut() {
        type_code.list_agency_id = Some(AGENCY_ID.to_string());
        type_code.list_id = Some(TYPE_CODE_LIST_ID.to_string());
    }

    for party in [doc.supplier_party.as_mut(), doc.customer_party.as_mut()]
        .into_iter()
        .flatten()
    {
        patch_party(party);
    }

    patch_payment_means(&mut doc);

    if let Some(first) = doc.tax_totals.first() {
        doc.legal_monetary_total.tax_exclusive_amount = first.tax_amount.clone();
    }
    if let (Some(payable), [term]) = (
        doc.legal_monetary_total.payable_amount.clone(),
        doc.payment_terms.as_mut_slice(),
    ) {
        if term.amount.is_none() {
            term.amount = Some(payable);
        }
    }

    if doc.is_credit_note() {
        for r in doc
            .billing_references
            .iter_mut()
            .filter_map(|b| b.invoice_document_reference.as_mut())
        {
            r.document_type_code = None;
        }
    }

    for tc in doc
        .tax_totals
        .iter_mut()
        .flat_map(|t| t.tax_subtotals.iter_mut())
    {
        patch_tax_category(&mut tc.tax_category);
    }
    for line in &mut doc.lines {
        if let Some(ctc) = line
            .item
            .as_mut()
            .and_then(|i| i.classified_tax_category.as_mut())
        {
            patch_tax_category(ctc);
        }
        for st in line
            .tax_totals
            .iter_mut()
            .flat_map(|t| t.tax_subtotals.iter_mut())
        {
            patch_tax_category(&mut st.tax_category);
        }
    }
    doc
}

fn dk_prefixed(value: &str) -> String {
    if value.starts_with(DK) {
        value.to_string()
    } else {
        format!("{DK}{value}")
    }
}

fn patch_party(p: &mut Party) {
    match p.endpoint_id.as_mut() {
        Some(ep) if ep.scheme_id == SCHEME_ID_GLN => ep.scheme_id = SCHEME_GLN.to_string(),
        Some(_) => {}
        None => {
            p.endpoint_id = p
                .party_tax_schemes
                .first()
                .and_then(|s| s.company_id.as_ref())
                .map(|id| EndpointId {
                    scheme_id: SCHEME_DK_CVR.to_string(),
                    value: dk_prefixed(&id.value),
                });
        }
    }

    if p.party_name.is_none() && p.party_identifications.is_empty() {
        p.party_name = p.registration_name().map(str::to_string);
    }

    if let Some(addr) = p.postal_address.as_mut() {
        patch_address(addr);
    }

    for pts in &mut p.party_tax_schemes {
        if let Some(id) = pts.company_id.as_mut() {
            id.scheme_id = Some(SCHEME_DK_SE.to_string());
            id.value = dk_prefixed(&id.value);
        }
        if let Some(ts) = pts.tax_scheme.as_mut() {
            patch_tax_scheme(ts);
        }
    }

    if let Some(id) = p
        .party_legal_entity
        .as_mut()
        .and_then(|l| l.company_id.as_mut())
    {
        id.scheme_id = Some(SCHEME_DK_CVR.to_string());
        id.value = dk_prefixed(&id.value);
    }

    let contact = p.contact.get_or_insert_with(Contact::default);
    contact
        .id
        .get_or_insert_with(|| DEFAULT_CONTACT_ID.to_string());
}

fn patch_address(addr: &mut PostalAddress) {
    addr.address_format_code.get_or_insert_with(|| IdType {
        list_id: Some(ADDRESS_FORMAT_LIST_ID.to_string()),
        list_agency_id: Some(AGENCY_ID.to_string()),
        ..IdType::new(ADDRESS_FORMAT_STRUCTURED)
    });
    if addr.building_number.is_none() {
        let number = addr
            .street_name
            .as_deref()
            .and_then(|s| s.split_whitespace().last())
            .unwrap_or(DEFAULT_BUILDING_NUMBER);
        addr.building_number = Some(number.to_string());
    }
}

fn patch_payment_means(doc: &mut Document) {
    for pm in &mut doc.payment_means {
        let channel = pm
            .payment_channel_code
            .get_or_insert_with(|| IdType::new(CHANNEL_IBAN));
        channel.list_id = Some(PAYMENT_CHANNEL_LIST_ID.to_string());
        if channel.value == CHANNEL_IBAN {
            if let Some(branch) = pm
                .payee_financial_account
                .as_mut()
                .and_then(|a| a.financial_institution_branch.as_mut())
            {
                branch.id = None;
            }
        }
        if pm.payment_due_date.is_none() {
            pm.payment_due_date = doc.due_date.clone();
        }
    }
    if !doc.payment_means.is_empty() {
        doc.due_date = None;
    }
}

fn legacy_category_code(code: &str) -> &str {
    match code {
        "S" | "Standard" | "standard" | "" => "StandardRated",
        "Z" | "Zero" | "zero" => "ZeroRated",
        "AE" | "ReverseCharge" => "ReverseCharge",
        other => other,
    }
}

fn patch_tax_category(tc: &mut TaxCategory) {
    let id = tc.id.get_or_insert_with(IdType::default);
    id.value = legacy_category_code(&id.value).to_string();
    id.scheme_id = Some(TAX_CATEGORY_SCHEME_ID.to_string());
    id.scheme_agency_id = Some(AGENCY_ID.to_string());
    if let Some(ts) = tc.tax_scheme.as_mut() {
        patch_tax_scheme(ts);
    }
}

fn patch_tax_scheme(ts: &mut TaxScheme) {
    ts.id = IdType {
        scheme_id: Some(TAX_SCHEME_SCHEME_ID.to_string()),
        scheme_agency_id: Some(AGENCY_ID.to_string()),
        ..IdType::new(TAX_SCHEME_VAT_CODE)
    };
    ts.name = Some(TAX_SCHEME_VAT_NAME.to_string());
}
