//! Canonical invoice → UBL document and XML.
//!
//! Run with: `cargo test --test forward_tests`

mod common;

use rust_decimal_macros::dec;
use ublmap::core::*;
use ublmap::ubl::context::{OIOUBL, PEPPOL, XRECHNUNG};
use ublmap::ubl::{self, ConvertOptions, DocumentKind};

fn peppol() -> ConvertOptions {
    ConvertOptions::new().context(PEPPOL)
}

#[test]
fn document_id_joins_series_and_code() {
    let doc = ubl::convert(&common::invoice(), &peppol()).unwrap();
    assert_eq!(doc.id, "2024-001");
    assert_eq!(doc.kind, DocumentKind::Invoice);
    assert_eq!(doc.issue_date, "2024-06-15");
    assert_eq!(doc.type_code_value(), Some("380"));
    assert_eq!(doc.document_currency_code.as_deref(), Some("EUR"));
}

#[test]
fn missing_document_type_is_a_validation_error() {
    let mut invoice = common::invoice();
    invoice.tax = None;
    let err = ubl::convert(&invoice, &peppol()).unwrap_err();
    match err {
        UblError::Validation(v) => assert_eq!(v.field, "tax.ext.untdid-document-type"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn missing_payment_means_code_is_a_validation_error() {
    let mut invoice = common::invoice();
    if let Some(i) = invoice
        .payment
        .as_mut()
        .and_then(|p| p.instructions.as_mut())
    {
        i.means_code = None;
    }
    let err = ubl::convert(&invoice, &peppol()).unwrap_err();
    assert!(
        matches!(err, UblError::Validation(ref v) if v.field == "payment.instructions.ext.untdid-payment-means")
    );
}

#[test]
fn percentage_charge_uses_invoice_sum_as_base() {
    let mut invoice = common::invoice();
    invoice.totals.sum = dec!(1000.00);
    invoice.charges.push(Charge {
        reason: Some("Handling".into()),
        percent: Some(Percentage::new(dec!(10))),
        amount: dec!(100.00),
        taxes: vec![TaxCombo {
            percent: Some(Percentage::new(dec!(19))),
            tax_code: Some("S".into()),
            ..TaxCombo::new("VAT")
        }],
        ..Default::default()
    });
    invoice.discounts.push(Charge {
        reason: Some("Loyalty".into()),
        amount: dec!(20.00),
        ..Default::default()
    });

    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    assert_eq!(doc.allowance_charges.len(), 2);

    let charge = &doc.allowance_charges[0];
    assert!(charge.charge_indicator);
    assert_eq!(charge.multiplier_factor_numeric.as_deref(), Some("10"));
    assert_eq!(charge.base_amount.as_ref().unwrap().value, "1000.00");
    assert_eq!(charge.amount.value, "100.00");
    assert_eq!(charge.tax_categories[0].percent.as_deref(), Some("19"));

    let discount = &doc.allowance_charges[1];
    assert!(!discount.charge_indicator);
    assert!(discount.base_amount.is_none());
    assert_eq!(discount.reason.as_deref(), Some("Loyalty"));
}

#[test]
fn single_due_date_goes_to_header_on_invoices() {
    let doc = ubl::convert(&common::invoice(), &peppol()).unwrap();
    assert_eq!(doc.due_date.as_deref(), Some("2024-07-15"));
    assert!(doc.payment_terms.is_empty());
}

#[test]
fn single_due_date_becomes_payment_terms_on_credit_notes() {
    let doc = ubl::convert(&common::credit_note(), &peppol()).unwrap();
    assert_eq!(doc.kind, DocumentKind::CreditNote);
    assert!(doc.due_date.is_none());
    assert_eq!(doc.payment_terms.len(), 1);
    assert_eq!(doc.payment_terms[0].payment_due_date.as_deref(), Some("2024-07-15"));
    assert_eq!(doc.payment_terms[0].payment_percent.as_deref(), Some("100"));
}

#[test]
fn several_due_dates_become_payment_terms() {
    let mut invoice = common::invoice();
    let terms = invoice
        .payment
        .as_mut()
        .and_then(|p| p.terms.as_mut())
        .unwrap();
    terms.due_dates = vec![
        DueDate {
            date: Some(common::date(2024, 7, 15)),
            amount: Some(dec!(1041.25)),
            ..Default::default()
        },
        DueDate {
            date: Some(common::date(2024, 8, 15)),
            amount: Some(dec!(1041.25)),
            notes: Some("Second instalment".into()),
            ..Default::default()
        },
    ];
    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    assert!(doc.due_date.is_none());
    assert_eq!(doc.payment_terms.len(), 2);
    let second = &doc.payment_terms[1];
    assert_eq!(second.amount.as_ref().unwrap().value, "1041.25");
    assert_eq!(second.amount.as_ref().unwrap().currency_id.as_deref(), Some("EUR"));
    assert_eq!(second.notes, vec!["Second instalment".to_string()]);
}

#[test]
fn single_note_profile_joins_notes() {
    let mut invoice = common::invoice();
    invoice.notes.push(Note::new("Delivery to gate 4."));
    invoice.notes.push(Note::with_key("legal", "Reverse charge applies."));

    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    assert_eq!(
        doc.notes,
        vec!["Thank you for your business.\n\nDelivery to gate 4.".to_string()]
    );

    let doc = ubl::convert(&invoice, &ConvertOptions::new().context(XRECHNUNG)).unwrap();
    assert_eq!(doc.notes.len(), 2);
}

#[test]
fn legal_note_becomes_exemption_reason() {
    let mut invoice = common::invoice();
    invoice.notes.push(Note::with_key("legal", "Exempt under Art. 132"));
    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    let cat = &doc.tax_totals[0].tax_subtotals[0].tax_category;
    assert_eq!(cat.tax_exemption_reason.as_deref(), Some("Exempt under Art. 132"));
}

#[test]
fn totals_are_copied_and_due_overrides_payable() {
    let mut invoice = common::invoice();
    invoice.totals.advances = Some(dec!(500.00));
    invoice.totals.due = Some(dec!(1582.50));

    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    let lmt = &doc.legal_monetary_total;
    assert_eq!(lmt.line_extension_amount.value, "1750.00");
    assert_eq!(lmt.tax_exclusive_amount.value, "1750.00");
    assert_eq!(lmt.tax_inclusive_amount.value, "2082.50");
    assert_eq!(lmt.prepaid_amount.as_ref().unwrap().value, "500.00");
    assert_eq!(lmt.payable_amount.as_ref().unwrap().value, "1582.50");
    assert!(lmt.charge_total_amount.is_none());

    assert_eq!(doc.tax_totals.len(), 1);
    let sub = &doc.tax_totals[0].tax_subtotals[0];
    assert_eq!(sub.taxable_amount.as_ref().unwrap().value, "1750.00");
    assert_eq!(sub.tax_amount.value, "332.50");
    assert_eq!(sub.tax_category.percent.as_deref(), Some("19"));
}

#[test]
fn tax_representative_swaps_parties() {
    let mut invoice = common::invoice();
    let original = PartyBuilder::new("Foreign Seller Ltd").tax_id("GB", "123456789").build();
    invoice.ordering = Some(Ordering {
        seller: Some(original),
        ..Default::default()
    });
    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    assert_eq!(
        doc.supplier_party.as_ref().unwrap().registration_name(),
        Some("Foreign Seller Ltd")
    );
    assert_eq!(
        doc.tax_representative_party.as_ref().unwrap().registration_name(),
        Some("ACME GmbH")
    );
}

#[test]
fn sales_order_only_uses_placeholder_order_id() {
    let mut invoice = common::invoice();
    invoice.ordering = Some(Ordering {
        sales: vec![DocumentRef::new("SO-77")],
        ..Default::default()
    });
    let doc = ubl::convert(&invoice, &peppol()).unwrap();
    let order = doc.order_reference.unwrap();
    assert_eq!(order.id, "NA");
    assert_eq!(order.sales_order_id.as_deref(), Some("SO-77"));
}

#[test]
fn oioubl_credit_transfer_uses_iban_means() {
    let doc = ubl::convert(&common::danish_invoice(), &ConvertOptions::new().context(OIOUBL)).unwrap();
    let pm = &doc.payment_means[0];
    assert_eq!(pm.payment_means_code.value, "31");
    assert_eq!(pm.payment_channel_code.as_ref().unwrap().value, "IBAN");
    let branch = pm
        .payee_financial_account
        .as_ref()
        .and_then(|a| a.financial_institution_branch.as_ref())
        .unwrap();
    assert_eq!(branch.financial_institution_id.as_deref(), Some("DABADKKK"));

    // OIOUBL also writes a tax total on every line.
    assert_eq!(doc.lines[0].tax_totals.len(), 1);
}

#[test]
fn xml_carries_namespaces_and_amounts() {
    let xml = ubl::to_ubl_xml(&common::invoice(), &peppol()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("xmlns=\"urn:oasis:names:specification:ubl:schema:xsd:Invoice-2\""));
    assert!(xml.contains("<cbc:ID>2024-001</cbc:ID>"));
    assert!(xml.contains("<cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>"));
    assert!(xml.contains("<cbc:DueDate>2024-07-15</cbc:DueDate>"));
    assert!(xml.contains("<cbc:PayableAmount currencyID=\"EUR\">2082.50</cbc:PayableAmount>"));
    assert!(xml.contains("<cbc:InvoicedQuantity unitCode=\"HUR\">10</cbc:InvoicedQuantity>"));
    assert!(xml.contains("<cbc:EndpointID schemeID=\"EM\">billing@acme.de</cbc:EndpointID>"));
}

#[test]
fn credit_note_xml_uses_credit_note_elements() {
    let xml = ubl::to_ubl_xml(&common::credit_note(), &peppol()).unwrap();
    assert!(xml.contains("<CreditNote "));
    assert!(xml.contains("<cbc:CreditNoteTypeCode>381</cbc:CreditNoteTypeCode>"));
    assert!(xml.contains("<cac:CreditNoteLine>"));
    assert!(xml.contains("<cbc:CreditedQuantity"));
    assert!(!xml.contains("<cbc:DueDate>"));
    assert!(xml.contains("<cac:BillingReference>"));
}

#[test]
fn special_characters_are_escaped() {
    let mut invoice = common::invoice();
    invoice.notes = vec![Note::new("Terms & <conditions>")];
    let xml = ubl::to_ubl_xml(&invoice, &peppol()).unwrap();
    assert!(xml.contains("Terms &amp; &lt;conditions&gt;"));
}
