//! UBL XML → canonical invoice.
//!
//! Run with: `cargo test --test reverse_tests`

mod common;

use rust_decimal_macros::dec;
use ublmap::core::*;
use ublmap::ubl::{self, DocumentKind};

fn peppol_invoice() -> Invoice {
    ubl::from_ubl_xml(common::fixture("peppol_invoice.xml")).unwrap()
}

#[test]
fn header_fields() {
    let inv = peppol_invoice();
    assert_eq!(inv.code, "INV-2024-0042");
    assert_eq!(inv.series, None);
    assert_eq!(inv.issue_date, common::date(2024, 3, 1));
    assert_eq!(inv.currency, "EUR");
    assert_eq!(inv.invoice_type, InvoiceType::Standard);
    assert_eq!(inv.document_type(), Some("380"));
    assert_eq!(inv.addons, vec!["eu-en16931-v2017".to_string()]);
    assert!(inv.meta.is_empty());
    assert_eq!(
        inv.notes,
        vec![Note::new("Please quote the invoice number with your payment.")]
    );
}

#[test]
fn supplier_identities_are_distributed() {
    let supplier = peppol_invoice().supplier;
    assert_eq!(supplier.name, "Nordic Supplies B.V.");
    assert_eq!(supplier.alias.as_deref(), Some("Nordic Supplies"));

    let tax_id = supplier.tax_id.as_ref().unwrap();
    assert_eq!(tax_id.country, "NL");
    assert_eq!(tax_id.code, "123456789B01");

    let legal = supplier
        .identities
        .iter()
        .find(|i| i.scope == IdentityScope::Legal)
        .unwrap();
    assert_eq!(legal.code, "12345678");
    assert_eq!(legal.scheme.as_deref(), Some("0106"));

    let gln = supplier
        .identities
        .iter()
        .find(|i| i.scheme.as_deref() == Some("0088"))
        .unwrap();
    assert_eq!(gln.code, "7300010000001");

    assert_eq!(supplier.inboxes[0].scheme.as_deref(), Some("0088"));
    assert_eq!(supplier.people[0].full_name(), "Anna de Vries");
    assert_eq!(supplier.emails, vec!["billing@nordic.example".to_string()]);
}

#[test]
fn customer_address_and_inbox() {
    let customer = peppol_invoice().customer.unwrap();
    assert_eq!(customer.name, "Buyer NV");
    assert_eq!(customer.inboxes[0].email.as_deref(), Some("ap@buyer.example"));
    let addr = &customer.addresses[0];
    assert_eq!(addr.street.as_deref(), Some("Harbour Road"));
    assert_eq!(addr.number.as_deref(), Some("7"));
    assert_eq!(addr.country.as_deref(), Some("BE"));
    assert_eq!(customer.tax_id.as_ref().unwrap().code, "0477472701");
}

#[test]
fn lines_with_base_quantity_keep_precision() {
    let inv = peppol_invoice();
    assert_eq!(inv.lines.len(), 3);

    let paper = &inv.lines[0];
    assert_eq!(paper.index, 1);
    assert_eq!(paper.quantity, dec!(100));
    assert_eq!(paper.item.unit.as_deref(), Some("one"));
    assert_eq!(paper.item.price.unwrap().to_string(), "8.000");
    assert_eq!(paper.total, Some(dec!(800.00)));
    assert_eq!(paper.order.as_deref(), Some("3"));
    assert_eq!(paper.item.reference.as_deref(), Some("PAP-A4"));
    assert_eq!(paper.item.origin.as_deref(), Some("DE"));
    assert_eq!(paper.item.meta.get("colour").map(String::as_str), Some("White"));
    assert!(!paper.item.meta.contains_key("Colour"));
    assert_eq!(paper.item.identities[0].scheme.as_deref(), Some("0160"));
    assert_eq!(paper.notes, vec![Note::new("Urgent order")]);

    let tax = &paper.taxes[0];
    assert_eq!(tax.category, "VAT");
    assert_eq!(tax.tax_code.as_deref(), Some("S"));
    assert_eq!(tax.percent, Some(Percentage::new(dec!(21))));

    assert_eq!(inv.lines[1].item.unit.as_deref(), Some("h"));
}

#[test]
fn zero_percent_on_exempt_line_is_suppressed() {
    let inv = peppol_invoice();
    let tax = &inv.lines[2].taxes[0];
    assert_eq!(tax.tax_code.as_deref(), Some("E"));
    assert_eq!(tax.percent, None);
    assert_eq!(tax.exemption_code.as_deref(), Some("VATEX-EU-132"));
}

#[test]
fn zero_percent_on_zero_rated_line_is_kept() {
    let xml = common::fixture("peppol_invoice.xml").replace(
        "<cbc:ID>E</cbc:ID>\n        <cbc:Percent>0</cbc:Percent>\n        <cac:TaxScheme>",
        "<cbc:ID>Z</cbc:ID>\n        <cbc:Percent>0</cbc:Percent>\n        <cac:TaxScheme>",
    );
    let inv = ubl::from_ubl_xml(xml).unwrap();
    let tax = &inv.lines[2].taxes[0];
    assert_eq!(tax.tax_code.as_deref(), Some("Z"));
    assert_eq!(tax.percent, Some(Percentage::ZERO));
}

#[test]
fn document_charges_and_discounts() {
    let inv = peppol_invoice();
    assert_eq!(inv.charges.len(), 1);
    assert_eq!(inv.discounts.len(), 1);

    let freight = &inv.charges[0];
    assert_eq!(freight.reason.as_deref(), Some("Freight"));
    assert_eq!(freight.reason_code.as_deref(), Some("FC"));
    assert_eq!(freight.percent, Some(Percentage::new(dec!(5))));
    assert_eq!(freight.base, Some(dec!(1000.00)));
    assert_eq!(freight.amount, dec!(50.00));
    assert_eq!(freight.taxes[0].percent, Some(Percentage::new(dec!(21))));

    assert_eq!(inv.discounts[0].amount, dec!(10.00));
    assert_eq!(inv.discounts[0].percent, None);
}

#[test]
fn totals_and_breakdown() {
    let t = peppol_invoice().totals;
    assert_eq!(t.sum, dec!(1000.00));
    assert_eq!(t.discount, Some(dec!(10.00)));
    assert_eq!(t.charge, Some(dec!(50.00)));
    assert_eq!(t.total, dec!(1040.00));
    assert_eq!(t.tax, dec!(218.40));
    assert_eq!(t.total_with_tax, dec!(1258.40));
    assert_eq!(t.payable, dec!(1258.40));
    assert_eq!(t.due, None);

    let cats = &t.taxes.as_ref().unwrap().categories;
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].code, "VAT");
    assert_eq!(cats[0].rates.len(), 2);
    assert_eq!(cats[0].rates[0].percent, Some(Percentage::new(dec!(21))));
    assert_eq!(cats[0].rates[1].percent, None);
    assert_eq!(cats[0].rates[1].exemption_code.as_deref(), Some("VATEX-EU-132"));
}

#[test]
fn ordering_delivery_and_attachments() {
    let inv = peppol_invoice();
    let ordering = inv.ordering.as_ref().unwrap();
    assert_eq!(ordering.code.as_deref(), Some("BR-991"));
    assert_eq!(ordering.purchases[0].code, "PO-5566");
    assert_eq!(ordering.contracts[0].code, "CT-2023-17");
    let period = ordering.period.unwrap();
    assert_eq!(period.start, common::date(2024, 2, 1));
    assert_eq!(period.end, common::date(2024, 2, 29));

    let delivery = inv.delivery.as_ref().unwrap();
    assert_eq!(delivery.date, Some(common::date(2024, 2, 28)));
    let receiver = delivery.receiver.as_ref().unwrap();
    assert_eq!(receiver.addresses[0].street.as_deref(), Some("Dock 4"));

    assert_eq!(inv.attachments.len(), 1);
    assert_eq!(
        inv.attachments[0].url.as_deref(),
        Some("https://example.com/timesheets/TS-1.pdf")
    );
    assert_eq!(inv.attachments[0].description.as_deref(), Some("Timesheet"));
}

#[test]
fn payment_instructions_and_terms() {
    let payment = peppol_invoice().payment.unwrap();
    let instructions = payment.instructions.unwrap();
    assert_eq!(instructions.means_code.as_deref(), Some("58"));
    assert_eq!(instructions.key.as_deref(), Some("credit-transfer+sepa"));
    assert_eq!(instructions.detail.as_deref(), Some("SEPA credit transfer"));
    assert_eq!(instructions.reference.as_deref(), Some("INV-2024-0042"));
    let ct = &instructions.credit_transfer[0];
    assert_eq!(ct.iban.as_deref(), Some("NL91ABNA0417164300"));
    assert_eq!(ct.bic.as_deref(), Some("ABNANL2A"));
    assert_eq!(ct.name.as_deref(), Some("Nordic Supplies B.V."));

    let terms = payment.terms.unwrap();
    assert_eq!(terms.notes.as_deref(), Some("Net 30 days"));
    assert_eq!(terms.due_dates.len(), 1);
    assert_eq!(terms.due_dates[0].date, Some(common::date(2024, 3, 31)));
    assert_eq!(terms.due_dates[0].percent, Some(Percentage::new(dec!(100))));
}

#[test]
fn credit_note_without_type_code() {
    let doc = ubl::parse(common::fixture("credit_note.xml")).unwrap();
    assert_eq!(doc.kind, DocumentKind::CreditNote);
    assert_eq!(doc.lines.len(), 1);
    assert_eq!(doc.lines[0].quantity.as_ref().unwrap().value, "2");

    let inv = doc.to_invoice().unwrap();
    assert_eq!(inv.invoice_type, InvoiceType::CreditNote);
    assert_eq!(inv.document_type(), None);
    assert_eq!(inv.addons, vec!["de-xrechnung-v3".to_string()]);
    assert_eq!(inv.preceding[0].code, "RE-2024-0815");
    assert_eq!(inv.preceding[0].issue_date, Some(common::date(2024, 3, 15)));

    let due = &inv.payment.unwrap().terms.unwrap().due_dates[0];
    assert_eq!(due.date, Some(common::date(2024, 4, 30)));
    assert_eq!(due.notes.as_deref(), Some("Amount will be refunded"));
}

#[test]
fn embedded_attachments_are_extracted_not_mapped() {
    let doc = ubl::parse(common::fixture("credit_note.xml")).unwrap();
    let binaries = doc.extract_binary_attachments();
    assert_eq!(binaries.len(), 1);
    assert_eq!(binaries[0].filename.as_deref(), Some("gutschrift.pdf"));
    assert_eq!(binaries[0].mime_code.as_deref(), Some("application/pdf"));
    assert_eq!(binaries[0].data, "JVBERi0xLjQK");

    assert!(doc.to_invoice().unwrap().attachments.is_empty());
}

#[test]
fn legacy_document_is_detected() {
    let inv = ubl::from_ubl_xml(common::fixture("oioubl21_invoice.xml")).unwrap();
    assert_eq!(inv.uuid.as_deref(), Some("9756b4d0-8815-1029-857a-e388fe63f399"));
    assert_eq!(inv.currency, "DKK");

    let supplier = &inv.supplier;
    assert_eq!(supplier.inboxes[0].scheme.as_deref(), Some("DK:CVR"));
    let tax_id = supplier.tax_id.as_ref().unwrap();
    assert_eq!(tax_id.country, "DK");
    assert_eq!(tax_id.code, "37990485");
    assert_eq!(supplier.addresses[0].number.as_deref(), Some("12"));

    let instructions = inv.payment.as_ref().and_then(|p| p.instructions.as_ref()).unwrap();
    assert_eq!(instructions.channel.as_deref(), Some("IBAN"));
    assert_eq!(instructions.credit_transfer[0].bic.as_deref(), Some("DABADKKK"));

    let terms = inv.payment.as_ref().and_then(|p| p.terms.as_ref()).unwrap();
    assert_eq!(terms.due_dates[0].date, Some(common::date(2024, 10, 1)));
}

#[test]
fn unknown_profile_is_kept_in_meta() {
    let xml = common::fixture("peppol_invoice.xml").replace(
        "<cbc:CustomizationID>urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0</cbc:CustomizationID>",
        "<cbc:CustomizationID>urn:cen.eu:en16931:2017</cbc:CustomizationID>",
    );
    let inv = ubl::from_ubl_xml(xml).unwrap();
    assert_eq!(
        inv.meta.get(META_KEY_UBL_PROFILE).map(String::as_str),
        Some("urn:fdc:peppol.eu:2017:poacc:billing:01:1.0")
    );
}

#[test]
fn foreign_namespace_is_unknown_document_type() {
    let xml = r#"<?xml version="1.0"?>
<Order xmlns="urn:oasis:names:specification:ubl:schema:xsd:Order-2"
       xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:ID>O-1</cbc:ID>
</Order>"#;
    assert!(matches!(ubl::parse(xml), Err(UblError::UnknownDocumentType)));
}

#[test]
fn malformed_input_is_an_xml_error() {
    assert!(matches!(ubl::parse(""), Err(UblError::Xml(_))));
    assert!(matches!(ubl::parse("not xml at all"), Err(UblError::Xml(_))));
    assert!(matches!(ubl::parse(&[0xff, 0xfe, 0x00][..]), Err(UblError::Xml(_))));
}

#[test]
fn malformed_amount_is_a_numeric_error() {
    let xml = common::fixture("peppol_invoice.xml").replace(
        "<cbc:PriceAmount currencyID=\"EUR\">100.00</cbc:PriceAmount>",
        "<cbc:PriceAmount currencyID=\"EUR\">one hundred</cbc:PriceAmount>",
    );
    match ubl::from_ubl_xml(xml) {
        Err(UblError::Numeric { input, .. }) => assert_eq!(input, "one hundred"),
        other => panic!("expected numeric error, got {other:?}"),
    }
}

#[test]
fn leading_decimal_point_is_normalized() {
    let xml = common::fixture("peppol_invoice.xml").replace(
        "<cbc:PriceAmount currencyID=\"EUR\">0.00</cbc:PriceAmount>",
        "<cbc:PriceAmount currencyID=\"EUR\"> .50</cbc:PriceAmount>",
    );
    let inv = ubl::from_ubl_xml(xml).unwrap();
    assert_eq!(inv.lines[2].item.price, Some(dec!(0.50)));
}
