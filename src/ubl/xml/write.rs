//! `Document` → UBL XML, in schema element order.

use super::writer::XmlWriter;
use crate::core::UblError;
use crate::ubl::document::{
    AllowanceCharge, BillingReference, Delivery, Document, DocumentLine, DocumentReference,
    ExchangeRate, FinancialAccount, Item, MonetaryTotal, Party, PaymentMeans, PaymentTerms, Period,
    PostalAddress, Price, TaxCategory, TaxScheme, TaxTotal,
};
use crate::ubl::{CAC, CBC, CCTS, QDT, UDT, XSI};

type W<'a> = &'a mut XmlWriter;

/// Serialize `doc` as an indented UBL document.
pub fn write_document(doc: &Document) -> Result<String, UblError> {
    let mut w = XmlWriter::new()?;
    let root = doc.kind.root_name();
    w.start_element_with_attrs(
        root,
        &[
            ("xmlns", doc.kind.namespace()),
            ("xmlns:cac", CAC),
            ("xmlns:cbc", CBC),
            ("xmlns:qdt", QDT),
            ("xmlns:udt", UDT),
            ("xmlns:ccts", CCTS),
            ("xmlns:xsi", XSI),
            ("xsi:schemaLocation", doc.kind.schema_location()),
        ],
    )?;

    w.opt_text("cbc:UBLVersionID", doc.ubl_version_id.as_deref())?;
    w.opt_text("cbc:CustomizationID", doc.customization_id.as_deref())?;
    w.opt_id("cbc:ProfileID", doc.profile_id.as_ref())?;
    w.text_element("cbc:ID", &doc.id)?;
    w.opt_text("cbc:UUID", doc.uuid.as_deref())?;
    w.text_element("cbc:IssueDate", &doc.issue_date)?;
    if !doc.is_credit_note() {
        w.opt_text("cbc:DueDate", doc.due_date.as_deref())?;
    }
    w.opt_id(
        &format!("cbc:{}", doc.kind.type_code_element()),
        doc.type_code.as_ref(),
    )?;
    w.texts("cbc:Note", &doc.notes)?;
    w.opt_text("cbc:DocumentCurrencyCode", doc.document_currency_code.as_deref())?;
    w.opt_text("cbc:TaxCurrencyCode", doc.tax_currency_code.as_deref())?;
    w.opt_text("cbc:AccountingCost", doc.accounting_cost.as_deref())?;
    w.opt_text("cbc:BuyerReference", doc.buyer_reference.as_deref())?;
    if let Some(p) = &doc.invoice_period {
        period(&mut w, "cac:InvoicePeriod", p)?;
    }
    if let Some(o) = &doc.order_reference {
        w.start_element("cac:OrderReference")?;
        w.text_element("cbc:ID", &o.id)?;
        w.opt_text("cbc:SalesOrderID", o.sales_order_id.as_deref())?;
        w.end_element("cac:OrderReference")?;
    }
    for b in &doc.billing_references {
        billing_reference(&mut w, b)?;
    }
    for r in &doc.despatch_document_references {
        document_reference(&mut w, "cac:DespatchDocumentReference", r)?;
    }
    for r in &doc.receipt_document_references {
        document_reference(&mut w, "cac:ReceiptDocumentReference", r)?;
    }
    for r in &doc.contract_document_references {
        document_reference(&mut w, "cac:ContractDocumentReference", r)?;
    }
    for r in &doc.additional_document_references {
        document_reference(&mut w, "cac:AdditionalDocumentReference", r)?;
    }
    for p in &doc.project_references {
        w.start_element("cac:ProjectReference")?;
        w.text_element("cbc:ID", p)?;
        w.end_element("cac:ProjectReference")?;
    }
    for s in &doc.signatures {
        w.start_element("cac:Signature")?;
        w.text_element("cbc:ID", &s.id)?;
        w.texts("cbc:Note", &s.notes)?;
        w.opt_text("cbc:ValidationDate", s.validation_date.as_deref())?;
        w.opt_text("cbc:SignatureMethod", s.signature_method.as_deref())?;
        w.end_element("cac:Signature")?;
    }

    if let Some(p) = &doc.supplier_party {
        w.start_element("cac:AccountingSupplierParty")?;
        party(&mut w, "cac:Party", p)?;
        w.end_element("cac:AccountingSupplierParty")?;
    }
    if let Some(p) = &doc.customer_party {
        w.start_element("cac:AccountingCustomerParty")?;
        party(&mut w, "cac:Party", p)?;
        w.end_element("cac:AccountingCustomerParty")?;
    }
    if let Some(p) = &doc.payee_party {
        party(&mut w, "cac:PayeeParty", p)?;
    }
    if let Some(p) = &doc.tax_representative_party {
        party(&mut w, "cac:TaxRepresentativeParty", p)?;
    }
    for d in &doc.deliveries {
        delivery(&mut w, d)?;
    }
    for pm in &doc.payment_means {
        payment_means(&mut w, pm)?;
    }
    for pt in &doc.payment_terms {
        payment_terms(&mut w, pt)?;
    }
    for pp in &doc.prepaid_payments {
        w.start_element("cac:PrepaidPayment")?;
        w.text_element("cbc:ID", &pp.id)?;
        w.opt_amount("cbc:PaidAmount", pp.paid_amount.as_ref())?;
        w.opt_text("cbc:ReceivedDate", pp.received_date.as_deref())?;
        w.end_element("cac:PrepaidPayment")?;
    }
    for ac in &doc.allowance_charges {
        allowance_charge(&mut w, ac)?;
    }
    if let Some(r) = &doc.tax_exchange_rate {
        exchange_rate(&mut w, r)?;
    }
    for t in &doc.tax_totals {
        tax_total(&mut w, t)?;
    }
    monetary_total(&mut w, &doc.legal_monetary_total)?;

    let line_element = format!("cac:{}", doc.kind.line_element());
    let quantity_element = format!("cbc:{}", doc.kind.quantity_element());
    for l in &doc.lines {
        line(&mut w, &line_element, &quantity_element, l)?;
    }

    w.end_element(root)?;
    w.into_string()
}

fn period(w: W, name: &str, p: &Period) -> Result<(), UblError> {
    w.start_element(name)?;
    w.opt_text("cbc:StartDate", p.start_date.as_deref())?;
    w.opt_text("cbc:EndDate", p.end_date.as_deref())?;
    w.end_element(name)?;
    Ok(())
}

fn billing_reference(w: W, b: &BillingReference) -> Result<(), UblError> {
    w.start_element("cac:BillingReference")?;
    let slots = [
        ("cac:InvoiceDocumentReference", &b.invoice_document_reference),
        (
            "cac:SelfBilledInvoiceDocumentReference",
            &b.self_billed_invoice_document_reference,
        ),
        ("cac:CreditNoteDocumentReference", &b.credit_note_document_reference),
        ("cac:AdditionalDocumentReference", &b.additional_document_reference),
    ];
    for (name, r) in slots {
        if let Some(r) = r {
            document_reference(w, name, r)?;
        }
    }
    w.end_element("cac:BillingReference")?;
    Ok(())
}

fn document_reference(w: W, name: &str, r: &DocumentReference) -> Result<(), UblError> {
    w.start_element(name)?;
    w.id_element("cbc:ID", &r.id)?;
    w.opt_text("cbc:IssueDate", r.issue_date.as_deref())?;
    w.opt_text("cbc:DocumentTypeCode", r.document_type_code.as_deref())?;
    w.opt_text("cbc:DocumentDescription", r.document_description.as_deref())?;
    if let Some(a) = &r.attachment {
        w.start_element("cac:Attachment")?;
        if let Some(obj) = &a.embedded {
            let attrs: Vec<(&str, &str)> = [("mimeCode", &obj.mime_code), ("filename", &obj.filename)]
                .into_iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
                .collect();
            w.text_element_with_attrs("cbc:EmbeddedDocumentBinaryObject", &obj.value, &attrs)?;
        }
        if let Some(uri) = &a.external_uri {
            w.start_element("cac:ExternalReference")?;
            w.text_element("cbc:URI", uri)?;
            w.end_element("cac:ExternalReference")?;
        }
        w.end_element("cac:Attachment")?;
    }
    w.end_element(name)?;
    Ok(())
}

fn party(w: W, name: &str, p: &Party) -> Result<(), UblError> {
    w.start_element(name)?;
    if let Some(ep) = &p.endpoint_id {
        w.text_element_with_attrs("cbc:EndpointID", &ep.value, &[("schemeID", ep.scheme_id.as_str())])?;
    }
    for id in &p.party_identifications {
        w.start_element("cac:PartyIdentification")?;
        w.id_element("cbc:ID", id)?;
        w.end_element("cac:PartyIdentification")?;
    }
    if let Some(n) = p.party_name.as_deref().filter(|n| !n.is_empty()) {
        w.start_element("cac:PartyName")?;
        w.text_element("cbc:Name", n)?;
        w.end_element("cac:PartyName")?;
    }
    if let Some(a) = &p.postal_address {
        address(w, "cac:PostalAddress", a)?;
    }
    for pts in &p.party_tax_schemes {
        w.start_element("cac:PartyTaxScheme")?;
        w.opt_id("cbc:CompanyID", pts.company_id.as_ref())?;
        if let Some(ts) = &pts.tax_scheme {
            tax_scheme(w, ts)?;
        }
        w.end_element("cac:PartyTaxScheme")?;
    }
    if let Some(le) = &p.party_legal_entity {
        w.start_element("cac:PartyLegalEntity")?;
        w.opt_text("cbc:RegistrationName", le.registration_name.as_deref())?;
        w.opt_id("cbc:CompanyID", le.company_id.as_ref())?;
        w.opt_text("cbc:CompanyLegalForm", le.company_legal_form.as_deref())?;
        w.end_element("cac:PartyLegalEntity")?;
    }
    if let Some(c) = p.contact.as_ref().filter(|c| !c.is_empty()) {
        w.start_element("cac:Contact")?;
        w.opt_text("cbc:ID", c.id.as_deref())?;
        w.opt_text("cbc:Name", c.name.as_deref())?;
        w.opt_text("cbc:Telephone", c.telephone.as_deref())?;
        w.opt_text("cbc:ElectronicMail", c.electronic_mail.as_deref())?;
        w.end_element("cac:Contact")?;
    }
    w.end_element(name)?;
    Ok(())
}

fn address(w: W, name: &str, a: &PostalAddress) -> Result<(), UblError> {
    w.start_element(name)?;
    w.opt_id("cbc:AddressFormatCode", a.address_format_code.as_ref())?;
    w.opt_text("cbc:StreetName", a.street_name.as_deref())?;
    w.opt_text("cbc:AdditionalStreetName", a.additional_street_name.as_deref())?;
    w.opt_text("cbc:BuildingNumber", a.building_number.as_deref())?;
    w.opt_text("cbc:CityName", a.city_name.as_deref())?;
    w.opt_text("cbc:PostalZone", a.postal_zone.as_deref())?;
    w.opt_text("cbc:CountrySubentity", a.country_subentity.as_deref())?;
    for line in a.address_lines.iter().filter(|l| !l.is_empty()) {
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", line)?;
        w.end_element("cac:AddressLine")?;
    }
    if let Some(c) = a.country.as_deref().filter(|c| !c.is_empty()) {
        w.start_element("cac:Country")?;
        w.text_element("cbc:IdentificationCode", c)?;
        w.end_element("cac:Country")?;
    }
    if let Some(lc) = &a.location_coordinate {
        w.start_element("cac:LocationCoordinate")?;
        w.opt_text("cbc:LatitudeDegreesMeasure", lc.latitude_degrees.as_deref())?;
        w.opt_text("cbc:LongitudeDegreesMeasure", lc.longitude_degrees.as_deref())?;
        w.end_element("cac:LocationCoordinate")?;
    }
    w.end_element(name)?;
    Ok(())
}

fn delivery(w: W, d: &Delivery) -> Result<(), UblError> {
    w.start_element("cac:Delivery")?;
    w.opt_text("cbc:ActualDeliveryDate", d.actual_delivery_date.as_deref())?;
    if let Some(loc) = &d.delivery_location {
        w.start_element("cac:DeliveryLocation")?;
        w.opt_id("cbc:ID", loc.id.as_ref())?;
        if let Some(a) = &loc.address {
            address(w, "cac:Address", a)?;
        }
        w.end_element("cac:DeliveryLocation")?;
    }
    if let Some(p) = &d.estimated_delivery_period {
        period(w, "cac:EstimatedDeliveryPeriod", p)?;
    }
    if let Some(p) = &d.delivery_party {
        party(w, "cac:DeliveryParty", p)?;
    }
    w.end_element("cac:Delivery")?;
    Ok(())
}

fn financial_account(w: W, name: &str, a: &FinancialAccount) -> Result<(), UblError> {
    w.start_element(name)?;
    w.opt_text("cbc:ID", a.id.as_deref())?;
    w.opt_text("cbc:Name", a.name.as_deref())?;
    if let Some(b) = &a.financial_institution_branch {
        w.start_element("cac:FinancialInstitutionBranch")?;
        w.opt_text("cbc:ID", b.id.as_deref())?;
        w.opt_text("cbc:Name", b.name.as_deref())?;
        if let Some(fi) = b.financial_institution_id.as_deref().filter(|f| !f.is_empty()) {
            w.start_element("cac:FinancialInstitution")?;
            w.text_element("cbc:ID", fi)?;
            w.end_element("cac:FinancialInstitution")?;
        }
        w.end_element("cac:FinancialInstitutionBranch")?;
    }
    w.end_element(name)?;
    Ok(())
}

fn payment_means(w: W, pm: &PaymentMeans) -> Result<(), UblError> {
    w.start_element("cac:PaymentMeans")?;
    w.id_element("cbc:PaymentMeansCode", &pm.payment_means_code)?;
    w.opt_text("cbc:PaymentDueDate", pm.payment_due_date.as_deref())?;
    w.opt_id("cbc:PaymentChannelCode", pm.payment_channel_code.as_ref())?;
    w.opt_text("cbc:InstructionID", pm.instruction_id.as_deref())?;
    w.texts("cbc:InstructionNote", &pm.instruction_notes)?;
    w.opt_text("cbc:PaymentID", pm.payment_id.as_deref())?;
    if let Some(c) = &pm.card_account {
        w.start_element("cac:CardAccount")?;
        w.text_element("cbc:PrimaryAccountNumberID", &c.primary_account_number_id)?;
        w.opt_text("cbc:NetworkID", c.network_id.as_deref())?;
        w.opt_text("cbc:HolderName", c.holder_name.as_deref())?;
        w.end_element("cac:CardAccount")?;
    }
    if let Some(a) = &pm.payee_financial_account {
        financial_account(w, "cac:PayeeFinancialAccount", a)?;
    }
    if let Some(m) = &pm.payment_mandate {
        w.start_element("cac:PaymentMandate")?;
        w.id_element("cbc:ID", &m.id)?;
        if let Some(a) = &m.payer_financial_account {
            financial_account(w, "cac:PayerFinancialAccount", a)?;
        }
        w.end_element("cac:PaymentMandate")?;
    }
    w.end_element("cac:PaymentMeans")?;
    Ok(())
}

fn payment_terms(w: W, pt: &PaymentTerms) -> Result<(), UblError> {
    w.start_element("cac:PaymentTerms")?;
    w.texts("cbc:Note", &pt.notes)?;
    w.opt_text("cbc:PaymentPercent", pt.payment_percent.as_deref())?;
    w.opt_amount("cbc:Amount", pt.amount.as_ref())?;
    w.opt_text("cbc:PaymentDueDate", pt.payment_due_date.as_deref())?;
    w.end_element("cac:PaymentTerms")?;
    Ok(())
}

fn allowance_charge(w: W, ac: &AllowanceCharge) -> Result<(), UblError> {
    w.start_element("cac:AllowanceCharge")?;
    w.text_element(
        "cbc:ChargeIndicator",
        if ac.charge_indicator { "true" } else { "false" },
    )?;
    w.opt_text("cbc:AllowanceChargeReasonCode", ac.reason_code.as_deref())?;
    w.opt_text("cbc:AllowanceChargeReason", ac.reason.as_deref())?;
    w.opt_text("cbc:MultiplierFactorNumeric", ac.multiplier_factor_numeric.as_deref())?;
    w.amount_element("cbc:Amount", &ac.amount)?;
    w.opt_amount("cbc:BaseAmount", ac.base_amount.as_ref())?;
    for tc in &ac.tax_categories {
        tax_category(w, "cac:TaxCategory", tc)?;
    }
    w.end_element("cac:AllowanceCharge")?;
    Ok(())
}

fn exchange_rate(w: W, r: &ExchangeRate) -> Result<(), UblError> {
    w.start_element("cac:TaxExchangeRate")?;
    w.text_element("cbc:SourceCurrencyCode", &r.source_currency_code)?;
    w.text_element("cbc:TargetCurrencyCode", &r.target_currency_code)?;
    w.opt_text("cbc:CalculationRate", r.calculation_rate.as_deref())?;
    w.opt_text("cbc:Date", r.date.as_deref())?;
    w.end_element("cac:TaxExchangeRate")?;
    Ok(())
}

fn tax_scheme(w: W, ts: &TaxScheme) -> Result<(), UblError> {
    w.start_element("cac:TaxScheme")?;
    w.id_element("cbc:ID", &ts.id)?;
    w.opt_text("cbc:Name", ts.name.as_deref())?;
    w.opt_text("cbc:TaxTypeCode", ts.tax_type_code.as_deref())?;
    w.end_element("cac:TaxScheme")?;
    Ok(())
}

fn tax_category(w: W, name: &str, tc: &TaxCategory) -> Result<(), UblError> {
    w.start_element(name)?;
    w.opt_id("cbc:ID", tc.id.as_ref())?;
    w.opt_text("cbc:Percent", tc.percent.as_deref())?;
    w.opt_text("cbc:TaxExemptionReasonCode", tc.tax_exemption_reason_code.as_deref())?;
    w.opt_text("cbc:TaxExemptionReason", tc.tax_exemption_reason.as_deref())?;
    if let Some(ts) = &tc.tax_scheme {
        tax_scheme(w, ts)?;
    }
    w.end_element(name)?;
    Ok(())
}

fn tax_total(w: W, t: &TaxTotal) -> Result<(), UblError> {
    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", &t.tax_amount)?;
    for st in &t.tax_subtotals {
        w.start_element("cac:TaxSubtotal")?;
        w.opt_amount("cbc:TaxableAmount", st.taxable_amount.as_ref())?;
        w.amount_element("cbc:TaxAmount", &st.tax_amount)?;
        tax_category(w, "cac:TaxCategory", &st.tax_category)?;
        w.end_element("cac:TaxSubtotal")?;
    }
    w.end_element("cac:TaxTotal")?;
    Ok(())
}

fn monetary_total(w: W, m: &MonetaryTotal) -> Result<(), UblError> {
    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", &m.line_extension_amount)?;
    w.amount_element("cbc:TaxExclusiveAmount", &m.tax_exclusive_amount)?;
    w.amount_element("cbc:TaxInclusiveAmount", &m.tax_inclusive_amount)?;
    w.opt_amount("cbc:AllowanceTotalAmount", m.allowance_total_amount.as_ref())?;
    w.opt_amount("cbc:ChargeTotalAmount", m.charge_total_amount.as_ref())?;
    w.opt_amount("cbc:PrepaidAmount", m.prepaid_amount.as_ref())?;
    w.opt_amount("cbc:PayableRoundingAmount", m.payable_rounding_amount.as_ref())?;
    w.opt_amount("cbc:PayableAmount", m.payable_amount.as_ref())?;
    w.end_element("cac:LegalMonetaryTotal")?;
    Ok(())
}

fn line(w: W, name: &str, quantity_name: &str, l: &DocumentLine) -> Result<(), UblError> {
    w.start_element(name)?;
    w.text_element("cbc:ID", &l.id)?;
    w.texts("cbc:Note", &l.notes)?;
    if let Some(q) = &l.quantity {
        w.quantity_element(quantity_name, q)?;
    }
    w.amount_element("cbc:LineExtensionAmount", &l.line_extension_amount)?;
    w.opt_text("cbc:AccountingCost", l.accounting_cost.as_deref())?;
    if let Some(p) = &l.invoice_period {
        period(w, "cac:InvoicePeriod", p)?;
    }
    if let Some(r) = l.order_line_reference.as_deref().filter(|r| !r.is_empty()) {
        w.start_element("cac:OrderLineReference")?;
        w.text_element("cbc:LineID", r)?;
        w.end_element("cac:OrderLineReference")?;
    }
    for ac in &l.allowance_charges {
        allowance_charge(w, ac)?;
    }
    for t in &l.tax_totals {
        tax_total(w, t)?;
    }
    if let Some(i) = &l.item {
        item(w, i)?;
    }
    if let Some(p) = &l.price {
        price(w, p)?;
    }
    w.end_element(name)?;
    Ok(())
}

fn item(w: W, i: &Item) -> Result<(), UblError> {
    w.start_element("cac:Item")?;
    w.opt_text("cbc:Description", i.description.as_deref())?;
    w.text_element("cbc:Name", &i.name)?;
    let identifications = [
        ("cac:BuyersItemIdentification", &i.buyers_item_identification),
        ("cac:SellersItemIdentification", &i.sellers_item_identification),
        ("cac:StandardItemIdentification", &i.standard_item_identification),
    ];
    for (name, id) in identifications {
        if let Some(id) = id {
            w.start_element(name)?;
            w.id_element("cbc:ID", id)?;
            w.end_element(name)?;
        }
    }
    if let Some(c) = i.origin_country.as_deref().filter(|c| !c.is_empty()) {
        w.start_element("cac:OriginCountry")?;
        w.text_element("cbc:IdentificationCode", c)?;
        w.end_element("cac:OriginCountry")?;
    }
    for c in &i.commodity_classifications {
        w.start_element("cac:CommodityClassification")?;
        w.id_element("cbc:ItemClassificationCode", c)?;
        w.end_element("cac:CommodityClassification")?;
    }
    if let Some(tc) = &i.classified_tax_category {
        tax_category(w, "cac:ClassifiedTaxCategory", tc)?;
    }
    for p in &i.additional_item_properties {
        w.start_element("cac:AdditionalItemProperty")?;
        w.text_element("cbc:Name", &p.name)?;
        w.text_element("cbc:Value", &p.value)?;
        w.end_element("cac:AdditionalItemProperty")?;
    }
    w.end_element("cac:Item")?;
    Ok(())
}

fn price(w: W, p: &Price) -> Result<(), UblError> {
    w.start_element("cac:Price")?;
    w.amount_element("cbc:PriceAmount", &p.price_amount)?;
    if let Some(q) = &p.base_quantity {
        w.quantity_element("cbc:BaseQuantity", q)?;
    }
    if let Some(ac) = &p.allowance_charge {
        allowance_charge(w, ac)?;
    }
    w.end_element("cac:Price")?;
    Ok(())
}
