//! Element tree → `Document`.

use super::reader::Element;
use crate::core::UblError;
use crate::ubl::document::{
    AllowanceCharge, Amount, BillingReference, BinaryObject, Branch, CardAccount, Contact,
    Delivery, DeliveryLocation, Document, DocumentAttachment, DocumentKind, DocumentLine,
    DocumentReference, EndpointId, ExchangeRate, FinancialAccount, IdType, Item, ItemProperty,
    LocationCoordinate, MonetaryTotal, OrderReference, Party, PartyLegalEntity, PartyTaxScheme,
    PaymentMandate, PaymentMeans, PaymentTerms, Period, PostalAddress, PrepaidPayment, Price,
    Quantity, Signature, TaxCategory, TaxScheme, TaxSubtotal, TaxTotal,
};

/// Map a parsed root element to a document. Fails on a root namespace
/// other than Invoice or CreditNote.
pub fn read_document(root: &Element) -> Result<Document, UblError> {
    let kind = root
        .namespace
        .as_deref()
        .and_then(DocumentKind::from_namespace)
        .ok_or(UblError::UnknownDocumentType)?;

    Ok(Document {
        kind,
        ubl_version_id: root.text_of("UBLVersionID"),
        customization_id: root.text_of("CustomizationID"),
        profile_id: root.child("ProfileID").map(id),
        id: root.text_of("ID").unwrap_or_default(),
        uuid: root.text_of("UUID"),
        issue_date: root.text_of("IssueDate").unwrap_or_default(),
        due_date: root.text_of("DueDate"),
        type_code: root.child(kind.type_code_element()).map(id),
        notes: root.texts_of("Note"),
        document_currency_code: root.text_of("DocumentCurrencyCode"),
        tax_currency_code: root.text_of("TaxCurrencyCode"),
        accounting_cost: root.text_of("AccountingCost"),
        buyer_reference: root.text_of("BuyerReference"),
        invoice_period: root.child("InvoicePeriod").map(period),
        order_reference: root.child("OrderReference").map(|o| OrderReference {
            id: o.text_of("ID").unwrap_or_default(),
            sales_order_id: o.text_of("SalesOrderID"),
        }),
        billing_references: root
            .children_named("BillingReference")
            .map(billing_reference)
            .collect(),
        despatch_document_references: references(root, "DespatchDocumentReference"),
        receipt_document_references: references(root, "ReceiptDocumentReference"),
        contract_document_references: references(root, "ContractDocumentReference"),
        additional_document_references: references(root, "AdditionalDocumentReference"),
        project_references: root
            .children_named("ProjectReference")
            .filter_map(|p| p.text_of("ID"))
            .collect(),
        signatures: root
            .children_named("Signature")
            .map(|s| Signature {
                id: s.text_of("ID").unwrap_or_default(),
                notes: s.texts_of("Note"),
                validation_date: s.text_of("ValidationDate"),
                signature_method: s.text_of("SignatureMethod"),
            })
            .collect(),
        supplier_party: root.at(&["AccountingSupplierParty", "Party"]).map(party),
        customer_party: root.at(&["AccountingCustomerParty", "Party"]).map(party),
        payee_party: root.child("PayeeParty").map(party),
        tax_representative_party: root.child("TaxRepresentativeParty").map(party),
        deliveries: root.children_named("Delivery").map(delivery).collect(),
        payment_means: root.children_named("PaymentMeans").map(payment_means).collect(),
        payment_terms: root
            .children_named("PaymentTerms")
            .map(|t| PaymentTerms {
                notes: t.texts_of("Note"),
                payment_percent: t.text_of("PaymentPercent"),
                amount: t.child("Amount").map(amount),
                payment_due_date: t.text_of("PaymentDueDate"),
            })
            .collect(),
        prepaid_payments: root
            .children_named("PrepaidPayment")
            .map(|p| PrepaidPayment {
                id: p.text_of("ID").unwrap_or_default(),
                paid_amount: p.child("PaidAmount").map(amount),
                received_date: p.text_of("ReceivedDate"),
            })
            .collect(),
        allowance_charges: root
            .children_named("AllowanceCharge")
            .map(allowance_charge)
            .collect(),
        tax_exchange_rate: root.child("TaxExchangeRate").map(|r| ExchangeRate {
            source_currency_code: r.text_of("SourceCurrencyCode").unwrap_or_default(),
            target_currency_code: r.text_of("TargetCurrencyCode").unwrap_or_default(),
            calculation_rate: r.text_of("CalculationRate"),
            date: r.text_of("Date"),
        }),
        tax_totals: root.children_named("TaxTotal").map(tax_total).collect(),
        legal_monetary_total: root
            .child("LegalMonetaryTotal")
            .map(monetary_total)
            .unwrap_or_default(),
        lines: root
            .children_named(kind.line_element())
            .map(|l| line(l, kind))
            .collect(),
    })
}

fn id(el: &Element) -> IdType {
    IdType {
        value: el.text.clone(),
        scheme_id: el.attr("schemeID").map(str::to_string),
        scheme_agency_id: el.attr("schemeAgencyID").map(str::to_string),
        scheme_name: el.attr("schemeName").map(str::to_string),
        list_id: el.attr("listID").map(str::to_string),
        list_agency_id: el.attr("listAgencyID").map(str::to_string),
        list_version_id: el.attr("listVersionID").map(str::to_string),
        name: el.attr("name").map(str::to_string),
    }
}

fn amount(el: &Element) -> Amount {
    Amount {
        value: el.text.clone(),
        currency_id: el.attr("currencyID").map(str::to_string),
    }
}

fn quantity(el: &Element) -> Quantity {
    Quantity {
        value: el.text.clone(),
        unit_code: el.attr("unitCode").map(str::to_string),
    }
}

fn period(el: &Element) -> Period {
    Period {
        start_date: el.text_of("StartDate"),
        end_date: el.text_of("EndDate"),
    }
}

fn billing_reference(el: &Element) -> BillingReference {
    BillingReference {
        invoice_document_reference: el.child("InvoiceDocumentReference").map(document_reference),
        self_billed_invoice_document_reference: el
            .child("SelfBilledInvoiceDocumentReference")
            .map(document_reference),
        credit_note_document_reference: el
            .child("CreditNoteDocumentReference")
            .map(document_reference),
        additional_document_reference: el
            .child("AdditionalDocumentReference")
            .map(document_reference),
    }
}

fn references(el: &Element, name: &str) -> Vec<DocumentReference> {
    el.children_named(name).map(document_reference).collect()
}

fn document_reference(el: &Element) -> DocumentReference {
    DocumentReference {
        id: el.child("ID").map(id).unwrap_or_default(),
        issue_date: el.text_of("IssueDate"),
        document_type_code: el.text_of("DocumentTypeCode"),
        document_description: el.text_of("DocumentDescription"),
        attachment: el.child("Attachment").map(|a| DocumentAttachment {
            embedded: a.child("EmbeddedDocumentBinaryObject").map(|o| BinaryObject {
                mime_code: o.attr("mimeCode").map(str::to_string),
                filename: o.attr("filename").map(str::to_string),
                value: o.text.clone(),
            }),
            external_uri: a.at(&["ExternalReference", "URI"]).map(|u| u.text.clone()),
        }),
    }
}

fn party(el: &Element) -> Party {
    Party {
        endpoint_id: el.child("EndpointID").map(|e| EndpointId {
            scheme_id: e.attr("schemeID").unwrap_or_default().to_string(),
            value: e.text.clone(),
        }),
        party_identifications: el
            .children_named("PartyIdentification")
            .filter_map(|p| p.child("ID"))
            .map(id)
            .collect(),
        party_name: el.at(&["PartyName", "Name"]).map(|n| n.text.clone()),
        postal_address: el.child("PostalAddress").map(address),
        party_tax_schemes: el
            .children_named("PartyTaxScheme")
            .map(|p| PartyTaxScheme {
                company_id: p.child("CompanyID").map(id),
                tax_scheme: p.child("TaxScheme").map(tax_scheme),
            })
            .collect(),
        party_legal_entity: el.child("PartyLegalEntity").map(|l| PartyLegalEntity {
            registration_name: l.text_of("RegistrationName"),
            company_id: l.child("CompanyID").map(id),
            company_legal_form: l.text_of("CompanyLegalForm"),
        }),
        contact: el.child("Contact").map(|c| Contact {
            id: c.text_of("ID"),
            name: c.text_of("Name"),
            telephone: c.text_of("Telephone"),
            electronic_mail: c.text_of("ElectronicMail"),
        }),
    }
}

fn address(el: &Element) -> PostalAddress {
    PostalAddress {
        address_format_code: el.child("AddressFormatCode").map(id),
        street_name: el.text_of("StreetName"),
        additional_street_name: el.text_of("AdditionalStreetName"),
        building_number: el.text_of("BuildingNumber"),
        city_name: el.text_of("CityName"),
        postal_zone: el.text_of("PostalZone"),
        country_subentity: el.text_of("CountrySubentity"),
        address_lines: el
            .children_named("AddressLine")
            .filter_map(|l| l.text_of("Line"))
            .collect(),
        country: el.at(&["Country", "IdentificationCode"]).map(|c| c.text.clone()),
        location_coordinate: el.child("LocationCoordinate").map(|c| LocationCoordinate {
            latitude_degrees: c.text_of("LatitudeDegreesMeasure"),
            longitude_degrees: c.text_of("LongitudeDegreesMeasure"),
        }),
    }
}

fn delivery(el: &Element) -> Delivery {
    Delivery {
        actual_delivery_date: el.text_of("ActualDeliveryDate"),
        delivery_location: el.child("DeliveryLocation").map(|l| DeliveryLocation {
            id: l.child("ID").map(id),
            address: l.child("Address").map(address),
        }),
        estimated_delivery_period: el.child("EstimatedDeliveryPeriod").map(period),
        delivery_party: el.child("DeliveryParty").map(party),
    }
}

fn financial_account(el: &Element) -> FinancialAccount {
    FinancialAccount {
        id: el.text_of("ID"),
        name: el.text_of("Name"),
        financial_institution_branch: el.child("FinancialInstitutionBranch").map(|b| Branch {
            id: b.text_of("ID"),
            name: b.text_of("Name"),
            financial_institution_id: b.at(&["FinancialInstitution", "ID"]).map(|i| i.text.clone()),
        }),
    }
}

fn payment_means(el: &Element) -> PaymentMeans {
    PaymentMeans {
        payment_means_code: el.child("PaymentMeansCode").map(id).unwrap_or_default(),
        payment_due_date: el.text_of("PaymentDueDate"),
        payment_channel_code: el.child("PaymentChannelCode").map(id),
        instruction_id: el.text_of("InstructionID"),
        instruction_notes: el.texts_of("InstructionNote"),
        payment_id: el.text_of("PaymentID"),
        card_account: el.child("CardAccount").map(|c| CardAccount {
            primary_account_number_id: c.text_of("PrimaryAccountNumberID").unwrap_or_default(),
            network_id: c.text_of("NetworkID"),
            holder_name: c.text_of("HolderName"),
        }),
        payee_financial_account: el.child("PayeeFinancialAccount").map(financial_account),
        payment_mandate: el.child("PaymentMandate").map(|m| PaymentMandate {
            id: m.child("ID").map(id).unwrap_or_default(),
            payer_financial_account: m.child("PayerFinancialAccount").map(financial_account),
        }),
    }
}

fn allowance_charge(el: &Element) -> AllowanceCharge {
    AllowanceCharge {
        charge_indicator: el
            .text_of("ChargeIndicator")
            .is_some_and(|c| c.trim().eq_ignore_ascii_case("true")),
        reason_code: el.text_of("AllowanceChargeReasonCode"),
        reason: el.text_of("AllowanceChargeReason"),
        multiplier_factor_numeric: el.text_of("MultiplierFactorNumeric"),
        amount: el.child("Amount").map(amount).unwrap_or_default(),
        base_amount: el.child("BaseAmount").map(amount),
        tax_categories: el.children_named("TaxCategory").map(tax_category).collect(),
    }
}

fn tax_scheme(el: &Element) -> TaxScheme {
    TaxScheme {
        id: el.child("ID").map(id).unwrap_or_default(),
        name: el.text_of("Name"),
        tax_type_code: el.text_of("TaxTypeCode"),
    }
}

fn tax_category(el: &Element) -> TaxCategory {
    TaxCategory {
        id: el.child("ID").map(id),
        percent: el.text_of("Percent"),
        tax_exemption_reason_code: el.text_of("TaxExemptionReasonCode"),
        tax_exemption_reason: el.text_of("TaxExemptionReason"),
        tax_scheme: el.child("TaxScheme").map(tax_scheme),
    }
}

fn tax_total(el: &Element) -> TaxTotal {
    TaxTotal {
        tax_amount: el.child("TaxAmount").map(amount).unwrap_or_default(),
        tax_subtotals: el
            .children_named("TaxSubtotal")
            .map(|s| TaxSubtotal {
                taxable_amount: s.child("TaxableAmount").map(amount),
                tax_amount: s.child("TaxAmount").map(amount).unwrap_or_default(),
                tax_category: s.child("TaxCategory").map(tax_category).unwrap_or_default(),
            })
            .collect(),
    }
}

fn monetary_total(el: &Element) -> MonetaryTotal {
    let required = |name: &str| el.child(name).map(amount).unwrap_or_default();
    MonetaryTotal {
        line_extension_amount: required("LineExtensionAmount"),
        tax_exclusive_amount: required("TaxExclusiveAmount"),
        tax_inclusive_amount: required("TaxInclusiveAmount"),
        allowance_total_amount: el.child("AllowanceTotalAmount").map(amount),
        charge_total_amount: el.child("ChargeTotalAmount").map(amount),
        prepaid_amount: el.child("PrepaidAmount").map(amount),
        payable_rounding_amount: el.child("PayableRoundingAmount").map(amount),
        payable_amount: el.child("PayableAmount").map(amount),
    }
}

fn line(el: &Element, kind: DocumentKind) -> DocumentLine {
    DocumentLine {
        id: el.text_of("ID").unwrap_or_default(),
        notes: el.texts_of("Note"),
        quantity: el.child(kind.quantity_element()).map(quantity),
        line_extension_amount: el.child("LineExtensionAmount").map(amount).unwrap_or_default(),
        accounting_cost: el.text_of("AccountingCost"),
        invoice_period: el.child("InvoicePeriod").map(period),
        order_line_reference: el.at(&["OrderLineReference", "LineID"]).map(|l| l.text.clone()),
        allowance_charges: el
            .children_named("AllowanceCharge")
            .map(allowance_charge)
            .collect(),
        tax_totals: el.children_named("TaxTotal").map(tax_total).collect(),
        item: el.child("Item").map(item),
        price: el.child("Price").map(|p| Price {
            price_amount: p.child("PriceAmount").map(amount).unwrap_or_default(),
            base_quantity: p.child("BaseQuantity").map(quantity),
            allowance_charge: p.child("AllowanceCharge").map(allowance_charge),
        }),
    }
}

fn item(el: &Element) -> Item {
    let identification = |name: &str| el.at(&[name, "ID"]).map(id);
    Item {
        description: el.text_of("Description"),
        name: el.text_of("Name").unwrap_or_default(),
        buyers_item_identification: identification("BuyersItemIdentification"),
        sellers_item_identification: identification("SellersItemIdentification"),
        standard_item_identification: identification("StandardItemIdentification"),
        origin_country: el
            .at(&["OriginCountry", "IdentificationCode"])
            .map(|c| c.text.clone()),
        commodity_classifications: el
            .children_named("CommodityClassification")
            .filter_map(|c| c.child("ItemClassificationCode"))
            .map(id)
            .collect(),
        classified_tax_category: el.child("ClassifiedTaxCategory").map(tax_category),
        additional_item_properties: el
            .children_named("AdditionalItemProperty")
            .map(|p| ItemProperty {
                name: p.text_of("Name").unwrap_or_default(),
                value: p.text_of("Value").unwrap_or_default(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ubl::xml::reader::parse_tree;

    #[test]
    fn unknown_namespace_is_rejected() {
        for xml in [
            r#"<Order xmlns="urn:oasis:names:specification:ubl:schema:xsd:Order-2"/>"#,
            r#"<Invoice xmlns="urn:example:not-ubl"/>"#,
            "<Invoice/>",
        ] {
            let root = parse_tree(xml).unwrap();
            assert!(
                matches!(read_document(&root), Err(UblError::UnknownDocumentType)),
                "{xml}"
            );
        }
    }

    #[test]
    fn credit_note_lines_and_type_code() {
        let xml = r#"<CreditNote xmlns="urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2"
  xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
  xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:ID>CN-1</cbc:ID>
  <cbc:CreditNoteTypeCode listID="UNCL1001">381</cbc:CreditNoteTypeCode>
  <cac:CreditNoteLine>
    <cbc:ID>1</cbc:ID>
    <cbc:CreditedQuantity unitCode="C62">2</cbc:CreditedQuantity>
    <cbc:LineExtensionAmount currencyID="EUR">20.00</cbc:LineExtensionAmount>
  </cac:CreditNoteLine>
</CreditNote>"#;
        let doc = read_document(&parse_tree(xml).unwrap()).unwrap();
        assert!(doc.is_credit_note());
        let tc = doc.type_code.unwrap();
        assert_eq!(tc.value, "381");
        assert_eq!(tc.list_id.as_deref(), Some("UNCL1001"));
        let q = doc.lines[0].quantity.as_ref().unwrap();
        assert_eq!(q.value, "2");
        assert_eq!(q.unit_code.as_deref(), Some("C62"));
        assert_eq!(
            doc.lines[0].line_extension_amount.currency_id.as_deref(),
            Some("EUR")
        );
    }
}
