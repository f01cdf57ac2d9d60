//! UBL 2.1 Invoice / CreditNote document tree.
//!
//! The structures mirror the XML shape closely and keep every value as
//! text, exactly as it appears on the wire. Numbers are only interpreted
//! when mapping to the canonical model.

use super::{
    NS_CREDIT_NOTE, NS_INVOICE, SCHEMA_LOCATION_CREDIT_NOTE, SCHEMA_LOCATION_INVOICE,
};

/// Root element flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    #[default]
    Invoice,
    CreditNote,
}

impl DocumentKind {
    /// Detect the kind from a root element namespace.
    pub fn from_namespace(ns: &str) -> Option<Self> {
        match ns {
            NS_INVOICE => Some(Self::Invoice),
            NS_CREDIT_NOTE => Some(Self::CreditNote),
            _ => None,
        }
    }

    pub fn root_name(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::CreditNote => "CreditNote",
        }
    }

    pub fn namespace(self) -> &'static str {
        match self {
            Self::Invoice => NS_INVOICE,
            Self::CreditNote => NS_CREDIT_NOTE,
        }
    }

    pub fn schema_location(self) -> &'static str {
        match self {
            Self::Invoice => SCHEMA_LOCATION_INVOICE,
            Self::CreditNote => SCHEMA_LOCATION_CREDIT_NOTE,
        }
    }

    /// Local name of the type code element.
    pub fn type_code_element(self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceTypeCode",
            Self::CreditNote => "CreditNoteTypeCode",
        }
    }

    /// Local name of the line element.
    pub fn line_element(self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceLine",
            Self::CreditNote => "CreditNoteLine",
        }
    }

    /// Local name of the line quantity element.
    pub fn quantity_element(self) -> &'static str {
        match self {
            Self::Invoice => "InvoicedQuantity",
            Self::CreditNote => "CreditedQuantity",
        }
    }
}

/// Identifier with optional scheme and list attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdType {
    pub value: String,
    pub scheme_id: Option<String>,
    pub scheme_agency_id: Option<String>,
    pub scheme_name: Option<String>,
    pub list_id: Option<String>,
    pub list_agency_id: Option<String>,
    pub list_version_id: Option<String>,
    pub name: Option<String>,
}

impl IdType {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_scheme(value: impl Into<String>, scheme_id: impl Into<String>) -> Self {
        Self {
            scheme_id: Some(scheme_id.into()),
            ..Self::new(value)
        }
    }

    /// Attribute name/value pairs in a stable order.
    pub fn attrs(&self) -> Vec<(&'static str, &str)> {
        [
            ("schemeID", &self.scheme_id),
            ("schemeAgencyID", &self.scheme_agency_id),
            ("schemeName", &self.scheme_name),
            ("listID", &self.list_id),
            ("listAgencyID", &self.list_agency_id),
            ("listVersionID", &self.list_version_id),
            ("name", &self.name),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect()
    }

    /// First qualifier usable as an identity label.
    pub fn label(&self) -> Option<&str> {
        self.scheme_id
            .as_deref()
            .or(self.list_id.as_deref())
            .or(self.list_version_id.as_deref())
            .or(self.scheme_name.as_deref())
            .or(self.name.as_deref())
    }
}

/// Monetary amount with its currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amount {
    pub value: String,
    pub currency_id: Option<String>,
}

impl Amount {
    pub fn new(value: impl ToString, currency: &str) -> Self {
        Self {
            value: value.to_string(),
            currency_id: Some(currency.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantity {
    pub value: String,
    pub unit_code: Option<String>,
}

/// Complete Invoice or CreditNote document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub kind: DocumentKind,
    pub ubl_version_id: Option<String>,
    pub customization_id: Option<String>,
    pub profile_id: Option<IdType>,
    pub id: String,
    pub uuid: Option<String>,
    pub issue_date: String,
    /// Header due date. Invoices only.
    pub due_date: Option<String>,
    pub type_code: Option<IdType>,
    pub notes: Vec<String>,
    pub document_currency_code: Option<String>,
    pub tax_currency_code: Option<String>,
    pub accounting_cost: Option<String>,
    pub buyer_reference: Option<String>,
    pub invoice_period: Option<Period>,
    pub order_reference: Option<OrderReference>,
    pub billing_references: Vec<BillingReference>,
    pub despatch_document_references: Vec<DocumentReference>,
    pub receipt_document_references: Vec<DocumentReference>,
    pub contract_document_references: Vec<DocumentReference>,
    pub additional_document_references: Vec<DocumentReference>,
    pub project_references: Vec<String>,
    pub signatures: Vec<Signature>,
    pub supplier_party: Option<Party>,
    pub customer_party: Option<Party>,
    pub payee_party: Option<Party>,
    pub tax_representative_party: Option<Party>,
    pub deliveries: Vec<Delivery>,
    pub payment_means: Vec<PaymentMeans>,
    pub payment_terms: Vec<PaymentTerms>,
    pub prepaid_payments: Vec<PrepaidPayment>,
    pub allowance_charges: Vec<AllowanceCharge>,
    pub tax_exchange_rate: Option<ExchangeRate>,
    pub tax_totals: Vec<TaxTotal>,
    pub legal_monetary_total: MonetaryTotal,
    pub lines: Vec<DocumentLine>,
}

impl Document {
    pub fn is_credit_note(&self) -> bool {
        self.kind == DocumentKind::CreditNote
    }

    /// Type code text, if present.
    pub fn type_code_value(&self) -> Option<&str> {
        self.type_code.as_ref().map(|c| c.value.as_str())
    }

    /// Embedded binary attachments, which the canonical mapping leaves out.
    pub fn extract_binary_attachments(&self) -> Vec<BinaryAttachment> {
        self.additional_document_references
            .iter()
            .filter_map(|r| {
                let obj = r.attachment.as_ref()?.embedded.as_ref()?;
                Some(BinaryAttachment {
                    id: r.id.value.clone(),
                    description: r.document_description.clone(),
                    mime_code: obj.mime_code.clone(),
                    filename: obj.filename.clone(),
                    data: obj.value.clone(),
                })
            })
            .collect()
    }
}

/// Binary attachment extracted from an `AdditionalDocumentReference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryAttachment {
    pub id: String,
    pub description: Option<String>,
    pub mime_code: Option<String>,
    pub filename: Option<String>,
    /// Base64 content as found in the document.
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Period {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReference {
    pub id: String,
    pub sales_order_id: Option<String>,
}

/// Reference to a preceding invoice. Only one variant is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingReference {
    pub invoice_document_reference: Option<DocumentReference>,
    pub self_billed_invoice_document_reference: Option<DocumentReference>,
    pub credit_note_document_reference: Option<DocumentReference>,
    pub additional_document_reference: Option<DocumentReference>,
}

impl BillingReference {
    /// The populated reference, in schema order.
    pub fn reference(&self) -> Option<&DocumentReference> {
        self.invoice_document_reference
            .as_ref()
            .or(self.self_billed_invoice_document_reference.as_ref())
            .or(self.credit_note_document_reference.as_ref())
            .or(self.additional_document_reference.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReference {
    pub id: IdType,
    pub issue_date: Option<String>,
    pub document_type_code: Option<String>,
    pub document_description: Option<String>,
    pub attachment: Option<DocumentAttachment>,
}

impl DocumentReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: IdType::new(id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentAttachment {
    pub embedded: Option<BinaryObject>,
    pub external_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryObject {
    pub mime_code: Option<String>,
    pub filename: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub id: String,
    pub notes: Vec<String>,
    pub validation_date: Option<String>,
    pub signature_method: Option<String>,
}

/// Any party block (supplier, customer, payee, tax representative, delivery).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Party {
    pub endpoint_id: Option<EndpointId>,
    pub party_identifications: Vec<IdType>,
    pub party_name: Option<String>,
    pub postal_address: Option<PostalAddress>,
    pub party_tax_schemes: Vec<PartyTaxScheme>,
    pub party_legal_entity: Option<PartyLegalEntity>,
    pub contact: Option<Contact>,
}

impl Party {
    /// Country of the postal address, if any.
    pub fn country_code(&self) -> Option<&str> {
        self.postal_address
            .as_ref()
            .and_then(|a| a.country.as_deref())
    }

    pub fn registration_name(&self) -> Option<&str> {
        self.party_legal_entity
            .as_ref()
            .and_then(|l| l.registration_name.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointId {
    pub scheme_id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub address_format_code: Option<IdType>,
    pub street_name: Option<String>,
    pub additional_street_name: Option<String>,
    pub building_number: Option<String>,
    pub city_name: Option<String>,
    pub postal_zone: Option<String>,
    pub country_subentity: Option<String>,
    pub address_lines: Vec<String>,
    /// `Country/IdentificationCode`.
    pub country: Option<String>,
    pub location_coordinate: Option<LocationCoordinate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationCoordinate {
    pub latitude_degrees: Option<String>,
    pub longitude_degrees: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyTaxScheme {
    pub company_id: Option<IdType>,
    pub tax_scheme: Option<TaxScheme>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxScheme {
    pub id: IdType,
    pub name: Option<String>,
    pub tax_type_code: Option<String>,
}

impl TaxScheme {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: IdType::new(id),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyLegalEntity {
    pub registration_name: Option<String>,
    pub company_id: Option<IdType>,
    pub company_legal_form: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub id: Option<String>,
    pub name: Option<String>,
    pub telephone: Option<String>,
    pub electronic_mail: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.telephone.is_none()
            && self.electronic_mail.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    pub actual_delivery_date: Option<String>,
    pub delivery_location: Option<DeliveryLocation>,
    pub estimated_delivery_period: Option<Period>,
    pub delivery_party: Option<Party>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryLocation {
    pub id: Option<IdType>,
    pub address: Option<PostalAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMeans {
    pub payment_means_code: IdType,
    pub payment_due_date: Option<String>,
    pub payment_channel_code: Option<IdType>,
    pub instruction_id: Option<String>,
    pub instruction_notes: Vec<String>,
    pub payment_id: Option<String>,
    pub card_account: Option<CardAccount>,
    pub payee_financial_account: Option<FinancialAccount>,
    pub payment_mandate: Option<PaymentMandate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardAccount {
    pub primary_account_number_id: String,
    pub network_id: Option<String>,
    pub holder_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinancialAccount {
    pub id: Option<String>,
    pub name: Option<String>,
    pub financial_institution_branch: Option<Branch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    pub id: Option<String>,
    pub name: Option<String>,
    /// `FinancialInstitution/ID`.
    pub financial_institution_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMandate {
    pub id: IdType,
    pub payer_financial_account: Option<FinancialAccount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentTerms {
    pub notes: Vec<String>,
    pub payment_percent: Option<String>,
    pub amount: Option<Amount>,
    pub payment_due_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepaidPayment {
    pub id: String,
    pub paid_amount: Option<Amount>,
    pub received_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowanceCharge {
    pub charge_indicator: bool,
    pub reason_code: Option<String>,
    pub reason: Option<String>,
    pub multiplier_factor_numeric: Option<String>,
    pub amount: Amount,
    pub base_amount: Option<Amount>,
    pub tax_categories: Vec<TaxCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeRate {
    pub source_currency_code: String,
    pub target_currency_code: String,
    pub calculation_rate: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxTotal {
    pub tax_amount: Amount,
    pub tax_subtotals: Vec<TaxSubtotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxSubtotal {
    pub taxable_amount: Option<Amount>,
    pub tax_amount: Amount,
    pub tax_category: TaxCategory,
}

/// `TaxCategory` or `ClassifiedTaxCategory`; both share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxCategory {
    pub id: Option<IdType>,
    pub percent: Option<String>,
    pub tax_exemption_reason_code: Option<String>,
    pub tax_exemption_reason: Option<String>,
    pub tax_scheme: Option<TaxScheme>,
}

impl TaxCategory {
    pub fn id_value(&self) -> Option<&str> {
        self.id.as_ref().map(|i| i.value.as_str())
    }

    pub fn scheme_value(&self) -> Option<&str> {
        self.tax_scheme.as_ref().map(|s| s.id.value.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonetaryTotal {
    pub line_extension_amount: Amount,
    pub tax_exclusive_amount: Amount,
    pub tax_inclusive_amount: Amount,
    pub allowance_total_amount: Option<Amount>,
    pub charge_total_amount: Option<Amount>,
    pub prepaid_amount: Option<Amount>,
    pub payable_rounding_amount: Option<Amount>,
    pub payable_amount: Option<Amount>,
}

/// `InvoiceLine` or `CreditNoteLine`, depending on the document kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLine {
    pub id: String,
    pub notes: Vec<String>,
    pub quantity: Option<Quantity>,
    pub line_extension_amount: Amount,
    pub accounting_cost: Option<String>,
    pub invoice_period: Option<Period>,
    /// `OrderLineReference/LineID`.
    pub order_line_reference: Option<String>,
    pub allowance_charges: Vec<AllowanceCharge>,
    pub tax_totals: Vec<TaxTotal>,
    pub item: Option<Item>,
    pub price: Option<Price>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub description: Option<String>,
    pub name: String,
    pub buyers_item_identification: Option<IdType>,
    pub sellers_item_identification: Option<IdType>,
    pub standard_item_identification: Option<IdType>,
    /// `OriginCountry/IdentificationCode`.
    pub origin_country: Option<String>,
    /// `CommodityClassification/ItemClassificationCode` entries.
    pub commodity_classifications: Vec<IdType>,
    pub classified_tax_category: Option<TaxCategory>,
    pub additional_item_properties: Vec<ItemProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Price {
    pub price_amount: Amount,
    pub base_quantity: Option<Quantity>,
    pub allowance_charge: Option<AllowanceCharge>,
}
