use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::num::Percentage;

/// Note key whose text carries the legal tax exemption reason.
pub const NOTE_KEY_LEGAL: &str = "legal";

/// Line note key mapped to the line accounting cost (BT-133).
pub const NOTE_KEY_BUYER_ACCOUNTING_REF: &str = "buyer-accounting-ref";

/// Invoice meta key overriding the output `ProfileID`.
pub const META_KEY_UBL_PROFILE: &str = "ubl-profile";

/// Default tax scheme for tax identities without an explicit one.
pub const TAX_SCHEME_VAT: &str = "VAT";

/// Canonical invoice: the already-calculated system of record.
///
/// Nothing in this crate computes totals or taxes; the mappers only
/// relocate the values found here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "type", default)]
    pub invoice_type: InvoiceType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<InvoiceTag>,
    /// Optional series prefix of the invoice number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// BT-1: Invoice number within the series.
    pub code: String,
    /// BT-2: Issue date.
    pub issue_date: NaiveDate,
    /// BT-5: Currency code (ISO 4217).
    pub currency: String,
    /// Behaviour modifier keys the invoice was prepared with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<InvoiceTax>,
    /// BG-4: Seller.
    pub supplier: Party,
    /// BG-7: Buyer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Party>,
    /// BG-3: Preceding invoice references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preceding: Vec<DocumentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Ordering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
    /// BG-25: Lines.
    #[serde(default)]
    pub lines: Vec<Line>,
    /// BG-21: Document-level charges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<Charge>,
    /// BG-20: Document-level allowances.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Charge>,
    /// BG-22: Totals.
    #[serde(default)]
    pub totals: Totals,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exchange_rates: Vec<ExchangeRate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl Invoice {
    pub fn is_credit_note(&self) -> bool {
        self.invoice_type == InvoiceType::CreditNote
    }

    pub fn has_tag(&self, tag: InvoiceTag) -> bool {
        self.tags.contains(&tag)
    }

    /// UNTDID 1001 document type code, if classified.
    pub fn document_type(&self) -> Option<&str> {
        self.tax
            .as_ref()
            .and_then(|t| t.document_type.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// First note with the `legal` key.
    pub fn legal_note(&self) -> Option<&Note> {
        self.notes
            .iter()
            .find(|n| n.key.as_deref() == Some(NOTE_KEY_LEGAL))
    }
}

/// Canonical invoice type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceType {
    #[default]
    Standard,
    CreditNote,
    Proforma,
    Corrective,
    DebitNote,
    Other,
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::CreditNote => "credit-note",
            Self::Proforma => "proforma",
            Self::Corrective => "corrective",
            Self::DebitNote => "debit-note",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Qualifiers that refine the invoice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceTag {
    SelfBilled,
    Partial,
}

/// Tax classification of the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTax {
    /// UNTDID 1001 document type code (e.g. "380", "381").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

/// BG-4 / BG-7 and related: any party on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Legal name.
    #[serde(default)]
    pub name: String,
    /// Trading name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<TaxIdentity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<Identity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people: Vec<Person>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telephones: Vec<String>,
    /// Electronic delivery addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inboxes: Vec<Inbox>,
}

/// Tax registration of a party, e.g. country `DE` with code `123456789`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxIdentity {
    pub country: String,
    pub code: String,
    /// Tax scheme; `VAT` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl TaxIdentity {
    pub fn new(country: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            code: code.into(),
            scheme: None,
        }
    }

    pub fn scheme(&self) -> &str {
        self.scheme.as_deref().unwrap_or(TAX_SCHEME_VAT)
    }
}

impl fmt::Display for TaxIdentity {
    /// Country-prefixed code as written on documents (`DE123456789`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.starts_with(&self.country) {
            f.write_str(&self.code)
        } else {
            write!(f, "{}{}", self.country, self.code)
        }
    }
}

/// Scope of a party identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityScope {
    /// Legal registration (company register, CVR, ...).
    Legal,
    /// Additional tax registration.
    Tax,
    #[default]
    Unscoped,
}

/// Party or item identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub scope: IdentityScope,
    /// Identity type; for tax-scope identities this is the tax scheme.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub code: String,
    /// ISO 6523 ICD scheme identifier (e.g. "0088", "0184").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Identity {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn legal(code: impl Into<String>) -> Self {
        Self {
            scope: IdentityScope::Legal,
            ..Self::new(code)
        }
    }

    pub fn tax(kind: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            scope: IdentityScope::Tax,
            kind: Some(kind.into()),
            ..Self::new(code)
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Contact person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub surname: String,
}

impl Person {
    /// "Given Surname", or whichever part is present.
    pub fn full_name(&self) -> String {
        match (self.given.is_empty(), self.surname.is_empty()) {
            (true, true) => String::new(),
            (true, false) => self.surname.clone(),
            (false, true) => self.given.clone(),
            (false, false) => format!("{} {}", self.given, self.surname),
        }
    }
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// House number, appended to the first address line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// ISO 3166-1 alpha-2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Address {
    /// Street followed by house number.
    pub fn line_one(&self) -> Option<String> {
        let street = self.street.as_deref().filter(|s| !s.is_empty())?;
        Some(match self.number.as_deref().filter(|n| !n.is_empty()) {
            Some(n) => format!("{street} {n}"),
            None => street.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Electronic address: either an email or a scheme/code pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// BG-25: Invoice line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// 1-based position.
    pub index: u32,
    pub quantity: Decimal,
    pub item: Item,
    /// Quantity times price, before line discounts and charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<Decimal>,
    /// BT-131: Net amount after line discounts and charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<Charge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Charge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxCombo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// BT-132: Referenced purchase order line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// BT-133: Buyer accounting reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

/// BG-31: Item information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Line currency when it differs from the invoice currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// BT-146: Net unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Unit key or UN/ECE Rec 20 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// BT-155: Seller's item identifier.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// BT-159: Country of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<Identity>,
    /// BG-32: Item attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

/// One tax applied to a line or charge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCombo {
    /// Tax scheme, e.g. "VAT".
    #[serde(rename = "cat")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    /// UNTDID 5305 tax category code (S, Z, E, AE, O, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    /// VATEX exemption reason code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption_code: Option<String>,
}

impl TaxCombo {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }
}

/// Charge or discount, at document or line level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// UNTDID 7161 (charges) or 5189 (allowances) reason code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    /// Amount the percent applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxCombo>,
}

/// BG-22: Document totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// BT-106: Sum of line totals.
    pub sum: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<Decimal>,
    /// BT-109: Total without tax.
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<TaxBreakdown>,
    /// BT-110: Total tax.
    pub tax: Decimal,
    /// BT-112: Total with tax.
    pub total_with_tax: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<Decimal>,
    pub payable: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advances: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Decimal>,
}

/// BG-23 breakdown grouped by tax scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Tax scheme, e.g. "VAT".
    pub code: String,
    pub rates: Vec<RateTotal>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTotal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exemption_code: Option<String>,
}

/// Payment details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// BG-10: Payee, when different from the seller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Terms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Instructions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advances: Vec<Advance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub due_dates: Vec<DueDate>,
    /// BT-20: Payment terms text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DueDate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// BG-16: Payment instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    /// Canonical means key, e.g. "credit-transfer+sepa".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// BT-81: UNTDID 4461 payment means code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub means_code: Option<String>,
    /// BT-82: Payment means text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// BT-83: Remittance information.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credit_transfer: Vec<CreditTransfer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_debit: Option<DirectDebit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    /// Payment channel code, e.g. "IBAN".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// BG-17: Credit transfer account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransfer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    /// Account number when not an IBAN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// BG-19: Direct debit mandate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDebit {
    /// BT-89: Mandate reference.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// BT-90: Creditor identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor: Option<String>,
    /// BT-91: Debited account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// BG-18: Payment card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub last4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

/// Amount already paid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// References from the buyer's ordering process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    /// BT-10: Buyer reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// BT-19: Buyer accounting reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    /// BG-14: Invoicing period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    /// BT-13: Purchase orders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub purchases: Vec<DocumentRef>,
    /// BT-14: Sales orders.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sales: Vec<DocumentRef>,
    /// BT-12: Contracts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contracts: Vec<DocumentRef>,
    /// BT-16: Despatch advices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub despatch: Vec<DocumentRef>,
    /// BT-15: Receiving advices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receiving: Vec<DocumentRef>,
    /// BT-11: Projects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<DocumentRef>,
    /// Original seller when the supplier acts as tax representative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<Party>,
}

impl Ordering {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Reference to another document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    /// UNTDID 1001 type of the referenced document.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocumentRef {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    /// Series-qualified identifier as written on documents.
    pub fn identifier(&self) -> String {
        invoice_number(self.series.as_deref(), &self.code)
    }
}

/// BG-13: Delivery information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Party>,
    /// BT-72: Actual delivery date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

/// Free-text note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub text: String,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_key(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(text)
        }
    }
}

/// BG-24: Supporting document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// External location (BT-124).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base64 content (BT-125).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Conversion rate from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

/// Compose a document identifier: `"{series}-{code}"`, or the bare code.
pub fn invoice_number(series: Option<&str>, code: &str) -> String {
    match series.filter(|s| !s.is_empty()) {
        Some(series) => format!("{series}-{code}"),
        None => code.to_string(),
    }
}
