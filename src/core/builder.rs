use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::UblError;
use super::num::Percentage;
use super::types::*;

/// Builder for canonical invoices.
///
/// The builder only assembles data. Totals must be supplied already
/// calculated, exactly as an invoicing engine would hand them over.
///
/// ```
/// use ublmap::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .series("2024")
///     .document_type("380")
///     .supplier(PartyBuilder::new("Nordisk Handel ApS").tax_id("DK", "37990485").build())
///     .customer(PartyBuilder::new("Kunde AG").build())
///     .add_line(LineBuilder::new(1, "Beratung", dec!(10), dec!(150.00))
///         .unit("h")
///         .tax(TaxCombo::new("VAT"))
///         .total(dec!(1500.00))
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice_number(invoice.series.as_deref(), &invoice.code), "2024-001");
/// ```
pub struct InvoiceBuilder {
    code: String,
    issue_date: NaiveDate,
    uuid: Option<String>,
    series: Option<String>,
    invoice_type: InvoiceType,
    tags: Vec<InvoiceTag>,
    currency: String,
    addons: Vec<String>,
    document_type: Option<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    preceding: Vec<DocumentRef>,
    ordering: Option<Ordering>,
    delivery: Option<Delivery>,
    payment: Option<PaymentDetails>,
    lines: Vec<Line>,
    charges: Vec<Charge>,
    discounts: Vec<Charge>,
    totals: Totals,
    notes: Vec<Note>,
    attachments: Vec<Attachment>,
    exchange_rates: Vec<ExchangeRate>,
    meta: BTreeMap<String, String>,
}

impl InvoiceBuilder {
    pub fn new(code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            code: code.into(),
            issue_date,
            uuid: None,
            series: None,
            invoice_type: InvoiceType::Standard,
            tags: Vec::new(),
            currency: "EUR".to_string(),
            addons: Vec::new(),
            document_type: None,
            supplier: None,
            customer: None,
            preceding: Vec::new(),
            ordering: None,
            delivery: None,
            payment: None,
            lines: Vec::new(),
            charges: Vec::new(),
            discounts: Vec::new(),
            totals: Totals::default(),
            notes: Vec::new(),
            attachments: Vec::new(),
            exchange_rates: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn tag(mut self, tag: InvoiceTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn addon(mut self, key: impl Into<String>) -> Self {
        self.addons.push(key.into());
        self
    }

    /// UNTDID 1001 document type code.
    pub fn document_type(mut self, code: impl Into<String>) -> Self {
        self.document_type = Some(code.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn preceding(mut self, reference: DocumentRef) -> Self {
        self.preceding.push(reference);
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn payment(mut self, payment: PaymentDetails) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn add_line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_charge(mut self, charge: Charge) -> Self {
        self.charges.push(charge);
        self
    }

    pub fn add_discount(mut self, discount: Charge) -> Self {
        self.discounts.push(discount);
        self
    }

    pub fn totals(mut self, totals: Totals) -> Self {
        self.totals = totals;
        self
    }

    pub fn note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn exchange_rate(mut self, rate: ExchangeRate) -> Self {
        self.exchange_rates.push(rate);
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Invoice, UblError> {
        if self.code.trim().is_empty() {
            return Err(UblError::required("code"));
        }
        let supplier = self.supplier.ok_or_else(|| UblError::required("supplier"))?;

        Ok(Invoice {
            uuid: self.uuid,
            invoice_type: self.invoice_type,
            tags: self.tags,
            series: self.series,
            code: self.code,
            issue_date: self.issue_date,
            currency: self.currency,
            addons: self.addons,
            tax: self.document_type.map(|code| InvoiceTax {
                document_type: Some(code),
            }),
            supplier,
            customer: self.customer,
            preceding: self.preceding,
            ordering: self.ordering,
            delivery: self.delivery,
            payment: self.payment,
            lines: self.lines,
            charges: self.charges,
            discounts: self.discounts,
            totals: self.totals,
            notes: self.notes,
            attachments: self.attachments,
            exchange_rates: self.exchange_rates,
            meta: self.meta,
        })
    }
}

/// Builder for parties.
pub struct PartyBuilder {
    party: Party,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            party: Party {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.party.alias = Some(alias.into());
        self
    }

    pub fn tax_id(mut self, country: impl Into<String>, code: impl Into<String>) -> Self {
        self.party.tax_id = Some(TaxIdentity::new(country, code));
        self
    }

    pub fn tax_identity(mut self, tax_id: TaxIdentity) -> Self {
        self.party.tax_id = Some(tax_id);
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.party.identities.push(identity);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.party.addresses.push(address);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.party.emails.push(email.into());
        self
    }

    pub fn telephone(mut self, number: impl Into<String>) -> Self {
        self.party.telephones.push(number.into());
        self
    }

    pub fn person(mut self, given: impl Into<String>, surname: impl Into<String>) -> Self {
        self.party.people.push(Person {
            given: given.into(),
            surname: surname.into(),
        });
        self
    }

    /// Electronic address with an explicit scheme (e.g. "0088", "GLN").
    pub fn inbox(mut self, scheme: impl Into<String>, code: impl Into<String>) -> Self {
        self.party.inboxes.push(Inbox {
            scheme: Some(scheme.into()),
            code: Some(code.into()),
            email: None,
        });
        self
    }

    pub fn inbox_email(mut self, email: impl Into<String>) -> Self {
        self.party.inboxes.push(Inbox {
            email: Some(email.into()),
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Party {
        self.party
    }
}

/// Builder for addresses.
pub struct AddressBuilder {
    address: Address,
}

impl AddressBuilder {
    pub fn new(
        locality: impl Into<String>,
        code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            address: Address {
                locality: Some(locality.into()),
                code: Some(code.into()),
                country: Some(country.into()),
                ..Default::default()
            },
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.address.street = Some(street.into());
        self
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.address.number = Some(number.into());
        self
    }

    pub fn street_extra(mut self, extra: impl Into<String>) -> Self {
        self.address.street_extra = Some(extra.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.address.region = Some(region.into());
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.address.coordinates = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }

    pub fn build(self) -> Address {
        self.address
    }
}

/// Builder for invoice lines.
pub struct LineBuilder {
    line: Line,
}

impl LineBuilder {
    pub fn new(index: u32, name: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            line: Line {
                index,
                quantity,
                item: Item {
                    name: name.into(),
                    price: Some(price),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.line.item.unit = Some(unit.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.line.item.description = Some(description.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.line.item.reference = Some(reference.into());
        self
    }

    pub fn origin(mut self, country: impl Into<String>) -> Self {
        self.line.item.origin = Some(country.into());
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.line.item.currency = Some(currency.into());
        self
    }

    pub fn item_identity(mut self, identity: Identity) -> Self {
        self.line.item.identities.push(identity);
        self
    }

    pub fn item_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.line.item.meta.insert(key.into(), value.into());
        self
    }

    pub fn tax(mut self, combo: TaxCombo) -> Self {
        self.line.taxes.push(combo);
        self
    }

    /// Shorthand for a single tax with category code and rate.
    pub fn vat(self, tax_code: impl Into<String>, percent: Decimal) -> Self {
        self.tax(TaxCombo {
            category: TAX_SCHEME_VAT.to_string(),
            percent: Some(Percentage::new(percent)),
            tax_code: Some(tax_code.into()),
            exemption_code: None,
        })
    }

    pub fn add_charge(mut self, charge: Charge) -> Self {
        self.line.charges.push(charge);
        self
    }

    pub fn add_discount(mut self, discount: Charge) -> Self {
        self.line.discounts.push(discount);
        self
    }

    pub fn note(mut self, note: Note) -> Self {
        self.line.notes.push(note);
        self
    }

    pub fn order(mut self, line_id: impl Into<String>) -> Self {
        self.line.order = Some(line_id.into());
        self
    }

    pub fn sum(mut self, sum: Decimal) -> Self {
        self.line.sum = Some(sum);
        self
    }

    pub fn total(mut self, total: Decimal) -> Self {
        self.line.total = Some(total);
        self
    }

    /// Build the line. A missing `sum` takes the value of `total`.
    pub fn build(mut self) -> Line {
        if self.line.sum.is_none() {
            self.line.sum = self.line.total;
        }
        self.line
    }
}
