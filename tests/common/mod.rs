//! Invoices shared by the integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use ublmap::core::*;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {path}: {e}"))
}

pub fn seller() -> Party {
    PartyBuilder::new("ACME GmbH")
        .tax_id("DE", "123456789")
        .identity(Identity::legal("HRB 12345").with_scheme("0204"))
        .address(
            AddressBuilder::new("Berlin", "10115", "DE")
                .street("Friedrichstraße")
                .number("123")
                .build(),
        )
        .person("Max", "Mustermann")
        .telephone("+49 30 12345678")
        .email("max@acme.de")
        .inbox_email("billing@acme.de")
        .build()
}

pub fn buyer() -> Party {
    PartyBuilder::new("Kunde AG")
        .tax_id("DE", "987654321")
        .address(
            AddressBuilder::new("München", "80331", "DE")
                .street("Marienplatz 1")
                .build(),
        )
        .inbox("0088", "4000001987658")
        .build()
}

pub fn danish_seller() -> Party {
    PartyBuilder::new("Dansk Handel ApS")
        .tax_id("DK", "37990485")
        .address(
            AddressBuilder::new("København", "1050", "DK")
                .street("Kongens Nytorv 12")
                .build(),
        )
        .inbox("GLN", "5790000435951")
        .build()
}

pub fn vat_totals(sum: Decimal, percent: Decimal) -> Totals {
    let tax = (sum * percent / dec!(100)).round_dp(2);
    Totals {
        sum,
        total: sum,
        taxes: Some(TaxBreakdown {
            categories: vec![CategoryTotal {
                code: TAX_SCHEME_VAT.to_string(),
                rates: vec![RateTotal {
                    base: Some(sum),
                    percent: Some(Percentage::new(percent)),
                    amount: tax,
                    tax_code: Some("S".into()),
                    exemption_code: None,
                }],
                amount: tax,
            }],
        }),
        tax,
        total_with_tax: sum + tax,
        payable: sum + tax,
        ..Default::default()
    }
}

pub fn credit_transfer() -> PaymentDetails {
    PaymentDetails {
        instructions: Some(Instructions {
            key: Some("credit-transfer+sepa".into()),
            means_code: Some("58".into()),
            reference: Some("RE-2024-001".into()),
            credit_transfer: vec![CreditTransfer {
                iban: Some("DE89370400440532013000".into()),
                bic: Some("COBADEFFXXX".into()),
                name: Some("ACME GmbH".into()),
                number: None,
            }],
            ..Default::default()
        }),
        terms: Some(Terms {
            due_dates: vec![DueDate {
                date: Some(date(2024, 7, 15)),
                percent: Some(Percentage::new(dec!(100))),
                ..Default::default()
            }],
            notes: None,
        }),
        ..Default::default()
    }
}

/// Domestic invoice `2024-001` with two standard-rated lines.
pub fn invoice() -> Invoice {
    InvoiceBuilder::new("001", date(2024, 6, 15))
        .series("2024")
        .document_type("380")
        .supplier(seller())
        .customer(buyer())
        .add_line(
            LineBuilder::new(1, "Consulting", dec!(10), dec!(150.00))
                .unit("h")
                .vat("S", dec!(19))
                .total(dec!(1500.00))
                .build(),
        )
        .add_line(
            LineBuilder::new(2, "Travel", dec!(1), dec!(250.00))
                .vat("S", dec!(19))
                .reference("TRV")
                .total(dec!(250.00))
                .build(),
        )
        .totals(vat_totals(dec!(1750.00), dec!(19)))
        .payment(credit_transfer())
        .note(Note::new("Thank you for your business."))
        .build()
        .unwrap()
}

/// Same content as [`invoice`], issued as a credit note.
pub fn credit_note() -> Invoice {
    let mut inv = invoice();
    inv.code = "CN-7".into();
    inv.series = None;
    inv.invoice_type = InvoiceType::CreditNote;
    inv.tax = Some(InvoiceTax {
        document_type: Some("381".into()),
    });
    inv.preceding = vec![DocumentRef {
        issue_date: Some(date(2024, 6, 15)),
        ..DocumentRef::new("2024-001")
    }];
    inv
}

/// Danish invoice for the OIOUBL contexts.
pub fn danish_invoice() -> Invoice {
    InvoiceBuilder::new("DK-100", date(2024, 9, 1))
        .document_type("380")
        .currency("DKK")
        .supplier(danish_seller())
        .customer(
            PartyBuilder::new("Kunde A/S")
                .tax_id("DK", "12345674")
                .address(
                    AddressBuilder::new("Aarhus", "8000", "DK")
                        .street("Strøget 5")
                        .build(),
                )
                .build(),
        )
        .add_line(
            LineBuilder::new(1, "Kaffe", dec!(4), dec!(50.00))
                .unit("kg")
                .vat("S", dec!(25))
                .total(dec!(200.00))
                .build(),
        )
        .totals(vat_totals(dec!(200.00), dec!(25)))
        .payment(PaymentDetails {
            instructions: Some(Instructions {
                means_code: Some("30".into()),
                credit_transfer: vec![CreditTransfer {
                    iban: Some("DK5000400440116243".into()),
                    bic: Some("DABADKKK".into()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            terms: Some(Terms {
                due_dates: vec![DueDate {
                    date: Some(date(2024, 10, 1)),
                    ..Default::default()
                }],
                notes: None,
            }),
            ..Default::default()
        })
        .build()
        .unwrap()
}
