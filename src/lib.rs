//! # ublmap
//!
//! Bidirectional mapping between a canonical invoice model and UBL 2.1
//! Invoice/CreditNote documents, covering EN 16931, Peppol BIS Billing 3.0,
//! XRechnung, the France CIUS profiles and Danish OIOUBL/Nemhandel.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are carried
//! through as stated on the invoice; nothing here recalculates taxes or
//! totals.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use ublmap::core::*;
//! use ublmap::ubl::{self, ConvertOptions};
//!
//! let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .series("2024")
//!     .document_type("380")
//!     .supplier(PartyBuilder::new("ACME GmbH").tax_id("DE", "123456789").build())
//!     .customer(PartyBuilder::new("Kunde AG").build())
//!     .add_line(LineBuilder::new(1, "Consulting", dec!(10), dec!(150)).total(dec!(1500.00)).build())
//!     .build()
//!     .unwrap();
//!
//! let doc = ubl::convert(&invoice, &ConvertOptions::new()).unwrap();
//! assert_eq!(doc.id, "2024-001");
//! let xml = ubl::to_xml(&doc).unwrap();
//! assert!(xml.contains("<cbc:ID>2024-001</cbc:ID>"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Canonical invoice model, builders, numeric normalization |
//! | `ubl` (default) | Contexts, forward/reverse mappers, OIOUBL 2.1 overlay, XML codec |
//! | `json` | Canonical JSON codec and byte-level `convert_bytes` |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
