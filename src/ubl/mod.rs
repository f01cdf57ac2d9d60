//! UBL 2.1 Invoice and CreditNote mapping.
//!
//! Converts canonical invoices to UBL documents under one of eight
//! contexts (EN 16931, Peppol, Peppol self-billed, XRechnung, the two
//! France CIUS variants, OIOUBL/Nemhandel and the legacy OIOUBL 2.1) and
//! reads UBL documents back into canonical invoices.
//!
//! # Example
//!
//! ```no_run
//! use ublmap::core::*;
//! use ublmap::ubl::{self, ConvertOptions};
//!
//! let invoice: Invoice = todo!(); // build via InvoiceBuilder
//! let opts = ConvertOptions::from_names("peppol", None).unwrap();
//! let xml = ubl::to_ubl_xml(&invoice, &opts).unwrap();
//! let back = ubl::from_ubl_xml(xml.as_bytes()).unwrap();
//! ```

pub mod context;
pub mod document;
mod forward;
pub mod legacy;
pub mod party;
mod reverse;
pub mod tax_map;
pub mod xml;

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::core::{Invoice, UblError};

pub use context::{CONTEXTS, Context, ConvertOptions, find, get_vesid, is_legacy_oioubl21};
pub use document::{BinaryAttachment, Document, DocumentKind};
pub use forward::build_document;
pub use reverse::{read_invoice, type_from_code};

/// UBL 2.1 namespace URIs.
pub const NS_INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
pub const NS_CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
pub const CAC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
pub const QDT: &str = "urn:oasis:names:specification:ubl:schema:xsd:QualifiedDataTypes-2";
pub const UDT: &str = "urn:oasis:names:specification:ubl:schema:xsd:UnqualifiedDataTypes-2";
pub const CCTS: &str = "urn:un:unece:uncefact:documentation:2";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const SCHEMA_LOCATION_INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2 http://docs.oasis-open.org/ubl/os-UBL-2.1/xsd/maindoc/UBL-Invoice-2.1.xsd";
pub const SCHEMA_LOCATION_CREDIT_NOTE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2 https://docs.oasis-open.org/ubl/os-UBL-2.1/xsd/maindoc/UBL-CreditNote-2.1.xsd";

/// Written to `UBLVersionID` for OIOUBL-family contexts.
pub const UBL_VERSION_ID: &str = "2.1";

/// `OrderReference/ID` placeholder when only a sales order is known.
pub(crate) const ORDER_ID_NOT_APPLICABLE: &str = "NA";

/// Collapse runs of whitespace, including newlines, into single spaces.
pub(crate) fn clean_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

static KEY_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("Invalid key separator regex"));
static KEY_INVALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9+-]").expect("Invalid key character regex"));
static KEY_REPEATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]{2,}").expect("Invalid key repeat regex"));

/// Turn a free-text property name into a meta key: lowercase, words
/// joined by `-`, anything outside `[a-z0-9+-]` dropped.
pub(crate) fn format_key(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let joined = KEY_SEPARATORS.replace_all(&lower, "-");
    let valid = KEY_INVALID.replace_all(&joined, "");
    let collapsed = KEY_REPEATED.replace_all(&valid, "-");
    collapsed.trim_matches(|c| c == '-' || c == '+').to_string()
}

/// Map `invoice` to a document under the options' context, applying the
/// OIOUBL 2.1 overlay when that context is selected.
pub fn convert(invoice: &Invoice, opts: &ConvertOptions) -> Result<Document, UblError> {
    let context = opts.effective_context();
    let doc = build_document(invoice, &context)?;
    if is_legacy_oioubl21(&context) {
        return Ok(legacy::apply(doc));
    }
    Ok(doc)
}

/// Serialize a document as XML.
pub fn to_xml(doc: &Document) -> Result<String, UblError> {
    xml::to_xml(doc)
}

/// Convert and serialize in one step.
pub fn to_ubl_xml(invoice: &Invoice, opts: &ConvertOptions) -> Result<String, UblError> {
    to_xml(&convert(invoice, opts)?)
}

/// Parse UBL XML into a document tree.
pub fn parse(xml: impl AsRef<[u8]>) -> Result<Document, UblError> {
    let doc = xml::from_xml(xml.as_ref())?;
    debug!("parsed {} {}", doc.kind.root_name(), doc.id);
    Ok(doc)
}

/// Parse UBL XML straight into a canonical invoice.
pub fn from_ubl_xml(xml: impl AsRef<[u8]>) -> Result<Invoice, UblError> {
    parse(xml)?.to_invoice()
}

/// Serialize a canonical invoice as JSON.
#[cfg(feature = "json")]
pub fn to_json(invoice: &Invoice) -> Result<String, UblError> {
    serde_json::to_string_pretty(invoice).map_err(|e| UblError::Json(e.to_string()))
}

/// Parse a canonical invoice from JSON.
#[cfg(feature = "json")]
pub fn from_json(json: impl AsRef<[u8]>) -> Result<Invoice, UblError> {
    serde_json::from_slice(json.as_ref()).map_err(|e| UblError::Json(e.to_string()))
}

/// Convert in whichever direction the input calls for: a JSON object is a
/// canonical invoice and becomes UBL XML, anything else is parsed as UBL
/// and becomes canonical JSON.
#[cfg(feature = "json")]
pub fn convert_bytes(data: &[u8], opts: &ConvertOptions) -> Result<Vec<u8>, UblError> {
    let body = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    let is_json = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');
    if is_json {
        debug!("input looks like JSON; converting to UBL");
        let invoice = from_json(body)?;
        Ok(to_ubl_xml(&invoice, opts)?.into_bytes())
    } else {
        debug!("input looks like XML; converting to JSON");
        Ok(to_json(&from_ubl_xml(body)?)?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_string_collapses_whitespace() {
        assert_eq!(clean_string("  a \n\t b  "), "a b");
        assert_eq!(clean_string(""), "");
    }

    #[test]
    fn format_key_lowercases_and_hyphenates() {
        assert_eq!(format_key("Colour"), "colour");
        assert_eq!(format_key("  Country of  Origin "), "country-of-origin");
        assert_eq!(format_key("batch_no."), "batch-no");
        assert_eq!(format_key("Size (EU)"), "size-eu");
        assert_eq!(format_key("a -- b"), "a-b");
        assert_eq!(format_key("already-a-key"), "already-a-key");
    }
}
