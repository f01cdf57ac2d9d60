//! UBL XML codec: a `quick-xml` writer for [`Document`] and a
//! namespace-aware reader producing one.

mod read;
mod reader;
mod write;
pub(crate) mod writer;

use crate::core::UblError;
use crate::ubl::document::Document;

pub use reader::{Element, parse_tree};

/// Serialize a document as indented XML.
pub fn to_xml(doc: &Document) -> Result<String, UblError> {
    write::write_document(doc)
}

/// Parse XML bytes into a document.
///
/// Fails with [`UblError::UnknownDocumentType`] when the root element is
/// not in the Invoice or CreditNote namespace.
pub fn from_xml(xml: &[u8]) -> Result<Document, UblError> {
    let text = std::str::from_utf8(xml).map_err(|e| UblError::Xml(format!("UTF-8 error: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    read::read_document(&parse_tree(text)?)
}
