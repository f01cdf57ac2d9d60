use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::core::UblError;
use crate::ubl::document::{Amount, IdType, Quantity};

fn xml_io(e: std::io::Error) -> UblError {
    UblError::Xml(format!("write error: {e}"))
}

/// Indenting element writer. Every `text_*` and value helper writes a
/// complete element; optional helpers skip `None` and empty strings.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, UblError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> Result<String, UblError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| UblError::Xml(format!("UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, UblError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, UblError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, UblError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, UblError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, UblError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn opt_text(&mut self, name: &str, text: Option<&str>) -> Result<&mut Self, UblError> {
        match text.filter(|t| !t.is_empty()) {
            Some(t) => self.text_element(name, t),
            None => Ok(self),
        }
    }

    pub fn texts(&mut self, name: &str, texts: &[String]) -> Result<&mut Self, UblError> {
        for t in texts {
            self.opt_text(name, Some(t))?;
        }
        Ok(self)
    }

    /// Identifier with its scheme/list attributes.
    pub fn id_element(&mut self, name: &str, id: &IdType) -> Result<&mut Self, UblError> {
        self.text_element_with_attrs(name, &id.value, &id.attrs())
    }

    pub fn opt_id(&mut self, name: &str, id: Option<&IdType>) -> Result<&mut Self, UblError> {
        match id {
            Some(id) => self.id_element(name, id),
            None => Ok(self),
        }
    }

    /// Amount with `currencyID`.
    pub fn amount_element(&mut self, name: &str, amount: &Amount) -> Result<&mut Self, UblError> {
        match amount.currency_id.as_deref() {
            Some(ccy) => self.text_element_with_attrs(name, &amount.value, &[("currencyID", ccy)]),
            None => self.text_element(name, &amount.value),
        }
    }

    pub fn opt_amount(&mut self, name: &str, amount: Option<&Amount>) -> Result<&mut Self, UblError> {
        match amount {
            Some(a) => self.amount_element(name, a),
            None => Ok(self),
        }
    }

    /// Quantity with `unitCode`.
    pub fn quantity_element(&mut self, name: &str, qty: &Quantity) -> Result<&mut Self, UblError> {
        match qty.unit_code.as_deref() {
            Some(unit) => self.text_element_with_attrs(name, &qty.value, &[("unitCode", unit)]),
            None => self.text_element(name, &qty.value),
        }
    }
}
