use super::parse_optional_date;
use crate::core::num::parse_amount;
use crate::core::{
    Attachment, Delivery, DocumentRef, ExchangeRate, Ordering, Party, Period as CanonicalPeriod,
    UblError,
};
use crate::ubl::ORDER_ID_NOT_APPLICABLE;
use crate::ubl::clean_string;
use crate::ubl::document::{Document, DocumentReference, Period};
use crate::ubl::party::{read_address, read_party};

/// A period needs both ends.
fn period(p: &Period) -> Result<Option<CanonicalPeriod>, UblError> {
    let start = parse_optional_date(p.start_date.as_deref())?;
    let end = parse_optional_date(p.end_date.as_deref())?;
    Ok(match (start, end) {
        (Some(start), Some(end)) => Some(CanonicalPeriod { start, end }),
        _ => None,
    })
}

fn reference(r: &DocumentReference) -> Result<DocumentRef, UblError> {
    Ok(DocumentRef {
        issue_date: parse_optional_date(r.issue_date.as_deref())?,
        type_code: r.document_type_code.clone().filter(|c| !c.is_empty()),
        description: r
            .document_description
            .as_deref()
            .map(clean_string)
            .filter(|d| !d.is_empty()),
        ..DocumentRef::new(r.id.value.trim())
    })
}

fn references(list: &[DocumentReference]) -> Result<Vec<DocumentRef>, UblError> {
    list.iter().map(reference).collect()
}

pub(super) fn read_preceding(doc: &Document) -> Result<Vec<DocumentRef>, UblError> {
    doc.billing_references
        .iter()
        .filter_map(|b| b.reference())
        .map(reference)
        .collect()
}

pub(super) fn read_ordering(doc: &Document) -> Result<Option<Ordering>, UblError> {
    let mut ordering = Ordering {
        code: doc.buyer_reference.clone().filter(|c| !c.is_empty()),
        cost: doc.accounting_cost.clone().filter(|c| !c.is_empty()),
        period: match &doc.invoice_period {
            Some(p) => period(p)?,
            None => None,
        },
        contracts: references(&doc.contract_document_references)?,
        despatch: references(&doc.despatch_document_references)?,
        receiving: references(&doc.receipt_document_references)?,
        projects: doc
            .project_references
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| DocumentRef::new(p.trim()))
            .collect(),
        ..Default::default()
    };

    if let Some(order) = &doc.order_reference {
        let id = order.id.trim();
        if !id.is_empty() && id != ORDER_ID_NOT_APPLICABLE {
            ordering.purchases.push(DocumentRef::new(id));
        }
        if let Some(sale) = order.sales_order_id.as_deref().filter(|s| !s.is_empty()) {
            ordering.sales.push(DocumentRef::new(sale.trim()));
        }
    }
    Ok((!ordering.is_empty()).then_some(ordering))
}

/// First delivery block only.
pub(super) fn read_delivery(doc: &Document) -> Result<Option<Delivery>, UblError> {
    let Some(d) = doc.deliveries.first() else {
        return Ok(None);
    };

    let mut receiver: Option<Party> = d.delivery_party.as_ref().map(read_party);
    if let Some(addr) = d.delivery_location.as_ref().and_then(|l| l.address.as_ref()) {
        receiver
            .get_or_insert_with(Party::default)
            .addresses
            .push(read_address(addr));
    }

    let delivery = Delivery {
        receiver,
        date: parse_optional_date(d.actual_delivery_date.as_deref())?,
        period: match &d.estimated_delivery_period {
            Some(p) => period(p)?,
            None => None,
        },
    };
    Ok((delivery != Delivery::default()).then_some(delivery))
}

/// External references only. Embedded binaries stay on the document; see
/// [`Document::extract_binary_attachments`].
pub(super) fn read_attachments(doc: &Document) -> Vec<Attachment> {
    doc.additional_document_references
        .iter()
        .filter_map(|r| {
            let uri = r.attachment.as_ref()?.external_uri.as_ref()?;
            Some(Attachment {
                code: Some(r.id.value.clone()).filter(|c| !c.is_empty()),
                description: r
                    .document_description
                    .as_deref()
                    .map(clean_string)
                    .filter(|d| !d.is_empty()),
                url: Some(uri.trim().to_string()),
                ..Default::default()
            })
        })
        .collect()
}

pub(super) fn read_exchange_rates(doc: &Document) -> Result<Vec<ExchangeRate>, UblError> {
    let Some(rate) = &doc.tax_exchange_rate else {
        return Ok(Vec::new());
    };
    let Some(value) = rate.calculation_rate.as_deref().filter(|r| !r.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    Ok(vec![ExchangeRate {
        from: rate.source_currency_code.trim().to_string(),
        to: rate.target_currency_code.trim().to_string(),
        amount: parse_amount(value)?,
    }])
}
