//! Header references: billing, ordering, attachments, exchange rate and
//! delivery.

use crate::core::{DocumentRef, Invoice, Period as CanonicalPeriod};
use crate::ubl::document::{
    BillingReference, BinaryObject, Delivery, DeliveryLocation, Document, DocumentAttachment,
    DocumentReference, ExchangeRate, OrderReference, Period,
};
use crate::ubl::ORDER_ID_NOT_APPLICABLE;
use crate::ubl::party::{build_address, build_delivery_party};

fn period(p: &CanonicalPeriod) -> Period {
    Period {
        start_date: Some(p.start.to_string()),
        end_date: Some(p.end.to_string()),
    }
}

fn reference(r: &DocumentRef) -> DocumentReference {
    DocumentReference {
        issue_date: r.issue_date.map(|d| d.to_string()),
        document_type_code: r.type_code.clone().filter(|c| !c.is_empty()),
        document_description: r.description.clone().filter(|d| !d.is_empty()),
        ..DocumentReference::new(r.identifier())
    }
}

fn references(list: &[DocumentRef]) -> Vec<DocumentReference> {
    list.iter().map(reference).collect()
}

pub(super) fn add_preceding(doc: &mut Document, invoice: &Invoice) {
    doc.billing_references = invoice
        .preceding
        .iter()
        .map(|r| BillingReference {
            invoice_document_reference: Some(reference(r)),
            ..Default::default()
        })
        .collect();
}

pub(super) fn add_ordering(doc: &mut Document, invoice: &Invoice) {
    let Some(ordering) = &invoice.ordering else {
        return;
    };
    doc.buyer_reference = ordering.code.clone().filter(|c| !c.is_empty());
    doc.invoice_period = ordering.period.as_ref().map(period);

    let purchase = ordering.purchases.first().map(DocumentRef::identifier);
    let sale = ordering.sales.first().map(DocumentRef::identifier);
    if purchase.is_some() || sale.is_some() {
        doc.order_reference = Some(OrderReference {
            id: purchase.unwrap_or_else(|| ORDER_ID_NOT_APPLICABLE.to_string()),
            sales_order_id: sale,
        });
    }

    doc.contract_document_references = references(&ordering.contracts);
    doc.despatch_document_references = references(&ordering.despatch);
    doc.receipt_document_references = references(&ordering.receiving);
    doc.project_references = ordering.projects.iter().map(DocumentRef::identifier).collect();
}

/// Tax currency and rate, from the first rate converting out of the
/// document currency.
pub(super) fn add_exchange_rate(doc: &mut Document, invoice: &Invoice) {
    let Some(rate) = invoice
        .exchange_rates
        .iter()
        .find(|r| r.from == invoice.currency && r.to != invoice.currency)
    else {
        return;
    };
    doc.tax_currency_code = Some(rate.to.clone());
    doc.tax_exchange_rate = Some(ExchangeRate {
        source_currency_code: rate.from.clone(),
        target_currency_code: rate.to.clone(),
        calculation_rate: Some(rate.amount.to_string()),
        date: None,
    });
}

pub(super) fn add_attachments(doc: &mut Document, invoice: &Invoice) {
    doc.additional_document_references = invoice
        .attachments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let id = a
                .code
                .clone()
                .filter(|c| !c.is_empty())
                .or_else(|| a.name.clone().filter(|n| !n.is_empty()))
                .unwrap_or_else(|| (i + 1).to_string());
            let attachment = match (&a.data, &a.url) {
                (Some(data), _) if !data.is_empty() => Some(DocumentAttachment {
                    embedded: Some(BinaryObject {
                        mime_code: a.mime.clone(),
                        filename: a.name.clone(),
                        value: data.clone(),
                    }),
                    external_uri: None,
                }),
                (_, Some(url)) if !url.is_empty() => Some(DocumentAttachment {
                    embedded: None,
                    external_uri: Some(url.clone()),
                }),
                _ => None,
            };
            DocumentReference {
                document_description: a.description.clone().filter(|d| !d.is_empty()),
                attachment,
                ..DocumentReference::new(id)
            }
        })
        .collect();
}

pub(super) fn add_delivery(doc: &mut Document, invoice: &Invoice) {
    let Some(delivery) = &invoice.delivery else {
        return;
    };
    let d = Delivery {
        actual_delivery_date: delivery.date.map(|d| d.to_string()),
        delivery_location: delivery
            .receiver
            .as_ref()
            .and_then(|r| r.addresses.first())
            .map(|a| DeliveryLocation {
                id: None,
                address: Some(build_address(a)),
            }),
        estimated_delivery_period: delivery.period.as_ref().map(period),
        delivery_party: delivery.receiver.as_ref().and_then(build_delivery_party),
    };
    if d != Delivery::default() {
        doc.deliveries = vec![d];
    }
}
