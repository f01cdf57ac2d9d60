use log::debug;

use crate::core::{Instructions, Invoice, Terms, UblError};
use crate::ubl::context::Context;
use crate::ubl::document::{
    Amount, Branch, CardAccount, Document, FinancialAccount, IdType, PaymentMandate, PaymentMeans,
    PaymentTerms,
};
use crate::ubl::party::build_payee_party;

const MEANS_CREDIT_TRANSFER: &str = "30";
const MEANS_CREDIT_TRANSFER_IBAN: &str = "31";
const CHANNEL_IBAN: &str = "IBAN";

/// Payment means, payment terms and payee.
pub(super) fn add_payment(doc: &mut Document, invoice: &Invoice, context: &Context) -> Result<(), UblError> {
    let Some(payment) = &invoice.payment else {
        return Ok(());
    };

    if let Some(instructions) = &payment.instructions {
        doc.payment_means = vec![payment_means(instructions, context)?];
    }
    if let Some(terms) = &payment.terms {
        add_terms(doc, terms, &invoice.currency);
    }
    doc.payee_party = payment.payee.as_ref().map(build_payee_party);
    Ok(())
}

fn payment_means(instructions: &Instructions, context: &Context) -> Result<PaymentMeans, UblError> {
    let mut code = instructions
        .means_code
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| UblError::required("payment.instructions.ext.untdid-payment-means"))?;
    if context.is_oioubl() && code == MEANS_CREDIT_TRANSFER {
        debug!("payment means {MEANS_CREDIT_TRANSFER} written as {MEANS_CREDIT_TRANSFER_IBAN}");
        code = MEANS_CREDIT_TRANSFER_IBAN.to_string();
    }
    let iban_transfer = context.is_oioubl() && code == MEANS_CREDIT_TRANSFER_IBAN;

    let mut means = PaymentMeans {
        payment_means_code: IdType {
            name: instructions.detail.clone().filter(|d| !d.is_empty()),
            ..IdType::new(code)
        },
        payment_channel_code: instructions
            .channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(IdType::new),
        payment_id: instructions.reference.clone().filter(|r| !r.is_empty()),
        ..Default::default()
    };

    if let Some(ct) = instructions.credit_transfer.first() {
        let bic = ct.bic.clone().filter(|b| !b.is_empty());
        means.payee_financial_account = Some(FinancialAccount {
            id: ct
                .iban
                .clone()
                .filter(|i| !i.is_empty())
                .or_else(|| ct.number.clone().filter(|n| !n.is_empty())),
            name: ct.name.clone().filter(|n| !n.is_empty()),
            financial_institution_branch: bic.map(|bic| Branch {
                financial_institution_id: iban_transfer.then(|| bic.clone()),
                id: Some(bic),
                name: None,
            }),
        });
        if iban_transfer && means.payment_channel_code.is_none() {
            means.payment_channel_code = Some(IdType::new(CHANNEL_IBAN));
        }
    }

    if let Some(dd) = &instructions.direct_debit {
        means.payment_mandate = Some(PaymentMandate {
            id: IdType::new(dd.reference.clone().unwrap_or_default()),
            payer_financial_account: dd
                .account
                .clone()
                .filter(|a| !a.is_empty())
                .map(|a| FinancialAccount {
                    id: Some(a),
                    ..Default::default()
                }),
        });
    }

    if let Some(card) = &instructions.card {
        means.card_account = Some(CardAccount {
            primary_account_number_id: card.last4.clone(),
            network_id: None,
            holder_name: card.holder.clone().filter(|h| !h.is_empty()),
        });
    }
    Ok(means)
}

/// Several due dates, or any due date on a credit note, become one term
/// each. A single invoice due date goes to the header instead.
fn add_terms(doc: &mut Document, terms: &Terms, invoice_currency: &str) {
    let due = &terms.due_dates;
    if due.len() > 1 || (doc.is_credit_note() && !due.is_empty()) {
        doc.payment_terms = due
            .iter()
            .map(|d| {
                let ccy = d
                    .currency
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(invoice_currency);
                PaymentTerms {
                    notes: d.notes.clone().filter(|n| !n.is_empty()).into_iter().collect(),
                    payment_percent: d.percent.map(|p| p.to_string_without_symbol()),
                    amount: d.amount.map(|a| Amount::new(a, ccy)),
                    payment_due_date: d.date.map(|d| d.to_string()),
                }
            })
            .collect();
    } else if let [single] = due.as_slice() {
        doc.due_date = single.date.map(|d| d.to_string());
    } else if let Some(notes) = terms.notes.as_ref().filter(|n| !n.is_empty()) {
        doc.payment_terms = vec![PaymentTerms {
            notes: vec![notes.clone()],
            ..Default::default()
        }];
    }
}
