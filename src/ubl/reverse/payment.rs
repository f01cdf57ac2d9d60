use std::sync::LazyLock;

use log::trace;
use regex::Regex;
use rust_decimal::Decimal;

use super::{parse_date, parse_optional_amount, parse_optional_date};
use crate::core::num::parse_percentage;
use crate::core::{
    Advance, Card, CreditTransfer, DirectDebit, DueDate, Instructions, Party, PaymentDetails,
    Percentage, Terms, UblError,
};
use crate::ubl::clean_string;
use crate::ubl::document::{Document, PaymentMeans};
use crate::ubl::party::read_party;

const SEPA: &str = "SEPA";
const PREPAID_DESCRIPTION: &str = "Prepaid Amount";

/// Payee, terms, instructions and advances. `None` when the document
/// carries none of them.
pub(super) fn read_payment(doc: &Document, supplier: &Party) -> Result<Option<PaymentDetails>, UblError> {
    let payee = doc.payee_party.as_ref().map(read_party);
    let terms = read_terms(doc)?;
    let instructions = doc
        .payment_means
        .first()
        .map(|pm| read_instructions(pm, supplier, payee.as_ref()));
    let advances = parse_optional_amount(doc.legal_monetary_total.prepaid_amount.as_ref())?
        .map(|amount| Advance {
            description: PREPAID_DESCRIPTION.to_string(),
            amount,
            date: None,
        })
        .into_iter()
        .collect::<Vec<_>>();

    let payment = PaymentDetails {
        payee,
        terms,
        instructions,
        advances,
    };
    Ok((payment != PaymentDetails::default()).then_some(payment))
}

fn read_terms(doc: &Document) -> Result<Option<Terms>, UblError> {
    let mut terms = Terms::default();
    let mut notes = Vec::new();

    for pt in &doc.payment_terms {
        let text = pt
            .notes
            .iter()
            .map(|n| clean_string(n))
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let date = parse_optional_date(pt.payment_due_date.as_deref())?;
        let amount = parse_optional_amount(pt.amount.as_ref())?;
        if date.is_some() || amount.is_some() {
            terms.due_dates.push(DueDate {
                date,
                amount,
                percent: pt
                    .payment_percent
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .map(parse_percentage)
                    .transpose()?,
                notes: (!text.is_empty()).then_some(text),
                currency: None,
            });
        } else if !text.is_empty() {
            notes.push(text);
        }
    }

    let header_due = doc
        .due_date
        .as_deref()
        .or_else(|| {
            doc.payment_means
                .first()
                .and_then(|pm| pm.payment_due_date.as_deref())
        })
        .filter(|d| !d.trim().is_empty());
    if let Some(due) = header_due {
        let date = parse_date(due)?;
        if !terms.due_dates.iter().any(|d| d.date == Some(date)) {
            terms.due_dates.push(DueDate {
                date: Some(date),
                ..Default::default()
            });
        }
    }

    if let [single] = terms.due_dates.as_mut_slice() {
        single
            .percent
            .get_or_insert(Percentage::new(Decimal::ONE_HUNDRED));
    }

    if !notes.is_empty() {
        terms.notes = Some(notes.join(" "));
    }
    Ok((terms != Terms::default()).then_some(terms))
}

fn means_key(code: &str) -> &'static str {
    match code {
        "10" => "cash",
        "20" => "cheque",
        "30" => "credit-transfer",
        "42" => "debit-transfer",
        "48" => "card",
        "49" => "direct-debit",
        "58" => "credit-transfer+sepa",
        "59" => "direct-debit+sepa",
        _ => "any",
    }
}

/// Two or more letters followed by digits and letters, spaces allowed.
static IBAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{2,}\s*[0-9A-Z\s]+$").expect("Invalid IBAN regex")
});

/// Whether an account id looks like an IBAN. Case is ignored.
fn looks_like_iban(account: &str) -> bool {
    IBAN.is_match(&account.trim().to_uppercase())
}

/// Creditor identifier from an identity labelled or schemed `SEPA`.
fn sepa_creditor(party: &Party) -> Option<String> {
    party
        .identities
        .iter()
        .find(|i| i.label.as_deref() == Some(SEPA) || i.scheme.as_deref() == Some(SEPA))
        .map(|i| i.code.clone())
}

fn read_instructions(pm: &PaymentMeans, supplier: &Party, payee: Option<&Party>) -> Instructions {
    let code = pm.payment_means_code.value.trim();
    let mut instructions = Instructions {
        key: Some(means_key(code).to_string()),
        means_code: (!code.is_empty()).then(|| code.to_string()),
        detail: pm
            .payment_means_code
            .name
            .as_deref()
            .map(clean_string)
            .filter(|d| !d.is_empty()),
        reference: pm.payment_id.clone().filter(|r| !r.is_empty()),
        channel: pm
            .payment_channel_code
            .as_ref()
            .map(|c| c.value.clone())
            .filter(|c| !c.is_empty()),
        ..Default::default()
    };

    if let Some(acct) = &pm.payee_financial_account {
        let id = acct.id.clone().filter(|i| !i.is_empty());
        let (iban, number) = match id {
            Some(id) if looks_like_iban(&id) => (Some(id), None),
            other => (None, other),
        };
        let bic = acct.financial_institution_branch.as_ref().and_then(|b| {
            b.id.clone()
                .filter(|i| !i.is_empty())
                .or_else(|| b.financial_institution_id.clone().filter(|i| !i.is_empty()))
        });
        instructions.credit_transfer.push(CreditTransfer {
            iban,
            bic,
            number,
            name: acct.name.clone().filter(|n| !n.is_empty()),
        });
    }

    if let Some(mandate) = &pm.payment_mandate {
        let creditor = payee
            .and_then(sepa_creditor)
            .or_else(|| sepa_creditor(supplier));
        trace!("direct debit creditor: {creditor:?}");
        instructions.direct_debit = Some(DirectDebit {
            reference: Some(mandate.id.value.clone()).filter(|r| !r.is_empty()),
            creditor,
            account: mandate
                .payer_financial_account
                .as_ref()
                .and_then(|a| a.id.clone())
                .filter(|a| !a.is_empty()),
        });
    }

    if let Some(card) = &pm.card_account {
        let pan = card.primary_account_number_id.trim();
        let start = pan.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
        instructions.card = Some(Card {
            last4: pan[start..].to_string(),
            holder: card.holder_name.clone().filter(|h| !h.is_empty()),
        });
    }
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Identity;
    use crate::ubl::document::{
        Amount, Branch, CardAccount, FinancialAccount, IdType, MonetaryTotal, PaymentMandate,
        PaymentTerms,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn iban_detection() {
        assert!(looks_like_iban("DK50 0040 0440 1162 43"));
        assert!(looks_like_iban("NO9386011117947"));
        assert!(looks_like_iban(" de89370400440532013000 "));
        assert!(!looks_like_iban("12345678"));
        assert!(!looks_like_iban("DK"));
        assert!(!looks_like_iban("DK-5000"));
        assert!(!looks_like_iban(""));
    }

    #[test]
    fn letters_only_account_counts_as_iban() {
        // The letter run backtracks so the tail can match.
        assert!(looks_like_iban("ABCD"));
        assert!(looks_like_iban("ABC"));
        assert!(looks_like_iban("NO 93"));
    }

    #[test]
    fn iban_account_goes_to_iban_slot() {
        let pm = PaymentMeans {
            payment_means_code: IdType::new("58"),
            payee_financial_account: Some(FinancialAccount {
                id: Some("ABCD".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let i = read_instructions(&pm, &Party::default(), None);
        let ct = &i.credit_transfer[0];
        assert_eq!(ct.iban.as_deref(), Some("ABCD"));
        assert!(ct.number.is_none());

        let pm = PaymentMeans {
            payee_financial_account: Some(FinancialAccount {
                id: Some("1234 5678".into()),
                ..Default::default()
            }),
            ..pm
        };
        let i = read_instructions(&pm, &Party::default(), None);
        assert_eq!(i.credit_transfer[0].number.as_deref(), Some("1234 5678"));
        assert!(i.credit_transfer[0].iban.is_none());
    }

    #[test]
    fn empty_document_has_no_payment() {
        assert!(read_payment(&Document::default(), &Party::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn header_due_date_gets_full_percent() {
        let doc = Document {
            due_date: Some("2024-06-30".into()),
            ..Default::default()
        };
        let p = read_payment(&doc, &Party::default()).unwrap().unwrap();
        let due = &p.terms.unwrap().due_dates;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].date, Some(date(30)));
        assert_eq!(due[0].percent.unwrap().value(), dec!(100));
    }

    #[test]
    fn terms_with_and_without_dates() {
        let doc = Document {
            payment_terms: vec![
                PaymentTerms {
                    notes: vec!["First  half".into()],
                    payment_percent: Some("50".into()),
                    amount: Some(Amount::new("50.00", "EUR")),
                    payment_due_date: Some("2024-06-10".into()),
                },
                PaymentTerms {
                    payment_percent: Some("50".into()),
                    amount: Some(Amount::new("50.00", "EUR")),
                    payment_due_date: Some("2024-06-20".into()),
                    ..Default::default()
                },
                PaymentTerms {
                    notes: vec!["Net 30".into()],
                    ..Default::default()
                },
            ],
            due_date: Some("2024-06-20".into()),
            ..Default::default()
        };
        let terms = read_terms(&doc).unwrap().unwrap();
        assert_eq!(terms.due_dates.len(), 2);
        assert_eq!(terms.due_dates[0].notes.as_deref(), Some("First half"));
        assert_eq!(terms.due_dates[1].percent.unwrap().value(), dec!(50));
        assert_eq!(terms.notes.as_deref(), Some("Net 30"));
    }

    #[test]
    fn credit_transfer_and_bic_fallback() {
        let pm = PaymentMeans {
            payment_means_code: IdType {
                name: Some("Bank transfer".into()),
                ..IdType::new("31")
            },
            payment_channel_code: Some(IdType::new("IBAN")),
            payee_financial_account: Some(FinancialAccount {
                id: Some("DK5000400440116243".into()),
                name: None,
                financial_institution_branch: Some(Branch {
                    financial_institution_id: Some("DABADKKK".into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };
        let i = read_instructions(&pm, &Party::default(), None);
        assert_eq!(i.key.as_deref(), Some("any"));
        assert_eq!(i.detail.as_deref(), Some("Bank transfer"));
        assert_eq!(i.channel.as_deref(), Some("IBAN"));
        let ct = &i.credit_transfer[0];
        assert_eq!(ct.iban.as_deref(), Some("DK5000400440116243"));
        assert_eq!(ct.bic.as_deref(), Some("DABADKKK"));
        assert!(ct.number.is_none());
    }

    #[test]
    fn direct_debit_creditor_prefers_payee() {
        let pm = PaymentMeans {
            payment_means_code: IdType::new("59"),
            payment_mandate: Some(PaymentMandate {
                id: IdType::new("MANDATE-7"),
                payer_financial_account: Some(FinancialAccount {
                    id: Some("DE89370400440532013000".into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };
        let supplier = Party {
            identities: vec![Identity::new("DE98ZZZ09999999999").with_label("SEPA")],
            ..Default::default()
        };
        let i = read_instructions(&pm, &supplier, None);
        assert_eq!(i.key.as_deref(), Some("direct-debit+sepa"));
        let dd = i.direct_debit.unwrap();
        assert_eq!(dd.reference.as_deref(), Some("MANDATE-7"));
        assert_eq!(dd.creditor.as_deref(), Some("DE98ZZZ09999999999"));
        assert_eq!(dd.account.as_deref(), Some("DE89370400440532013000"));

        let payee = Party {
            identities: vec![Identity::new("DE11ZZZ00000000001").with_scheme("SEPA")],
            ..Default::default()
        };
        let i = read_instructions(&pm, &supplier, Some(&payee));
        assert_eq!(
            i.direct_debit.unwrap().creditor.as_deref(),
            Some("DE11ZZZ00000000001")
        );
    }

    #[test]
    fn card_keeps_last_four() {
        let pm = PaymentMeans {
            payment_means_code: IdType::new("48"),
            card_account: Some(CardAccount {
                primary_account_number_id: "4111111111111234".into(),
                network_id: Some("VISA".into()),
                holder_name: Some("A Berg".into()),
            }),
            ..Default::default()
        };
        let card = read_instructions(&pm, &Party::default(), None).card.unwrap();
        assert_eq!(card.last4, "1234");
        assert_eq!(card.holder.as_deref(), Some("A Berg"));
    }

    #[test]
    fn prepaid_amount_becomes_advance() {
        let doc = Document {
            legal_monetary_total: MonetaryTotal {
                prepaid_amount: Some(Amount::new("20.00", "EUR")),
                ..Default::default()
            },
            ..Default::default()
        };
        let p = read_payment(&doc, &Party::default()).unwrap().unwrap();
        assert_eq!(p.advances[0].description, "Prepaid Amount");
        assert_eq!(p.advances[0].amount, dec!(20.00));
    }
}
