//! Party identity resolver.
//!
//! A canonical party keeps every identifier in one scoped list; UBL spreads
//! them over three slots: `PartyLegalEntity/CompanyID`,
//! `PartyTaxScheme/CompanyID` and `PartyIdentification/ID`. The `build_*`
//! functions go canonical → UBL, the `read_*` functions go back.

use super::clean_string;
use super::document::{
    Contact, EndpointId, IdType, LocationCoordinate, Party as UblParty, PartyLegalEntity,
    PartyTaxScheme, PostalAddress, TaxScheme,
};
use crate::core::{
    Address, Coordinates, Identity, IdentityScope, Inbox, Party, Person, TAX_SCHEME_VAT,
    TaxIdentity,
};

/// Endpoint scheme for email addresses.
pub const SCHEME_ID_EMAIL: &str = "EM";

/// ISO 6523 ICD for GLN endpoints.
pub const SCHEME_ID_GLN: &str = "0088";

const DK: &str = "DK";
const SCHEME_DK_VAT: &str = "0198";
const SCHEME_DK_CVR: &str = "0184";

/// Where a canonical identity ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    LegalEntity,
    TaxScheme,
    Identification,
}

/// Assign every identity to exactly one slot: the first legal identity
/// to the legal entity, every tax identity to a tax scheme, the rest to
/// the identification list.
fn slots(identities: &[Identity]) -> impl Iterator<Item = (Slot, &Identity)> {
    let first_legal = identities
        .iter()
        .position(|i| i.scope == IdentityScope::Legal);
    identities.iter().enumerate().map(move |(idx, id)| {
        let slot = match id.scope {
            IdentityScope::Legal if Some(idx) == first_legal => Slot::LegalEntity,
            IdentityScope::Tax => Slot::TaxScheme,
            _ => Slot::Identification,
        };
        (slot, id)
    })
}

fn scheme_id(identity: &Identity) -> IdType {
    IdType {
        scheme_id: identity.scheme.clone().filter(|s| !s.is_empty()),
        ..IdType::new(&identity.code)
    }
}

/// Map GLN to its ICD; other schemes pass through.
pub fn normalize_endpoint_scheme(scheme: &str) -> String {
    if scheme.eq_ignore_ascii_case("GLN") {
        SCHEME_ID_GLN.to_string()
    } else {
        scheme.to_string()
    }
}

fn endpoint(inbox: &Inbox) -> Option<EndpointId> {
    if let Some(email) = inbox.email.as_ref().filter(|e| !e.is_empty()) {
        return Some(EndpointId {
            scheme_id: SCHEME_ID_EMAIL.to_string(),
            value: email.clone(),
        });
    }
    let scheme = inbox.scheme.as_deref().filter(|s| !s.is_empty())?;
    Some(EndpointId {
        scheme_id: normalize_endpoint_scheme(scheme),
        value: inbox.code.clone().unwrap_or_default(),
    })
}

fn contact(party: &Party) -> Option<Contact> {
    let contact = Contact {
        id: None,
        name: party
            .people
            .first()
            .map(Person::full_name)
            .filter(|n| !n.is_empty()),
        telephone: party.telephones.first().cloned(),
        electronic_mail: party.emails.first().cloned(),
    };
    (!contact.is_empty()).then_some(contact)
}

/// Postal address from a canonical address.
pub fn build_address(a: &Address) -> PostalAddress {
    let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
    PostalAddress {
        street_name: a.line_one(),
        additional_street_name: non_empty(&a.street_extra),
        city_name: non_empty(&a.locality),
        postal_zone: non_empty(&a.code),
        country_subentity: non_empty(&a.region),
        country: non_empty(&a.country),
        location_coordinate: a.coordinates.map(|c| LocationCoordinate {
            latitude_degrees: Some(c.latitude.to_string()),
            longitude_degrees: Some(c.longitude.to_string()),
        }),
        ..Default::default()
    }
}

/// Full party block for supplier, customer and tax representative.
pub fn build_party(party: &Party) -> UblParty {
    let mut p = UblParty {
        postal_address: party.addresses.first().map(build_address),
        ..Default::default()
    };

    if !party.name.is_empty() {
        p.party_name = Some(party.name.clone());
        p.party_legal_entity = Some(PartyLegalEntity {
            registration_name: Some(party.name.clone()),
            ..Default::default()
        });
    }

    let tax_id = party.tax_id.as_ref().filter(|t| !t.code.is_empty());
    if let Some(tax_id) = tax_id {
        let mut company_id = IdType::new(tax_id.to_string());
        if tax_id.country == DK {
            company_id.scheme_id = Some(SCHEME_DK_VAT.to_string());
        }
        p.party_tax_schemes.push(PartyTaxScheme {
            company_id: Some(company_id),
            tax_scheme: Some(TaxScheme::new(tax_id.scheme())),
        });
        p.postal_address.get_or_insert_with(Default::default).country =
            Some(tax_id.country.clone());
    }

    p.contact = contact(party);
    p.endpoint_id = party.inboxes.first().and_then(endpoint);

    if let Some(alias) = party.alias.as_ref().filter(|a| !a.is_empty()) {
        p.party_name = Some(alias.clone());
    }

    for (slot, id) in slots(&party.identities) {
        match slot {
            Slot::LegalEntity => {
                p.party_legal_entity
                    .get_or_insert_with(Default::default)
                    .company_id = Some(scheme_id(id));
            }
            Slot::TaxScheme => p.party_tax_schemes.push(PartyTaxScheme {
                company_id: Some(scheme_id(id)),
                tax_scheme: Some(TaxScheme::new(id.kind.clone().unwrap_or_default())),
            }),
            Slot::Identification => p.party_identifications.push(scheme_id(id)),
        }
    }

    if let (Some(legal), Some(tax_id)) = (p.party_legal_entity.as_mut(), party.tax_id.as_ref()) {
        if legal.company_id.is_none() && tax_id.country == DK {
            legal.company_id = Some(IdType::with_scheme(&tax_id.code, SCHEME_DK_CVR));
        }
    }
    p
}

/// Reduced party for `Delivery/DeliveryParty`: name and contact only.
pub fn build_delivery_party(party: &Party) -> Option<UblParty> {
    let mut p = UblParty::default();
    if !party.name.is_empty() {
        p.party_name = Some(party.name.clone());
        p.party_legal_entity = Some(PartyLegalEntity {
            registration_name: Some(party.name.clone()),
            ..Default::default()
        });
    }
    p.contact = contact(party);
    (p.party_name.is_some() || p.contact.is_some()).then_some(p)
}

/// Reduced party for `PayeeParty`: name, one scheme-qualified
/// identification and the legal company id, without a registration name.
pub fn build_payee_party(party: &Party) -> UblParty {
    let identification = party.identities.iter().find_map(|id| {
        let scheme = id
            .scheme
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| id.label.clone().filter(|l| l.len() == 4))?;
        Some(IdType::with_scheme(&id.code, scheme))
    });
    let legal = party
        .identities
        .iter()
        .find(|id| id.scope == IdentityScope::Legal)
        .map(|id| PartyLegalEntity {
            company_id: Some(scheme_id(id)),
            ..Default::default()
        });
    UblParty {
        party_name: Some(party.name.clone()),
        party_identifications: identification.into_iter().collect(),
        party_legal_entity: legal,
        ..Default::default()
    }
}

/// Canonical address from a postal address.
pub fn read_address(a: &PostalAddress) -> Address {
    let clean = |s: &Option<String>| s.as_deref().map(clean_string).filter(|v| !v.is_empty());
    let street = clean(&a.street_name);
    let number = clean(&a.building_number)
        .filter(|n| !street.as_deref().is_some_and(|s| s.ends_with(n.as_str())));
    let coordinates = a.location_coordinate.as_ref().and_then(|c| {
        Some(Coordinates {
            latitude: c.latitude_degrees.as_deref()?.trim().parse().ok()?,
            longitude: c.longitude_degrees.as_deref()?.trim().parse().ok()?,
        })
    });
    Address {
        street,
        number,
        street_extra: clean(&a.additional_street_name),
        locality: clean(&a.city_name),
        region: clean(&a.country_subentity),
        code: clean(&a.postal_zone),
        country: clean(&a.country),
        coordinates,
    }
}

/// Canonical party from any UBL party block.
pub fn read_party(party: &UblParty) -> Party {
    let mut p = Party {
        name: party.registration_name().map(clean_string).unwrap_or_default(),
        ..Default::default()
    };

    if let Some(e) = &party.endpoint_id {
        let inbox = if e.scheme_id == SCHEME_ID_EMAIL {
            Inbox {
                email: Some(e.value.clone()),
                ..Default::default()
            }
        } else {
            Inbox {
                scheme: Some(e.scheme_id.clone()),
                code: Some(e.value.clone()),
                email: None,
            }
        };
        p.inboxes.push(inbox);
    }

    if let Some(name) = &party.party_name {
        let name = clean_string(name);
        if p.name.is_empty() {
            p.name = name;
        } else if name != p.name {
            p.alias = Some(name);
        }
    }

    if let Some(c) = &party.contact {
        if let Some(name) = &c.name {
            p.people.push(Person {
                given: clean_string(name),
                surname: String::new(),
            });
        }
        if let Some(tel) = &c.telephone {
            p.telephones.push(clean_string(tel));
        }
        if let Some(mail) = &c.electronic_mail {
            p.emails.push(clean_string(mail));
        }
    }

    if let Some(a) = &party.postal_address {
        p.addresses.push(read_address(a));
    }

    if let Some(company_id) = party
        .party_legal_entity
        .as_ref()
        .and_then(|l| l.company_id.as_ref())
    {
        p.identities.push(Identity {
            scheme: company_id.scheme_id.clone(),
            ..Identity::legal(&company_id.value)
        });
    }

    read_tax_schemes(party, &mut p);

    p.identities
        .extend(party.party_identifications.iter().map(|id| Identity {
            scheme: id.scheme_id.clone(),
            ..Identity::new(&id.value)
        }));
    p
}

/// One valid tax scheme becomes the tax id. With several, the VAT one (or
/// the first) becomes the tax id and the rest tax-scope identities.
fn read_tax_schemes(party: &UblParty, p: &mut Party) {
    let valid: Vec<(&IdType, &TaxScheme)> = party
        .party_tax_schemes
        .iter()
        .filter_map(|pts| {
            let company_id = pts.company_id.as_ref().filter(|c| !c.value.is_empty())?;
            Some((company_id, pts.tax_scheme.as_ref()?))
        })
        .collect();
    if valid.is_empty() {
        return;
    }

    let country = party.country_code().unwrap_or_default();
    let chosen = valid
        .iter()
        .position(|(_, ts)| ts.id.value == TAX_SCHEME_VAT)
        .unwrap_or(0);
    let (company_id, scheme) = valid[chosen];
    p.tax_id = Some(tax_identity(&company_id.value, scheme, country));

    for (idx, (company_id, scheme)) in valid.iter().enumerate() {
        if idx == chosen {
            continue;
        }
        p.identities.push(Identity {
            country: (!country.is_empty()).then(|| country.to_string()),
            ..Identity::tax(&scheme.id.value, &company_id.value)
        });
    }
}

fn tax_identity(value: &str, scheme: &TaxScheme, postal_country: &str) -> TaxIdentity {
    let value = value.trim();
    let country = if postal_country.is_empty() {
        country_prefix(value).unwrap_or_default()
    } else {
        postal_country
    };
    let code = value
        .strip_prefix(country)
        .filter(|_| !country.is_empty())
        .unwrap_or(value);
    let mut tax_id = TaxIdentity::new(country, code);
    if scheme.id.value != TAX_SCHEME_VAT {
        tax_id.scheme = Some(
            scheme
                .tax_type_code
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| scheme.id.value.clone()),
        );
    }
    tax_id
}

fn country_prefix(value: &str) -> Option<&str> {
    let prefix = value.get(..2)?;
    prefix
        .bytes()
        .all(|b| b.is_ascii_uppercase())
        .then_some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AddressBuilder, PartyBuilder};

    #[test]
    fn identities_land_in_one_slot_each() {
        let party = PartyBuilder::new("Acme A/S")
            .identity(Identity::legal("12345678").with_scheme("0184"))
            .identity(Identity::legal("87654321"))
            .identity(Identity::tax("FC", "DE-FC-1"))
            .identity(Identity::new("5790000435951").with_scheme("0088"))
            .build();
        let p = build_party(&party);

        let legal = p.party_legal_entity.as_ref().unwrap();
        assert_eq!(legal.registration_name.as_deref(), Some("Acme A/S"));
        let company_id = legal.company_id.as_ref().unwrap();
        assert_eq!(company_id.value, "12345678");
        assert_eq!(company_id.scheme_id.as_deref(), Some("0184"));

        assert_eq!(p.party_tax_schemes.len(), 1);
        assert_eq!(p.party_tax_schemes[0].tax_scheme.as_ref().unwrap().id.value, "FC");

        let ids: Vec<_> = p.party_identifications.iter().map(|i| i.value.as_str()).collect();
        assert_eq!(ids, vec!["87654321", "5790000435951"]);
    }

    #[test]
    fn danish_tax_id_gets_icd_schemes() {
        let party = PartyBuilder::new("Dansk ApS").tax_id("DK", "37990485").build();
        let p = build_party(&party);
        let pts = &p.party_tax_schemes[0];
        let company_id = pts.company_id.as_ref().unwrap();
        assert_eq!(company_id.value, "DK37990485");
        assert_eq!(company_id.scheme_id.as_deref(), Some("0198"));
        assert_eq!(p.country_code(), Some("DK"));

        let legal = p.party_legal_entity.unwrap().company_id.unwrap();
        assert_eq!(legal.value, "37990485");
        assert_eq!(legal.scheme_id.as_deref(), Some("0184"));
    }

    #[test]
    fn endpoint_from_first_inbox() {
        let party = PartyBuilder::new("X").inbox("GLN", "5790000435951").build();
        let e = build_party(&party).endpoint_id.unwrap();
        assert_eq!(e.scheme_id, "0088");

        let party = PartyBuilder::new("X").inbox_email("ap@example.com").build();
        let e = build_party(&party).endpoint_id.unwrap();
        assert_eq!(e.scheme_id, "EM");
        assert_eq!(e.value, "ap@example.com");
    }

    #[test]
    fn alias_overrides_party_name() {
        let party = PartyBuilder::new("Legal Name GmbH").alias("Brand").build();
        let p = build_party(&party);
        assert_eq!(p.party_name.as_deref(), Some("Brand"));
        assert_eq!(p.registration_name(), Some("Legal Name GmbH"));

        let back = read_party(&p);
        assert_eq!(back.name, "Legal Name GmbH");
        assert_eq!(back.alias.as_deref(), Some("Brand"));
    }

    #[test]
    fn payee_party_is_reduced() {
        let party = PartyBuilder::new("Factor Bank")
            .identity(Identity::new("DE98ZZZ09999999999").with_label("SEPA"))
            .identity(Identity::legal("HRB 1234"))
            .address(AddressBuilder::new("Berlin", "10115", "DE").build())
            .build();
        let p = build_payee_party(&party);
        assert_eq!(p.party_name.as_deref(), Some("Factor Bank"));
        assert_eq!(p.party_identifications.len(), 1);
        assert_eq!(p.party_identifications[0].scheme_id.as_deref(), Some("SEPA"));
        let legal = p.party_legal_entity.unwrap();
        assert!(legal.registration_name.is_none());
        assert_eq!(legal.company_id.unwrap().value, "HRB 1234");
        assert!(p.postal_address.is_none());
    }

    #[test]
    fn delivery_party_without_content_is_none() {
        assert!(build_delivery_party(&Party::default()).is_none());
        let p = build_delivery_party(&PartyBuilder::new("Dock 4").build()).unwrap();
        assert_eq!(p.party_name.as_deref(), Some("Dock 4"));
    }

    #[test]
    fn multiple_tax_schemes_prefer_vat() {
        let party = UblParty {
            postal_address: Some(PostalAddress {
                country: Some("DE".into()),
                ..Default::default()
            }),
            party_tax_schemes: vec![
                PartyTaxScheme {
                    company_id: Some(IdType::new("201/113/40209")),
                    tax_scheme: Some(TaxScheme::new("FC")),
                },
                PartyTaxScheme {
                    company_id: Some(IdType::new("DE123456789")),
                    tax_scheme: Some(TaxScheme::new("VAT")),
                },
                PartyTaxScheme {
                    company_id: Some(IdType::new("")),
                    tax_scheme: Some(TaxScheme::new("VAT")),
                },
            ],
            ..Default::default()
        };
        let p = read_party(&party);
        let tax_id = p.tax_id.unwrap();
        assert_eq!(tax_id.country, "DE");
        assert_eq!(tax_id.code, "123456789");
        assert_eq!(tax_id.scheme, None);
        assert_eq!(p.identities.len(), 1);
        assert_eq!(p.identities[0].scope, IdentityScope::Tax);
        assert_eq!(p.identities[0].kind.as_deref(), Some("FC"));
        assert_eq!(p.identities[0].country.as_deref(), Some("DE"));
    }

    #[test]
    fn single_non_vat_scheme_keeps_scheme() {
        let party = UblParty {
            party_tax_schemes: vec![PartyTaxScheme {
                company_id: Some(IdType::new("NO999999999MVA")),
                tax_scheme: Some(TaxScheme {
                    tax_type_code: Some("TAX".into()),
                    ..TaxScheme::new("TAX")
                }),
            }],
            ..Default::default()
        };
        let tax_id = read_party(&party).tax_id.unwrap();
        assert_eq!(tax_id.country, "NO");
        assert_eq!(tax_id.code, "999999999MVA");
        assert_eq!(tax_id.scheme.as_deref(), Some("TAX"));
    }

    #[test]
    fn address_round_trip() {
        let a = AddressBuilder::new("København", "1620", "DK")
            .street("Vesterbrogade")
            .number("12")
            .coordinates(55.6731, 12.5581)
            .build();
        let pa = build_address(&a);
        assert_eq!(pa.street_name.as_deref(), Some("Vesterbrogade 12"));
        let lc = pa.location_coordinate.as_ref().unwrap();
        assert_eq!(lc.latitude_degrees.as_deref(), Some("55.6731"));

        let back = read_address(&pa);
        assert_eq!(back.street.as_deref(), Some("Vesterbrogade 12"));
        assert_eq!(back.number, None);
        assert_eq!(back.locality.as_deref(), Some("København"));
        assert_eq!(back.coordinates.unwrap().longitude, 12.5581);
    }
}
