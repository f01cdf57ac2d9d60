//! Context registry: the eight built-in UBL profiles.
//!
//! A [`Context`] pairs the `CustomizationID` / `ProfileID` written into a
//! document with the addons the canonical invoice is expected to carry and
//! the validation executor set identifiers (VESIDs) used by external validators.
//! Behaviour that differs per profile is expressed through [`ProfileFlags`]
//! rather than comparing identifiers at each call site.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::core::{Invoice, META_KEY_UBL_PROFILE, UblError};

/// Peppol BIS Billing 3.0 profile identifier.
pub const PEPPOL_BILLING_PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

const ADDON_EN16931: &str = "eu-en16931-v2017";
const ADDON_XRECHNUNG: &str = "de-xrechnung-v3";
const ADDON_FACTURX: &str = "fr-facturx-v1";

/// Validation executor set identifiers for invoices and credit notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vesids {
    pub invoice: &'static str,
    pub credit_note: &'static str,
}

/// Per-profile switches consulted by the mappers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFlags {
    /// Emit `UBLVersionID` and `UUID` in the header.
    pub emits_version_uuid: bool,
    /// Join all notes into a single `Note` element.
    pub single_note: bool,
    /// Emit a `TaxTotal` on every line.
    pub line_tax_totals: bool,
    /// Payment means `30` becomes `31` with a financial institution block.
    pub oioubl_payment: bool,
    /// Run the OIOUBL 2.1 overlay after forward mapping.
    pub legacy_overlay: bool,
}

const BASE_FLAGS: ProfileFlags = ProfileFlags {
    emits_version_uuid: false,
    single_note: false,
    line_tax_totals: false,
    oioubl_payment: false,
    legacy_overlay: false,
};

const OIOUBL_FLAGS: ProfileFlags = ProfileFlags {
    emits_version_uuid: true,
    single_note: false,
    line_tax_totals: true,
    oioubl_payment: true,
    legacy_overlay: false,
};

/// A UBL profile.
///
/// Two contexts are equal when their `CustomizationID` and `ProfileID`
/// match; the remaining fields are derived data.
#[derive(Debug, Clone)]
pub struct Context {
    pub customization_id: &'static str,
    pub profile_id: Cow<'static, str>,
    /// `CustomizationID` to write instead of [`Self::customization_id`].
    pub output_customization_id: Option<&'static str>,
    /// Addon keys the canonical invoice should have been prepared with.
    pub addons: &'static [&'static str],
    pub vesids: Option<Vesids>,
    pub flags: ProfileFlags,
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.customization_id == other.customization_id && self.profile_id == other.profile_id
    }
}

impl Eq for Context {}

impl Default for Context {
    fn default() -> Self {
        EN16931
    }
}

impl Context {
    /// Same context with an explicit `ProfileID`.
    pub fn with_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Cow::Owned(profile_id.into());
        self
    }

    /// `CustomizationID` as written on output.
    pub fn output_customization_id(&self) -> &'static str {
        self.output_customization_id
            .unwrap_or(self.customization_id)
    }

    /// VESID for a credit note or an invoice; empty when the profile has none.
    pub fn vesid(&self, credit_note: bool) -> &'static str {
        match self.vesids {
            Some(v) if credit_note => v.credit_note,
            Some(v) => v.invoice,
            None => "",
        }
    }

    pub fn is_oioubl(&self) -> bool {
        self.flags.oioubl_payment
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.profile_id.is_empty() {
            f.write_str(self.customization_id)
        } else {
            write!(f, "{} ({})", self.customization_id, self.profile_id)
        }
    }
}

/// Resolve a case-insensitive alias such as `peppol` or `oioubl21`.
impl FromStr for Context {
    type Err = UblError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ctx = match s.trim().to_ascii_lowercase().as_str() {
            "en16931" | "en" => EN16931,
            "peppol" => PEPPOL,
            "peppol-self-billed" | "peppol-selfbilled" | "peppol-self" => PEPPOL_SELF_BILLED,
            "xrechnung" => XRECHNUNG,
            "peppol-france-cius" | "france-cius" | "fr-cius" => PEPPOL_FRANCE_CIUS,
            "peppol-france-extended" | "france-extended" | "fr-extended" => {
                PEPPOL_FRANCE_EXTENDED
            }
            "nemhandel" | "oioubl" => OIOUBL,
            "nemhandel-2.1" | "oioubl-2.1" | "oioubl21" => OIOUBL21,
            _ => return Err(UblError::Config(format!("unknown context '{s}'"))),
        };
        Ok(ctx)
    }
}

/// Baseline EN 16931 UBL.
pub const EN16931: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017",
    profile_id: Cow::Borrowed(""),
    output_customization_id: None,
    addons: &[ADDON_EN16931],
    vesids: Some(Vesids {
        invoice: "eu.cen.en16931:ubl:1.3.14-2",
        credit_note: "eu.cen.en16931:ubl-creditnote:1.3.15",
    }),
    flags: BASE_FLAGS,
};

/// Peppol BIS Billing 3.0.
pub const PEPPOL: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0",
    profile_id: Cow::Borrowed(PEPPOL_BILLING_PROFILE_ID),
    output_customization_id: None,
    addons: &[ADDON_EN16931],
    vesids: Some(Vesids {
        invoice: "eu.peppol.bis3:invoice:2025.5",
        credit_note: "eu.peppol.bis3:creditnote:2025.5",
    }),
    flags: ProfileFlags {
        single_note: true,
        ..BASE_FLAGS
    },
};

/// Peppol BIS Self-Billing 3.0.
pub const PEPPOL_SELF_BILLED: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:selfbilling:3.0",
    profile_id: Cow::Borrowed("urn:fdc:peppol.eu:2017:poacc:selfbilling:01:1.0"),
    output_customization_id: None,
    addons: &[ADDON_EN16931],
    vesids: Some(Vesids {
        invoice: "eu.peppol.bis3:invoice-self-billing:2025.3",
        credit_note: "eu.peppol.bis3:creditnote-self-billing:2025.3",
    }),
    flags: BASE_FLAGS,
};

/// German XRechnung 3.0.
pub const XRECHNUNG: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0",
    profile_id: Cow::Borrowed(PEPPOL_BILLING_PROFILE_ID),
    output_customization_id: None,
    addons: &[ADDON_XRECHNUNG],
    vesids: Some(Vesids {
        invoice: "de.xrechnung:ubl-invoice:3.0.2",
        credit_note: "de.xrechnung:ubl-creditnote:3.0.2",
    }),
    flags: BASE_FLAGS,
};

/// French CIUS on Peppol. Written as plain EN 16931.
pub const PEPPOL_FRANCE_CIUS: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017#compliant#urn:peppol:france:billing:cius:1.0",
    profile_id: Cow::Borrowed("urn:peppol:france:billing:regulated"),
    output_customization_id: Some("urn:cen.eu:en16931:2017"),
    addons: &[ADDON_EN16931],
    vesids: Some(Vesids {
        invoice: "fr.ctc:ubl-invoice:1.2",
        credit_note: "fr.ctc:ubl-creditnote:1.2",
    }),
    flags: BASE_FLAGS,
};

/// French extended CTC profile on Peppol.
pub const PEPPOL_FRANCE_EXTENDED: Context = Context {
    customization_id: "urn:cen.eu:en16931:2017#conformant#urn:peppol:france:billing:extended:1.0",
    profile_id: Cow::Borrowed("urn:peppol:france:billing:regulated"),
    output_customization_id: Some(
        "urn:cen.eu:en16931:2017#conformant#urn.cpro.gouv.fr:1p0:extended-ctc-fr",
    ),
    addons: &[ADDON_FACTURX],
    vesids: Some(Vesids {
        invoice: "fr.ctc:ubl-invoice:1.2",
        credit_note: "fr.ctc:ubl-creditnote:1.2",
    }),
    flags: BASE_FLAGS,
};

/// OIOUBL 3 (Nemhandel).
pub const OIOUBL: Context = Context {
    customization_id: "urn:fdc:oioubl.dk:trns:billing:invoice:3.0",
    profile_id: Cow::Borrowed("urn:fdc:oioubl.dk:bis:billing_with_response:3"),
    output_customization_id: None,
    addons: &[ADDON_EN16931],
    vesids: None,
    flags: OIOUBL_FLAGS,
};

/// Legacy OIOUBL 2.1.
pub const OIOUBL21: Context = Context {
    customization_id: "OIOUBL-2.1",
    profile_id: Cow::Borrowed("urn:www.nesubl.eu:profiles:profile5:ver2.0"),
    output_customization_id: None,
    addons: &[ADDON_EN16931],
    vesids: None,
    flags: ProfileFlags {
        legacy_overlay: true,
        ..OIOUBL_FLAGS
    },
};

/// All built-in contexts in lookup order.
pub static CONTEXTS: [Context; 8] = [
    EN16931,
    PEPPOL,
    PEPPOL_SELF_BILLED,
    XRECHNUNG,
    PEPPOL_FRANCE_CIUS,
    PEPPOL_FRANCE_EXTENDED,
    OIOUBL,
    OIOUBL21,
];

/// Look up a context by the identifiers found in a document.
///
/// Contexts are first matched on `CustomizationID`; a context with its own
/// `ProfileID` is skipped when a different non-empty `profile_id` is given.
/// Failing that, the output `CustomizationID` is tried.
pub fn find(customization_id: &str, profile_id: Option<&str>) -> Option<&'static Context> {
    let profile_id = profile_id.filter(|p| !p.is_empty());
    let found = CONTEXTS
        .iter()
        .filter(|c| c.customization_id == customization_id)
        .find(|c| match profile_id {
            Some(p) if !c.profile_id.is_empty() => c.profile_id == p,
            _ => true,
        })
        .or_else(|| {
            CONTEXTS
                .iter()
                .find(|c| c.output_customization_id == Some(customization_id))
        });
    debug!(
        "context lookup for '{customization_id}' / {profile_id:?}: {}",
        found.map_or("none".to_string(), |c| c.to_string())
    );
    found
}

/// `CustomizationID` and `ProfileID` to write for `invoice` under `context`.
///
/// The invoice's `ubl-profile` meta entry overrides the context profile.
pub fn resolve_output_profile<'a>(invoice: &'a Invoice, context: &'a Context) -> (&'a str, &'a str) {
    let profile = invoice
        .meta
        .get(META_KEY_UBL_PROFILE)
        .map(String::as_str)
        .unwrap_or(&context.profile_id);
    (context.output_customization_id(), profile)
}

/// VESID matching the invoice type.
pub fn get_vesid(context: &Context, invoice: &Invoice) -> &'static str {
    context.vesid(invoice.is_credit_note())
}

/// Whether the legacy OIOUBL 2.1 overlay applies.
pub fn is_legacy_oioubl21(context: &Context) -> bool {
    context.flags.legacy_overlay
}

/// Context addons not present on the invoice.
pub fn missing_addons<'c>(invoice: &Invoice, context: &'c Context) -> Vec<&'c str> {
    context
        .addons
        .iter()
        .copied()
        .filter(|a| !invoice.addons.iter().any(|have| have == a))
        .collect()
}

/// Conversion settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub context: Context,
    /// Explicit `ProfileID` replacing the context default.
    pub profile_id: Option<String>,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a context alias and an optional profile override.
    pub fn from_names(context: &str, profile_id: Option<&str>) -> Result<Self, UblError> {
        let mut opts = Self::new().context(context.parse()?);
        if let Some(p) = profile_id.filter(|p| !p.is_empty()) {
            opts = opts.profile_id(p);
        }
        Ok(opts)
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// The context with any explicit profile applied.
    pub fn effective_context(&self) -> Context {
        match &self.profile_id {
            Some(p) => self.context.clone().with_profile_id(p.clone()),
            None => self.context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oioubl_family_flags() {
        assert!(OIOUBL.is_oioubl());
        assert!(OIOUBL21.is_oioubl());
        assert!(!PEPPOL.is_oioubl());
        assert!(is_legacy_oioubl21(&OIOUBL21));
        assert!(!is_legacy_oioubl21(&OIOUBL));
        assert!(PEPPOL.flags.single_note);
        assert!(!XRECHNUNG.flags.single_note);
    }

    #[test]
    fn equality_ignores_derived_fields() {
        let mut other = PEPPOL;
        other.addons = &[];
        other.vesids = None;
        assert_eq!(other, PEPPOL);
        assert_ne!(PEPPOL.with_profile_id("urn:other"), PEPPOL);
    }

    #[test]
    fn output_customization_falls_back() {
        assert_eq!(PEPPOL.output_customization_id(), PEPPOL.customization_id);
        assert_eq!(
            PEPPOL_FRANCE_CIUS.output_customization_id(),
            "urn:cen.eu:en16931:2017"
        );
    }

    #[test]
    fn vesid_empty_without_mapping() {
        assert_eq!(OIOUBL.vesid(false), "");
        assert_eq!(XRECHNUNG.vesid(true), "de.xrechnung:ubl-creditnote:3.0.2");
    }

    #[test]
    fn unknown_alias_is_config_error() {
        let err = "zugferd".parse::<Context>().unwrap_err();
        assert!(matches!(err, UblError::Config(_)));
    }

    #[test]
    fn options_apply_profile_override() {
        let opts = ConvertOptions::from_names("XRechnung", Some("urn:custom")).unwrap();
        let ctx = opts.effective_context();
        assert_eq!(ctx.customization_id, XRECHNUNG.customization_id);
        assert_eq!(ctx.profile_id, "urn:custom");

        let opts = ConvertOptions::from_names("en", None).unwrap();
        assert_eq!(opts.effective_context(), EN16931);
    }
}
