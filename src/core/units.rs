//! Canonical unit keys and their UN/CEFACT Recommendation 20 codes.
//!
//! Lines carry either a short canonical key (`"h"`, `"kg"`, `"item"`) or
//! a Rec 20 code directly. Keys are translated on output; codes without a
//! key pass through unchanged in both directions.

/// Translate a canonical unit key into its Rec 20 code.
pub fn to_unece(unit: &str) -> &str {
    UNIT_CODES
        .binary_search_by(|(key, _)| (*key).cmp(unit))
        .map(|i| UNIT_CODES[i].1)
        .unwrap_or(unit)
}

/// Translate a Rec 20 code back into a canonical unit key.
pub fn from_unece(code: &str) -> &str {
    UNIT_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(key, _)| *key)
        .unwrap_or(code)
}

/// Check whether `code` has a canonical key.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.iter().any(|(_, c)| *c == code)
}

/// Canonical key to Rec 20 code, sorted by key for binary search.
static UNIT_CODES: &[(&str, &str)] = &[
    ("bag", "XBG"),
    ("box", "XBX"),
    ("carton", "XCT"),
    ("cl", "CLT"),
    ("cm", "CMT"),
    ("cm2", "CMK"),
    ("day", "DAY"),
    ("g", "GRM"),
    ("h", "HUR"),
    ("ha", "HAR"),
    ("in", "INH"),
    ("item", "H87"),
    ("kg", "KGM"),
    ("km", "KMT"),
    ("kw", "KWT"),
    ("kwh", "KWH"),
    ("l", "LTR"),
    ("m", "MTR"),
    ("m2", "MTK"),
    ("m3", "MTQ"),
    ("mg", "MGM"),
    ("min", "MIN"),
    ("ml", "MLT"),
    ("mm", "MMT"),
    ("month", "MON"),
    ("one", "C62"),
    ("pair", "PR"),
    ("pallet", "XPX"),
    ("percent", "P1"),
    ("roll", "XRO"),
    ("s", "SEC"),
    ("set", "SET"),
    ("sheet", "XST"),
    ("t", "TNE"),
    ("w", "WTT"),
    ("week", "WEE"),
    ("year", "ANN"),
];
