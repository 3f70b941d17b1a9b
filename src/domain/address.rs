/// Delivery countries and the lower-case fragments that identify them in a
/// geocoder display name. Checked in order; the first hit wins.
pub const SUPPORTED_COUNTRIES: &[(&str, &[&str])] = &[
    ("Nigeria", &["nigeria"]),
    (
        "United States",
        &["united states", "usa", "united states of america"],
    ),
    ("Canada", &["canada"]),
    ("Netherlands", &["netherlands", "holland"]),
    ("Spain", &["spain", "españa"]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAddress {
    pub country: &'static str,
    pub normalized_address: String,
    pub lat: String,
    pub lon: String,
}

/// Map a geocoder display name to a supported delivery country.
pub fn classify_country(display_name: &str) -> Option<&'static str> {
    let haystack = display_name.to_lowercase();
    SUPPORTED_COUNTRIES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| haystack.contains(n)))
        .map(|(country, _)| *country)
}
