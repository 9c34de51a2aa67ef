//! Place-name resolution for reverse-geocoded coordinates.
//!
//! Reverse geocoders return several candidate places for one coordinate pair,
//! usually ordered from "what the provider thinks" rather than "what a person
//! standing there would call it". The functions here pick the most specific
//! human-readable `(name, country)` pair out of those candidates.
//!
//! Two payload shapes are supported:
//! - OpenWeatherMap Geo: a flat list of [`GeocodeCandidate`]s
//! - Google Geocoding: a list of [`AddressResult`]s made of typed components,
//!   in either the v4 (`addressComponents`/`longText`) or the legacy
//!   (`address_components`/`long_name`) field naming
//!
//! Everything in this module is pure and synchronous.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// City names that cover a large area and say little about where the fix is.
const GENERIC_CITY_NAMES: [&str; 5] = ["epworth", "harare", "chitungwiza", "norton", "ruwa"];

/// Substrings of a localized name that mark a neighbourhood-level place.
const SPECIFIC_AREA_KEYWORDS: [&str; 6] = ["park", "estate", "suburb", "district", "ward", "damofalls"];

/// Substrings of a formatted address that mark a neighbourhood-level place.
const ADDRESS_AREA_KEYWORDS: [&str; 10] = [
    "park",
    "estate",
    "suburb",
    "gardens",
    "hills",
    "damofalls",
    "grove",
    "heights",
    "ridge",
    "meadows",
];

/// Address component types, most specific first.
const TYPE_PREFERENCE: [&str; 9] = [
    "sublocality_level_1",
    "sublocality_level_2",
    "sublocality_level_3",
    "sublocality",
    "neighborhood",
    "colloquial_area",
    "locality",
    "administrative_area_level_2",
    "administrative_area_level_1",
];

const ADDRESS_KEYWORD_BONUS: u32 = 15;
const UNKNOWN_COUNTRY: &str = "Unknown";

/// The place name chosen for a coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub country: String,
}

/// One entry of an OpenWeatherMap reverse-geocoding response.
///
/// Missing fields deserialize as empty so a sparse entry never fails the
/// whole payload; the selection rules simply pass over it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    #[serde(default)]
    pub name: String,
    /// ISO 3166 country code, copied through unchecked
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Language code -> localized name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_names: Option<HashMap<String, String>>,
}

impl GeocodeCandidate {
    fn english_name(&self) -> Option<&str> {
        self.local_names
            .as_ref()
            .and_then(|names| names.get("en"))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    fn has_specific_local_name(&self) -> bool {
        self.english_name().is_some_and(|local| {
            let local = local.to_lowercase();
            SPECIFIC_AREA_KEYWORDS
                .iter()
                .any(|keyword| local.contains(keyword))
        })
    }

    fn has_state(&self) -> bool {
        self.state.as_deref().is_some_and(|s| !s.is_empty())
    }

    fn has_non_generic_name(&self) -> bool {
        !self.name.is_empty() && !is_generic_city(&self.name)
    }

    /// Localized English name when it says something `name` does not.
    fn display_name(&self) -> &str {
        match self.english_name() {
            Some(local) if local.to_lowercase() != self.name.to_lowercase() => local,
            _ => &self.name,
        }
    }
}

fn is_generic_city(name: &str) -> bool {
    let name = name.to_lowercase();
    GENERIC_CITY_NAMES.contains(&name.as_str())
}

/// One typed piece of a Google address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default, alias = "longText", skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    #[serde(default, alias = "shortText", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Position in [`TYPE_PREFERENCE`] of the most specific tag this component carries.
    fn preference_rank(&self) -> Option<usize> {
        TYPE_PREFERENCE.iter().position(|tag| self.has_type(tag))
    }

    fn best_name(&self) -> Option<&str> {
        non_empty(self.long_name.as_deref()).or_else(|| non_empty(self.short_name.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Precision of a Google geocoding result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Rooftop,
    RangeInterpolated,
    GeometricCenter,
    Approximate,
    #[serde(other)]
    Unspecified,
}

impl Granularity {
    fn bonus(self) -> u32 {
        match self {
            Self::Rooftop => 5,
            Self::RangeInterpolated => 3,
            Self::GeometricCenter => 2,
            Self::Approximate => 1,
            Self::Unspecified => 0,
        }
    }
}

/// One Google reverse-geocoding result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressResult {
    #[serde(default, alias = "addressComponents")]
    pub address_components: Vec<AddressComponent>,
    #[serde(default, alias = "formattedAddress", skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
}

impl AddressResult {
    /// Specificity score and the `(name, country)` it would yield.
    fn score(&self) -> (u32, Option<&str>, &str) {
        let mut best_rank: Option<usize> = None;
        let mut name = None;

        for component in &self.address_components {
            let Some(rank) = component.preference_rank() else {
                continue;
            };
            if best_rank.map_or(true, |best| rank < best) {
                best_rank = Some(rank);
                name = component.best_name();
            }
        }

        let mut specificity = best_rank.map_or(0, |rank| (TYPE_PREFERENCE.len() - rank) as u32);

        let country = self
            .address_components
            .iter()
            .find(|c| c.has_type("country"))
            .and_then(|c| non_empty(c.short_name.as_deref()))
            .unwrap_or(UNKNOWN_COUNTRY);

        if let Some(address) = &self.formatted_address {
            let address = address.to_lowercase();
            if ADDRESS_AREA_KEYWORDS
                .iter()
                .any(|keyword| address.contains(keyword))
            {
                specificity += ADDRESS_KEYWORD_BONUS;
            }
        }

        if let Some(granularity) = self.granularity {
            specificity += granularity.bonus();
        }

        (specificity, name, country)
    }
}

/// Raw reverse-geocoding results from either provider.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeInput {
    Candidates(Vec<GeocodeCandidate>),
    AddressResults(Vec<AddressResult>),
}

impl GeocodeInput {
    /// Pick the best place name using the rules for this payload's provider.
    pub fn resolve(&self) -> Option<ResolvedLocation> {
        match self {
            Self::Candidates(candidates) => resolve_from_candidates(candidates),
            Self::AddressResults(results) => resolve_from_address_components(results),
        }
    }
}

/// Choose a place name from an OpenWeatherMap candidate list.
///
/// Tiers, each scanning the whole list in order and taking the first hit:
/// 1. English local name mentioning a neighbourhood keyword ("park", "estate", ...)
/// 2. Has a state and a name that is not a generic city
/// 3. Has a name that is not a generic city
/// 4. The first candidate
///
/// Returns `None` for an empty list or when the chosen candidate's derived
/// name is empty, even if it has a country.
pub fn resolve_from_candidates(candidates: &[GeocodeCandidate]) -> Option<ResolvedLocation> {
    let chosen = candidates
        .iter()
        .find(|c| c.has_specific_local_name())
        .or_else(|| candidates.iter().find(|c| c.has_state() && c.has_non_generic_name()))
        .or_else(|| candidates.iter().find(|c| c.has_non_generic_name()))
        .or_else(|| candidates.first())?;

    let name = chosen.display_name();
    if name.is_empty() {
        return None;
    }

    Some(ResolvedLocation {
        name: name.to_string(),
        country: chosen.country.clone(),
    })
}

/// Choose a place name from Google address results.
///
/// Every result is scored: the most specific component type it contains
/// (sublocality beats locality beats admin area), +15 when the formatted
/// address mentions a neighbourhood keyword, and a small bonus for precise
/// granularity. The first highest-scoring result with a name wins.
pub fn resolve_from_address_components(results: &[AddressResult]) -> Option<ResolvedLocation> {
    let mut best: Option<(u32, ResolvedLocation)> = None;

    for result in results {
        let (score, name, country) = result.score();
        let Some(name) = name else {
            continue;
        };

        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((
                score,
                ResolvedLocation {
                    name: name.to_string(),
                    country: country.to_string(),
                },
            ));
        }
    }

    best.map(|(_, location)| location)
}
