//! Country-name to ISO 3166-1 alpha-3 mapping for country headings.
//!
//! International schedules group holdings under headings like `Canada—6.5%`
//! or `China–28.8%`. The heading matcher tolerates all three dash styles and
//! headings whose spaces were lost during text extraction
//! (`UnitedKingdom—15.7%`). Unresolved headings yield `None`, never a guess.

use std::collections::BTreeMap;

/// Built-in country names as they appear in schedule headings.
pub static COUNTRY_TO_ISO3: &[(&str, &str)] = &[
    ("Argentina", "ARG"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Bahrain", "BHR"),
    ("Bangladesh", "BGD"),
    ("Belgium", "BEL"),
    ("Brazil", "BRA"),
    ("Canada", "CAN"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Colombia", "COL"),
    ("Czech Republic", "CZE"),
    ("Denmark", "DNK"),
    ("Egypt", "EGY"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Germany", "DEU"),
    ("Greece", "GRC"),
    ("Hong Kong", "HKG"),
    ("Hungary", "HUN"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Ireland", "IRL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Japan", "JPN"),
    ("Kenya", "KEN"),
    ("Kuwait", "KWT"),
    ("Malaysia", "MYS"),
    ("Mexico", "MEX"),
    ("Morocco", "MAR"),
    ("Netherlands", "NLD"),
    ("New Zealand", "NZL"),
    ("Nigeria", "NGA"),
    ("Norway", "NOR"),
    ("Pakistan", "PAK"),
    ("Peru", "PER"),
    ("Philippines", "PHL"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Qatar", "QAT"),
    ("Romania", "ROU"),
    ("Russia", "RUS"),
    ("Saudi Arabia", "SAU"),
    ("Singapore", "SGP"),
    ("Slovenia", "SVN"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Taiwan", "TWN"),
    ("Thailand", "THA"),
    ("Turkey", "TUR"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom", "GBR"),
    ("United States", "USA"),
    ("Uruguay", "URY"),
    ("Vietnam", "VNM"),
];

/// Look up the ISO3 code for an exact country name.
pub fn iso3_for_country(name: &str) -> Option<&'static str> {
    let needle = fold(name);
    COUNTRY_TO_ISO3
        .iter()
        .find(|(country, _)| fold(country) == needle)
        .map(|(_, iso)| *iso)
}

/// Whether `code` is one of the known ISO3 codes.
pub fn is_known_iso3(code: &str) -> bool {
    COUNTRY_TO_ISO3.iter().any(|(_, iso)| *iso == code)
}

/// Map a heading like `Canada—6.5%` or `UnitedKingdom—15.7%` to an ISO3 code.
///
/// A country matches when its name appears in the heading immediately
/// followed by a dash (`-`, `–` or `—`), comparing case- and
/// whitespace-insensitively. Entries in `extra` (from a layout config) are
/// consulted before the built-in table, so a config can override a mapping.
pub fn country_heading_to_iso3(heading: &str, extra: &BTreeMap<String, String>) -> Option<String> {
    let folded = fold(heading);

    for (name, iso) in extra {
        if name_precedes_dash(&folded, name) {
            return Some(iso.clone());
        }
    }
    for (name, iso) in COUNTRY_TO_ISO3 {
        if name_precedes_dash(&folded, name) {
            return Some((*iso).to_string());
        }
    }
    None
}

/// Lowercase and strip all whitespace.
fn fold(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn name_precedes_dash(folded_heading: &str, name: &str) -> bool {
    let needle = fold(name);
    if needle.is_empty() {
        return false;
    }
    let mut search = folded_heading;
    while let Some(pos) = search.find(&needle) {
        let rest = &search[pos + needle.len()..];
        if matches!(rest.chars().next(), Some('-' | '–' | '—')) {
            return true;
        }
        search = &search[pos + needle.len()..];
        if search.is_empty() {
            break;
        }
    }
    false
}
