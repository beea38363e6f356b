use crate::domain::model::{FacilityRecord, Resolution};

pub const NOT_FOUND: &str = "Sorry, we do not have information on that service.";
pub const NO_CANDIDATE_NOTICE: &str = "No matching service found. Please check your spelling.";

/// Formats matching centers as a plain-text listing.
pub fn render_listing(matches: &[&FacilityRecord]) -> String {
    if matches.is_empty() {
        return NOT_FOUND.to_string();
    }

    let mut out = String::from("Available Centers:\n");
    out.push_str("\nNote: All prices listed are fictitious estimates.\n");
    for center in matches {
        out.push_str(&format!("\nCenter: {}\n", center.name));
        out.push_str(&format!("  Address: {}\n", center.address));
        out.push_str(&format!("  Phone: {}\n", center.phone));
        out.push_str(&format!("  Hours: {}\n", center.hours));
        out.push_str(&format!("  Rating: {}\n", center.rating));
        out.push_str(&format!("  Fees: ${}\n", center.fee));
    }
    out
}

pub fn correction_notice(suggested_tag: &str) -> String {
    format!(
        "Did you mean '{}'? Showing results for '{}'.",
        suggested_tag, suggested_tag
    )
}

/// Notice to show above the listing, if the resolution warrants one.
pub fn resolution_notice(resolution: &Resolution<'_>) -> Option<String> {
    match resolution {
        Resolution::ExactOrSubstring { .. } => None,
        Resolution::Corrected { suggested_tag, .. } => Some(correction_notice(suggested_tag)),
        Resolution::NoMatch => Some(NO_CANDIDATE_NOTICE.to_string()),
    }
}
