use std::fmt::Write as _;

use crate::records::{ActivityRecord, HotelRecord};

pub const MAX_SUMMARY_ENTRIES: usize = 10;
pub const NO_LODGING_MESSAGE: &str = "Could not find any 4 or 5-star hotels for that city.";
pub const NO_ATTRACTIONS_MESSAGE: &str =
    "Could not find any major points of interest for that city.";

pub fn summarize_lodging(hotels: &[HotelRecord]) -> String {
    if hotels.is_empty() {
        return NO_LODGING_MESSAGE.to_string();
    }

    let mut summary = String::from("🏨 Top 10 Hotels Nearby:\n");
    for hotel in hotels.iter().take(MAX_SUMMARY_ENTRIES) {
        let name = hotel.name.as_deref().unwrap_or("Unknown Hotel");
        let distance = hotel
            .distance
            .as_ref()
            .and_then(|distance| distance.value_text())
            .unwrap_or_else(|| "N/A".to_string());
        let unit = hotel
            .distance
            .as_ref()
            .and_then(|distance| distance.unit.as_deref())
            .unwrap_or("km");
        let _ = writeln!(summary, "• {name} — {distance} {unit} away");
    }

    format!("Found these top-rated hotels:\n{summary}")
}

pub fn summarize_points_of_interest(activities: &[ActivityRecord]) -> String {
    if activities.is_empty() {
        return NO_ATTRACTIONS_MESSAGE.to_string();
    }

    let mut summary = String::from("\n📍 Top 10 Tourist Attractions:\n");
    for activity in activities.iter().take(MAX_SUMMARY_ENTRIES) {
        let name = activity.name.as_deref().unwrap_or("Unknown Attraction");
        let category = activity.category.as_deref().unwrap_or("N/A");
        let _ = writeln!(summary, "• {name} ({category})");
    }

    format!("Found these popular attractions:\n{summary}")
}
