mod client;
mod records;
mod summary;
mod token;

use serde_json::json;
use thiserror::Error;
use tripgenie_core::GeoPoint;

pub use client::{
    default_token_url, TravelDataClient, TravelDataConfig, DEFAULT_TRAVEL_BASE_URL,
    LODGING_RADIUS, LODGING_RATINGS, POI_BOX_HALF_SIDE_DEGREES,
};
pub use records::{ActivityRecord, CityRecord, Distance, GeoCode, HotelRecord};
pub use summary::{
    summarize_lodging, summarize_points_of_interest, MAX_SUMMARY_ENTRIES, NO_ATTRACTIONS_MESSAGE,
    NO_LODGING_MESSAGE,
};
pub use token::AccessToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Failed to authenticate with the travel data provider.")]
    Authentication,
    #[error("API request failed with status {0}")]
    Status(u16),
    #[error("API request failed: {0}")]
    Transport(String),
    #[error("API response could not be decoded: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Structured `{"error": ...}` value embedded in a data payload so the
    /// response generator can explain the failure conversationally.
    pub fn to_payload(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}

/// Lookups against the travel data provider. "Not found" is `Ok(None)`;
/// `Err` carries provider failures, never panics or transport errors raised
/// past the caller.
pub trait TravelData: Send + Sync {
    async fn resolve_city_code(&self, city_name: &str) -> Result<Option<String>, ProviderError>;

    async fn resolve_city_coordinates(
        &self,
        city_name: &str,
    ) -> Result<Option<GeoPoint>, ProviderError>;

    /// Always yields payload text: a summary, the canned empty message, or an
    /// error payload.
    async fn find_lodging(&self, city_code: &str) -> String;

    async fn find_points_of_interest(&self, point: GeoPoint) -> String;
}
