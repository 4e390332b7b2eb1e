use std::fmt;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use tripgenie_core::GeoPoint;

use crate::records::{ActivityRecord, CityRecord, Envelope, HotelRecord};
use crate::summary::{summarize_lodging, summarize_points_of_interest};
use crate::token::{AccessToken, TokenCell, TokenResponse};
use crate::{ProviderError, TravelData};

pub const DEFAULT_TRAVEL_BASE_URL: &str = "https://test.api.amadeus.com";
pub const LODGING_RADIUS: u32 = 20;
pub const LODGING_RATINGS: &str = "4,5";
pub const POI_BOX_HALF_SIDE_DEGREES: f64 = 0.05;

const CITY_SEARCH_PATH: &str = "/v1/reference-data/locations/cities";
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const ACTIVITIES_BY_SQUARE_PATH: &str = "/v1/shopping/activities/by-square";

#[derive(Clone)]
pub struct TravelDataConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub token_url: String,
    pub timeout: Duration,
}

impl TravelDataConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::with_base_url(api_key, api_secret, DEFAULT_TRAVEL_BASE_URL)
    }

    /// Points every endpoint, including the token endpoint, at `base_url`.
    pub fn with_base_url(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_url: default_token_url(&base_url),
            base_url,
            timeout: Duration::from_secs(30),
        }
    }
}

pub fn default_token_url(base_url: &str) -> String {
    format!(
        "{}/v1/security/oauth2/token",
        base_url.trim_end_matches('/')
    )
}

impl fmt::Debug for TravelDataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TravelDataConfig")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub struct TravelDataClient {
    http: Client,
    config: TravelDataConfig,
    tokens: TokenCell,
}

impl TravelDataClient {
    pub fn new(config: TravelDataConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(config.timeout)
            .build()
            .map_err(|error| ProviderError::Transport(error.to_string()))?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: Client, config: TravelDataConfig) -> Self {
        Self {
            http,
            config,
            tokens: TokenCell::default(),
        }
    }

    /// The cached credential, if one has been obtained.
    pub fn token(&self) -> Option<AccessToken> {
        self.tokens.snapshot()
    }

    async fn fetch_token(&self) -> Result<String, ProviderError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.api_key.as_str()),
            ("client_secret", self.config.api_secret.as_str()),
        ];

        let response = match self
            .http
            .post(self.config.token_url.as_str())
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "travel provider token request failed");
                self.tokens.clear();
                return Err(ProviderError::Authentication);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "travel provider rejected credentials");
            self.tokens.clear();
            return Err(ProviderError::Authentication);
        }

        match response.json::<TokenResponse>().await {
            Ok(token) => Ok(self.tokens.store(token.into_token(Utc::now()))),
            Err(error) => {
                warn!(error = %error, "travel provider token response malformed");
                self.tokens.clear();
                Err(ProviderError::Authentication)
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Response, ProviderError> {
        self.http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, url = %url, "travel provider request failed");
                ProviderError::Transport(error.to_string())
            })
    }

    /// Authenticated GET. A 401 refreshes the token and retries once; the
    /// retry's outcome is final.
    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);

        let token = match self.tokens.current(Utc::now()) {
            Some(token) => token,
            None => self.fetch_token().await?,
        };

        let response = self.send(&url, query, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        info!(path = %path, "travel provider token rejected, refreshing");
        let token = self.fetch_token().await?;
        let retry = self.send(&url, query, &token).await?;
        decode(retry).await
    }

    async fn search_city(&self, keyword: String) -> Result<Option<CityRecord>, ProviderError> {
        let envelope: Envelope<CityRecord> = self
            .get_json(
                CITY_SEARCH_PATH,
                &[("keyword", keyword), ("max", "1".to_string())],
            )
            .await?;
        Ok(envelope.data.into_iter().next())
    }
}

async fn decode<T>(response: Response) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "travel provider returned an error");
        return Err(ProviderError::Status(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|error| ProviderError::Decode(error.to_string()))
}

impl TravelData for TravelDataClient {
    async fn resolve_city_code(&self, city_name: &str) -> Result<Option<String>, ProviderError> {
        let record = self.search_city(city_name.to_uppercase()).await?;
        let code = record.and_then(|city| city.iata_code);
        debug!(city = %city_name, code = ?code, "resolved city code");
        Ok(code)
    }

    async fn resolve_city_coordinates(
        &self,
        city_name: &str,
    ) -> Result<Option<GeoPoint>, ProviderError> {
        let record = self.search_city(city_name.to_string()).await?;
        let point = record.map(|city| {
            let geo = city.geo_code.unwrap_or_default();
            GeoPoint {
                latitude: geo.latitude.unwrap_or(0.0),
                longitude: geo.longitude.unwrap_or(0.0),
            }
        });
        debug!(city = %city_name, point = ?point, "resolved city coordinates");
        Ok(point)
    }

    async fn find_lodging(&self, city_code: &str) -> String {
        let query = [
            ("cityCode", city_code.to_string()),
            ("radius", LODGING_RADIUS.to_string()),
            ("ratings", LODGING_RATINGS.to_string()),
        ];

        match self
            .get_json::<Envelope<HotelRecord>>(HOTELS_BY_CITY_PATH, &query)
            .await
        {
            Ok(envelope) => summarize_lodging(&envelope.data),
            Err(error) => error.to_payload(),
        }
    }

    async fn find_points_of_interest(&self, point: GeoPoint) -> String {
        let query = [
            ("north", (point.latitude + POI_BOX_HALF_SIDE_DEGREES).to_string()),
            ("south", (point.latitude - POI_BOX_HALF_SIDE_DEGREES).to_string()),
            ("east", (point.longitude + POI_BOX_HALF_SIDE_DEGREES).to_string()),
            ("west", (point.longitude - POI_BOX_HALF_SIDE_DEGREES).to_string()),
        ];

        match self
            .get_json::<Envelope<ActivityRecord>>(ACTIVITIES_BY_SQUARE_PATH, &query)
            .await
        {
            Ok(envelope) => summarize_points_of_interest(&envelope.data),
            Err(error) => error.to_payload(),
        }
    }
}
