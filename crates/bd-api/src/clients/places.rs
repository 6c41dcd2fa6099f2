//! Places-search client for donation-center discovery
//!
//! Wraps the Foursquare places API. Both lookups retry once with a plain
//! "hospital" keyword query when the category search fails.

use crate::error::ApiError;
use tracing::warn;

const BASE_URL: &str = "https://api.foursquare.com/v3/places";

/// Foursquare category id for hospitals.
const HOSPITAL_CATEGORY: &str = "15000";

const SEARCH_RADIUS_M: &str = "10000";
const SEARCH_LIMIT: &str = "50";

pub struct PlacesClient {
    http: reqwest::Client,
    api_key: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    /// Hospitals near a coordinate, closest first.
    pub async fn nearby(&self, lat: f64, lng: f64) -> Result<Vec<serde_json::Value>, ApiError> {
        let ll = format!("{},{}", lat, lng);
        let primary = self
            .search(&[
                ("ll", ll.as_str()),
                ("categories", HOSPITAL_CATEGORY),
                ("radius", SEARCH_RADIUS_M),
                ("limit", SEARCH_LIMIT),
                ("sort", "DISTANCE"),
            ])
            .await;

        match primary {
            Ok(results) => Ok(results),
            Err(err) => {
                warn!("Places category search failed, retrying with keyword: {}", err);
                self.search(&[
                    ("ll", ll.as_str()),
                    ("query", "hospital"),
                    ("radius", SEARCH_RADIUS_M),
                    ("limit", SEARCH_LIMIT),
                ])
                .await
                .map_err(|e| ApiError::Upstream(format!("Places search failed: {}", e)))
            }
        }
    }

    /// Hospitals near a free-form place name, most relevant first.
    pub async fn search_near(&self, place: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        let primary = self
            .search(&[
                ("near", place),
                ("categories", HOSPITAL_CATEGORY),
                ("radius", SEARCH_RADIUS_M),
                ("limit", SEARCH_LIMIT),
                ("sort", "RELEVANCE"),
            ])
            .await;

        match primary {
            Ok(results) => Ok(results),
            Err(err) => {
                warn!("Places search failed, retrying with keyword: {}", err);
                self.search(&[("near", place), ("query", "hospital"), ("limit", SEARCH_LIMIT)])
                    .await
                    .map_err(|e| ApiError::Upstream(format!("Places search failed: {}", e)))
            }
        }
    }

    async fn search(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Vec<serde_json::Value>, reqwest::Error> {
        let response: serde_json::Value = self
            .http
            .get(format!("{}/search", BASE_URL))
            .header("Accept", "application/json")
            .header("Authorization", &self.api_key)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response["results"].as_array().cloned().unwrap_or_default())
    }
}
