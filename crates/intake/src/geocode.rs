//! Reverse geocoding through Nominatim.
//!
//! Best effort only. [`ReverseGeocoder::reverse`] always produces an address
//! string, falling back to the raw coordinates.

use std::time::Duration;

use civic_core::GeocoderConfig;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

/// Nominatim reverse-geocoding client.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl ReverseGeocoder {
    pub fn new(config: GeocoderConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    /// Address for a map pin. Never fails.
    ///
    /// A response without `display_name` yields `Location: lat, lng`; any
    /// request or decoding failure yields `Coordinates: lat, lng`.
    pub async fn reverse(&self, lat: f64, lng: f64) -> String {
        match self.lookup(lat, lng).await {
            Ok(Some(name)) => name,
            Ok(None) => format!("Location: {:.6}, {:.6}", lat, lng),
            Err(e) => {
                warn!("Reverse geocoding failed for {}, {}: {}", lat, lng, e);
                coordinates_label(lat, lng)
            }
        }
    }

    async fn lookup(&self, lat: f64, lng: f64) -> Result<Option<String>, reqwest::Error> {
        let lat_param = lat.to_string();
        let lng_param = lng.to_string();
        debug!("Reverse geocoding {}, {}", lat_param, lng_param);

        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("format", "json"),
                ("lat", lat_param.as_str()),
                ("lon", lng_param.as_str()),
                ("addressdetails", "1"),
            ])
            .header(USER_AGENT, &self.config.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_response(&body))
    }
}

/// The fallback address used when the lookup fails.
pub fn coordinates_label(lat: f64, lng: f64) -> String {
    format!("Coordinates: {:.6}, {:.6}", lat, lng)
}

/// Extracts `display_name` from a Nominatim reverse response.
fn parse_response(body: &serde_json::Value) -> Option<String> {
    body.get("display_name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_name() {
        let body = serde_json::json!({
            "place_id": 1,
            "display_name": "Main Road, Ranchi, Jharkhand, India",
            "address": { "city": "Ranchi" }
        });
        assert_eq!(
            parse_response(&body).as_deref(),
            Some("Main Road, Ranchi, Jharkhand, India")
        );
    }

    #[test]
    fn missing_display_name() {
        assert!(parse_response(&serde_json::json!({ "error": "Unable to geocode" })).is_none());
        assert!(parse_response(&serde_json::json!({ "display_name": "" })).is_none());
    }

    #[test]
    fn coordinates_label_uses_six_decimals() {
        assert_eq!(coordinates_label(23.3441, 85.3096), "Coordinates: 23.344100, 85.309600");
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_coordinates() {
        let geocoder = ReverseGeocoder::new(GeocoderConfig {
            endpoint: "http://127.0.0.1:9/reverse".to_string(),
            timeout_secs: 1,
            ..Default::default()
        });
        assert_eq!(geocoder.reverse(1.5, -2.25).await, "Coordinates: 1.500000, -2.250000");
    }
}
