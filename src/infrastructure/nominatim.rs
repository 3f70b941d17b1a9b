use reqwest::blocking::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::NominatimConfig;
use crate::domain::address::GeocodeMatch;
use crate::domain::errors::GatewayError;
use crate::domain::ports::Geocoder;

#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

/// Free-text search against a Nominatim instance. Only the best match is
/// requested.
pub struct NominatimClient {
    http: Client,
    search_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(config: &NominatimConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Geocoder for NominatimClient {
    fn search(&self, address: &str) -> Result<Vec<GeocodeMatch>, GatewayError> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("format", "json"), ("limit", "1"), ("q", address)])
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT_LANGUAGE, "en")
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        let places: Vec<Place> = response
            .json()
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;
        Ok(places
            .into_iter()
            .map(|p| GeocodeMatch {
                display_name: p.display_name,
                lat: p.lat,
                lon: p.lon,
            })
            .collect())
    }
}
