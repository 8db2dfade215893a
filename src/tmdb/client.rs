use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{Error, Res, types::ApiErrorBody};

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";

/// Prefix of poster image URLs; TMDB returns only the path.
pub const POSTER_BASE_URL: &str = "https://www.themoviedb.org/t/p/w600_and_h900_bestv2";

/// HTTP client for the TMDB v3 API.
///
/// Cheap to clone: the underlying [`reqwest::Client`] shares its pool.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Creates a client against the public TMDB v3 API.
    ///
    /// # Arguments
    ///
    /// * `api_key` - TMDB v3 API key, sent as the `api_key` query parameter
    ///
    /// # Example
    ///
    /// ```
    /// let tmdb = TmdbClient::new(&config.tmdb.api_key);
    /// let movies = tmdb.search_movies("Stalker").await?;
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    /// Creates a client against another API root, e.g. a local mock server.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a GET to `path` and decodes the JSON body.
    ///
    /// Non-2xx answers become [`Error::Api`] carrying the status and the
    /// `status_message` TMDB puts in its error bodies.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Res<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?params, "GET");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str::<T>(&body).map_err(|e| Error::UnexpectedResponse {
            url,
            reason: e.to_string(),
        })
    }
}

fn api_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    tracing::warn!(status = status.as_u16(), %message, "TMDB request failed");
    Error::Api {
        status: status.as_u16(),
        message,
    }
}

/// Full URL of a poster given the `poster_path` of a details answer.
pub fn poster_url(poster_path: &str) -> String {
    format!("{}{}", POSTER_BASE_URL, poster_path)
}
