//! TMDB catalog lookups.
//!
//! Failures never reach the user as errors: a failed search is an empty result
//! list and a failed details fetch is "not found". The cause is logged.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::models::{MovieDetails, MovieId, MovieSummary, year_prefix};

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(StatusCode),

    #[error("movie {0} is missing required fields")]
    Incomplete(MovieId),
}

/// Search and lookup against the movie catalog
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Movies matching `query`, in the order the catalog ranks them. Empty on error.
    async fn search_titles(&self, query: &str) -> Vec<MovieSummary>;

    /// Details of one movie, or `None` when it is unknown or the lookup failed.
    async fn fetch_details(&self, id: MovieId) -> Option<MovieDetails>;
}

/// TMDB v3 client
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    async fn try_search(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/search/movie", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let body: TmdbSearchResponse = response.json().await?;
        Ok(body.into_summaries())
    }

    async fn try_fetch(&self, id: MovieId) -> Result<Option<MovieDetails>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/movie/{}", self.base_url, id))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(CatalogError::Status(status)),
            _ => {}
        }

        let body: TmdbMovieDetails = response.json().await?;
        body.into_details().map(Some).ok_or(CatalogError::Incomplete(id))
    }
}

#[async_trait]
impl CatalogLookup for TmdbClient {
    async fn search_titles(&self, query: &str) -> Vec<MovieSummary> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        debug!(query = %query, "Searching TMDB movies");
        match self.try_search(query).await {
            Ok(results) => results,
            Err(e) => {
                error!(query = %query, "Error fetching search results from TMDB: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_details(&self, id: MovieId) -> Option<MovieDetails> {
        debug!(movie_id = id, "Fetching TMDB movie details");
        match self.try_fetch(id).await {
            Ok(Some(details)) => Some(details),
            Ok(None) => {
                warn!(movie_id = id, "TMDB has no movie with this id");
                None
            }
            Err(e) => {
                error!(movie_id = id, "Error fetching movie details from TMDB: {}", e);
                None
            }
        }
    }
}

pub fn poster_url(poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{TMDB_IMAGE_BASE}{p}"))
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResult {
    id: MovieId,
    title: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: Option<MovieId>,
    title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
}

impl TmdbSearchResponse {
    fn into_summaries(self) -> Vec<MovieSummary> {
        self.results
            .into_iter()
            .map(|r| MovieSummary {
                id: r.id,
                title: r.title.unwrap_or_default(),
                release_year: r
                    .release_date
                    .as_deref()
                    .and_then(year_prefix)
                    .unwrap_or_default()
                    .to_string(),
                poster_url: poster_url(r.poster_path.as_deref()),
            })
            .collect()
    }
}

impl TmdbMovieDetails {
    fn into_details(self) -> Option<MovieDetails> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(MovieDetails {
            id: self.id?,
            title,
            release_date: self.release_date.unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            poster_url: poster_url(self.poster_path.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_keeps_order_and_tolerates_gaps() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 438631, "title": "Dune", "release_date": "2021-10-21",
                 "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"},
                {"id": 841, "title": "Dune", "release_date": "1984-12-14", "poster_path": null},
                {"id": 1, "title": "Dune: Untitled", "release_date": ""}
            ],
            "total_results": 3
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(body).unwrap();
        let summaries = response.into_summaries();

        assert_eq!(
            summaries.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![438631, 841, 1]
        );
        assert_eq!(summaries[0].release_year, "2021");
        assert_eq!(
            summaries[0].poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
        );
        assert_eq!(summaries[1].poster_url, None);
        assert_eq!(summaries[2].release_year, "");
    }

    #[test]
    fn missing_results_is_empty() {
        let response: TmdbSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_summaries().is_empty());
    }

    #[test]
    fn details_require_id_and_title() {
        let full: TmdbMovieDetails = serde_json::from_str(
            r#"{"id": 438631, "title": "Dune", "release_date": "2021-10-21",
                "overview": "Paul Atreides...", "poster_path": "/p.jpg", "runtime": 155}"#,
        )
        .unwrap();
        let details = full.into_details().unwrap();
        assert_eq!(details.title, "Dune");
        assert_eq!(details.release_year(), Some(2021));

        let untitled: TmdbMovieDetails =
            serde_json::from_str(r#"{"id": 5, "title": "  "}"#).unwrap();
        assert!(untitled.into_details().is_none());

        let no_id: TmdbMovieDetails = serde_json::from_str(r#"{"title": "Dune"}"#).unwrap();
        assert!(no_id.into_details().is_none());
    }
}
