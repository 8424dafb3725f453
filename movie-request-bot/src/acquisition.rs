use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::models::{MovieDetails, MovieId};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("invalid movie details: {0}")]
    InvalidDetails(String),

    #[error("radarr request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("radarr rejected the movie with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Hands a confirmed movie to the download manager
#[async_trait]
pub trait MediaAcquisition: Send + Sync {
    /// Submit once; no retries.
    async fn submit(&self, details: &MovieDetails) -> Result<(), AcquisitionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptions {
    pub search_for_movie: bool,
}

/// Body of `POST /api/v3/movie`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMoviePayload {
    pub title: String,
    pub title_slug: String,
    pub tmdb_id: MovieId,
    pub year: u16,
    pub root_folder_path: String,
    pub quality_profile_id: u32,
    pub monitored: bool,
    pub add_options: AddOptions,
}

impl AddMoviePayload {
    pub fn from_details(
        details: &MovieDetails,
        root_folder_path: &str,
        quality_profile_id: u32,
    ) -> Result<Self, AcquisitionError> {
        let title = details.title.trim();
        if title.is_empty() {
            return Err(AcquisitionError::InvalidDetails(format!(
                "movie {} has no title",
                details.id
            )));
        }
        let year = details.release_year().ok_or_else(|| {
            AcquisitionError::InvalidDetails(format!(
                "movie {} has no usable release date ({:?})",
                details.id, details.release_date
            ))
        })?;

        Ok(Self {
            title: title.to_string(),
            title_slug: slugify(title),
            tmdb_id: details.id,
            year,
            root_folder_path: root_folder_path.to_string(),
            quality_profile_id,
            monitored: true,
            add_options: AddOptions {
                search_for_movie: true,
            },
        })
    }
}

/// Lowercase, spaces become hyphens
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Radarr v3 client
pub struct RadarrClient {
    client: Client,
    api_key: String,
    base_url: String,
    root_folder_path: String,
    quality_profile_id: u32,
}

impl RadarrClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        root_folder_path: impl Into<String>,
        quality_profile_id: u32,
    ) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            root_folder_path: root_folder_path.into(),
            quality_profile_id,
        })
    }
}

#[async_trait]
impl MediaAcquisition for RadarrClient {
    async fn submit(&self, details: &MovieDetails) -> Result<(), AcquisitionError> {
        let payload = AddMoviePayload::from_details(
            details,
            &self.root_folder_path,
            self.quality_profile_id,
        )?;

        let response = self
            .client
            .post(format!("{}/api/v3/movie", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(movie_id = details.id, %status, "Radarr rejected movie: {}", body);
            return Err(AcquisitionError::Rejected { status, body });
        }

        info!(movie_id = details.id, title = %payload.title, "Movie added to Radarr");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dune() -> MovieDetails {
        MovieDetails {
            id: 438631,
            title: "Dune".to_string(),
            release_date: "2021-10-21".to_string(),
            overview: "Paul Atreides, a brilliant and gifted young man...".to_string(),
            poster_url: None,
        }
    }

    #[test]
    fn dune_payload() {
        let payload = AddMoviePayload::from_details(&dune(), "/external-media/movies", 4).unwrap();

        assert_eq!(payload.title_slug, "dune");
        assert_eq!(payload.year, 2021);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "title": "Dune",
                "titleSlug": "dune",
                "tmdbId": 438631,
                "year": 2021,
                "rootFolderPath": "/external-media/movies",
                "qualityProfileId": 4,
                "monitored": true,
                "addOptions": { "searchForMovie": true }
            })
        );
    }

    #[test]
    fn slug_replaces_spaces_and_lowercases() {
        assert_eq!(slugify("The Empire Strikes Back"), "the-empire-strikes-back");
        assert_eq!(slugify("Blade Runner 2049"), "blade-runner-2049");
    }

    #[test]
    fn refuses_missing_year() {
        let mut movie = dune();
        movie.release_date = String::new();
        assert!(matches!(
            AddMoviePayload::from_details(&movie, "/m", 4),
            Err(AcquisitionError::InvalidDetails(_))
        ));

        movie.release_date = "TBA".to_string();
        assert!(matches!(
            AddMoviePayload::from_details(&movie, "/m", 4),
            Err(AcquisitionError::InvalidDetails(_))
        ));
    }

    #[test]
    fn refuses_blank_title() {
        let mut movie = dune();
        movie.title = " ".to_string();
        assert!(matches!(
            AddMoviePayload::from_details(&movie, "/m", 4),
            Err(AcquisitionError::InvalidDetails(_))
        ));
    }

    #[tokio::test]
    async fn invalid_details_fail_before_any_request() {
        // nothing listens on the discard port; a request would surface as Http
        let client = RadarrClient::new("key", "http://127.0.0.1:9", "/m", 4).unwrap();
        let mut movie = dune();
        movie.release_date = String::new();

        let err = client.submit(&movie).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::InvalidDetails(_)));
    }
}
