use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog identifier of a movie (TMDB id)
pub type MovieId = u64;

/// One entry of a title search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    /// Four digit year, or empty when the catalog has no release date
    pub release_year: String,
    pub poster_url: Option<String>,
}

/// Full record of a movie the user picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    /// `YYYY-MM-DD` as reported by the catalog, possibly empty
    pub release_date: String,
    pub overview: String,
    pub poster_url: Option<String>,
}

impl MovieDetails {
    /// The year part of the release date, if the date starts with four digits
    pub fn release_year(&self) -> Option<u16> {
        year_prefix(&self.release_date).and_then(|y| y.parse().ok())
    }
}

/// Movie waiting for the user's yes/no
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSelection {
    pub movie: MovieDetails,
    pub selected_at: DateTime<Utc>,
}

impl PendingSelection {
    pub fn new(movie: MovieDetails) -> Self {
        Self {
            movie,
            selected_at: Utc::now(),
        }
    }
}

/// First four characters of a date-like string when they are all ASCII digits
pub fn year_prefix(date: &str) -> Option<&str> {
    let year = date.get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_prefix_requires_four_digits() {
        assert_eq!(year_prefix("2021-10-21"), Some("2021"));
        assert_eq!(year_prefix("1999"), Some("1999"));
        assert_eq!(year_prefix(""), None);
        assert_eq!(year_prefix("20"), None);
        assert_eq!(year_prefix("n/a-2021"), None);
    }
}
