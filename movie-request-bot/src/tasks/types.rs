use crate::models::MovieId;

// Keys of the per-user session context
pub mod session_keys {
    pub const PENDING_SELECTION: &str = "pending_selection";
    pub const OFFERED_RESULTS: &str = "offered_results";
}

pub mod states {
    pub const RESULTS_SHOWN: &str = "results_shown";
    pub const DETAILS_CONFIRM_PENDING: &str = "details_confirm_pending";
}

/// Button tokens. A selection token is the bare movie id.
pub mod tokens {
    use super::MovieId;

    pub const CONFIRM_PREFIX: &str = "add_";
    pub const CANCEL: &str = "cancel";

    pub fn selection(id: MovieId) -> String {
        id.to_string()
    }

    pub fn confirm(id: MovieId) -> String {
        format!("{CONFIRM_PREFIX}{id}")
    }

    pub fn is_selection(token: &str) -> bool {
        parse_selection(token).is_some()
    }

    pub fn parse_selection(token: &str) -> Option<MovieId> {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        token.parse().ok()
    }

    pub fn is_confirm(token: &str) -> bool {
        token.starts_with(CONFIRM_PREFIX)
    }

    pub fn parse_confirm(token: &str) -> Option<MovieId> {
        token.strip_prefix(CONFIRM_PREFIX).and_then(parse_selection)
    }

    pub fn is_cancel(token: &str) -> bool {
        token == CANCEL
    }
}

/// User-facing texts
pub mod messages {
    pub const USAGE_HINT: &str = "Please provide a movie name to search for.";
    pub const HELP: &str = "Use /search <movie name> to find a movie, pick one of the results \
                            and confirm to add it to Radarr.";
    pub const FOUND_MOVIES: &str = "Found movies:";
    pub const NO_MOVIES_FOUND: &str = "No movies found.";
    pub const DETAILS_FETCH_FAILED: &str = "Failed to fetch movie details.";
    pub const CONFIRM_PROMPT: &str = "Do you want to add this movie to Radarr?";
    pub const ADDED: &str = "Movie added to Radarr successfully.";
    pub const ADD_FAILED: &str = "Failed to add movie to Radarr.";
    pub const CANCELLED: &str = "Operation cancelled.";
    pub const SELECTION_NOT_PENDING: &str = "This selection is no longer pending.";
    pub const BUTTON_INACTIVE: &str = "This button is no longer active.";
    pub const SELECT: &str = "Select";
    pub const YES: &str = "Yes";
    pub const NO: &str = "No";
}

#[cfg(test)]
mod tests {
    use super::tokens;

    #[test]
    fn token_shapes() {
        assert_eq!(tokens::parse_selection("438631"), Some(438631));
        assert_eq!(tokens::parse_selection(""), None);
        assert_eq!(tokens::parse_selection("+42"), None);
        assert_eq!(tokens::parse_selection("add_42"), None);

        assert_eq!(tokens::confirm(42), "add_42");
        assert_eq!(tokens::parse_confirm("add_42"), Some(42));
        assert_eq!(tokens::parse_confirm("add_"), None);
        assert_eq!(tokens::parse_confirm("add_x"), None);
        assert!(tokens::is_cancel("cancel"));
        assert!(!tokens::is_selection("cancel"));
    }
}
