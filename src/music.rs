//! Music panel state.

use reqwest::Url;
use tracing::{instrument, warn};

const EMBED_BASE: &str = "https://www.youtube.com/embed";

/// The open music panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicPanel {
    query: String,
}

impl MusicPanel {
    /// Opens the panel for a search query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    /// Search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Embeddable search-playlist URL for the query.
    #[instrument(skip(self), fields(query = %self.query))]
    pub fn embed_url(&self) -> String {
        match Url::parse_with_params(
            EMBED_BASE,
            &[("listType", "search"), ("list", self.query.as_str())],
        ) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(error = %e, "Could not build embed URL");
                EMBED_BASE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_encoded() {
        let panel = MusicPanel::new("calm piano & rain");
        let url = panel.embed_url();
        assert!(url.starts_with("https://www.youtube.com/embed?listType=search&list="));
        assert!(url.ends_with("calm+piano+%26+rain"));
    }
}
