//! Annif REST client.
//!
//! Only the `suggest` endpoint is used: the document text is posted as a form
//! along with the `limit` and `threshold` parameters, and the response holds a ranked list of suggestions.
use log::debug;
use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_URL: &str = "http://localhost:5000";

/// A single class suggestion.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub score: f64,
    #[serde(default)]
    pub notation: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    results: Vec<Suggestion>,
}

/// Parse the body of a `suggest` response.
pub fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, Error> {
    let response: SuggestResponse = serde_json::from_str(body)?;
    Ok(response.results)
}

/// Something that suggests classes for a text.
pub trait Suggest {
    fn suggest(&self, text: &str) -> Result<Vec<Suggestion>, Error>;

    /// Get suggested labels only, best first.
    fn suggest_labels(&self, text: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .suggest(text)?
            .into_iter()
            .map(|s| s.label)
            .collect())
    }
}

/// Blocking client for one Annif project.
pub struct AnnifClient {
    client: reqwest::blocking::Client,
    suggest_url: reqwest::Url,
    limit: usize,
    threshold: f64,
}

impl AnnifClient {
    pub fn new(base_url: &str, project: &str, limit: usize, threshold: f64) -> Result<Self, Error> {
        let suggest_url = format!(
            "{}/v1/projects/{}/suggest",
            base_url.trim_end_matches('/'),
            project
        );
        let suggest_url = reqwest::Url::parse(&suggest_url)
            .map_err(|e| Error::Config(format!("invalid Annif url {}: {}", suggest_url, e)))?;

        Ok(Self {
            client: reqwest::blocking::Client::new(),
            suggest_url,
            limit,
            threshold,
        })
    }

    pub fn suggest_url(&self) -> &reqwest::Url {
        &self.suggest_url
    }
}

impl Suggest for AnnifClient {
    fn suggest(&self, text: &str) -> Result<Vec<Suggestion>, Error> {
        let limit = self.limit.to_string();
        let threshold = self.threshold.to_string();
        let params = [
            ("text", text),
            ("limit", limit.as_str()),
            ("threshold", threshold.as_str()),
        ];

        let body = self
            .client
            .post(self.suggest_url.clone())
            .form(&params)
            .send()?
            .error_for_status()?
            .text()?;
        debug!("{}", body);

        parse_suggestions(&body)
    }
}
