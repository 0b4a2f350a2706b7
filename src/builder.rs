use std::time::Duration;

use crate::prelude::*;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3/playlistItems";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct PlaylistBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_results: Option<u32>,
}

impl PlaylistBuilder {
    /// creates a new builder bound to the given api key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            max_results: None,
        }
    }

    /// overrides the listing endpoint, mostly useful for tests.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// sets the timeout applied to every listing request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// forces an explicit page size instead of the endpoint default.
    pub fn max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    /// builds a [`PlaylistClient`] using the configured options.
    pub fn build(&self) -> Result<PlaylistClient> {
        PlaylistClient::new(
            &self.base_url,
            self.api_key.clone(),
            self.timeout,
            self.max_results,
        )
    }
}
