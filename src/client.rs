use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::{PlaylistError, Result};

/// one decoded page of the `playlistItems` listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistPage {
    /// cursor for the next page; empty or absent on the last page.
    #[serde(default)]
    next_page_token: String,
    #[serde(default)]
    items: Vec<PlaylistItem>,
    #[serde(default)]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    video_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    results_per_page: u64,
}

pub struct PlaylistClient {
    base_url: Url,
    api_key: String,
    max_results: Option<u32>,
    client: ReqwestClient,
}

impl PlaylistClient {
    /// creates a listing client for `base_url`.
    ///
    /// every request issued by this client is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: Duration,
        max_results: Option<u32>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|_| PlaylistError::BaseUrl {
            url: base_url.to_string(),
        })?;

        let client = ReqwestClient::builder()
            .timeout(timeout)
            .default_headers(Self::headers())
            .build()
            .map_err(PlaylistError::BuildClient)?;

        Ok(Self {
            base_url,
            api_key,
            max_results,
            client,
        })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("plget/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    /// builds the url of a single listing request.
    ///
    /// `pageToken` is left out entirely while the cursor is empty.
    fn page_url(&self, playlist_id: &str, page_token: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "contentDetails")
                .append_pair("playlistId", playlist_id)
                .append_pair("key", &self.api_key);

            if !page_token.is_empty() {
                query.append_pair("pageToken", page_token);
            }

            if let Some(max_results) = self.max_results {
                query.append_pair("maxResults", &max_results.to_string());
            }
        }
        url
    }

    async fn ensure_success(
        response: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read error body>".to_string());

        Err(PlaylistError::HttpStatus {
            context: context.to_string(),
            status,
            body,
        })
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        page_token: &str,
        page: usize,
    ) -> Result<PlaylistPage> {
        let resp = self
            .client
            .get(self.page_url(playlist_id, page_token))
            .send()
            .await
            .map_err(|source| PlaylistError::Request {
                context: format!("requesting playlist page {page}"),
                source,
            })?;

        let resp = Self::ensure_success(resp, &format!("playlist page {page}")).await?;

        let text = resp
            .text()
            .await
            .map_err(|source| PlaylistError::ResponseBody {
                context: format!("reading playlist page {page}"),
                source,
            })?;

        serde_json::from_str(&text).map_err(|source| PlaylistError::Json {
            context: format!("parsing playlist page {page} json"),
            source,
        })
    }

    /// collects every video id of a playlist, in playlist order.
    ///
    /// pages are requested one after another until the listing returns an
    /// empty `nextPageToken`. any failure discards the ids gathered so far.
    pub async fn enumerate(&self, playlist_id: &str) -> Result<Vec<String>> {
        let mut video_ids = Vec::new();
        let mut page_token = String::new();
        let mut page = 1;

        loop {
            let parsed = self.fetch_page(playlist_id, &page_token, page).await?;
            let count = parsed.items.len();

            video_ids.extend(
                parsed
                    .items
                    .into_iter()
                    .map(|item| item.content_details.video_id),
            );

            debug!(
                page,
                items = count,
                collected = video_ids.len(),
                total_results = parsed.page_info.total_results,
                results_per_page = parsed.page_info.results_per_page,
                "fetched playlist page"
            );

            if parsed.next_page_token.is_empty() {
                break;
            }

            page_token = parsed.next_page_token;
            page += 1;
        }

        info!(playlist_id, videos = video_ids.len(), pages = page, "playlist enumerated");
        Ok(video_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(max_results: Option<u32>) -> PlaylistClient {
        PlaylistClient::new(
            "https://example.com/youtube/v3/playlistItems",
            "secret".to_string(),
            Duration::from_secs(5),
            max_results,
        )
        .expect("client should build")
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn page_url_omits_empty_page_token() {
        let url = client(None).page_url("PL123", "");
        assert_eq!(
            query(&url),
            vec![
                ("part".to_string(), "contentDetails".to_string()),
                ("playlistId".to_string(), "PL123".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn page_url_carries_cursor_and_page_size() {
        let url = client(Some(50)).page_url("PL123", "T2");
        let pairs = query(&url);
        assert!(pairs.contains(&("pageToken".to_string(), "T2".to_string())));
        assert!(pairs.contains(&("maxResults".to_string(), "50".to_string())));
        assert_eq!(url.path(), "/youtube/v3/playlistItems");
    }

    #[test]
    fn page_decodes_missing_token_as_last_page() {
        let page: PlaylistPage = serde_json::from_str(
            r#"{
                "items": [{"contentDetails": {"videoId": "a"}}],
                "pageInfo": {"totalResults": 1, "resultsPerPage": 5}
            }"#,
        )
        .expect("page should decode");
        assert!(page.next_page_token.is_empty());
        assert_eq!(page.items[0].content_details.video_id, "a");
        assert_eq!(page.page_info.total_results, 1);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = PlaylistClient::new("not a url", String::new(), Duration::from_secs(1), None)
            .err()
            .expect("invalid base url should error");
        assert!(matches!(err, PlaylistError::BaseUrl { .. }));
    }
}
