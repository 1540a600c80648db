//! Blocking Zotero Web API (v3) client

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::error::ZoteroError;
use super::item::Item;
use super::LibrarySnapshot;
use crate::config::ZoteroConfig;

/// Public Zotero Web API endpoint
pub const WEB_API_URL: &str = "https://api.zotero.org";

/// Zotero desktop local API endpoint
pub const LOCAL_API_URL: &str = "http://localhost:23119/api";

/// Maximum page size accepted by the API
pub const MAX_PAGE_SIZE: usize = 100;

/// Upper bound on a single server-requested backoff
const MAX_BACKOFF_SECS: u64 = 60;

const API_VERSION: &str = "3";

/// Library the client reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Library {
    /// A personal library
    User(String),
    /// A group library
    Group(String),
    /// The library of the running Zotero desktop app
    Local,
}

impl Library {
    /// URL path prefix of the library
    #[must_use]
    pub fn path_prefix(&self) -> String {
        match self {
            Self::User(id) => format!("/users/{id}"),
            Self::Group(id) => format!("/groups/{id}"),
            Self::Local => "/users/0".to_string(),
        }
    }

    /// `zotero://` link that selects an item in the desktop app
    #[must_use]
    pub fn select_link(&self, item_key: &str) -> String {
        match self {
            Self::Group(id) => format!("zotero://select/groups/{id}/items/{item_key}"),
            Self::User(_) | Self::Local => format!("zotero://select/library/items/{item_key}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeletedResponse {
    #[serde(default)]
    items: Vec<String>,
}

/// Zotero API client
pub struct ZoteroClient {
    http: Client,
    base_url: String,
    library: Library,
    api_key: Option<String>,
    collection: Option<String>,
    page_size: usize,
    max_retries: u32,
}

impl ZoteroClient {
    /// Build a client from the `[zotero]` configuration
    ///
    /// # Errors
    ///
    /// Returns an error if web mode lacks credentials or the HTTP client cannot be built.
    pub fn from_config(config: &ZoteroConfig) -> Result<Self, ZoteroError> {
        let library = config.library()?;

        let api_key = match library {
            Library::Local => None,
            Library::User(_) | Library::Group(_) => Some(
                config
                    .api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ZoteroError::MissingCredentials("zotero.api_key"))?,
            ),
        };

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| {
                if library == Library::Local {
                    LOCAL_API_URL.to_string()
                } else {
                    WEB_API_URL.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .user_agent(concat!("litsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            library,
            api_key,
            collection: config.collection.clone(),
            page_size: MAX_PAGE_SIZE,
            max_retries: config.max_retries(),
        })
    }

    /// Override the page size (clamped to `1..=100`)
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Library this client reads from
    #[must_use]
    pub const fn library(&self) -> &Library {
        &self.library
    }

    /// Whether `since`-based incremental fetches are available
    #[must_use]
    pub const fn supports_incremental(&self) -> bool {
        !matches!(self.library, Library::Local)
    }

    /// Fetch all top-level items, optionally only those changed after `since`
    ///
    /// Returns the items and the library version reported by the server.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-success statuses, or malformed JSON.
    pub fn fetch_items(&self, since: Option<u64>) -> Result<(Vec<Item>, u64), ZoteroError> {
        let path = match &self.collection {
            Some(collection) => format!("/collections/{collection}/items/top"),
            None => "/items/top".to_string(),
        };

        let mut items: Vec<Item> = Vec::new();
        let mut library_version = 0;
        let mut start = 0;

        loop {
            let mut query = vec![
                ("format", "json".to_string()),
                ("limit", self.page_size.to_string()),
                ("start", start.to_string()),
            ];
            if let Some(version) = since {
                query.push(("since", version.to_string()));
            }

            let response = self.get(&path, &query)?;
            let total = header_u64(&response, "Total-Results");
            library_version = header_u64(&response, "Last-Modified-Version").unwrap_or(library_version);

            let page: Vec<Item> = response.json()?;
            let page_len = page.len();
            debug!(start, page_len, ?total, "fetched item page");
            items.extend(page);
            start += page_len;

            let reached_total = total.is_some_and(|t| start as u64 >= t);
            if page_len < self.page_size || reached_total {
                break;
            }
        }

        info!(count = items.len(), library_version, "fetched Zotero items");
        Ok((items, library_version))
    }

    /// Fetch keys of items deleted after `since`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-success statuses, or malformed JSON.
    pub fn fetch_deleted(&self, since: u64) -> Result<Vec<String>, ZoteroError> {
        let response = self.get("/deleted", &[("since", since.to_string())])?;
        let deleted: DeletedResponse = response.json()?;
        debug!(count = deleted.items.len(), since, "fetched deleted item keys");
        Ok(deleted.items)
    }

    /// Fetch everything a sync needs in one snapshot
    ///
    /// With `since`, only changed items and deleted keys are fetched and the
    /// snapshot is marked incomplete.
    ///
    /// # Errors
    ///
    /// Returns an error if any request fails.
    pub fn fetch_snapshot(&self, since: Option<u64>) -> Result<LibrarySnapshot, ZoteroError> {
        let since = since.filter(|v| *v > 0 && self.supports_incremental());

        let (items, library_version) = self.fetch_items(since)?;
        let deleted = match since {
            Some(version) => self.fetch_deleted(version)?,
            None => Vec::new(),
        };

        Ok(LibrarySnapshot {
            items,
            deleted,
            library_version,
            complete: since.is_none(),
        })
    }

    /// GET with API headers and backoff on 429/503
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ZoteroError> {
        let url = format!("{}{}{}", self.base_url, self.library.path_prefix(), path);
        let mut attempt = 0;

        loop {
            let mut request = self
                .http
                .get(&url)
                .header("Zotero-API-Version", API_VERSION)
                .query(query);
            if let Some(key) = &self.api_key {
                request = request.header("Zotero-API-Key", key);
            }

            let response = request.send()?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
                if attempt >= self.max_retries {
                    return Err(ZoteroError::RateLimited(attempt));
                }
                attempt += 1;
                let wait = backoff_secs(
                    header_u64(&response, "Retry-After"),
                    header_u64(&response, "Backoff"),
                );
                warn!(status = status.as_u16(), wait, attempt, "Zotero asked to back off");
                std::thread::sleep(Duration::from_secs(wait));
                continue;
            }

            let body: String = response.text().unwrap_or_default().chars().take(200).collect();
            return Err(ZoteroError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }
    }
}

/// Seconds to wait before retrying, capped at `MAX_BACKOFF_SECS`
fn backoff_secs(retry_after: Option<u64>, backoff: Option<u64>) -> u64 {
    retry_after.or(backoff).unwrap_or(1).min(MAX_BACKOFF_SECS)
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
