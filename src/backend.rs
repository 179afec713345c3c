//! Client for the external search service.
//!
//! The only contract is `GET {base}/api/search?q=&page=` answering
//! `{"records": [...], "totalCount": n}`. Ranking, storage and page size are
//! the backend's business.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::{backend_search_url, CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SearchRecord {
    #[serde(default)]
    pub(crate) id: Option<RecordId>,
    #[serde(default)]
    pub(crate) slug: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) organization: Option<String>,
    /// Highlighted excerpt; may contain inline emphasis markup.
    #[serde(default)]
    pub(crate) headline: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SearchResults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) records: Vec<SearchRecord>,
    #[serde(default, rename = "totalCount", deserialize_with = "null_as_default")]
    pub(crate) total_count: u64,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) trait SearchBackend: Send + Sync {
    fn search(&self, q: &str, page: u64) -> Result<SearchResults>;
}

pub(crate) struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SearchBackend for HttpBackend {
    fn search(&self, q: &str, page: u64) -> Result<SearchResults> {
        let url = backend_search_url(&self.base_url, q, page);
        debug!(%url, "querying search backend");
        let response = self.agent.get(&url).call()?;
        response
            .into_json::<SearchResults>()
            .map_err(|e| CatalogError::BackendDecode(e.to_string()))
    }
}

/// Load one catalog page. A failing backend degrades to an empty page
/// instead of an error page.
pub(crate) fn fetch_or_empty(backend: &dyn SearchBackend, q: &str, page: u64) -> SearchResults {
    match backend.search(q, page) {
        Ok(results) => results,
        Err(err) => {
            warn!(%err, q, page, "search backend failed, rendering empty results");
            SearchResults::default()
        }
    }
}
