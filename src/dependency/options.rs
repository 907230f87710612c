//! Query options: cross-cutting filters and consistency mode for backend reads.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read consistency requested from the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Server default: reads are served by the leader.
    #[default]
    Default,
    /// Any server may answer, possibly with stale data.
    Stale,
    /// Leader verifies it is still leader before answering.
    Consistent,
}

/// Options applied to a single backend read.
///
/// Values are never mutated by a query; [`QueryOptions::merge`] returns a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub region: Option<String>,
    pub namespace: Option<String>,
    /// Filter expression evaluated by the server (e.g. `Datacenter == dc1`).
    pub filter: Option<String>,
    pub consistency: Consistency,
    /// Blocking-query index: the server holds the request until its index exceeds this.
    pub wait_index: Option<u64>,
    /// Upper bound on how long a blocking query may be held.
    pub wait_time: Option<Duration>,
    pub per_page: Option<u32>,
}

fn overlay_string(base: &mut Option<String>, overlay: &Option<String>) {
    if let Some(value) = overlay.as_deref().filter(|v| !v.is_empty()) {
        *base = Some(value.to_string());
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_wait(mut self, index: u64, wait_time: Duration) -> Self {
        self.wait_index = Some(index);
        self.wait_time = Some(wait_time);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Copy `self` and overwrite every field `overlay` sets.
    ///
    /// Empty strings, `None` and `Consistency::Default` in the overlay leave
    /// the receiver's value in place.
    pub fn merge(&self, overlay: &QueryOptions) -> QueryOptions {
        let mut merged = self.clone();
        overlay_string(&mut merged.region, &overlay.region);
        overlay_string(&mut merged.namespace, &overlay.namespace);
        overlay_string(&mut merged.filter, &overlay.filter);
        if overlay.consistency != Consistency::Default {
            merged.consistency = overlay.consistency;
        }
        if overlay.wait_index.is_some() {
            merged.wait_index = overlay.wait_index;
        }
        if overlay.wait_time.is_some() {
            merged.wait_time = overlay.wait_time;
        }
        if overlay.per_page.is_some() {
            merged.per_page = overlay.per_page;
        }
        merged
    }

    /// Query-string parameters in a fixed, alphabetical key order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.consistency == Consistency::Consistent {
            pairs.push(("consistent", String::new()));
        }
        if let Some(filter) = self.filter.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("filter", filter.to_string()));
        }
        if let Some(index) = self.wait_index.filter(|i| *i > 0) {
            pairs.push(("index", index.to_string()));
        }
        if let Some(namespace) = self.namespace.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("namespace", namespace.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(region) = self.region.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("region", region.to_string()));
        }
        if self.consistency == Consistency::Stale {
            pairs.push(("stale", String::new()));
        }
        if let Some(wait) = self.wait_time.filter(|w| !w.is_zero()) {
            pairs.push(("wait", format!("{}ms", wait.as_millis())));
        }
        pairs
    }

    /// Request path with the encoded query string appended, for diagnostics.
    pub fn request_path(&self, path: &str) -> String {
        let pairs = self.to_query_pairs();
        match Url::parse_with_params(&format!("http://nomad{}", path), &pairs) {
            Ok(url) => match url.query() {
                Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
                _ => url.path().to_string(),
            },
            Err(_) => path.to_string(),
        }
    }
}
