use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

/// Warms the tile cache one level ahead of what is on screen.
pub struct Prefetcher {
    client: reqwest::Client,
    enabled: bool,
    /// URLs that are in flight or already fetched. Failed URLs are removed
    /// so the next request tries them again.
    claimed: Arc<Mutex<HashSet<String>>>,
}

impl Prefetcher {
    pub fn new(client: reqwest::Client, enabled: bool) -> Self {
        Self {
            client,
            enabled,
            claimed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Fire a background GET for `url` unless it is in flight or already
    /// fetched. Failures only show up in debug logs.
    pub fn request(&mut self, url: Option<String>) -> Option<JoinHandle<bool>> {
        let url = url?;
        if !self.enabled {
            return None;
        }
        {
            let mut claimed = self.claimed.lock().ok()?;
            if !claimed.insert(url.clone()) {
                return None;
            }
        }

        let client = self.client.clone();
        let claimed = Arc::clone(&self.claimed);
        Some(tokio::spawn(async move {
            let fetched = match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
                Ok(resp) => resp.bytes().await.map(|body| body.len()),
                Err(e) => Err(e),
            };
            match fetched {
                Ok(bytes) => {
                    tracing::debug!(url = %url, bytes, "Prefetched tile");
                    true
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "Tile prefetch failed");
                    if let Ok(mut claimed) = claimed.lock() {
                        claimed.remove(&url);
                    }
                    false
                }
            }
        }))
    }
}
