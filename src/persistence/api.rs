//! REST client for the level-unlock service
//!
//! Request construction is plain data so it can be checked natively; only
//! sending goes through the browser's `fetch`.

use thiserror::Error;

use crate::progress::{LevelRecord, UnlockView};

/// Default service location
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// JSON body
    pub body: Option<String>,
}

/// Errors talking to the service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service answered {0}")]
    Status(u16),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Builds requests against a base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn levels_url(&self) -> String {
        format!("{}/levels", self.base_url)
    }

    fn level_url(&self, level_id: u32) -> String {
        format!("{}/levels/{}", self.base_url, level_id)
    }

    /// `GET /levels`
    pub fn list_levels(&self) -> ApiRequest {
        ApiRequest {
            method: Method::Get,
            url: self.levels_url(),
            body: None,
        }
    }

    /// `GET /levels/:id`
    pub fn get_level(&self, level_id: u32) -> ApiRequest {
        ApiRequest {
            method: Method::Get,
            url: self.level_url(level_id),
            body: None,
        }
    }

    /// `POST /levels`
    pub fn create_level(&self, record: LevelRecord) -> ApiRequest {
        ApiRequest {
            method: Method::Post,
            url: self.levels_url(),
            body: Some(
                serde_json::json!({ "levelId": record.level_id, "unlocked": record.unlocked })
                    .to_string(),
            ),
        }
    }

    /// `PUT /levels/:id`
    pub fn set_unlocked(&self, level_id: u32, unlocked: bool) -> ApiRequest {
        ApiRequest {
            method: Method::Put,
            url: self.level_url(level_id),
            body: Some(serde_json::json!({ "unlocked": unlocked }).to_string()),
        }
    }

    /// `DELETE /levels/:id`
    pub fn delete_level(&self, level_id: u32) -> ApiRequest {
        ApiRequest {
            method: Method::Delete,
            url: self.level_url(level_id),
            body: None,
        }
    }
}

/// Parse a `GET /levels` response into the menu view
pub fn parse_level_list(json: &str) -> Result<UnlockView, ApiError> {
    let records: Vec<LevelRecord> = serde_json::from_str(json)?;
    Ok(UnlockView::from_records(&records))
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::{JsFuture, spawn_local};

    use super::*;
    use crate::progress::FIRST_LEVEL;

    fn js_err(value: JsValue) -> ApiError {
        ApiError::Network(format!("{:?}", value))
    }

    /// Send a request and return the response body (None for 204)
    pub async fn send(req: &ApiRequest) -> Result<Option<String>, ApiError> {
        let opts = web_sys::RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_mode(web_sys::RequestMode::Cors);
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = web_sys::Request::new_with_str_and_init(&req.url, &opts).map_err(js_err)?;
        if req.body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
        }

        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?
            .dyn_into()
            .map_err(js_err)?;

        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }
        if response.status() == 204 {
            return Ok(None);
        }
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok(text.as_string())
    }

    /// Current unlock view, or the fallback if the service is unavailable
    pub async fn fetch_unlock_view(client: &ApiClient) -> UnlockView {
        let result = match send(&client.list_levels()).await {
            Ok(Some(body)) => parse_level_list(&body),
            Ok(None) => Ok(UnlockView::default()),
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            log::error!("Error fetching level statuses: {}", e);
            log::info!("Falling back to level {} only", FIRST_LEVEL);
            UnlockView::fallback()
        })
    }

    /// Fire-and-forget refresh; `on_done` receives the view
    pub fn spawn_refresh(client: ApiClient, on_done: impl FnOnce(UnlockView) + 'static) {
        spawn_local(async move {
            on_done(fetch_unlock_view(&client).await);
        });
    }

    /// Fire-and-forget unlock; refreshes the view on success
    pub fn spawn_unlock(
        client: ApiClient,
        level_id: u32,
        on_done: impl FnOnce(UnlockView) + 'static,
    ) {
        spawn_local(async move {
            match send(&client.set_unlocked(level_id, true)).await {
                Ok(_) => {
                    log::info!("Level {} unlocked!", level_id);
                    on_done(fetch_unlock_view(&client).await);
                }
                Err(e) => log::error!("Failed to unlock level {}: {}", level_id, e),
            }
        });
    }

    /// Fire-and-forget progress reset: lock every level after the first
    pub fn spawn_reset_progress(client: ApiClient, on_done: impl FnOnce(UnlockView) + 'static) {
        spawn_local(async move {
            let mut ok = true;
            for level_id in FIRST_LEVEL + 1..=crate::consts::LAST_LEVEL {
                if let Err(e) = send(&client.set_unlocked(level_id, false)).await {
                    log::error!("Failed to reset progress for level {}: {}", level_id, e);
                    ok = false;
                }
            }
            if ok {
                log::info!("Progress reset successfully");
            }
            on_done(fetch_unlock_view(&client).await);
        });
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{fetch_unlock_view, send, spawn_refresh, spawn_reset_progress, spawn_unlock};
