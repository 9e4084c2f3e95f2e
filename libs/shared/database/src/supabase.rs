use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::StoreError;
use crate::store::{validate_key, RecordStore};

/// PostgREST-backed record store. Each key maps to a table of the same name.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, extra: &[(&'static str, &'static str)]) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| StoreError::InvalidHeader(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| StoreError::InvalidHeader(e.to_string()))?;

        headers.insert("apikey", api_key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in extra {
            headers.insert(*name, HeaderValue::from_static(value));
        }

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: &[(&'static str, &'static str)],
    ) -> Result<reqwest::Response, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(extra_headers)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(StoreError::Remote {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, &[]).await?;
        Ok(response.json::<T>().await?)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn load(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        validate_key(key)?;
        let path = format!("/rest/v1/{}?select=*", key);
        self.request(Method::GET, &path, None).await
    }

    async fn save(&self, key: &str, records: Vec<Value>) -> Result<(), StoreError> {
        validate_key(key)?;
        if records.is_empty() {
            return Ok(());
        }

        let path = format!("/rest/v1/{}", key);
        self.send(
            Method::POST,
            &path,
            Some(Value::Array(records)),
            &[("Prefer", "resolution=merge-duplicates,return=minimal")],
        ).await?;

        Ok(())
    }
}
