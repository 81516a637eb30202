//! Authenticated Odoo client
//!
//! Authenticates once in [`OdooClient::connect`]; every later call reuses the
//! resolved user id with `object.execute_kw`.

use crate::config::OdooConfig;
use crate::rpc::{parse_ids, parse_records, parse_uid, RpcRequest, RpcResponse};
use async_trait::async_trait;
use hrsync_core::{RawRecord, RecordId, RecordSource, SourceError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Odoo external API over JSON-RPC
#[derive(Debug)]
pub struct OdooClient {
    http: reqwest::Client,
    endpoint: String,
    config: OdooConfig,
    uid: i64,
    next_id: AtomicU64,
}

impl OdooClient {
    /// Authenticate and return a ready client
    ///
    /// # Errors
    /// - `SourceError::Authentication` if the server rejects the credentials
    /// - `SourceError::Transport` if the server cannot be reached
    pub async fn connect(config: OdooConfig) -> Result<Self, SourceError> {
        let mut client = Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint(),
            config,
            uid: 0,
            next_id: AtomicU64::new(1),
        };

        let args = vec![
            json!(client.config.database),
            json!(client.config.username),
            json!(client.config.api_key),
            json!({}),
        ];
        let result = client.call("common", "authenticate", args).await?;
        client.uid = parse_uid(&result)?;

        tracing::debug!(uid = client.uid, endpoint = %client.endpoint, "authenticated");
        Ok(client)
    }

    /// Remote user id resolved at authentication
    #[inline]
    #[must_use]
    pub fn uid(&self) -> i64 {
        self.uid
    }

    /// Connection settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OdooConfig {
        &self.config
    }

    async fn call(&self, service: &str, method: &str, args: Vec<Value>) -> Result<Value, SourceError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::call(id, service, method, args);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Transport(format!(
                "{service}.{method} answered HTTP {status}"
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        body.into_result()
    }

    async fn execute_kw(&self, model: &str, method: &str, args: Value) -> Result<Value, SourceError> {
        let args = vec![
            json!(self.config.database),
            json!(self.uid),
            json!(self.config.api_key),
            json!(model),
            json!(method),
            args,
        ];
        self.call("object", "execute_kw", args).await
    }
}

#[async_trait]
impl RecordSource for OdooClient {
    async fn list_identifiers(&self, resource: &str) -> Result<Vec<RecordId>, SourceError> {
        let result = self.execute_kw(resource, "search", json!([[]])).await?;
        parse_ids(result)
    }

    async fn read_batch(
        &self,
        resource: &str,
        ids: &[RecordId],
        fields: &[&str],
    ) -> Result<Vec<RawRecord>, SourceError> {
        tracing::debug!(resource, count = ids.len(), "reading batch");
        let result = self.execute_kw(resource, "read", json!([ids, fields])).await?;
        parse_records(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Nothing listens on the discard port of the loopback interface.
        let config = OdooConfig::new("http://127.0.0.1:9", "prod", "bot", "secret");
        let err = OdooClient::connect(config).await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }
}
