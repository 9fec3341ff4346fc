//! Request gateway: typed GET/SHOW/POST/PUT/DELETE over a [`Transport`], with every failure
//! normalized to one message and raised on the alert channel before it reaches the caller.

pub mod problem;
pub mod query;
pub mod transport;

pub use problem::{normalize_failure, Normalized, DEFAULT_CONFLICT_MARKER};
pub use query::Query;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ResponseBody, Transport};

use crate::alert::AlertChannel;
use crate::config::RecordId;
use crate::error::{FailureKind, GatewayError, Operation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    alerts: AlertChannel,
    conflict_marker: String,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, alerts: AlertChannel) -> Self {
        Self {
            transport,
            alerts,
            conflict_marker: DEFAULT_CONFLICT_MARKER.to_string(),
        }
    }

    pub fn with_conflict_marker(mut self, marker: impl Into<String>) -> Self {
        self.conflict_marker = marker.into();
        self
    }

    pub fn alerts(&self) -> &AlertChannel {
        &self.alerts
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, GatewayError> {
        let resp = self
            .dispatch(Operation::Get, Method::Get, query::normalize_path(path), query, None)
            .await?;
        self.decode(Operation::Get, resp)
    }

    pub async fn show<T: DeserializeOwned>(
        &self,
        path: &str,
        id: &RecordId,
        query: &Query,
    ) -> Result<T, GatewayError> {
        let resp = self
            .dispatch(Operation::Show, Method::Get, item_path(path, id), query, None)
            .await?;
        self.decode(Operation::Show, resp)
    }

    /// Create. The success body is not interpreted.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), GatewayError> {
        let body = self.encode(Operation::Post, body)?;
        self.dispatch(Operation::Post, Method::Post, query::normalize_path(path), &Query::new(), Some(body))
            .await
            .map(|_| ())
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        id: &RecordId,
        body: &B,
    ) -> Result<(), GatewayError> {
        let body = self.encode(Operation::Put, body)?;
        self.dispatch(Operation::Put, Method::Put, item_path(path, id), &Query::new(), Some(body))
            .await
            .map(|_| ())
    }

    pub async fn delete(&self, path: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.dispatch(Operation::Delete, Method::Delete, item_path(path, id), &Query::new(), None)
            .await
            .map(|_| ())
    }

    async fn dispatch(
        &self,
        operation: Operation,
        method: Method,
        path: String,
        query: &Query,
        body: Option<Value>,
    ) -> Result<ApiResponse, GatewayError> {
        let request = ApiRequest {
            method,
            path,
            query: query.to_pairs(),
            body,
        };
        tracing::debug!(%operation, path = %request.path, query = ?request.query, "dispatch");
        match self.transport.send(request).await {
            Ok(resp) if resp.is_success() => Ok(resp),
            Ok(resp) => Err(self.fail(operation, Some(resp.status), FailureKind::Status, &resp.body)),
            Err(e) => {
                tracing::error!(%operation, error = %e, "transport failure");
                Err(self.fail(operation, None, FailureKind::Transport, &ResponseBody::Empty))
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, operation: Operation, resp: ApiResponse) -> Result<T, GatewayError> {
        let decoded = match &resp.body {
            ResponseBody::Json(v) => serde_json::from_value(v.clone()),
            ResponseBody::Text(t) => serde_json::from_str(t),
            ResponseBody::Empty => serde_json::from_value(Value::Null),
        };
        decoded.map_err(|e| {
            tracing::error!(%operation, error = %e, "undecodable success body");
            self.fail(operation, Some(resp.status), FailureKind::Decode, &ResponseBody::Empty)
        })
    }

    fn encode<B: Serialize + ?Sized>(&self, operation: Operation, body: &B) -> Result<Value, GatewayError> {
        serde_json::to_value(body).map_err(|e| {
            tracing::error!(%operation, error = %e, "unserializable request body");
            self.fail(operation, None, FailureKind::Decode, &ResponseBody::Empty)
        })
    }

    fn fail(
        &self,
        operation: Operation,
        status: Option<u16>,
        kind: FailureKind,
        body: &ResponseBody,
    ) -> GatewayError {
        let normalized = normalize_failure(operation, status, body, &self.conflict_marker);
        let kind = if normalized.conflict { FailureKind::Conflict } else { kind };
        tracing::error!(%operation, ?status, ?kind, message = %normalized.message, "request failed");
        self.alerts.error(normalized.message.clone());
        GatewayError {
            operation,
            status,
            kind,
            message: normalized.message,
        }
    }
}

fn item_path(path: &str, id: &RecordId) -> String {
    format!("{}/{}", query::normalize_path(path).trim_end_matches('/'), id)
}

#[cfg(test)]
mod tests {
    use super::transport::scripted::{Reply, ScriptedTransport};
    use super::*;
    use crate::alert::AlertKind;
    use serde_json::json;

    fn gateway(t: &Arc<ScriptedTransport>) -> Gateway {
        Gateway::new(t.clone(), AlertChannel::new())
    }

    #[tokio::test]
    async fn get_decodes_payload_and_drops_absent_query_values() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Get, "/categories", Reply::json(200, json!([{"id": 1, "name": "Docs"}])));
        let gw = gateway(&t);
        let rows: Vec<Value> = gw
            .get("categories", &Query::new().param("page", 1).param("q", ""))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let sent = t.sent();
        assert_eq!(sent[0].path, "/categories");
        assert_eq!(sent[0].query, vec![("page".to_string(), "1".to_string())]);
        assert!(gw.alerts().snapshot().is_empty());
    }

    #[tokio::test]
    async fn item_operations_address_by_id() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Put, "/sites/7", Reply::empty(204));
        t.on(Method::Delete, "/sites/abc", Reply::empty(204));
        t.on(Method::Get, "/sites/7", Reply::json(200, json!({"id": 7})));
        let gw = gateway(&t);
        gw.put("/sites", &RecordId::Int(7), &json!({"name": "x"})).await.unwrap();
        gw.delete("/sites", &RecordId::Text("abc".into())).await.unwrap();
        let row: Value = gw.show("/sites", &RecordId::Int(7), &Query::new()).await.unwrap();
        assert_eq!(row["id"], 7);
        assert_eq!(t.sent()[0].body, Some(json!({"name": "x"})));
    }

    #[tokio::test]
    async fn failure_is_alerted_once_before_returning() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Post, "/categories", Reply::text(422, r#"{"detail":"Ya existe una categoría con ese nombre."}"#));
        let gw = gateway(&t);
        let err = gw.post("/categories", &json!({"name": "Docs"})).await.unwrap_err();
        assert_eq!(err.status, Some(422));
        assert_eq!(err.kind, FailureKind::Status);
        assert_eq!(err.message, "Ya existe una categoría con ese nombre.");
        let alerts = gw.alerts().snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Danger);
        assert_eq!(alerts[0].text, err.message);
    }

    #[tokio::test]
    async fn delete_conflict_marker_is_surfaced() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Delete, "/categories/3", Reply::text(500, "No se puede borrar: en uso"));
        let gw = gateway(&t);
        let err = gw.delete("/categories", &RecordId::Int(3)).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(gw.alerts().snapshot()[0].text.starts_with("No se puede borrar"));
    }

    #[tokio::test]
    async fn custom_conflict_marker() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Delete, "/categories/3", Reply::text(500, "ERROR 1451: Cannot delete: in use"));
        let gw = gateway(&t).with_conflict_marker("Cannot delete");
        let err = gw.delete("/categories", &RecordId::Int(3)).await.unwrap_err();
        assert_eq!(err.message, "Cannot delete: in use");
    }

    #[tokio::test]
    async fn network_failure_synthesizes_message() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Get, "/sites", Reply::Network);
        let gw = gateway(&t);
        let err = gw.get::<Value>("/sites", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Transport);
        assert_eq!(err.message, "GET failed (code 0)");
        assert_eq!(gw.alerts().snapshot().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_success_body_fails() {
        let t = Arc::new(ScriptedTransport::new());
        t.on(Method::Get, "/sites", Reply::text(200, "<html>"));
        let gw = gateway(&t);
        let err = gw.get::<Value>("/sites", &Query::new()).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        assert_eq!(err.message, "GET failed (code 200)");
    }
}
