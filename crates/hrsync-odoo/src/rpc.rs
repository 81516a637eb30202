//! JSON-RPC envelope
//!
//! Odoo's `/jsonrpc` route takes `{"method": "call", "params": {service,
//! method, args}}` and answers with either `result` or an `error` object.

use hrsync_core::{RawRecord, RecordId, SourceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing call
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: CallParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Vec<Value>,
}

impl<'a> RpcRequest<'a> {
    pub(crate) fn call(id: u64, service: &'a str, method: &'a str, args: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params: CallParams {
                service,
                method,
                args,
            },
            id,
        }
    }
}

/// Incoming reply
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcFault>,
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<FaultData>,
}

#[derive(Debug, Deserialize)]
struct FaultData {
    #[serde(default)]
    message: Option<String>,
}

impl RpcResponse {
    /// Result value, or the fault's most specific message
    pub(crate) fn into_result(self) -> Result<Value, SourceError> {
        match self.error {
            None => Ok(self.result),
            Some(fault) => {
                let detail = fault
                    .data
                    .and_then(|d| d.message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(fault.message);
                Err(SourceError::rpc(detail))
            }
        }
    }
}

/// `authenticate` answers with the user id, or `false` on bad credentials
pub(crate) fn parse_uid(value: &Value) -> Result<i64, SourceError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .filter(|uid| *uid > 0)
            .ok_or_else(|| SourceError::Decode(format!("invalid user id: {n}"))),
        Value::Bool(false) | Value::Null => Err(SourceError::Authentication(
            "server rejected the credentials".to_string(),
        )),
        other => Err(SourceError::Decode(format!(
            "authenticate returned {other}"
        ))),
    }
}

/// `search` answers with an array of ids
pub(crate) fn parse_ids(value: Value) -> Result<Vec<RecordId>, SourceError> {
    let Value::Array(items) = value else {
        return Err(SourceError::Decode("search did not return an array".to_string()));
    };
    items
        .into_iter()
        .map(|item| {
            item.as_i64()
                .ok_or_else(|| SourceError::Decode(format!("non-numeric record id: {item}")))
        })
        .collect()
}

/// `read` answers with an array of field maps
pub(crate) fn parse_records(value: Value) -> Result<Vec<RawRecord>, SourceError> {
    let Value::Array(items) = value else {
        return Err(SourceError::Decode("read did not return an array".to_string()));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(SourceError::Decode(format!("record is not an object: {other}"))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let request = RpcRequest::call(
            3,
            "object",
            "execute_kw",
            vec![json!("prod"), json!(2), json!("key"), json!("hr.employee"), json!("search"), json!([[]])],
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "call",
                "params": {
                    "service": "object",
                    "method": "execute_kw",
                    "args": ["prod", 2, "key", "hr.employee", "search", [[]]],
                },
                "id": 3,
            })
        );
    }

    #[test]
    fn result_is_returned() {
        let response: RpcResponse =
            serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 1, "result": [1, 2] })).unwrap();
        assert_eq!(response.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn fault_prefers_data_message() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": { "name": "odoo.exceptions.AccessError", "message": "Access Denied" },
            },
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, SourceError::Rpc { ref message } if message == "Access Denied"));
    }

    #[test]
    fn fault_without_data_uses_message() {
        let response: RpcResponse = serde_json::from_value(json!({
            "error": { "code": 404, "message": "Not Found" },
        }))
        .unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "remote call failed: Not Found");
    }

    #[test]
    fn uid_parsing() {
        assert_eq!(parse_uid(&json!(7)).unwrap(), 7);
        assert!(matches!(parse_uid(&json!(false)), Err(SourceError::Authentication(_))));
        assert!(matches!(parse_uid(&json!("7")), Err(SourceError::Decode(_))));
    }

    #[test]
    fn ids_and_records_parsing() {
        assert_eq!(parse_ids(json!([4, 8, 15])).unwrap(), vec![4, 8, 15]);
        assert!(parse_ids(json!({})).is_err());
        assert!(parse_ids(json!(["x"])).is_err());

        let records = parse_records(json!([{ "id": 4, "work_email": "a@x.com" }])).unwrap();
        assert_eq!(records[0]["work_email"], json!("a@x.com"));
        assert!(parse_records(json!([1])).is_err());
    }
}
