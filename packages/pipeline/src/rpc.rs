//! Dummy remote-procedure client with a statically enumerable operation
//! set. Operations are a closed enum dispatched by match, so the supported
//! surface is visible at compile time; there is no lookup by concatenated
//! handler-name strings. Responses are canned fixtures standing in for a
//! real remote service.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The operations the dummy client supports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RpcOperation {
    GetDocument {
        document_id: String,
    },
    GetSheet {
        sheet_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<String>,
    },
    ListFiles {
        #[serde(skip_serializing_if = "Option::is_none")]
        folder: Option<String>,
    },
    QueryRecords {
        query: String,
    },
    CreateRecord {
        object: String,
        fields: Value,
    },
    UpdateRecord {
        object: String,
        record_id: String,
        fields: Value,
    },
}

impl RpcOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetDocument { .. } => "get_document",
            Self::GetSheet { .. } => "get_sheet",
            Self::ListFiles { .. } => "list_files",
            Self::QueryRecords { .. } => "query_records",
            Self::CreateRecord { .. } => "create_record",
            Self::UpdateRecord { .. } => "update_record",
        }
    }
}

/// Simulated remote-procedure client returning fixture payloads
#[derive(Debug, Default)]
pub struct DummyRpcClient;

impl DummyRpcClient {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch one operation. Every variant has a handler; an unsupported
    /// operation cannot be constructed.
    pub fn call(&self, operation: &RpcOperation) -> Value {
        tracing::debug!(operation = operation.name(), "Dispatching dummy RPC call");
        match operation {
            RpcOperation::GetDocument { document_id } => json!({
                "status": "success",
                "document_id": document_id,
                "title": "Quarterly Flood Preparedness Review",
                "body": "Draft notes on relief logistics and shelter capacity.",
            }),
            RpcOperation::GetSheet { sheet_id, range } => json!({
                "status": "success",
                "sheet_id": sheet_id,
                "range": range.as_deref().unwrap_or("A1:Z100"),
                "rows": [
                    ["district", "camps", "occupancy"],
                    ["Wayanad", "42", "87%"],
                    ["Idukki", "17", "63%"],
                ],
            }),
            RpcOperation::ListFiles { folder } => json!({
                "status": "success",
                "folder": folder.as_deref().unwrap_or("/"),
                "files": [
                    { "id": "doc-001", "name": "situation_report.md" },
                    { "id": "sheet-002", "name": "camp_capacity.csv" },
                ],
            }),
            RpcOperation::QueryRecords { query } => json!({
                "status": "success",
                "query": query,
                "records": [
                    { "id": "rec-100", "name": "Relief Supply Request", "stage": "open" },
                ],
                "total": 1,
            }),
            RpcOperation::CreateRecord { object, fields } => json!({
                "status": "success",
                "object": object,
                "record_id": "rec-new-001",
                "fields": fields,
            }),
            RpcOperation::UpdateRecord { object, record_id, fields } => json!({
                "status": "success",
                "object": object,
                "record_id": record_id,
                "updated_fields": fields,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_fetch_echoes_the_requested_id() {
        let client = DummyRpcClient::new();
        let response = client.call(&RpcOperation::GetDocument {
            document_id: "doc-123".to_string(),
        });

        assert_eq!(response["status"], "success");
        assert_eq!(response["document_id"], "doc-123");
    }

    #[test]
    fn sheet_fetch_defaults_the_range() {
        let client = DummyRpcClient::new();
        let response = client.call(&RpcOperation::GetSheet {
            sheet_id: "sheet-7".to_string(),
            range: None,
        });

        assert_eq!(response["range"], "A1:Z100");
        assert!(response["rows"].is_array());
    }

    #[test]
    fn every_operation_dispatches_to_a_success_payload() {
        let client = DummyRpcClient::new();
        let operations = [
            RpcOperation::GetDocument {
                document_id: "d".to_string(),
            },
            RpcOperation::GetSheet {
                sheet_id: "s".to_string(),
                range: Some("A1:B2".to_string()),
            },
            RpcOperation::ListFiles { folder: None },
            RpcOperation::QueryRecords {
                query: "SELECT Id FROM Case".to_string(),
            },
            RpcOperation::CreateRecord {
                object: "Case".to_string(),
                fields: serde_json::json!({ "subject": "flooding" }),
            },
            RpcOperation::UpdateRecord {
                object: "Case".to_string(),
                record_id: "rec-1".to_string(),
                fields: serde_json::json!({ "stage": "closed" }),
            },
        ];

        for operation in &operations {
            let response = client.call(operation);
            assert_eq!(response["status"], "success", "{}", operation.name());
        }
    }

    #[test]
    fn operations_deserialize_from_tagged_json() {
        let operation: RpcOperation =
            serde_json::from_str(r#"{ "op": "get_document", "document_id": "doc-9" }"#).unwrap();
        assert_eq!(
            operation,
            RpcOperation::GetDocument {
                document_id: "doc-9".to_string()
            }
        );

        // An unknown operation name fails to parse instead of reaching a
        // nonexistent handler
        let unknown = serde_json::from_str::<RpcOperation>(r#"{ "op": "drop_tables" }"#);
        assert!(unknown.is_err());
    }
}
