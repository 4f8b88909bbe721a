/// Fallback-mode responses
///
/// Without a database the frontend keeps its own copy of the data; the API
/// only has to answer in the same shape. Writes echo the normalized input
/// with a fresh id and timestamps, reads return nothing, deletes succeed.

use axum::{http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// `{ "success": true }`
pub fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Echo of a created record
pub fn created<T: Serialize>(input: &T) -> (StatusCode, Json<Value>) {
    let now = Utc::now();
    let mut record = to_object(input);
    record.insert("id".to_string(), json!(Uuid::new_v4()));
    record.insert("createdAt".to_string(), json!(now));
    record.insert("updatedAt".to_string(), json!(now));

    (StatusCode::CREATED, Json(Value::Object(record)))
}

/// Echo of an updated record
pub fn updated<T: Serialize>(id: Uuid, input: &T) -> Json<Value> {
    let mut record = to_object(input);
    record.insert("id".to_string(), json!(id));
    record.insert("updatedAt".to_string(), json!(Utc::now()));

    Json(Value::Object(record))
}

fn to_object<T: Serialize>(input: &T) -> Map<String, Value> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        client_name: &'static str,
        amount: f64,
    }

    #[test]
    fn test_created_echo_adds_id_and_timestamps() {
        let (status, Json(body)) = created(&Sample {
            client_name: "Acme",
            amount: 12.5,
        });

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["clientName"], "Acme");
        assert_eq!(body["amount"], 12.5);
        assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
        assert_eq!(body["createdAt"], body["updatedAt"]);
    }

    #[test]
    fn test_updated_echo_keeps_id() {
        let id = Uuid::new_v4();
        let Json(body) = updated(id, &json!({ "status": "paid" }));

        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["status"], "paid");
    }
}
