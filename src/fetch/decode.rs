use serde_json::Value;

use crate::records::{Record, Snapshot};

use super::{FetchError, FetchResult};

/// Decode an index-data body into a snapshot.
///
/// A missing or `null` data field is an empty snapshot rather than an error;
/// anything that is not an array of objects is malformed.
pub fn decode_snapshot(body: &str, data_field: &str) -> FetchResult<Snapshot> {
    let root: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::malformed(format!("body is not valid JSON: {err}")))?;

    let mut object = match root {
        Value::Object(object) => object,
        other => {
            return Err(FetchError::malformed(format!(
                "expected a JSON object at the top level, found {}",
                type_name(&other)
            )))
        }
    };

    let rows = match object.remove(data_field) {
        None | Some(Value::Null) => return Ok(Snapshot::empty()),
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(FetchError::malformed(format!(
                "field `{data_field}` should be an array, found {}",
                type_name(&other)
            )))
        }
    };

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(position, row)| into_record(position, row, data_field))
        .collect::<FetchResult<Vec<Record>>>()?;

    Ok(Snapshot::new(records))
}

fn into_record(position: usize, row: Value, data_field: &str) -> FetchResult<Record> {
    match row {
        Value::Object(record) => Ok(record),
        other => Err(FetchError::malformed(format!(
            "element {position} of `{data_field}` should be an object, found {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FailureKind;

    #[test]
    fn decodes_index_payload_verbatim() {
        let sample = r#"{
            "name": "NIFTY TOTAL MARKET",
            "advance": { "declines": "312", "advances": "438" },
            "data": [
                {
                    "priority": 1,
                    "symbol": "NIFTY TOTAL MARKET",
                    "open": 12890.15,
                    "lastPrice": 12932.4,
                    "pChange": 0.41
                },
                {
                    "priority": 0,
                    "symbol": "RELIANCE",
                    "identifier": "RELIANCEEQN",
                    "lastPrice": 2950.5,
                    "totalTradedVolume": 5342101,
                    "meta": { "isFNOSec": true }
                }
            ]
        }"#;

        let snapshot = decode_snapshot(sample, "data").unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records()[1]["symbol"], "RELIANCE");
        assert_eq!(snapshot.records()[1]["totalTradedVolume"], 5342101);
        assert_eq!(snapshot.records()[1]["meta"]["isFNOSec"], true);
    }

    #[test]
    fn empty_array_is_an_empty_success() {
        let snapshot = decode_snapshot(r#"{"data": []}"#, "data").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn missing_or_null_field_is_an_empty_success() {
        assert!(decode_snapshot(r#"{"name": "NIFTY 50"}"#, "data")
            .unwrap()
            .is_empty());
        assert!(decode_snapshot(r#"{"data": null}"#, "data")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn custom_data_field_is_honoured() {
        let snapshot = decode_snapshot(r#"{"rows": [{"symbol": "TCS"}]}"#, "rows").unwrap();
        assert_eq!(snapshot.records()[0]["symbol"], "TCS");
    }

    #[test]
    fn non_json_body_is_a_parse_failure() {
        let err = decode_snapshot("<html><body>Access Denied</body></html>", "data").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
    }

    #[test]
    fn wrong_shapes_are_parse_failures() {
        for body in [
            r#"[{"symbol": "TCS"}]"#,
            r#"{"data": {"symbol": "TCS"}}"#,
            r#"{"data": [{"symbol": "TCS"}, "INFY"]}"#,
        ] {
            let err = decode_snapshot(body, "data").unwrap_err();
            assert_eq!(err.kind(), FailureKind::Parse, "body {body}");
        }
    }

    #[test]
    fn failure_message_names_offending_element() {
        let err = decode_snapshot(r#"{"data": [{"a": 1}, 7]}"#, "data").unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("element 1") && message.contains("a number"),
            "unexpected error message: {message}"
        );
    }
}
