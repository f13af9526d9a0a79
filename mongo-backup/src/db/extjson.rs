//! Lossless JSON encoding of documents.
//!
//! Export files hold canonical Extended JSON v2, so dates, binary data,
//! object ids, decimals and the distinction between int32, int64 and double
//! all survive a round trip through [`encode_documents`] and
//! [`decode_documents`].

use mongodb::bson::{extjson, Bson, Document};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid Extended JSON at index {index}: {source}")]
    ExtJson {
        index: usize,
        #[source]
        source: extjson::de::Error,
    },

    #[error("element at index {0} is not a document")]
    NotADocument(usize),
}

/// Encode one document as canonical Extended JSON.
pub fn encode_document(document: Document) -> Value {
    Bson::Document(document).into_canonical_extjson()
}

/// Encode documents as a JSON array of canonical Extended JSON objects.
pub fn encode_documents(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(encode_document).collect())
}

/// Decode a JSON array produced by [`encode_documents`].
pub fn decode_documents(json: &str) -> Result<Vec<Document>, DecodeError> {
    let values: Vec<Value> = serde_json::from_str(json)?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match Bson::try_from(value) {
            Ok(Bson::Document(document)) => Ok(document),
            Ok(_) => Err(DecodeError::NotADocument(index)),
            Err(source) => Err(DecodeError::ExtJson { index, source }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::spec::BinarySubtype;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::{doc, Binary, DateTime};

    fn sample() -> Document {
        doc! {
            "_id": ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap(),
            "created_at": DateTime::from_millis(1_704_164_645_123),
            "name": "Ana",
            "count": 42_i32,
            "views": 9_007_199_254_740_993_i64,
            "ratio": 0.25_f64,
            "active": true,
            "deleted_at": Bson::Null,
            "payload": Binary { subtype: BinarySubtype::Generic, bytes: vec![0, 1, 2, 254, 255] },
            "address": {
                "city": "Lisboa",
                "geo": { "lat": 38.72_f64, "lng": (-9.14_f64) },
            },
            "tags": ["a", 1_i32, { "nested": true }],
        }
    }

    #[test]
    fn test_round_trip_preserves_values_and_types() {
        let original = sample();
        let json = serde_json::to_string_pretty(&encode_documents(vec![original.clone()])).unwrap();

        let decoded = decode_documents(&json).unwrap();
        assert_eq!(decoded, vec![original]);

        let first = &decoded[0];
        assert!(matches!(first.get("_id"), Some(Bson::ObjectId(_))));
        assert!(matches!(first.get("created_at"), Some(Bson::DateTime(_))));
        assert!(matches!(first.get("count"), Some(Bson::Int32(42))));
        assert!(matches!(first.get("views"), Some(Bson::Int64(_))));
        assert!(matches!(first.get("address"), Some(Bson::Document(_))));
    }

    #[test]
    fn test_object_id_is_typed_not_plain_string() {
        let value = encode_document(doc! { "_id": ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap() });
        assert_eq!(value["_id"]["$oid"], "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_date_is_typed() {
        let value = encode_document(doc! { "at": DateTime::from_millis(0) });
        assert!(value["at"].get("$date").is_some());
    }

    #[test]
    fn test_decode_rejects_non_document_elements() {
        let result = decode_documents("[{\"a\": {\"$numberInt\": \"1\"}}, 5]");
        assert!(matches!(result, Err(DecodeError::NotADocument(1))));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(decode_documents("[{"), Err(DecodeError::Json(_))));
    }
}
