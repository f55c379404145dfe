//! Delete request model for asynchronous soft deletion.

use serde::Deserialize;

/// A user's request to tombstone some of their short codes.
///
/// Produced once per caller-facing delete call and handed to the
/// [`crate::domain::delete_worker`] queue. The caller is acknowledged as soon
/// as the request is enqueued; the tombstones are applied later in a batch.
///
/// # Ownership
///
/// Only codes owned by `user_id` are affected. Unknown codes and codes owned
/// by other users are skipped when the batch is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub user_id: String,
    pub codes: Vec<i64>,
}

/// A code as it may appear in a request body: `"12"` or `12`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(i64),
    Text(String),
}

impl DeleteRequest {
    pub fn new(user_id: impl Into<String>, codes: Vec<i64>) -> Self {
        Self {
            user_id: user_id.into(),
            codes,
        }
    }

    /// Parses a JSON array body such as `["1", "2", 3]` into ordered codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON array or an element is not
    /// an integer (or a string holding one).
    pub fn parse_codes(body: &[u8]) -> Result<Vec<i64>, serde_json::Error> {
        let raw: Vec<RawCode> = serde_json::from_slice(body)?;

        raw.into_iter()
            .map(|code| match code {
                RawCode::Number(n) => Ok(n),
                RawCode::Text(s) => s.trim().parse::<i64>().map_err(|e| {
                    <serde_json::Error as serde::de::Error>::custom(format!(
                        "invalid short code {s:?}: {e}"
                    ))
                }),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_request_creation() {
        let request = DeleteRequest::new("user-1", vec![3, 1, 2]);

        assert_eq!(request.user_id, "user-1");
        assert_eq!(request.codes, vec![3, 1, 2]);
        assert!(!request.is_empty());
    }

    #[test]
    fn test_parse_codes_strings_and_numbers() {
        let codes = DeleteRequest::parse_codes(br#"["5", 7, " 9 "]"#).unwrap();
        assert_eq!(codes, vec![5, 7, 9]);
    }

    #[test]
    fn test_parse_codes_empty_array() {
        let codes = DeleteRequest::parse_codes(b"[]").unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn test_parse_codes_rejects_garbage() {
        assert!(DeleteRequest::parse_codes(br#"["abc"]"#).is_err());
        assert!(DeleteRequest::parse_codes(br#"{"id": 1}"#).is_err());
        assert!(DeleteRequest::parse_codes(b"1,2,3").is_err());
    }
}
