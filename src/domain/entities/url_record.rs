//! URL record entity and the per-user listing item.

use serde::{Deserialize, Serialize};

/// A stored mapping between a short code and an original URL.
///
/// `code` and `owner` never change once assigned. `tombstoned` only moves
/// from `false` to `true`; records are never physically removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub code: i64,
    pub original_url: String,
    pub owner: String,
    pub tombstoned: bool,
}

impl UrlRecord {
    /// Creates a live record.
    pub fn new(code: i64, original_url: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            code,
            original_url: original_url.into(),
            owner: owner.into(),
            tombstoned: false,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.tombstoned
    }
}

/// One entry of a user's URL listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

impl UserUrl {
    pub fn new(short_url: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            original_url: original_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_live() {
        let record = UrlRecord::new(1, "https://example.com/", "user-1");

        assert_eq!(record.code, 1);
        assert_eq!(record.original_url, "https://example.com/");
        assert_eq!(record.owner, "user-1");
        assert!(record.is_live());
    }

    #[test]
    fn test_user_url_json_shape() {
        let item = UserUrl::new("http://host/1", "https://example.com/");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["short_url"], "http://host/1");
        assert_eq!(json["original_url"], "https://example.com/");
    }
}
