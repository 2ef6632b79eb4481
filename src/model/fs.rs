use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum FSError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("{message}")]
    Backend { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FSError {
    pub fn not_found(key: &str) -> Self {
        FSError::NotFound {
            key: key.to_string(),
        }
    }

    pub fn backend(message: String) -> Self {
        FSError::Backend { message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FSError::NotFound { .. })
    }
}

/// Backend-owned metadata of a stored object. `key` is the full backend key,
/// path prefix included.
#[derive(Clone, Debug, PartialEq)]
pub struct FSObject {
    pub key: String,
    pub size: i64,
    pub content_type: Option<String>,
    pub updated: Option<OffsetDateTime>,
}

impl FSObject {
    pub fn timestamp(&self) -> Option<i64> {
        self.updated.map(|u| u.unix_timestamp())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FSAclEntry {
    pub entity: String,
    pub role: String,
}

/// One listed object. `path` is the raw backend key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FSEntry {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        let cases = vec![
            (None, None),
            (Some(OffsetDateTime::UNIX_EPOCH), Some(0)),
            (
                Some(OffsetDateTime::from_unix_timestamp(1_581_031_712).unwrap()),
                Some(1_581_031_712),
            ),
        ];

        for (updated, expected) in cases {
            let object = FSObject {
                key: "key".to_string(),
                size: 0,
                content_type: None,
                updated,
            };
            assert_eq!(object.timestamp(), expected, "failed for case: {:?}", updated);
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(FSError::not_found("a").is_not_found());
        assert!(!FSError::backend("boom".to_string()).is_not_found());
        assert!(!FSError::Unsupported {
            message: "nope".to_string()
        }
        .is_not_found());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(FSError::not_found("dir/a").to_string(), "object not found: dir/a");
        assert_eq!(
            FSError::backend("failed to get_object at: a, 403".to_string()).to_string(),
            "failed to get_object at: a, 403"
        );
    }
}
