use crate::model::fs::FSError;

#[derive(Debug, PartialEq, Eq)]
pub enum Provider {
    AWS,
    GCS,
}

impl Provider {
    pub fn is_aws(&self) -> bool {
        matches!(self, Provider::AWS)
    }

    pub fn is_gcs(&self) -> bool {
        matches!(self, Provider::GCS)
    }
}

pub fn parse_provider_from_uri(bucket_uri: &str) -> Result<Provider, FSError> {
    if bucket_uri.starts_with("s3://") {
        Ok(Provider::AWS)
    } else if bucket_uri.starts_with("gs://") {
        Ok(Provider::GCS)
    } else {
        Err(FSError::Unsupported {
            message: format!("failed to parse provider of: {}", bucket_uri),
        })
    }
}

fn strip_scheme(bucket_uri: &str) -> &str {
    bucket_uri.split_once("://").map(|(_, rest)| rest).unwrap_or("")
}

pub fn parse_bucket_from_uri(bucket_uri: &str) -> &str {
    let rest = strip_scheme(bucket_uri);
    rest.split_once('/').map(|(bucket, _)| bucket).unwrap_or(rest)
}

/// Everything after the bucket, verbatim. `gs://bucket/a/b/` gives `a/b/`.
pub fn parse_prefix_from_uri(bucket_uri: &str) -> &str {
    strip_scheme(bucket_uri)
        .split_once('/')
        .map(|(_, prefix)| prefix)
        .unwrap_or("")
}
