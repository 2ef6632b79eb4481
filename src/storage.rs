use std::io::Read;

use tracing::{error, info};

use crate::{adapters, model};

/// Storage over one bucket, every logical path living under `prefix`.
/// Directories are only key prefixes ending in `/`.
pub struct StorageAdapter {
    pub client: Box<dyn adapters::Object>,
    pub bucket: String,
    pub prefix: String,
}

impl StorageAdapter {
    pub fn new(client: Box<dyn adapters::Object>, bucket: &str, prefix: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Plain concatenation. `prefix` is expected to carry its own separator.
    pub fn apply_path_prefix(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }

    /// Listing prefix for `dirname`. An empty `dirname` gives `None`, the
    /// whole bucket, whatever the path prefix.
    pub fn directory_prefix(&self, dirname: &str) -> Option<String> {
        if dirname.is_empty() {
            return None;
        }

        Some(format!("{}/", self.apply_path_prefix(dirname)))
    }

    pub fn upload(
        &self,
        path: &str,
        contents: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.client
            .fs_put_object(&self.bucket, &self.apply_path_prefix(path), contents)
            .map_err(|err| {
                error!(error_message=%err, error_group="put_object");
                err
            })
    }

    pub fn upload_stream(
        &self,
        path: &str,
        contents: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.client
            .fs_put_object_stream(&self.bucket, &self.apply_path_prefix(path), contents)
            .map_err(|err| {
                error!(error_message=%err, error_group="put_object_stream");
                err
            })
    }

    /// Server-side copy, then delete of the source when `delete` is set. A
    /// failed delete leaves the object under both keys.
    pub fn move_object(
        &self,
        path: &str,
        new_path: &str,
        delete: bool,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let key = self.apply_path_prefix(path);
        let new_key = self.apply_path_prefix(new_path);

        let new_object = self
            .client
            .fs_copy_object(&self.bucket, &key, &new_key)
            .map_err(|err| {
                error!(error_message=%err, error_group="copy_object");
                err
            })?;
        info!(key = %key, new_key = %new_key, "copied");

        if delete {
            self.client.fs_delete_object(&self.bucket, &key).map_err(|err| {
                error!(error_message=%err, error_group="delete_object", key = %key);
                err
            })?;
        }

        Ok(new_object)
    }
}
