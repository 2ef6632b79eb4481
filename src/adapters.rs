use std::{io::Read, sync::Arc};

use crate::model::{self, visibility::Visibility};

pub mod gcs;
#[cfg(test)]
pub mod mock;
pub mod s3;

/// Outbound contract with an object-storage client. Keys are full backend
/// keys; a missing object must surface as `FSError::NotFound`.
pub trait Object: Send + Sync {
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError>;

    fn fs_put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError>;

    fn fs_download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError>;

    fn fs_download_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, model::fs::FSError>;

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError>;

    fn fs_object_exists(&self, bucket: &str, key: &str) -> Result<bool, model::fs::FSError>;

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError>;

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        new_key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError>;

    /// `None` lists the whole bucket.
    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<model::fs::FSObject>, model::fs::FSError>;

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::fs::FSAclEntry>, model::fs::FSError>;

    fn fs_set_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), model::fs::FSError>;
}

impl<T: Object + ?Sized> Object for Arc<T> {
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        (**self).fs_put_object(bucket, key, body)
    }

    fn fs_put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        (**self).fs_put_object_stream(bucket, key, body)
    }

    fn fs_download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        (**self).fs_download_object(bucket, key)
    }

    fn fs_download_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, model::fs::FSError> {
        (**self).fs_download_object_stream(bucket, key)
    }

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        (**self).fs_delete_object(bucket, key)
    }

    fn fs_object_exists(&self, bucket: &str, key: &str) -> Result<bool, model::fs::FSError> {
        (**self).fs_object_exists(bucket, key)
    }

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        (**self).fs_head_object(bucket, key)
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        new_key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        (**self).fs_copy_object(bucket, key, new_key)
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<model::fs::FSObject>, model::fs::FSError> {
        (**self).fs_list_objects(bucket, prefix)
    }

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::fs::FSAclEntry>, model::fs::FSError> {
        (**self).fs_get_object_acl(bucket, key)
    }

    fn fs_set_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), model::fs::FSError> {
        (**self).fs_set_object_acl(bucket, key, visibility)
    }
}
