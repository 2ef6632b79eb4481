use std::{fmt::Debug, io::Read};

use google_cloud_storage::http::{
    self,
    object_access_controls::{list::ListObjectAccessControlsRequest, PredefinedObjectAcl},
    objects::{
        copy::CopyObjectRequest,
        delete::DeleteObjectRequest,
        download::Range,
        get::GetObjectRequest,
        list::ListObjectsRequest,
        rewrite::RewriteObjectRequest,
        upload::{Media, UploadObjectRequest, UploadType},
        Object,
    },
};

use crate::{adapters, model, model::visibility::Visibility, util};

fn map_error(call: &str, key: &str, err: http::Error) -> model::fs::FSError {
    if let http::Error::Response(res) = &err {
        if res.code == 404 {
            return model::fs::FSError::not_found(key);
        }
    }

    model::fs::FSError::backend(format!("failed to {} at: {}, {}", call, key, err))
}

fn to_fs_object(obj: Object) -> model::fs::FSObject {
    model::fs::FSObject {
        key: obj.name,
        size: obj.size,
        content_type: obj.content_type,
        updated: obj.updated,
    }
}

fn predefined_acl(visibility: Visibility) -> PredefinedObjectAcl {
    match visibility {
        Visibility::AuthenticatedRead => PredefinedObjectAcl::AuthenticatedRead,
        Visibility::BucketOwnerFullControl => PredefinedObjectAcl::BucketOwnerFullControl,
        Visibility::BucketOwnerRead => PredefinedObjectAcl::BucketOwnerRead,
        Visibility::Private => PredefinedObjectAcl::Private,
        Visibility::ProjectPrivate => PredefinedObjectAcl::ProjectPrivate,
        Visibility::PublicRead => PredefinedObjectAcl::PublicRead,
    }
}

/// Rewrites the object onto itself with a predefined ACL, which replaces the
/// object's whole ACL. Patch requests only accept the bucket-level ACL set.
fn set_acl_request(bucket: &str, key: &str, visibility: Visibility) -> RewriteObjectRequest {
    RewriteObjectRequest {
        source_bucket: bucket.to_string(),
        source_object: key.to_string(),
        destination_bucket: bucket.to_string(),
        destination_object: key.to_string(),
        destination_predefined_object_acl: Some(predefined_acl(visibility)),
        ..Default::default()
    }
}

fn acl_entries<R: Debug>(
    acls: impl IntoIterator<Item = (String, R)>,
) -> Vec<model::fs::FSAclEntry> {
    acls.into_iter()
        .map(|(entity, role)| model::fs::FSAclEntry {
            entity,
            role: format!("{:?}", role),
        })
        .collect()
}

impl adapters::Object for google_cloud_storage::client::Client {
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        let obj = util::poll::poll_until_ready_error(self.upload_object(
            &req,
            body,
            &UploadType::Simple(Media::new(key.to_string())),
        ))
        .map_err(|err| map_error("upload_object", key, err))?;

        Ok(to_fs_object(obj))
    }

    fn fs_put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        let chunks = futures::stream::iter(util::stream::ReadChunks::new(body));

        let obj = util::poll::poll_until_ready_error(self.upload_streamed_object(
            &req,
            chunks,
            &UploadType::Simple(Media::new(key.to_string())),
        ))
        .map_err(|err| map_error("upload_streamed_object", key, err))?;

        Ok(to_fs_object(obj))
    }

    fn fs_download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        let req = GetObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        util::poll::poll_until_ready_error(self.download_object(&req, &Range::default()))
            .map_err(|err| map_error("download_object", key, err))
    }

    fn fs_download_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, model::fs::FSError> {
        let req = GetObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        let stream = util::poll::poll_until_ready_error(
            self.download_streamed_object(&req, &Range::default()),
        )
        .map_err(|err| map_error("download_streamed_object", key, err))?;

        Ok(Box::new(util::stream::StreamReader::new(Box::pin(stream))))
    }

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        let req = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        util::poll::poll_until_ready_error(self.delete_object(&req))
            .map_err(|err| map_error("delete_object", key, err))
    }

    fn fs_object_exists(&self, bucket: &str, key: &str) -> Result<bool, model::fs::FSError> {
        match self.fs_head_object(bucket, key) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = GetObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        let obj = util::poll::poll_until_ready_error(self.get_object(&req))
            .map_err(|err| map_error("get_object", key, err))?;

        Ok(to_fs_object(obj))
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        new_key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = CopyObjectRequest {
            source_bucket: bucket.to_string(),
            source_object: key.to_string(),
            destination_bucket: bucket.to_string(),
            destination_object: new_key.to_string(),
            ..Default::default()
        };

        let obj = util::poll::poll_until_ready_error(self.copy_object(&req))
            .map_err(|err| map_error("copy_object", key, err))?;

        Ok(to_fs_object(obj))
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<model::fs::FSObject>, model::fs::FSError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let req = ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: prefix.map(|p| p.to_string()),
                page_token: continuation_token.clone(),
                ..Default::default()
            };

            let lo = util::poll::poll_until_ready_error(self.list_objects(&req)).map_err(|err| {
                model::fs::FSError::backend(format!(
                    "failed to list_objects at: {}, {}",
                    prefix.unwrap_or(""),
                    err
                ))
            })?;

            if let Some(objs) = lo.items {
                objects.extend(objs.into_iter().map(to_fs_object));
            }

            continuation_token = lo.next_page_token;
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::fs::FSAclEntry>, model::fs::FSError> {
        let req = ListObjectAccessControlsRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        let acls = util::poll::poll_until_ready_error(self.list_object_access_controls(&req))
            .map_err(|err| map_error("list_object_access_controls", key, err))?;

        Ok(acl_entries(acls.items.into_iter().map(|acl| (acl.entity, acl.role))))
    }

    fn fs_set_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), model::fs::FSError> {
        let mut req = set_acl_request(bucket, key, visibility);

        loop {
            let res = util::poll::poll_until_ready_error(self.rewrite_object(&req))
                .map_err(|err| map_error("rewrite_object", key, err))?;

            if res.done {
                break;
            }
            req.rewrite_token = res.rewrite_token;
        }

        Ok(())
    }
}
