use std::{fmt::Debug, io::Read};

use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime},
    types::ObjectCannedAcl,
};
use time::OffsetDateTime;

use crate::{adapters, model, model::visibility::Visibility, util};

fn map_error<E, R>(call: &str, key: &str, err: SdkError<E, R>) -> model::fs::FSError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    if matches!(err.code(), Some("NoSuchKey") | Some("NotFound")) {
        return model::fs::FSError::not_found(key);
    }

    model::fs::FSError::backend(format!(
        "failed to {} at: {}, {}",
        call,
        key,
        DisplayErrorContext(&err)
    ))
}

fn to_offset_date_time(last_modified: Option<&DateTime>) -> Option<OffsetDateTime> {
    let lm = last_modified?;
    let secs = OffsetDateTime::from_unix_timestamp(lm.secs()).ok()?;

    Some(secs.replace_nanosecond(lm.subsec_nanos()).unwrap_or(secs))
}

impl adapters::Object for aws_sdk_s3::Client {
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body));

        util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("put_object", key, err))?;

        self.fs_head_object(bucket, key)
    }

    // PutObject needs a content length up front.
    fn fs_put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        mut body: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf)?;

        self.fs_put_object(bucket, key, buf)
    }

    fn fs_download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        let req = self.get_object().bucket(bucket).key(key);

        let o = util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("get_object", key, err))?;

        let bytes = util::poll::poll_until_ready_error(o.body.collect()).map_err(|err| {
            model::fs::FSError::backend(format!("failed to collect body: {}, {}", key, err))
        })?;

        Ok(bytes.into_bytes().to_vec())
    }

    fn fs_download_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, model::fs::FSError> {
        let req = self.get_object().bucket(bucket).key(key);

        let o = util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("get_object", key, err))?;

        let chunks = futures::stream::unfold(o.body, |mut body| async move {
            body.next().await.map(|chunk| (chunk, body))
        });

        Ok(Box::new(util::stream::StreamReader::new(Box::pin(chunks))))
    }

    // DeleteObject succeeds on missing keys, so existence is checked first.
    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        // DeleteObject succeeds on missing keys.
        self.fs_head_object(bucket, key)?;

        let req = self.delete_object().bucket(bucket).key(key);

        util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("delete_object", key, err))?;

        Ok(())
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
        let req = self.head_object().bucket(bucket).key(key);

        let ho = util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("head_object", key, err))?;

        Ok(model::fs::FSObject {
            key: key.to_string(),
            size: ho.content_length().unwrap_or(0),
            content_type: ho.content_type().map(|ct| ct.to_string()),
            updated: to_offset_date_time(ho.last_modified()),
        })
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        new_key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        let req = self
            .copy_object()
            .bucket(bucket)
            .copy_source(format!("{}/{}", bucket, key))
            .key(new_key);

        util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("copy_object", key, err))?;

        self.fs_head_object(bucket, new_key)
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<model::fs::FSObject>, model::fs::FSError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.list_objects_v2().bucket(bucket);

            if let Some(p) = prefix {
                req = req.prefix(p);
            }

            if let Some(tok) = continuation_token {
                req = req.continuation_token(tok);
            }

            let lo = util::poll::poll_until_ready_error(req.send())
                .map_err(|err| map_error("list_objects", prefix.unwrap_or(""), err))?;

            for o in lo.contents() {
                objects.push(model::fs::FSObject {
                    key: o.key().unwrap_or("").to_string(),
                    size: o.size().unwrap_or(0),
                    content_type: None,
                    updated: to_offset_date_time(o.last_modified()),
                });
            }

            continuation_token = lo.next_continuation_token().map(|tok| tok.to_string());
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
        let req = self.get_object_acl().bucket(bucket).key(key);

        let acl = util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("get_object_acl", key, err))?;

        Ok(acl
            .grants()
            .iter()
            .map(|grant| {
                let entity = grant
                    .grantee()
                    .and_then(|g| g.uri().or(g.id()).or(g.email_address()))
                    .unwrap_or("");

                model::fs::FSAclEntry {
                    entity: entity.to_string(),
                    role: grant
                        .permission()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_default(),
                }
            })
            .collect())
    }

    fn fs_set_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), model::fs::FSError> {
        let canned = visibility
            .canned_acl()
            .ok_or_else(|| model::fs::FSError::Unsupported {
                message: format!("no s3 canned acl for visibility: {}", visibility),
            })?;

        let req = self
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(canned));

        util::poll::poll_until_ready_error(req.send())
            .map_err(|err| map_error("put_object_acl", key, err))?;

        Ok(())
    }
}
