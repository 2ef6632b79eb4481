use std::{
    collections::{BTreeMap, HashSet},
    io::{Cursor, Read},
    sync::Mutex,
};

use time::OffsetDateTime;

use crate::{adapters, model, model::visibility::Visibility};

#[derive(Clone, Debug)]
pub struct MockObject {
    pub body: Vec<u8>,
    pub acl: Vec<model::fs::FSAclEntry>,
    pub updated: OffsetDateTime,
}

/// In-memory bucket. Records every backend call as `<call> <bucket>/<key>`
/// and fails deletes of keys listed in `fail_delete`.
#[derive(Default)]
pub struct MemoryClient {
    pub objects: Mutex<BTreeMap<(String, String), MockObject>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_delete: Mutex<HashSet<String>>,
}

fn owner_acl() -> Vec<model::fs::FSAclEntry> {
    vec![model::fs::FSAclEntry {
        entity: "user-owner".to_string(),
        role: "OWNER".to_string(),
    }]
}

fn predefined_acl(visibility: Visibility) -> Vec<model::fs::FSAclEntry> {
    let mut acl = owner_acl();
    let reader = match visibility {
        Visibility::AuthenticatedRead => Some("allAuthenticatedUsers"),
        Visibility::BucketOwnerRead => Some("project-owners"),
        Visibility::BucketOwnerFullControl => {
            acl.push(model::fs::FSAclEntry {
                entity: "project-owners".to_string(),
                role: "OWNER".to_string(),
            });
            None
        }
        Visibility::Private => None,
        Visibility::ProjectPrivate => Some("project-viewers"),
        Visibility::PublicRead => Some("allUsers"),
    };

    if let Some(entity) = reader {
        acl.push(model::fs::FSAclEntry {
            entity: entity.to_string(),
            role: "READER".to_string(),
        });
    }

    acl
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(bucket: &str, objects: &[(&str, &str)]) -> Self {
        let client = Self::new();
        {
            let mut lock_objects = client.objects.lock().unwrap();
            for (key, body) in objects {
                lock_objects.insert(
                    (bucket.to_string(), key.to_string()),
                    MockObject {
                        body: body.as_bytes().to_vec(),
                        acl: owner_acl(),
                        updated: OffsetDateTime::UNIX_EPOCH,
                    },
                );
            }
        }

        client
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete.lock().unwrap().insert(key.to_string());
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str, bucket: &str, key: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}/{}", call, bucket, key));
    }

    fn get(&self, bucket: &str, key: &str) -> Result<MockObject, model::fs::FSError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| model::fs::FSError::not_found(key))
    }

    fn describe(key: &str, object: &MockObject) -> model::fs::FSObject {
        model::fs::FSObject {
            key: key.to_string(),
            size: object.body.len() as i64,
            content_type: Some("application/octet-stream".to_string()),
            updated: Some(object.updated),
        }
    }

    fn insert(&self, bucket: &str, key: &str, body: Vec<u8>) -> model::fs::FSObject {
        let object = MockObject {
            body,
            acl: owner_acl(),
            updated: OffsetDateTime::now_utc(),
        };
        let described = Self::describe(key, &object);

        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), object);

        described
    }
}

impl adapters::Object for MemoryClient {
    fn fs_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.record("put_object", bucket, key);
        Ok(self.insert(bucket, key, body))
    }

    fn fs_put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        mut body: Box<dyn Read + Send + Sync>,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.record("put_object_stream", bucket, key);

        let mut buf = Vec::new();
        body.read_to_end(&mut buf)?;

        Ok(self.insert(bucket, key, buf))
    }

    fn fs_download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, model::fs::FSError> {
        self.record("download_object", bucket, key);
        Ok(self.get(bucket, key)?.body)
    }

    fn fs_download_object_stream(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Box<dyn Read + Send>, model::fs::FSError> {
        self.record("download_object_stream", bucket, key);
        Ok(Box::new(Cursor::new(self.get(bucket, key)?.body)))
    }

    fn fs_delete_object(&self, bucket: &str, key: &str) -> Result<(), model::fs::FSError> {
        self.record("delete_object", bucket, key);

        if self.fail_delete.lock().unwrap().contains(key) {
            return Err(model::fs::FSError::backend(format!(
                "failed to delete_object at: {}, 403 forbidden",
                key
            )));
        }

        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| model::fs::FSError::not_found(key))
    }

    fn fs_object_exists(&self, bucket: &str, key: &str) -> Result<bool, model::fs::FSError> {
        self.record("object_exists", bucket, key);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    fn fs_head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.record("head_object", bucket, key);
        Ok(Self::describe(key, &self.get(bucket, key)?))
    }

    fn fs_copy_object(
        &self,
        bucket: &str,
        key: &str,
        new_key: &str,
    ) -> Result<model::fs::FSObject, model::fs::FSError> {
        self.record("copy_object", bucket, key);
        let object = self.get(bucket, key)?;
        Ok(self.insert(bucket, new_key, object.body))
    }

    fn fs_list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<model::fs::FSObject>, model::fs::FSError> {
        self.record("list_objects", bucket, prefix.unwrap_or(""));

        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix.unwrap_or("")))
            .map(|((_, k), o)| Self::describe(k, o))
            .collect())
    }

    fn fs_get_object_acl(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<model::fs::FSAclEntry>, model::fs::FSError> {
        self.record("get_object_acl", bucket, key);
        Ok(self.get(bucket, key)?.acl)
    }

    fn fs_set_object_acl(
        &self,
        bucket: &str,
        key: &str,
        visibility: Visibility,
    ) -> Result<(), model::fs::FSError> {
        self.record("set_object_acl", bucket, key);

        let mut lock_objects = self.objects.lock().unwrap();
        let object = lock_objects
            .get_mut(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| model::fs::FSError::not_found(key))?;
        object.acl = predefined_acl(visibility);

        Ok(())
    }
}
