use std::io::Read;

use tracing::{error, info, span, Level};

use crate::{
    model::{
        fs::{FSAclEntry, FSEntry, FSError, FSObject},
        visibility::Visibility,
    },
    storage,
};

/// Generic file storage contract. Paths are relative to the driver's root.
pub trait StorageDriver {
    fn write(&self, path: &str, contents: Vec<u8>) -> Result<FSObject, FSError>;

    fn write_stream(
        &self,
        path: &str,
        contents: Box<dyn Read + Send + Sync>,
    ) -> Result<FSObject, FSError>;

    fn update(&self, path: &str, contents: Vec<u8>) -> Result<FSObject, FSError>;

    fn update_stream(
        &self,
        path: &str,
        contents: Box<dyn Read + Send + Sync>,
    ) -> Result<FSObject, FSError>;

    fn read(&self, path: &str) -> Result<Vec<u8>, FSError>;

    fn read_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, FSError>;

    /// `Ok(false)` when there was nothing to delete.
    fn delete(&self, path: &str) -> Result<bool, FSError>;

    fn delete_dir(&self, dirname: &str) -> Result<bool, FSError>;

    fn create_dir(&self, dirname: &str) -> Result<(), FSError>;

    fn has(&self, path: &str) -> Result<bool, FSError>;

    fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<FSEntry>, FSError>;

    fn get_metadata(&self, path: &str) -> Result<FSObject, FSError>;

    fn get_size(&self, path: &str) -> Result<i64, FSError>;

    fn get_mimetype(&self, path: &str) -> Result<Option<String>, FSError>;

    /// Unix seconds of the last update.
    fn get_timestamp(&self, path: &str) -> Result<Option<i64>, FSError>;

    fn get_visibility(&self, path: &str) -> Result<Vec<FSAclEntry>, FSError>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<Visibility, FSError>;

    fn copy(&self, path: &str, new_path: &str) -> Result<FSObject, FSError>;

    fn rename(&self, path: &str, new_path: &str) -> Result<FSObject, FSError>;
}

impl StorageDriver for storage::StorageAdapter {
    fn write(&self, path: &str, contents: Vec<u8>) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "write", context = "write");
        let _e = span.enter();
        info!(path = path, size = contents.len(), "called");

        self.upload(path, contents)
    }

    fn write_stream(
        &self,
        path: &str,
        contents: Box<dyn Read + Send + Sync>,
    ) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "write_stream", context = "write_stream");
        let _e = span.enter();
        info!(path = path, "called");

        self.upload_stream(path, contents)
    }

    fn update(&self, path: &str, contents: Vec<u8>) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "update", context = "update");
        let _e = span.enter();
        info!(path = path, size = contents.len(), "called");

        self.upload(path, contents)
    }

    fn update_stream(
        &self,
        path: &str,
        contents: Box<dyn Read + Send + Sync>,
    ) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "update_stream", context = "update_stream");
        let _e = span.enter();
        info!(path = path, "called");

        self.upload_stream(path, contents)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FSError> {
        let span = span!(Level::INFO, "read", context = "read");
        let _e = span.enter();
        info!(path = path, "called");

        self.client
            .fs_download_object(&self.bucket, &self.apply_path_prefix(path))
            .map_err(|err| {
                error!(error_message=%err, error_group="download_object");
                err
            })
    }

    fn read_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, FSError> {
        let span = span!(Level::INFO, "read_stream", context = "read_stream");
        let _e = span.enter();
        info!(path = path, "called");

        self.client
            .fs_download_object_stream(&self.bucket, &self.apply_path_prefix(path))
            .map_err(|err| {
                error!(error_message=%err, error_group="download_object_stream");
                err
            })
    }

    fn delete(&self, path: &str) -> Result<bool, FSError> {
        let span = span!(Level::INFO, "delete", context = "delete");
        let _e = span.enter();
        info!(path = path, "called");

        match self
            .client
            .fs_delete_object(&self.bucket, &self.apply_path_prefix(path))
        {
            Err(err) if err.is_not_found() => {
                info!(path = path, "nothing to delete");
                Ok(false)
            }
            Err(err) => {
                error!(error_message=%err, error_group="delete_object");
                Err(err)
            }
            Ok(()) => Ok(true),
        }
    }

    // Deletes one by one; the first failure stops the rest and the objects
    // already deleted stay deleted.
    fn delete_dir(&self, dirname: &str) -> Result<bool, FSError> {
        let span = span!(Level::INFO, "delete_dir", context = "delete_dir");
        let _e = span.enter();
        info!(dirname = dirname, "called");

        let prefix = format!("{}/", self.apply_path_prefix(dirname));
        let objects = self
            .client
            .fs_list_objects(&self.bucket, Some(&prefix))
            .map_err(|err| {
                error!(error_message=%err, error_group="list_objects");
                err
            })?;

        for obj in objects {
            self.client
                .fs_delete_object(&self.bucket, &obj.key)
                .map_err(|err| {
                    error!(error_message=%err, error_group="delete_object", key = %obj.key);
                    err
                })?;
        }

        Ok(true)
    }

    fn create_dir(&self, dirname: &str) -> Result<(), FSError> {
        let span = span!(Level::INFO, "create_dir", context = "create_dir");
        let _e = span.enter();
        info!(dirname = dirname, "called");

        Err(FSError::Unsupported {
            message: format!(
                "directories are created as needed when writing files, path: {}",
                dirname
            ),
        })
    }

    fn has(&self, path: &str) -> Result<bool, FSError> {
        let span = span!(Level::INFO, "has", context = "has");
        let _e = span.enter();
        info!(path = path, "called");

        self.client
            .fs_object_exists(&self.bucket, &self.apply_path_prefix(path))
            .map_err(|err| {
                error!(error_message=%err, error_group="object_exists");
                err
            })
    }

    fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<FSEntry>, FSError> {
        let span = span!(Level::INFO, "list_contents", context = "list_contents");
        let _e = span.enter();
        info!(directory = directory, recursive = recursive, "called");

        // Object keys are flat, so every listing is already recursive.
        let prefix = self.directory_prefix(directory);
        let objects = self
            .client
            .fs_list_objects(&self.bucket, prefix.as_deref())
            .map_err(|err| {
                error!(error_message=%err, error_group="list_objects");
                err
            })?;

        Ok(objects
            .into_iter()
            .map(|obj| FSEntry { path: obj.key })
            .collect())
    }

    fn get_metadata(&self, path: &str) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "get_metadata", context = "get_metadata");
        let _e = span.enter();
        info!(path = path, "called");

        self.client
            .fs_head_object(&self.bucket, &self.apply_path_prefix(path))
            .map_err(|err| {
                error!(error_message=%err, error_group="head_object");
                err
            })
    }

    fn get_size(&self, path: &str) -> Result<i64, FSError> {
        Ok(self.get_metadata(path)?.size)
    }

    fn get_mimetype(&self, path: &str) -> Result<Option<String>, FSError> {
        Ok(self.get_metadata(path)?.content_type)
    }

    fn get_timestamp(&self, path: &str) -> Result<Option<i64>, FSError> {
        Ok(self.get_metadata(path)?.timestamp())
    }

    fn get_visibility(&self, path: &str) -> Result<Vec<FSAclEntry>, FSError> {
        let span = span!(Level::INFO, "get_visibility", context = "get_visibility");
        let _e = span.enter();
        info!(path = path, "called");

        self.client
            .fs_get_object_acl(&self.bucket, &self.apply_path_prefix(path))
            .map_err(|err| {
                error!(error_message=%err, error_group="get_object_acl");
                err
            })
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<Visibility, FSError> {
        let span = span!(Level::INFO, "set_visibility", context = "set_visibility");
        let _e = span.enter();
        info!(path = path, visibility = %visibility, "called");

        self.client
            .fs_set_object_acl(&self.bucket, &self.apply_path_prefix(path), visibility)
            .map_err(|err| {
                error!(error_message=%err, error_group="set_object_acl");
                err
            })?;

        Ok(visibility)
    }

    fn copy(&self, path: &str, new_path: &str) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "copy", context = "copy");
        let _e = span.enter();
        info!(path = path, new_path = new_path, "called");

        self.move_object(path, new_path, false)
    }

    fn rename(&self, path: &str, new_path: &str) -> Result<FSObject, FSError> {
        let span = span!(Level::INFO, "rename", context = "rename");
        let _e = span.enter();
        info!(path = path, new_path = new_path, "called");

        self.move_object(path, new_path, true)
    }
}
