use std::{fmt, str::FromStr};

use crate::model::fs::FSError;

/// Predefined access policies an object can be switched to. There is no
/// custom ACL composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    AuthenticatedRead,
    BucketOwnerFullControl,
    BucketOwnerRead,
    Private,
    ProjectPrivate,
    PublicRead,
}

impl Visibility {
    pub const ALL: [Visibility; 6] = [
        Visibility::AuthenticatedRead,
        Visibility::BucketOwnerFullControl,
        Visibility::BucketOwnerRead,
        Visibility::Private,
        Visibility::ProjectPrivate,
        Visibility::PublicRead,
    ];

    /// Predefined ACL name as GCS spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::AuthenticatedRead => "authenticatedRead",
            Visibility::BucketOwnerFullControl => "bucketOwnerFullControl",
            Visibility::BucketOwnerRead => "bucketOwnerRead",
            Visibility::Private => "private",
            Visibility::ProjectPrivate => "projectPrivate",
            Visibility::PublicRead => "publicRead",
        }
    }

    pub fn kebab_name(&self) -> &'static str {
        match self {
            Visibility::AuthenticatedRead => "authenticated-read",
            Visibility::BucketOwnerFullControl => "bucket-owner-full-control",
            Visibility::BucketOwnerRead => "bucket-owner-read",
            Visibility::Private => "private",
            Visibility::ProjectPrivate => "project-private",
            Visibility::PublicRead => "public-read",
        }
    }

    /// S3 canned ACL, if S3 has one.
    pub fn canned_acl(&self) -> Option<&'static str> {
        match self {
            Visibility::ProjectPrivate => None,
            _ => Some(self.kebab_name()),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = FSError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visibility::ALL
            .into_iter()
            .find(|v| v.as_str() == s || v.kebab_name() == s)
            .ok_or_else(|| FSError::Unsupported {
                message: format!("unknown visibility: {}", s),
            })
    }
}
