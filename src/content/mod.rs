//! Content module - clients for the headless CMS and the records they return

mod cosmic;
mod dir;
mod models;

pub use cosmic::CosmicClient;
pub use dir::DirContentClient;
pub use models::{SiteSettings, SocialLinks};

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::ContentError;

/// Future returned by every content client call
pub type ContentFuture<'a, T> = BoxFuture<'a, Result<T, ContentError>>;

/// A source of CMS records.
///
/// Records are raw JSON objects shaped like Cosmic objects: a `slug`, a
/// `title`, an optional `content` body and a free-form `metadata` map.
pub trait ContentClient: Send + Sync {
    /// Fetch one object by slug
    fn get_object<'a>(&'a self, slug: &'a str) -> ContentFuture<'a, Value>;

    /// Fetch every object of a content type
    fn get_objects_by_type<'a>(&'a self, type_slug: &'a str) -> ContentFuture<'a, Vec<Value>>;
}

/// Reject slugs that could escape a path segment
pub(crate) fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains("..")
}
