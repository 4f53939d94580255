//! Flat-file content store
//!
//! Layout:
//!
//! ```text
//! content/
//!   objects/site-settings.json   one object per slug
//!   types/tour-dates.json        a JSON array per content type
//! ```

use futures_util::FutureExt;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{is_safe_slug, ContentClient, ContentFuture};
use crate::error::ContentError;

/// Content client reading JSON files from a directory
#[derive(Debug, Clone)]
pub struct DirContentClient {
    root: PathBuf,
}

impl DirContentClient {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn read_json(&self, subdir: &str, name: &str) -> Result<Value, ContentError> {
        if !is_safe_slug(name) {
            return Err(ContentError::NotFound(name.to_string()));
        }

        let path = self.root.join(subdir).join(format!("{}.json", name));
        tracing::debug!("Reading {:?}", path);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl ContentClient for DirContentClient {
    fn get_object<'a>(&'a self, slug: &'a str) -> ContentFuture<'a, Value> {
        async move {
            let object = self.read_json("objects", slug).await?;
            if object.is_object() {
                Ok(object)
            } else {
                Err(ContentError::Malformed(format!(
                    "objects/{}.json is not a JSON object",
                    slug
                )))
            }
        }
        .boxed()
    }

    fn get_objects_by_type<'a>(&'a self, type_slug: &'a str) -> ContentFuture<'a, Vec<Value>> {
        async move {
            match self.read_json("types", type_slug).await {
                Ok(Value::Array(items)) => Ok(items),
                Ok(_) => Err(ContentError::Malformed(format!(
                    "types/{}.json is not a JSON array",
                    type_slug
                ))),
                // A type nobody has created yet has no entries
                Err(ContentError::NotFound(_)) => Ok(Vec::new()),
                Err(e) => Err(e),
            }
        }
        .boxed()
    }
}
