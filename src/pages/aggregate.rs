//! Concurrent fetch of a page's named content requirements

use futures_util::future::try_join_all;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::content::ContentClient;
use crate::error::{AggregateError, ViewError};

/// What a single fetch asks the content client for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOp {
    /// One object by slug
    Object(String),
    /// Every object of a type
    Collection(String),
}

/// A named fetch belonging to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    pub name: String,
    pub op: FetchOp,
}

impl FetchSpec {
    pub fn object(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            op: FetchOp::Object(slug.to_string()),
        }
    }

    pub fn collection(name: &str, type_slug: &str) -> Self {
        Self {
            name: name.to_string(),
            op: FetchOp::Collection(type_slug.to_string()),
        }
    }
}

/// Raw content returned by one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Object(Value),
    Collection(Vec<Value>),
}

/// Results of a completed fetch set, keyed by fetch name in declaration order
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    entries: IndexMap<String, Fetched>,
}

impl FetchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Fetched> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Remove an object entry
    pub fn take_object(&mut self, name: &str) -> Result<Value, ViewError> {
        match self.entries.shift_remove(name) {
            Some(Fetched::Object(value)) => Ok(value),
            Some(Fetched::Collection(_)) => Err(ViewError::WrongShape {
                name: name.to_string(),
                expected: "an object",
            }),
            None => Err(ViewError::MissingEntry(name.to_string())),
        }
    }

    /// Remove a collection entry
    pub fn take_collection(&mut self, name: &str) -> Result<Vec<Value>, ViewError> {
        match self.entries.shift_remove(name) {
            Some(Fetched::Collection(values)) => Ok(values),
            Some(Fetched::Object(_)) => Err(ViewError::WrongShape {
                name: name.to_string(),
                expected: "a collection",
            }),
            None => Err(ViewError::MissingEntry(name.to_string())),
        }
    }
}

impl FromIterator<(String, Fetched)> for FetchResult {
    fn from_iter<I: IntoIterator<Item = (String, Fetched)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Run every fetch concurrently and join the results.
///
/// Each fetch runs on its own task. The first failure is returned as soon
/// as it is observed; fetches still in flight keep running detached and
/// their results are dropped.
pub async fn fetch_all(
    client: Arc<dyn ContentClient>,
    specs: &[FetchSpec],
) -> Result<FetchResult, AggregateError> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(AggregateError::DuplicateName(spec.name.clone()));
        }
    }

    let tasks = specs.iter().map(|spec| {
        let name = spec.name.clone();
        let spec = spec.clone();
        let client = Arc::clone(&client);

        let handle = tokio::spawn(async move {
            tracing::debug!("Fetching {} ({:?})", spec.name, spec.op);
            let fetched = match &spec.op {
                FetchOp::Object(slug) => client.get_object(slug).await.map(Fetched::Object),
                FetchOp::Collection(type_slug) => client
                    .get_objects_by_type(type_slug)
                    .await
                    .map(Fetched::Collection),
            };
            match fetched {
                Ok(fetched) => Ok((spec.name, fetched)),
                Err(source) => Err(AggregateError::Fetch {
                    name: spec.name,
                    source,
                }),
            }
        });

        async move {
            handle
                .await
                .map_err(|source| AggregateError::Join { name, source })?
        }
    });

    let entries = try_join_all(tasks).await?;
    Ok(entries.into_iter().collect())
}
