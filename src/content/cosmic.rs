//! Cosmic headless CMS REST client.
//!
//! Objects are read from `{api_url}/{bucket}/object/{slug}` and collections
//! from `{api_url}/{bucket}/object-type/{type}`. A read key, when configured,
//! is sent as the `read_key` query parameter.

use futures_util::FutureExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::{ContentClient, ContentFuture};
use crate::error::ContentError;

/// Cosmic bucket client
#[derive(Debug, Clone)]
pub struct CosmicClient {
    client: Client,
    api_url: String,
    bucket: String,
    read_key: Option<String>,
}

impl CosmicClient {
    /// Create a client for one bucket
    pub fn new(
        api_url: &str,
        bucket: &str,
        read_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        let client = Client::builder()
            .user_agent(concat!("bandsite/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            read_key,
        })
    }

    /// URL of a single object
    pub fn object_url(&self, slug: &str) -> String {
        format!(
            "{}/{}/object/{}",
            self.api_url,
            encode_segment(&self.bucket),
            encode_segment(slug)
        )
    }

    /// URL of a content type listing
    pub fn type_url(&self, type_slug: &str) -> String {
        format!(
            "{}/{}/object-type/{}",
            self.api_url,
            encode_segment(&self.bucket),
            encode_segment(type_slug)
        )
    }

    async fn get_json(&self, url: &str, what: &str) -> Result<Value, ContentError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(key) = &self.read_key {
            request = request.query(&[("read_key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            error!("Content API returned {} for {}", status, url);
            return Err(ContentError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ContentClient for CosmicClient {
    fn get_object<'a>(&'a self, slug: &'a str) -> ContentFuture<'a, Value> {
        async move {
            let data = self.get_json(&self.object_url(slug), slug).await?;
            parse_object(data, slug)
        }
        .boxed()
    }

    fn get_objects_by_type<'a>(&'a self, type_slug: &'a str) -> ContentFuture<'a, Vec<Value>> {
        async move {
            let data = self.get_json(&self.type_url(type_slug), type_slug).await?;
            parse_objects(data)
        }
        .boxed()
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC)
        .to_string()
        // Keep slugs readable in logs
        .replace("%2D", "-")
        .replace("%5F", "_")
}

/// Extract the object from a `{ "object": ... }` response
fn parse_object(mut data: Value, slug: &str) -> Result<Value, ContentError> {
    match data.get_mut("object").map(Value::take) {
        Some(Value::Null) | None => Err(ContentError::NotFound(slug.to_string())),
        Some(object @ Value::Object(_)) => Ok(object),
        Some(_) => Err(ContentError::Malformed(format!(
            "object '{}' is not a JSON object",
            slug
        ))),
    }
}

/// Extract the list from a `{ "objects": [...] }` response
///
/// An empty type is returned by the API without an `objects` key.
fn parse_objects(mut data: Value) -> Result<Vec<Value>, ContentError> {
    match data.get_mut("objects").map(Value::take) {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        // Older SDK responses nest the list under `all`
        Some(Value::Object(mut map)) => match map.remove("all") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ContentError::Malformed(
                "objects is not a list".to_string(),
            )),
        },
        Some(_) => Err(ContentError::Malformed(
            "objects is not a list".to_string(),
        )),
    }
}
