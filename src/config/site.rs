//! Site configuration (bandsite.yml + environment)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Default Cosmic REST endpoint
pub const DEFAULT_COSMIC_API_URL: &str = "https://api.cosmicjs.com/v1";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Environment name; `development` exposes error details
    pub environment: String,

    // Server
    pub ip: String,
    pub port: u16,

    // Directories
    pub public_dir: String,
    pub views_dir: Option<String>,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub mailchimp: MailchimpConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            ip: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: "public".to_string(),
            views_dir: None,
            request_timeout_secs: 10,
            content: ContentConfig::default(),
            mailchimp: MailchimpConfig::default(),
        }
    }
}

/// Where page content comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub api_url: String,
    pub bucket: Option<String>,
    pub read_key: Option<String>,
    /// Local directory store; takes precedence over the bucket
    pub dir: Option<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_COSMIC_API_URL.to_string(),
            bucket: None,
            read_key: None,
            dir: None,
        }
    }
}

/// Resolved content source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Directory(PathBuf),
    Cosmic {
        api_url: String,
        bucket: String,
        read_key: Option<String>,
    },
}

impl ContentConfig {
    /// Resolve the configured source, directory first
    pub fn source(&self, base_dir: &Path) -> Option<ContentSource> {
        if let Some(dir) = &self.dir {
            return Some(ContentSource::Directory(base_dir.join(dir)));
        }
        self.bucket.as_ref().map(|bucket| ContentSource::Cosmic {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            bucket: bucket.clone(),
            read_key: self.read_key.clone(),
        })
    }
}

/// Mailing list provider credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailchimpConfig {
    /// Data-center code, e.g. `us6`
    pub dc: Option<String>,
    pub list_id: Option<String>,
    pub api_key: Option<String>,
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = non_empty("NODE_ENV") {
            self.environment = env;
        }
        if let Some(port) = non_empty("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(secs) = non_empty("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs =
                secs.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "REQUEST_TIMEOUT_SECS",
                    value: secs.clone(),
                })?;
        }

        if let Some(url) = non_empty("COSMIC_API_URL") {
            self.content.api_url = url;
        }
        if let Some(bucket) = non_empty("COSMIC_BUCKET") {
            self.content.bucket = Some(bucket);
        }
        if let Some(key) = non_empty("COSMIC_READ_KEY") {
            self.content.read_key = Some(key);
        }
        if let Some(dir) = non_empty("CONTENT_DIR") {
            self.content.dir = Some(dir);
        }

        if let Some(dc) = non_empty("MAILCHIMP_DC") {
            self.mailchimp.dc = Some(dc);
        }
        if let Some(list_id) = non_empty("MAILCHIMP_LIST_ID") {
            self.mailchimp.list_id = Some(list_id);
        }
        if let Some(key) = non_empty("MAILCHIMP_KEY") {
            self.mailchimp.api_key = Some(key);
        }

        Ok(())
    }

    /// Check that everything needed to serve requests is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if self.content.dir.is_none() && self.content.bucket.is_none() {
            missing.push("COSMIC_BUCKET (or CONTENT_DIR)");
        }
        if self.mailchimp.dc.is_none() {
            missing.push("MAILCHIMP_DC");
        }
        if self.mailchimp.list_id.is_none() {
            missing.push("MAILCHIMP_LIST_ID");
        }
        if self.mailchimp.api_key.is_none() {
            missing.push("MAILCHIMP_KEY");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
