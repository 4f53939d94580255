//! bandsite: server-rendered website for a music act
//!
//! Pages are assembled per request from a headless CMS: each page declares
//! the content it needs, the fetches run concurrently, the results are
//! reshaped into a view model and rendered with Tera templates. A signup
//! endpoint forwards mailing-list subscriptions to Mailchimp.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod signup;
pub mod templates;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{ContentSource, SiteConfig};
use content::{ContentClient, CosmicClient, DirContentClient};
use error::ConfigError;
use signup::{MailchimpClient, Mailer};
use templates::TemplateRenderer;

/// Config file looked up in the base directory
pub const CONFIG_FILE: &str = "bandsite.yml";

/// The running site: configuration plus the collaborators every request uses
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: Arc<SiteConfig>,
    /// Base directory
    pub base_dir: PathBuf,
    /// Static asset directory
    pub public_dir: PathBuf,
    pub content: Arc<dyn ContentClient>,
    pub mailer: Arc<dyn Mailer>,
    pub renderer: Arc<TemplateRenderer>,
}

impl Site {
    /// Build a site from a directory and the process environment
    ///
    /// Fails if any required setting is missing.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = load_config(&base_dir, |key| std::env::var(key).ok())?;
        Self::from_config(config, base_dir)
    }

    /// Build a site from an already validated configuration
    pub fn from_config(config: SiteConfig, base_dir: PathBuf) -> Result<Self> {
        let timeout = config.request_timeout();

        let content: Arc<dyn ContentClient> = match config.content.source(&base_dir) {
            Some(ContentSource::Directory(dir)) => {
                tracing::info!("Serving content from {:?}", dir);
                Arc::new(DirContentClient::new(dir))
            }
            Some(ContentSource::Cosmic {
                api_url,
                bucket,
                read_key,
            }) => {
                tracing::info!("Serving content from bucket {} at {}", bucket, api_url);
                Arc::new(CosmicClient::new(&api_url, &bucket, read_key, timeout)?)
            }
            None => return Err(ConfigError::Missing(vec!["COSMIC_BUCKET (or CONTENT_DIR)"]).into()),
        };

        let mailer: Arc<dyn Mailer> = Arc::new(MailchimpClient::new(&config.mailchimp, timeout)?);

        let renderer = match &config.views_dir {
            Some(dir) => TemplateRenderer::with_overrides(base_dir.join(dir))?,
            None => TemplateRenderer::new()?,
        };

        Ok(Self::from_parts(
            config,
            base_dir,
            content,
            mailer,
            Arc::new(renderer),
        ))
    }

    /// Assemble a site from explicit collaborators
    pub fn from_parts(
        config: SiteConfig,
        base_dir: PathBuf,
        content: Arc<dyn ContentClient>,
        mailer: Arc<dyn Mailer>,
        renderer: Arc<TemplateRenderer>,
    ) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config: Arc::new(config),
            base_dir,
            public_dir,
            content,
            mailer,
            renderer,
        }
    }
}

/// Load `bandsite.yml` if present, overlay the environment and validate
pub fn load_config<F>(base_dir: &Path, lookup: F) -> Result<SiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = base_dir.join(CONFIG_FILE);

    let mut config = if config_path.exists() {
        SiteConfig::load(&config_path)
            .with_context(|| format!("Failed to load {:?}", config_path))?
    } else {
        SiteConfig::default()
    };

    config.apply_env(lookup)?;
    config.validate()?;
    Ok(config)
}
