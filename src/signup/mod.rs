//! Mailing list signup forwarding
//!
//! The site never validates addresses itself: whatever the visitor typed is
//! handed to the mail provider, and any failure becomes a
//! `subscribed=false` redirect.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::MailchimpConfig;
use crate::error::MailError;

/// Something that can add an address to a mailing list
pub trait Mailer: Send + Sync {
    fn subscribe<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Mailchimp list members API client
#[derive(Debug, Clone)]
pub struct MailchimpClient {
    client: Client,
    members_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct NewMember<'a> {
    email_address: &'a str,
    status: &'static str,
}

impl MailchimpClient {
    /// Create a client from configured credentials
    pub fn new(config: &MailchimpConfig, timeout: Duration) -> Result<Self, MailError> {
        let dc = config
            .dc
            .as_deref()
            .ok_or(MailError::NotConfigured("MAILCHIMP_DC"))?;
        let list_id = config
            .list_id
            .as_deref()
            .ok_or(MailError::NotConfigured("MAILCHIMP_LIST_ID"))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(MailError::NotConfigured("MAILCHIMP_KEY"))?;

        Self::with_members_url(&members_url(dc, list_id), api_key, timeout)
    }

    /// Create a client posting to an explicit members endpoint
    pub fn with_members_url(
        members_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .user_agent(concat!("bandsite/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            members_url: members_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// List members endpoint for a data center and list
pub fn members_url(dc: &str, list_id: &str) -> String {
    format!(
        "https://{}.api.mailchimp.com/3.0/lists/{}/members/",
        dc, list_id
    )
}

impl Mailer for MailchimpClient {
    fn subscribe<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), MailError>> {
        async move {
            let response = self
                .client
                .post(&self.members_url)
                .basic_auth("anystring", Some(&self.api_key))
                .json(&NewMember {
                    email_address: email,
                    status: "subscribed",
                })
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected { status, body })
        }
        .boxed()
    }
}

/// Result of a signup attempt, as shown to the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Subscribed,
    NotSubscribed,
}

impl SignupOutcome {
    /// Where the visitor is sent afterwards
    pub fn redirect_target(&self) -> &'static str {
        match self {
            SignupOutcome::Subscribed => "/?subscribed=true",
            SignupOutcome::NotSubscribed => "/?subscribed=false",
        }
    }
}

/// Forward one signup to the mail provider
///
/// A request without an email field never reaches the provider and is
/// reported like any other failure.
pub async fn forward(mailer: &dyn Mailer, email: Option<&str>) -> SignupOutcome {
    let Some(email) = email else {
        warn!("Signup request without an email field");
        return SignupOutcome::NotSubscribed;
    };

    match mailer.subscribe(email).await {
        Ok(()) => {
            info!("New mailing list signup");
            SignupOutcome::Subscribed
        }
        Err(e) => {
            warn!("Mailing list signup failed: {}", e);
            SignupOutcome::NotSubscribed
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Mail provider stand-in for tests

    use super::*;
    use std::sync::{Arc, Mutex};

    pub struct FakeMailer {
        accept: bool,
        pub received: Arc<Mutex<Vec<String>>>,
    }

    impl FakeMailer {
        pub fn accepting() -> Self {
            Self {
                accept: true,
                received: Arc::default(),
            }
        }

        pub fn rejecting() -> Self {
            Self {
                accept: false,
                received: Arc::default(),
            }
        }
    }

    impl Mailer for FakeMailer {
        fn subscribe<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), MailError>> {
            self.received.lock().unwrap().push(email.to_string());
            let result = if self.accept {
                Ok(())
            } else {
                Err(MailError::Rejected {
                    status: reqwest::StatusCode::BAD_REQUEST,
                    body: "Member Exists".to_string(),
                })
            };
            async move { result }.boxed()
        }
    }
}
