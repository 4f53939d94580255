//! Configuration module

mod site;

pub use site::ContentConfig;
pub use site::ContentSource;
pub use site::MailchimpConfig;
pub use site::SiteConfig;
pub use site::DEFAULT_COSMIC_API_URL;
