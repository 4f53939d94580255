//! Typed views over CMS records

use serde::Serialize;
use serde_json::Value;

/// Metadata of the `site-settings` object
///
/// Only the fields the site derives values from are typed; everything
/// else stays in the raw record handed to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSettings {
    pub band_name: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub apple_music: Option<String>,
    pub spotify: Option<String>,
    pub bandcamp: Option<String>,
}

impl SiteSettings {
    /// Read the typed fields out of a raw metadata map
    ///
    /// Fields that are missing or not strings are treated as absent.
    pub fn from_metadata(metadata: &Value) -> Self {
        let field = |name: &str| {
            metadata
                .get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Self {
            band_name: field("band_name"),
            twitter: field("twitter"),
            instagram: field("instagram"),
            youtube: field("youtube"),
            apple_music: field("apple_music"),
            spotify: field("spotify"),
            bandcamp: field("bandcamp"),
        }
    }

    /// Social links shown in the header and footer of every page
    pub fn socials(&self) -> SocialLinks {
        SocialLinks {
            twitter: self.twitter.clone(),
            instagram: self.instagram.clone(),
            youtube: self.youtube.clone(),
            apple: self.apple_music.clone(),
            spotify: self.spotify.clone(),
            bandcamp: self.bandcamp.clone(),
        }
    }
}

/// Social platform handles; absent entries are omitted when serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apple: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandcamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_socials_select_six_fields() {
        let settings = SiteSettings::from_metadata(&json!({
            "band_name": "The Band",
            "twitter": "@band",
            "apple_music": "https://music.apple.com/band",
            "bandcamp": "https://band.bandcamp.com",
            "bio": "ignored here"
        }));

        let socials = settings.socials();
        assert_eq!(socials.twitter.as_deref(), Some("@band"));
        assert_eq!(
            socials.apple.as_deref(),
            Some("https://music.apple.com/band")
        );
        assert!(socials.instagram.is_none());
        assert!(socials.youtube.is_none());
    }

    #[test]
    fn test_absent_socials_are_omitted() {
        let settings = SiteSettings::from_metadata(&json!({ "twitter": "@x", "spotify": 42 }));
        let value = serde_json::to_value(settings.socials()).unwrap();
        assert_eq!(value, json!({ "twitter": "@x" }));
    }

    #[test]
    fn test_settings_from_non_object_metadata() {
        assert_eq!(SiteSettings::from_metadata(&json!(null)), SiteSettings::default());
        assert_eq!(
            SiteSettings::from_metadata(&json!({ "band_name": "X" })),
            SiteSettings {
                band_name: Some("X".to_string()),
                ..SiteSettings::default()
            }
        );
    }
}
