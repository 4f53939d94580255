//! View model derivation
//!
//! Everything here is a pure function of a [`FetchResult`]: no I/O, no
//! clock, so pages can be tested without a content client.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use super::aggregate::FetchResult;
use super::{PageDefinition, SETTINGS, SETTINGS_SLUG};
use crate::content::{SiteSettings, SocialLinks};
use crate::error::ViewError;

/// Number of tour dates shown on the home page
pub const HOME_TOUR_DATES: usize = 3;

/// Flat values handed to a template
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    /// Raw `site-settings` metadata
    pub settings: Value,
    pub socials: SocialLinks,
    pub title: String,
    /// Page specific fields, e.g. `tourDates` or `album`
    #[serde(flatten)]
    pub fields: IndexMap<&'static str, Value>,
}

impl ViewModel {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn with(mut self, name: &'static str, value: Value) -> Self {
        self.fields.insert(name, value);
        self
    }
}

/// Page title: the band name, optionally followed by a page label
pub fn page_title(band_name: &str, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{} | {}", band_name, label),
        None => band_name.to_string(),
    }
}

/// Sort tour dates ascending by `metadata.date`.
///
/// The sort is stable, so entries sharing a date keep their input order.
/// Entries without a date go last.
pub fn sort_tour_dates(mut dates: Vec<Value>) -> Vec<Value> {
    dates.sort_by(|a, b| match (tour_date_key(a), tour_date_key(b)) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    dates
}

/// The earliest `count` tour dates
pub fn upcoming_tour_dates(dates: Vec<Value>, count: usize) -> Vec<Value> {
    let mut sorted = sort_tour_dates(dates);
    sorted.truncate(count);
    sorted
}

fn tour_date_key(date: &Value) -> Option<&str> {
    date.get("metadata")
        .and_then(|m| m.get("date"))
        .and_then(Value::as_str)
}

/// Build the parts shared by every page from the settings entry
fn base(result: &mut FetchResult, label: Option<&str>) -> Result<ViewModel, ViewError> {
    let settings_object = result.take_object(SETTINGS.name)?;
    let metadata = match settings_object.get("metadata") {
        Some(metadata @ Value::Object(_)) => metadata.clone(),
        _ => {
            return Err(ViewError::MissingField {
                record: SETTINGS_SLUG.to_string(),
                field: "metadata",
            })
        }
    };

    let settings = SiteSettings::from_metadata(&metadata);
    let band_name = settings
        .band_name
        .as_deref()
        .ok_or_else(|| ViewError::MissingField {
            record: SETTINGS_SLUG.to_string(),
            field: "band_name",
        })?;

    Ok(ViewModel {
        title: page_title(band_name, label),
        socials: settings.socials(),
        settings: metadata,
        fields: IndexMap::new(),
    })
}

/// `/`: home page metadata and the next three tour dates
pub fn home(page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    let view = base(&mut result, page.label)?;
    let home_page = result.take_object("homePage")?;
    let dates = result.take_collection("tourDates")?;

    Ok(view
        .with(
            "homepage",
            home_page
                .get("metadata")
                .filter(|m| m.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
        )
        .with(
            "tourDates",
            Value::Array(upcoming_tour_dates(dates, HOME_TOUR_DATES)),
        ))
}

/// `/tour`: every tour date
pub fn tour(page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    let view = base(&mut result, page.label)?;
    let dates = result.take_collection("tourDates")?;
    Ok(view.with("tourDates", Value::Array(sort_tour_dates(dates))))
}

/// `/photo-gallery`: gallery listing
pub fn gallery(page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    let view = base(&mut result, page.label)?;
    let galleries = result.take_collection("galleries")?;
    Ok(view.with("galleries", Value::Array(galleries)))
}

/// `/photo-gallery/:slug`: one album, titled after the album
pub fn album(_page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    let album = result.take_object("album")?;
    let album_title = album
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| ViewError::MissingField {
            record: album_record(&album),
            field: "title",
        })?
        .to_string();

    let view = base(&mut result, Some(album_title.as_str()))?;
    let photos = album
        .get("metadata")
        .and_then(|m| m.get("photos"))
        .filter(|p| p.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    Ok(view.with("album", album).with("photos", photos))
}

fn album_record(album: &Value) -> String {
    match album.get("slug").and_then(Value::as_str) {
        Some(slug) => format!("album '{}'", slug),
        None => "album".to_string(),
    }
}

/// `/videos`: video listing
pub fn videos(page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    let view = base(&mut result, page.label)?;
    let videos = result.take_collection("videos")?;
    Ok(view.with("videos", Value::Array(videos)))
}

/// `/bio`: settings only
pub fn bio(page: &PageDefinition, mut result: FetchResult) -> Result<ViewModel, ViewError> {
    base(&mut result, page.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::aggregate::Fetched;
    use crate::pages::{page, PageId};
    use serde_json::json;

    fn settings() -> (String, Fetched) {
        (
            "siteSettings".to_string(),
            Fetched::Object(json!({
                "slug": "site-settings",
                "metadata": { "band_name": "X", "twitter": "@x" }
            })),
        )
    }

    fn tour_date(date: &str, venue: &str) -> Value {
        json!({ "title": venue, "metadata": { "date": date, "venue": venue } })
    }

    fn five_dates() -> Vec<Value> {
        vec![
            tour_date("2024-05-01", "e"),
            tour_date("2024-01-01", "a"),
            tour_date("2024-03-01", "c"),
            tour_date("2024-02-01", "b"),
            tour_date("2024-04-01", "d"),
        ]
    }

    fn dates_of(view: &ViewModel) -> Vec<String> {
        view.field("tourDates")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .map(|d| d["metadata"]["date"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_home_shows_three_earliest() {
        let result: FetchResult = vec![
            settings(),
            (
                "homePage".to_string(),
                Fetched::Object(json!({ "metadata": { "headline": "New record out now" } })),
            ),
            ("tourDates".to_string(), Fetched::Collection(five_dates())),
        ]
        .into_iter()
        .collect();

        let view = home(page(PageId::Home), result).unwrap();
        assert_eq!(view.title, "X");
        assert_eq!(dates_of(&view), vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(
            view.field("homepage"),
            Some(&json!({ "headline": "New record out now" }))
        );
        assert_eq!(view.socials.twitter.as_deref(), Some("@x"));
    }

    #[test]
    fn test_tour_shows_all_ascending() {
        let result: FetchResult = vec![
            settings(),
            ("tourDates".to_string(), Fetched::Collection(five_dates())),
        ]
        .into_iter()
        .collect();

        let view = tour(page(PageId::Tour), result).unwrap();
        assert_eq!(view.title, "X | Tour Dates");
        assert_eq!(
            dates_of(&view),
            vec![
                "2024-01-01",
                "2024-02-01",
                "2024-03-01",
                "2024-04-01",
                "2024-05-01"
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_and_undated_last() {
        let dates = vec![
            json!({ "title": "undated" }),
            tour_date("2024-02-01", "first"),
            tour_date("2024-01-01", "early"),
            tour_date("2024-02-01", "second"),
        ];
        let titles: Vec<_> = sort_tour_dates(dates)
            .into_iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["early", "first", "second", "undated"]);
    }

    #[test]
    fn test_home_page_without_metadata() {
        let result: FetchResult = vec![
            settings(),
            (
                "homePage".to_string(),
                Fetched::Object(json!({ "slug": "home-page" })),
            ),
            ("tourDates".to_string(), Fetched::Collection(Vec::new())),
        ]
        .into_iter()
        .collect();

        let view = home(page(PageId::Home), result).unwrap();
        assert_eq!(view.field("homepage"), Some(&json!({})));
        assert_eq!(view.field("tourDates"), Some(&json!([])));
    }

    #[test]
    fn test_home_cut_keeps_earlier_declared_tie() {
        let dates = vec![
            tour_date("2024-03-01", "third"),
            tour_date("2024-01-01", "first"),
            tour_date("2024-03-01", "fourth"),
            tour_date("2024-02-01", "second"),
        ];
        let venues: Vec<_> = upcoming_tour_dates(dates, HOME_TOUR_DATES)
            .into_iter()
            .map(|d| d["title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(venues, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_upcoming_with_fewer_than_three() {
        let dates = vec![tour_date("2024-02-01", "b"), tour_date("2024-01-01", "a")];
        assert_eq!(upcoming_tour_dates(dates, HOME_TOUR_DATES).len(), 2);
        assert!(upcoming_tour_dates(Vec::new(), HOME_TOUR_DATES).is_empty());
    }

    #[test]
    fn test_sorted_output_is_non_decreasing() {
        let mut dates = Vec::new();
        for day in [17, 3, 28, 9, 1, 22, 14, 5, 30, 11] {
            dates.push(tour_date(&format!("2024-06-{:02}", day), "v"));
        }
        let sorted = sort_tour_dates(dates.clone());
        let keys: Vec<_> = sorted.iter().filter_map(tour_date_key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        let top = upcoming_tour_dates(dates, HOME_TOUR_DATES);
        let top_keys: Vec<_> = top.iter().filter_map(tour_date_key).collect();
        assert_eq!(top_keys, vec!["2024-06-01", "2024-06-03", "2024-06-05"]);
    }

    #[test]
    fn test_page_titles() {
        assert_eq!(page_title("X", None), "X");
        assert_eq!(page_title("X", Some("Bio")), "X | Bio");
        assert_eq!(page_title("X", Some("Bio")), page_title("X", Some("Bio")));
    }

    #[test]
    fn test_album_title_and_photos() {
        let result: FetchResult = vec![
            settings(),
            (
                "album".to_string(),
                Fetched::Object(json!({
                    "slug": "live-in-berlin",
                    "title": "Live in Berlin",
                    "metadata": { "photos": [{ "url": "1.jpg" }, { "url": "2.jpg" }] }
                })),
            ),
        ]
        .into_iter()
        .collect();

        let view = album(page(PageId::Album), result).unwrap();
        assert_eq!(view.title, "X | Live in Berlin");
        assert_eq!(view.field("photos").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(view.field("album").unwrap()["slug"], "live-in-berlin");
    }

    #[test]
    fn test_album_without_photos_gets_empty_list() {
        let result: FetchResult = vec![
            settings(),
            (
                "album".to_string(),
                Fetched::Object(json!({ "title": "Empty", "metadata": {} })),
            ),
        ]
        .into_iter()
        .collect();

        let view = album(page(PageId::Album), result).unwrap();
        assert_eq!(view.field("photos"), Some(&json!([])));
    }

    #[test]
    fn test_album_without_title_is_an_error() {
        let result: FetchResult = vec![
            settings(),
            (
                "album".to_string(),
                Fetched::Object(json!({ "slug": "untitled" })),
            ),
        ]
        .into_iter()
        .collect();

        let err = album(page(PageId::Album), result).unwrap_err();
        assert!(matches!(err, ViewError::MissingField { field: "title", .. }));
    }

    #[test]
    fn test_missing_band_name_is_an_error() {
        let result: FetchResult = vec![(
            "siteSettings".to_string(),
            Fetched::Object(json!({ "metadata": { "twitter": "@x" } })),
        )]
        .into_iter()
        .collect();

        let err = bio(page(PageId::Bio), result).unwrap_err();
        assert!(matches!(
            err,
            ViewError::MissingField {
                field: "band_name",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let result: FetchResult = vec![settings()].into_iter().collect();
        let err = videos(page(PageId::Videos), result).unwrap_err();
        assert!(matches!(err, ViewError::MissingEntry(ref name) if name == "videos"));
    }

    #[test]
    fn test_view_model_serializes_flat() {
        let result: FetchResult = vec![
            settings(),
            (
                "galleries".to_string(),
                Fetched::Collection(vec![json!({ "title": "Tour 2024" })]),
            ),
        ]
        .into_iter()
        .collect();

        let view = gallery(page(PageId::Gallery), result).unwrap();
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["title"], "X | Photo Gallery");
        assert_eq!(value["socials"], json!({ "twitter": "@x" }));
        assert_eq!(value["settings"]["band_name"], "X");
        assert_eq!(value["galleries"][0]["title"], "Tour 2024");
    }
}
