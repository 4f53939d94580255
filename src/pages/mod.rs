//! Page definitions
//!
//! Each page is one row in [`PAGES`]: the route it answers, the content it
//! needs, how that content becomes a view model, and the template that
//! renders it. A single generic handler serves every row.

pub mod aggregate;
pub mod view;

pub use aggregate::{fetch_all, FetchOp, FetchResult, FetchSpec, Fetched};
pub use view::ViewModel;

use std::collections::HashMap;
use std::sync::Arc;

use crate::content::ContentClient;
use crate::error::{PageError, ViewError};

/// Slug of the object holding band name and social links
pub const SETTINGS_SLUG: &str = "site-settings";

/// Identifies a page definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Home,
    Tour,
    Gallery,
    Album,
    Videos,
    Bio,
}

/// Where a fetch's identifier comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A fixed object slug
    Object(&'static str),
    /// An object whose slug is a route parameter
    ObjectFromParam(&'static str),
    /// A fixed content type
    Collection(&'static str),
}

/// A fetch as declared in the page table, before route parameters are bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTemplate {
    pub name: &'static str,
    pub source: Source,
}

impl FetchTemplate {
    /// Bind route parameters, producing a concrete fetch
    pub fn bind(&self, params: &HashMap<String, String>) -> Result<FetchSpec, PageError> {
        match self.source {
            Source::Object(slug) => Ok(FetchSpec::object(self.name, slug)),
            Source::Collection(type_slug) => Ok(FetchSpec::collection(self.name, type_slug)),
            Source::ObjectFromParam(param) => params
                .get(param)
                .filter(|slug| !slug.is_empty())
                .map(|slug| FetchSpec::object(self.name, slug))
                .ok_or(PageError::NotFound),
        }
    }
}

pub(crate) const SETTINGS: FetchTemplate = FetchTemplate {
    name: "siteSettings",
    source: Source::Object(SETTINGS_SLUG),
};

/// Derives a page's view model from its fetched content
pub type ViewBuilder = fn(&PageDefinition, FetchResult) -> Result<ViewModel, ViewError>;

/// One page of the site
pub struct PageDefinition {
    pub id: PageId,
    /// axum route path
    pub route: &'static str,
    pub template: &'static str,
    /// Suffix of the page title; `None` shows the band name alone
    pub label: Option<&'static str>,
    pub fetches: &'static [FetchTemplate],
    pub build: ViewBuilder,
}

impl PageDefinition {
    /// Concrete fetch set for one request
    pub fn fetch_specs(&self, params: &HashMap<String, String>) -> Result<Vec<FetchSpec>, PageError> {
        self.fetches.iter().map(|f| f.bind(params)).collect()
    }

    /// Whether the route takes path parameters
    pub fn has_params(&self) -> bool {
        self.fetches
            .iter()
            .any(|f| matches!(f.source, Source::ObjectFromParam(_)))
    }
}

impl std::fmt::Debug for PageDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDefinition")
            .field("id", &self.id)
            .field("route", &self.route)
            .field("template", &self.template)
            .finish()
    }
}

/// Every page the site serves
pub static PAGES: &[PageDefinition] = &[
    PageDefinition {
        id: PageId::Home,
        route: "/",
        template: "index.html",
        label: None,
        fetches: &[
            SETTINGS,
            FetchTemplate {
                name: "homePage",
                source: Source::Object("home-page"),
            },
            FetchTemplate {
                name: "tourDates",
                source: Source::Collection("tour-dates"),
            },
        ],
        build: view::home,
    },
    PageDefinition {
        id: PageId::Tour,
        route: "/tour",
        template: "tour.html",
        label: Some("Tour Dates"),
        fetches: &[
            SETTINGS,
            FetchTemplate {
                name: "tourDates",
                source: Source::Collection("tour-dates"),
            },
        ],
        build: view::tour,
    },
    PageDefinition {
        id: PageId::Gallery,
        route: "/photo-gallery",
        template: "gallery.html",
        label: Some("Photo Gallery"),
        fetches: &[
            SETTINGS,
            FetchTemplate {
                name: "galleries",
                source: Source::Collection("galleries"),
            },
        ],
        build: view::gallery,
    },
    PageDefinition {
        id: PageId::Album,
        route: "/photo-gallery/:slug",
        template: "album.html",
        label: None,
        fetches: &[
            SETTINGS,
            FetchTemplate {
                name: "album",
                source: Source::ObjectFromParam("slug"),
            },
        ],
        build: view::album,
    },
    PageDefinition {
        id: PageId::Videos,
        route: "/videos",
        template: "videos.html",
        label: Some("Videos"),
        fetches: &[
            SETTINGS,
            FetchTemplate {
                name: "videos",
                source: Source::Collection("videos"),
            },
        ],
        build: view::videos,
    },
    PageDefinition {
        id: PageId::Bio,
        route: "/bio",
        template: "bio.html",
        label: Some("Bio"),
        fetches: &[SETTINGS],
        build: view::bio,
    },
];

/// Look up a page definition
pub fn page(id: PageId) -> &'static PageDefinition {
    PAGES
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| unreachable!("every PageId has a definition"))
}

/// Fetch a page's content and derive its view model
pub async fn load(
    client: Arc<dyn ContentClient>,
    page: &PageDefinition,
    params: &HashMap<String, String>,
) -> Result<ViewModel, PageError> {
    let specs = page.fetch_specs(params)?;
    let result = fetch_all(client, &specs).await?;
    Ok((page.build)(page, result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fake::FakeContent;
    use crate::error::AggregateError;
    use serde_json::{json, Value};
    use std::collections::HashSet;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn content() -> FakeContent {
        let dates = ["2024-05-01", "2024-01-01", "2024-03-01", "2024-02-01", "2024-04-01"]
            .iter()
            .map(|d| json!({ "title": d, "metadata": { "date": d } }))
            .collect();
        FakeContent::new()
            .object(
                "site-settings",
                json!({ "metadata": { "band_name": "X", "twitter": "@x" } }),
            )
            .object("home-page", json!({ "metadata": {} }))
            .object("live", json!({ "title": "Live", "metadata": { "photos": [] } }))
            .collection("tour-dates", dates)
    }

    fn dates(view: &ViewModel) -> Vec<&str> {
        view.field("tourDates")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .map(|d| d["metadata"]["date"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_table_is_consistent() {
        let mut ids = HashSet::new();
        let mut routes = HashSet::new();
        for page in PAGES {
            assert!(ids.insert(page.id), "duplicate id {:?}", page.id);
            assert!(routes.insert(page.route), "duplicate route {}", page.route);

            let mut names = HashSet::new();
            for fetch in page.fetches {
                assert!(names.insert(fetch.name), "duplicate fetch in {:?}", page.id);
            }
            assert!(names.contains("siteSettings"));
        }
        assert_eq!(PAGES.len(), 6);
    }

    #[test]
    fn test_bind_route_param() {
        let album = page(PageId::Album);
        assert!(album.has_params());
        assert!(!page(PageId::Tour).has_params());

        let specs = album.fetch_specs(&params(&[("slug", "live")])).unwrap();
        assert_eq!(specs[1], FetchSpec::object("album", "live"));

        assert!(matches!(
            album.fetch_specs(&HashMap::new()),
            Err(PageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_home_page_end_to_end() {
        let view = load(Arc::new(content()), page(PageId::Home), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(view.title, "X");
        assert_eq!(dates(&view), vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    }

    #[tokio::test]
    async fn test_tour_page_end_to_end() {
        let view = load(Arc::new(content()), page(PageId::Tour), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(view.title, "X | Tour Dates");
        assert_eq!(
            dates(&view),
            vec!["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01", "2024-05-01"]
        );
    }

    #[tokio::test]
    async fn test_album_page_end_to_end() {
        let view = load(
            Arc::new(content()),
            page(PageId::Album),
            &params(&[("slug", "live")]),
        )
        .await
        .unwrap();
        assert_eq!(view.title, "X | Live");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_a_server_error() {
        let client = Arc::new(content().failing("tour-dates"));
        let err = load(client, page(PageId::Tour), &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PageError::Aggregate(AggregateError::Fetch { .. })
        ));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
