//! List page routes

use crate::pages::{PageDefinition, Source, PAGES};

/// Print every page route with its template and fetches
pub fn run() {
    println!("Routes ({}):", PAGES.len() + 1);
    for page in PAGES {
        println!("{}", describe(page));
    }
    println!("  POST /signup -> /?subscribed=true|false");
}

/// One line per page: route, template, then each named fetch
pub fn describe(page: &PageDefinition) -> String {
    let fetches = page
        .fetches
        .iter()
        .map(|fetch| match &fetch.source {
            Source::Object(slug) => format!("{}={}", fetch.name, slug),
            Source::ObjectFromParam(param) => format!("{}=:{}", fetch.name, param),
            Source::Collection(type_slug) => format!("{}=[{}]", fetch.name, type_slug),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("  GET {} [{}] {}", page.route, page.template, fetches)
}
