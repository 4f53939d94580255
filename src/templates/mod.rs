//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary. A views directory can
//! replace any of them by name (e.g. `views/tour.html`) or add new ones.

use anyhow::Result;
use chrono::Datelike;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::helpers::{display_date, truncate_words};

/// Words kept by `truncate_text` when no length is given
const DEFAULT_TRUNCATE_WORDS: usize = 30;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all embedded templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Plain-text fields are escaped in the templates with `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("tour.html", include_str!("site/tour.html")),
            ("gallery.html", include_str!("site/gallery.html")),
            ("album.html", include_str!("site/album.html")),
            ("videos.html", include_str!("site/videos.html")),
            ("bio.html", include_str!("site/bio.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("site/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("site/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/tour_date.html",
                include_str!("site/partials/tour_date.html"),
            ),
        ])?;

        register_helpers(&mut tera);

        Ok(Self { tera })
    }

    /// Create a renderer whose templates can be overridden from a directory
    pub fn with_overrides<P: AsRef<Path>>(views_dir: P) -> Result<Self> {
        let mut renderer = Self::new()?;
        let views_dir = views_dir.as_ref();

        if !views_dir.is_dir() {
            anyhow::bail!("Views directory not found: {:?}", views_dir);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(views_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().map(|e| e != "html").unwrap_or(true) {
                continue;
            }
            let name = path
                .strip_prefix(views_dir)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            tracing::debug!("Template override: {}", name);
            files.push((path.to_path_buf(), Some(name)));
        }

        renderer.tera.add_template_files(files)?;
        Ok(renderer)
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(template_name, context)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }
}

fn register_helpers(tera: &mut Tera) {
    tera.register_filter("truncate_text", truncate_text_filter);
    tera.register_filter("format_date", format_date_filter);
    tera.register_function("get_year", get_year);
}

/// Tera filter: plain-text excerpt of some HTML, by words
fn truncate_text_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_text", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_text", "length", usize, val),
        None => DEFAULT_TRUNCATE_WORDS,
    };
    Ok(tera::Value::String(truncate_words(&s, length)))
}

/// Tera filter: display a CMS date, e.g. `May 1st, 2024`
fn format_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("format_date", "value", String, value);
    Ok(tera::Value::String(display_date(&s)))
}

/// Tera function: the current year
fn get_year(_args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    Ok(tera::Value::from(chrono::Local::now().year()))
}
