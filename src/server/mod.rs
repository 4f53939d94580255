//! HTTP server: page routes, signup and static assets

use anyhow::Result;
use axum::{
    async_trait,
    body::Body,
    extract::{rejection::QueryRejection, FromRequest, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tera::Context;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::PageError;
use crate::pages::{self, PageDefinition, PAGES};
use crate::signup;
use crate::Site;

/// Query string understood by every page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Set by the signup redirect
    pub subscribed: Option<String>,
}

/// Build the application router
pub fn router(site: Site) -> Router {
    let mut router = Router::new();

    for page in PAGES {
        router = if page.has_params() {
            router.route(
                page.route,
                get(
                    move |State(site): State<Site>,
                          Path(params): Path<HashMap<String, String>>,
                          query: Result<Query<PageQuery>, QueryRejection>| async move {
                        render_page(site, page, params, page_query(query)).await
                    },
                )
                .fallback(not_found_handler),
            )
        } else {
            router.route(
                page.route,
                get(
                    move |State(site): State<Site>,
                          query: Result<Query<PageQuery>, QueryRejection>| async move {
                        render_page(site, page, HashMap::new(), page_query(query)).await
                    },
                )
                .fallback(not_found_handler),
            )
        };
    }

    router
        .route("/signup", post(signup_handler).fallback(not_found_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Start the server and run until Ctrl+C
pub async fn start(site: Site, ip: &str, port: u16) -> Result<()> {
    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router(site))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// A query string that does not fit `PageQuery` is ignored
fn page_query(query: Result<Query<PageQuery>, QueryRejection>) -> PageQuery {
    match query {
        Ok(Query(query)) => query,
        Err(e) => {
            tracing::debug!("Ignoring query string: {}", e);
            PageQuery::default()
        }
    }
}

/// Unsupported methods on known routes get the 404 page
async fn not_found_handler(State(site): State<Site>) -> Response {
    error_response(&site, PageError::NotFound)
}

/// Generic handler shared by every page definition
async fn render_page(
    site: Site,
    page: &'static PageDefinition,
    params: HashMap<String, String>,
    query: PageQuery,
) -> Response {
    match build_page(&site, page, &params, &query).await {
        Ok(html) => Html(html).into_response(),
        Err(err) => error_response(&site, err),
    }
}

async fn build_page(
    site: &Site,
    page: &PageDefinition,
    params: &HashMap<String, String>,
    query: &PageQuery,
) -> Result<String, PageError> {
    let view = pages::load(Arc::clone(&site.content), page, params).await?;

    let mut context = Context::from_serialize(&view)?;
    context.insert("subscribed", &query.subscribed);

    Ok(site.renderer.render(page.template, &context)?)
}

/// Render the error page for a failed request
fn error_response(site: &Site, err: PageError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!("{}", error_chain(&err));
    } else {
        tracing::debug!("{}", err);
    }

    let message = status.canonical_reason().unwrap_or("Error");
    let mut context = Context::new();
    context.insert("title", "error");
    context.insert("message", message);
    context.insert("status", &status.as_u16());
    if site.config.is_development() {
        context.insert("error", &error_chain(&err));
    }

    match site.renderer.render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, message).into_response()
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    out
}

/// Signup form body, accepted as JSON or urlencoded
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub email: Option<String>,
}

#[async_trait]
impl<S> FromRequest<S> for SignupForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        let form = if is_json {
            Json::<SignupForm>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .ok()
        } else {
            Form::<SignupForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .ok()
        };

        Ok(form.unwrap_or_default())
    }
}

async fn signup_handler(State(site): State<Site>, form: SignupForm) -> Redirect {
    let outcome = signup::forward(site.mailer.as_ref(), form.email.as_deref()).await;
    Redirect::to(outcome.redirect_target())
}

/// Fallback handler: static files, then the 404 page
async fn fallback_handler(State(site): State<Site>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&site.public_dir).append_index_html_on_directories(false);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => error_response(&site, PageError::NotFound),
        Err(e) => {
            tracing::error!("Static file error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
