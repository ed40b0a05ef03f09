use std::sync::Arc;

use axum::{extract::State, routing::get, Router};

use crate::app::App;

mod pages;

pub(crate) fn router() -> Router<Arc<App>> {
    pages::PRIVILEGED_PAGES
        .iter()
        .fold(
            Router::new().route("/", get(pages::home)),
            |router, &(path, name)| {
                router.route(
                    path,
                    get(move |State(app): State<Arc<App>>| async move { pages::page(&app, name) }),
                )
            },
        )
        .fallback(pages::fallback)
}
