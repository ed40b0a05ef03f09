use std::sync::Arc;

use alloy::primitives::Address;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::app::{App, ConnectionSnapshot};

/// Pages that need a connected wallet, keyed by path.
pub(crate) const PRIVILEGED_PAGES: &[(&str, &str)] = &[
    ("/dashboard", "dashboard"),
    ("/submit", "submit-action"),
    ("/actions", "actions"),
    ("/leaderboard", "leaderboard"),
    ("/donate", "donate"),
    ("/admin", "admin-verify"),
    ("/admin/registry", "admin-registry"),
    ("/admin/reputation", "admin-reputation"),
    ("/matching", "matching-pool"),
    ("/retirement", "retirement"),
    ("/governance", "governance"),
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HomeData {
    pub(crate) page: &'static str,
    pub(crate) network: String,
    pub(crate) connection: ConnectionSnapshot,
    pub(crate) walkthrough_open: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageData {
    pub(crate) page: &'static str,
    pub(crate) address: Address,
    pub(crate) chain_id: Option<u64>,
    pub(crate) wallet: Option<String>,
}

pub(crate) async fn home(State(app): State<Arc<App>>) -> Json<HomeData> {
    Json(HomeData {
        page: "home",
        network: app.network_name().to_owned(),
        connection: app.snapshot(),
        walkthrough_open: app.is_walkthrough_open(),
    })
}

pub(crate) fn page(app: &App, page: &'static str) -> Response {
    let snapshot = app.snapshot();

    match snapshot.address.filter(|_| app.connected()) {
        Some(address) => Json(PageData {
            page,
            address,
            chain_id: snapshot.chain_id,
            wallet: snapshot.wallet,
        })
        .into_response(),
        None => {
            debug!(page, "Redirecting visitor without a wallet");
            Redirect::to("/").into_response()
        }
    }
}

pub(crate) async fn fallback() -> Redirect {
    Redirect::to("/")
}
