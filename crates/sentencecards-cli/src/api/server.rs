// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;

use crate::api::get::due_handler;
use crate::api::get::list_handler;
use crate::api::get::not_found_handler;
use crate::api::get::show_handler;
use crate::api::get::stats_handler;
use crate::api::get::stats_page;
use crate::api::post::create_handler;
use crate::api::post::delete_handler;
use crate::api::post::reset_handler;
use crate::api::post::review_handler;
use crate::api::post::update_handler;
use crate::api::state::ServerState;
use crate::collection::Collection;
use crate::error::Fallible;

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/api/sentences", get(list_handler).post(create_handler));
    let app = app.route("/api/sentences/due", get(due_handler));
    let app = app.route("/api/sentences/reset", post(reset_handler));
    let app = app.route(
        "/api/sentences/{id}",
        get(show_handler).put(update_handler).delete(delete_handler),
    );
    let app = app.route("/api/sentences/{id}/review", post(review_handler));
    let app = app.route("/api/stats", get(stats_handler));
    let app = app.route("/stats", get(stats_page));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

/// Serve the collection's API until interrupted.
pub async fn start_server(coll: Collection, port: u16) -> Fallible<()> {
    let bind = format!("{}:{port}", coll.config.bind);
    let app = router(ServerState::new(coll));
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = ctrl_c().await;
            log::debug!("Shutting down.");
        })
        .await?;
    Ok(())
}
