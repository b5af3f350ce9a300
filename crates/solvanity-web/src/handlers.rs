use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{debug, error, info};

use solvanity_core::{GrindSession, StreamEvent};

use crate::error::{constraint_error_response, error_response, grind_error_response};
use crate::form::GrindForm;
use crate::WebState;

const EVENT_BUFFER: usize = 64;

pub(crate) const SHUTDOWN_MESSAGE: &str = "Server is shutting down";

pub async fn health() -> &'static str {
    "OK"
}

/// Start a grind and stream its events. Dropping the response body (client
/// disconnect) closes the channel, which kills the grinder; so does server
/// shutdown.
pub async fn generate_vanity_address(
    State(state): State<WebState>,
    Form(form): Form<GrindForm>,
) -> Response {
    let constraints = match form.into_constraints() {
        Ok(constraints) => constraints,
        Err(err) => return constraint_error_response(&err),
    };
    let session = match GrindSession::new(constraints, state.config.session.clone()) {
        Ok(session) => session,
        Err(err) => return grind_error_response(&err),
    };

    let (tx, rx) = mpsc::channel::<StreamEvent>(EVENT_BUFFER);
    let notice = tx.clone();
    let mut shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            outcome = session.run(tx) => {
                if let Err(err) = outcome {
                    debug!("Grind session ended without a result: {}", err);
                }
            }
            // Dropping the session kills the grinder and removes its scratch dir
            true = async { shutdown.wait_for(|stopping| *stopping).await.is_ok() } => {
                info!("Grind aborted by server shutdown");
                let _ = notice.send(StreamEvent::error(SHUTDOWN_MESSAGE)).await;
            }
        }
    });

    let lines = ReceiverStream::new(rx).map(|event| event.to_line());

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

pub async fn tool_version(State(state): State<WebState>) -> Response {
    match solvanity_core::tool_version(&state.config.solana).await {
        Ok(version) => Json(json!({
            "success": true,
            "version": version,
        }))
        .into_response(),
        Err(err) => {
            error!("Solana CLI version check failed: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to check Solana CLI",
            )
        }
    }
}
