//! HTTP handler for the WhatsApp messaging proxy.

use axum::{Json, extract::State};
use serde_json::Value;

use crate::{
    AppState,
    api::models::{messaging::SendMessageRequest, users::CurrentUser},
    errors::Error,
    messaging::WhatsAppClient,
};

/// Send a WhatsApp text message
#[utoipa::path(
    post,
    path = "/messages",
    tag = "messaging",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message accepted by the provider"),
        (status = 400, description = "Missing destination or message"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "WhatsApp credentials not configured"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Value>, Error> {
    request.validate()?;
    let client = WhatsAppClient::from_config(&state.config.whatsapp)?;
    let data = client.send_text(&request.to, &request.message).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": data })))
}
