use axum::{extract::State, Json};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::common::validate_input;
use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::services::ChatTurn;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// A missing or `null` message deserializes as empty so validation reports it.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// POST /api/chat
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatTurn>, ApiError> {
    validate_input(&request)?;

    let turn = state
        .services
        .chat
        .send_message(
            &user.user_id,
            &request.message,
            request.conversation_id.as_deref(),
        )
        .await?;
    Ok(Json(turn))
}
