use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use super::common::{success_response, SuccessFlag};
use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::models::Conversation;
use crate::AppState;

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = state.services.chat.list_conversations(&user.user_id).await?;
    Ok(Json(conversations))
}

/// GET /api/conversations/:id
pub async fn get_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .services
        .chat
        .get_conversation(&user.user_id, &id)
        .await?;
    Ok(Json(conversation))
}

/// DELETE /api/conversations/:id
pub async fn delete_conversation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .services
        .chat
        .delete_conversation(&user.user_id, &id)
        .await?;
    Ok(success_response(SuccessFlag { success: true }))
}
