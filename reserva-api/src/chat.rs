use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use reserva_chat::{Conversation, Message, PresenceRegistry};
use reserva_core::user::{User, UserRole, UserSummary};
use reserva_shared::models::events::{
    MessageReceivedEvent, MessagesReadEvent, PresenceChangedEvent, ServerEvent, TypingEvent,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{decode_token, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub participant_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    pub typing: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub participants: Vec<UserSummary>,
    pub last_message: String,
    pub last_message_time: chrono::DateTime<Utc>,
    pub unread_count: i32,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_messages: i64,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub pagination: Pagination,
}

fn summarize(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/chat/conversations",
            post(start_conversation).get(list_conversations),
        )
        .route(
            "/v1/chat/conversations/{conversation_id}/messages",
            get(conversation_messages),
        )
        .route("/v1/chat/messages", post(send_message))
        .route(
            "/v1/chat/conversations/{conversation_id}/read",
            patch(mark_read),
        )
        .route(
            "/v1/chat/conversations/{conversation_id}/typing",
            post(typing),
        )
        .route("/v1/chat/unread-count", get(unread_count))
        .route("/v1/chat/users", get(search_users))
        .route("/v1/chat/users/{user_id}/online", get(online_status))
}

async fn conversation_response(
    state: &AppState,
    conversation: &Conversation,
    requester: Uuid,
) -> Result<ConversationResponse, AppError> {
    let mut participants = Vec::with_capacity(2);
    for participant_id in [conversation.participant_a, conversation.participant_b] {
        if let Some(user) = state
            .users
            .find_by_id(participant_id)
            .await
            .map_err(AppError::repo)?
        {
            participants.push(summarize(&user));
        }
    }

    Ok(ConversationResponse {
        id: conversation.id,
        participants,
        last_message: conversation.last_message.clone(),
        last_message_time: conversation.last_message_time,
        unread_count: conversation.unread_for(requester),
        created_at: conversation.created_at,
    })
}

/// Fetch a conversation and reject non-participants.
async fn participant_conversation(
    state: &AppState,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Conversation, AppError> {
    let conversation = state
        .chat
        .get_conversation(conversation_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    if !conversation.is_participant(user_id) {
        return Err(AppError::Authorization(
            "You are not a participant in this conversation".to_string(),
        ));
    }

    Ok(conversation)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/chat/conversations
async fn start_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartConversationRequest>,
) -> Result<Json<ConversationResponse>, AppError> {
    let user_id = claims.user_id()?;

    state
        .users
        .find_by_id(req.participant_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    let conversation = state
        .chat
        .get_or_create_conversation(user_id, req.participant_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(
        conversation_response(&state, &conversation, user_id).await?,
    ))
}

/// GET /v1/chat/conversations
async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ConversationResponse>>, AppError> {
    let user_id = claims.user_id()?;

    let conversations = state
        .chat
        .list_conversations(user_id)
        .await
        .map_err(AppError::repo)?;

    let mut responses = Vec::with_capacity(conversations.len());
    for conversation in &conversations {
        responses.push(conversation_response(&state, conversation, user_id).await?);
    }

    Ok(Json(responses))
}

/// GET /v1/chat/conversations/:id/messages
async fn conversation_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesResponse>, AppError> {
    let user_id = claims.user_id()?;
    participant_conversation(&state, conversation_id, user_id).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(state.business_rules.chat_page_size)
        .clamp(1, state.business_rules.chat_page_size);

    let (mut messages, total) = state
        .chat
        .list_messages(conversation_id, page, limit)
        .await
        .map_err(AppError::repo)?;

    // The store returns newest first; the page payload reads oldest first
    messages.reverse();

    let total_pages = (total + limit - 1) / limit;
    let has_more = page * limit < total;

    Ok(Json(MessagesResponse {
        messages,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_messages: total,
            has_more,
        },
    }))
}

/// POST /v1/chat/messages
async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let user_id = claims.user_id()?;
    let conversation = participant_conversation(&state, req.conversation_id, user_id).await?;

    let message =
        Message::new(req.conversation_id, user_id, &req.content).map_err(AppError::chat)?;
    let recipient_id = conversation
        .other_participant(user_id)
        .map_err(AppError::chat)?;

    state
        .chat
        .create_message(&message, recipient_id)
        .await
        .map_err(AppError::repo)?;

    let _ = state
        .events_tx
        .send(ServerEvent::MessageReceived(MessageReceivedEvent {
            conversation_id: message.conversation_id,
            message_id: message.id,
            sender_id: user_id,
            recipient_id,
            content: message.content.clone(),
            sent_at: message.created_at.timestamp(),
        }));

    Ok((StatusCode::CREATED, Json(message)))
}

/// PATCH /v1/chat/conversations/:id/read
async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = claims.user_id()?;
    let conversation = participant_conversation(&state, conversation_id, user_id).await?;

    state
        .chat
        .mark_read(conversation_id, user_id)
        .await
        .map_err(AppError::repo)?;

    if let Ok(recipient_id) = conversation.other_participant(user_id) {
        let _ = state
            .events_tx
            .send(ServerEvent::MessagesRead(MessagesReadEvent {
                conversation_id,
                reader_id: user_id,
                recipient_id,
                read_at: Utc::now().timestamp(),
            }));
    }

    Ok(Json(json!({ "message": "Messages marked as read" })))
}

/// POST /v1/chat/conversations/:id/typing
/// Ephemeral: nothing is persisted, the indicator just fans out.
async fn typing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<Uuid>,
    Json(req): Json<TypingRequest>,
) -> Result<StatusCode, AppError> {
    let user_id = claims.user_id()?;
    let conversation = participant_conversation(&state, conversation_id, user_id).await?;
    let recipient_id = conversation
        .other_participant(user_id)
        .map_err(AppError::chat)?;

    let event = TypingEvent {
        conversation_id,
        user_id,
        recipient_id,
    };
    let _ = state.events_tx.send(if req.typing {
        ServerEvent::TypingStarted(event)
    } else {
        ServerEvent::TypingStopped(event)
    });

    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/chat/unread-count
async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = claims.user_id()?;
    let total = state
        .chat
        .total_unread(user_id)
        .await
        .map_err(AppError::repo)?;

    Ok(Json(json!({ "unread_count": total })))
}

/// GET /v1/chat/users
/// Directory for starting a chat: customers find vendors and vice versa.
async fn search_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let user_id = claims.user_id()?;

    let role = match query.role.as_deref() {
        None => None,
        Some(raw) => Some(
            UserRole::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", raw)))?,
        ),
    };

    let users = state
        .chat
        .search_users(
            user_id,
            role,
            query.search.as_deref(),
            state.business_rules.user_directory_limit,
        )
        .await
        .map_err(AppError::repo)?;

    Ok(Json(users))
}

/// GET /v1/chat/users/:id/online
async fn online_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Json<serde_json::Value> {
    Json(json!({
        "user_id": user_id,
        "is_online": state.presence.is_online(user_id),
    }))
}

// ============================================================================
// SSE delivery stream
// ============================================================================

/// Announces the user offline once the stream is dropped.
struct PresenceGuard {
    presence: Arc<PresenceRegistry>,
    events_tx: broadcast::Sender<ServerEvent>,
    user_id: Uuid,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        if self.presence.disconnect(self.user_id) {
            let _ = self
                .events_tx
                .send(ServerEvent::PresenceChanged(PresenceChangedEvent {
                    user_id: self.user_id,
                    online: false,
                }));
        }
    }
}

/// GET /v1/chat/stream?token=...
/// EventSource cannot set headers, so the token rides a query parameter.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let claims = decode_token(&state.auth.secret, &query.token)?;
    let user_id = claims.user_id()?;

    let rx = state.events_tx.subscribe();

    if state.presence.connect(user_id) {
        let _ = state
            .events_tx
            .send(ServerEvent::PresenceChanged(PresenceChangedEvent {
                user_id,
                online: true,
            }));
    }

    let guard = PresenceGuard {
        presence: state.presence.clone(),
        events_tx: state.events_tx.clone(),
        user_id,
    };

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        // The guard lives as long as the stream does
        let _keep_alive = &guard;

        let item = match result {
            Ok(event) => {
                let visible = event.recipient().map_or(true, |r| r == user_id);
                if visible {
                    serde_json::to_string(&event).ok().map(|data| {
                        Ok::<_, Infallible>(
                            Event::default().event(event.name()).data(data),
                        )
                    })
                } else {
                    None
                }
            }
            // Lagged subscribers drop missed events and keep going
            Err(_) => None,
        };

        futures_util::future::ready(item)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
