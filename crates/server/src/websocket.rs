//! WebSocket chat transport
//!
//! One session per connection. Messages are processed sequentially in
//! arrival order; the client gets a `query_received` ack before the
//! (potentially slow) answer arrives.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use support_agent_core::Intent;

use crate::state::AppState;

/// Messages the client may send
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    UserQuery { data: QueryData },
    HealthCheck,
    GetStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryData {
    pub message: String,
}

/// Messages the server emits
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    SessionInfo {
        session_id: String,
    },
    QueryReceived,
    BotResponse {
        message: String,
        original_query: String,
        intent: Intent,
        is_goodbye: bool,
        from_cache: bool,
    },
    Error {
        message: String,
    },
    SessionEnding,
    HealthStatus {
        llm_available: bool,
        documents: Option<usize>,
        session_backend: String,
    },
    SessionStats {
        session_id: String,
        created_at: String,
        last_activity: String,
        turn_count: u64,
        form_state: String,
        documents: Option<usize>,
    },
}

type WsSender = SplitSink<WebSocket, Message>;

async fn send_event(sender: &mut WsSender, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server event");
            false
        }
    }
}

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let session_id = match state.store.create_session().await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create session");
            let _ = send_event(
                &mut sender,
                &ServerEvent::Error {
                    message: "Unable to start a session right now. Please try again.".to_string(),
                },
            )
            .await;
            return;
        }
    };

    tracing::info!(session_id = %session_id, "WebSocket session started");

    if !send_event(
        &mut sender,
        &ServerEvent::SessionInfo {
            session_id: session_id.clone(),
        },
    )
    .await
    {
        return;
    }

    // Up-front details collection starts with a greeting that doubles as
    // the first form prompt.
    if state.settings.session.initial_details_collection {
        let greeting = state.agent.canned_text().initial_ask_name();
        let _ = send_event(
            &mut sender,
            &ServerEvent::BotResponse {
                message: greeting,
                original_query: String::new(),
                intent: Intent::Greeting,
                is_goodbye: false,
                from_cache: false,
            },
        )
        .await;
    }

    while let Some(Ok(message)) = receiver.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let request = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Malformed client message");
                let _ = send_event(
                    &mut sender,
                    &ServerEvent::Error {
                        message: "Invalid message format".to_string(),
                    },
                )
                .await;
                continue;
            }
        };

        match request {
            ClientMessage::UserQuery { data } => {
                let message = data.message;
                if message.trim().is_empty() {
                    let _ = send_event(
                        &mut sender,
                        &ServerEvent::Error {
                            message: "Empty message".to_string(),
                        },
                    )
                    .await;
                    continue;
                }

                let _ = send_event(&mut sender, &ServerEvent::QueryReceived).await;

                match state.agent.process_message(&session_id, &message).await {
                    Ok(outcome) => {
                        let is_goodbye = outcome.is_goodbye;
                        let _ = send_event(
                            &mut sender,
                            &ServerEvent::BotResponse {
                                message: outcome.response,
                                original_query: message.clone(),
                                intent: outcome.intent,
                                is_goodbye,
                                from_cache: outcome.from_cache,
                            },
                        )
                        .await;

                        if is_goodbye {
                            end_session(&state, &session_id).await;
                            let _ = send_event(&mut sender, &ServerEvent::SessionEnding).await;
                            break;
                        }
                    }
                    Err(e) if e.is_session_not_found() => {
                        let _ = send_event(
                            &mut sender,
                            &ServerEvent::Error {
                                message: "Session expired. Please reconnect.".to_string(),
                            },
                        )
                        .await;
                        break;
                    }
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "Message processing failed");
                        let _ = send_event(
                            &mut sender,
                            &ServerEvent::Error {
                                message: "Something went wrong processing your message."
                                    .to_string(),
                            },
                        )
                        .await;
                    }
                }
            }
            ClientMessage::HealthCheck => {
                let llm_available = state.llm.is_available().await;
                let documents = state.search.collection_size().await.ok();
                let _ = send_event(
                    &mut sender,
                    &ServerEvent::HealthStatus {
                        llm_available,
                        documents,
                        session_backend: state.store.backend_name().to_string(),
                    },
                )
                .await;
            }
            ClientMessage::GetStats => {
                match state.store.session_info(&session_id).await {
                    Some(record) => {
                        let documents = state.search.collection_size().await.ok();
                        let _ = send_event(
                            &mut sender,
                            &ServerEvent::SessionStats {
                                session_id: record.session_id,
                                created_at: record.created_at.to_rfc3339(),
                                last_activity: record.last_activity.to_rfc3339(),
                                turn_count: record.turn_count,
                                form_state: record.form_state.as_str().to_string(),
                                documents,
                            },
                        )
                        .await;
                    }
                    None => {
                        let _ = send_event(
                            &mut sender,
                            &ServerEvent::Error {
                                message: "Session not found".to_string(),
                            },
                        )
                        .await;
                    }
                }
            }
        }
    }

    tracing::info!(session_id = %session_id, "WebSocket session closed");
}

/// Archive the transcript (when a durable store is wired) and drop the
/// session's working state.
async fn end_session(state: &AppState, session_id: &str) {
    if let Some(archive) = &state.archive {
        let history = state.store.get_session_history(session_id, None).await;
        let details = state.store.contact_form_data(session_id).await;
        if let Err(e) = archive
            .save_conversation(session_id, &history, &details)
            .await
        {
            tracing::error!(session_id = %session_id, error = %e, "Failed to archive conversation");
        }
    }

    state.store.clear_session(session_id).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_parsing() {
        let parsed: ClientMessage =
            serde_json::from_str(r#"{"type":"user_query","data":{"message":"hi there"}}"#)
                .unwrap();
        assert!(
            matches!(parsed, ClientMessage::UserQuery { data } if data.message == "hi there")
        );

        let parsed: ClientMessage = serde_json::from_str(r#"{"type":"health_check"}"#).unwrap();
        assert!(matches!(parsed, ClientMessage::HealthCheck));

        // unknown types are rejected by the parser and become error events
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"emoji_blast"}"#).is_err());
    }

    #[test]
    fn test_server_event_wire_format() {
        let event = ServerEvent::BotResponse {
            message: "Hello!".to_string(),
            original_query: "hi".to_string(),
            intent: Intent::Greeting,
            is_goodbye: false,
            from_cache: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"bot_response""#));
        assert!(json.contains(r#""intent":"greeting""#));
        assert!(json.contains(r#""original_query":"hi""#));
        assert!(json.contains(r#""from_cache":true"#));
    }
}
