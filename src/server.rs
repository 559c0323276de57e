use crate::chat::model::MessageKind;
use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::context::ApplicationContext;
use crate::error::ServerError;
use crate::files::kind_for_file_name;
use crate::lifecycle::run_session;
use axum::Json;
use axum::Router;
use axum::extract::ws::WebSocket;
use axum::extract::{Multipart, Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::future::ready;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

pub async fn run_server(context: ApplicationContext) -> Result<(), ServerError> {
	let address = context.configuration.address;
	let listener = tokio::net::TcpListener::bind(address).await?;

	info!("Starting server. Open websocket connections at 'ws://{address}/ws'.");
	axum::serve(listener, create_router(context)).await?;
	Ok(())
}

pub fn create_router(context: ApplicationContext) -> Router {
	let file_directory = context.configuration.file_storage_path.clone();
	Router::new()
		.route("/ws", get(websocket))
		.route("/api/files", post(upload_file))
		.nest_service("/files", ServeDir::new(file_directory))
		.layer(CorsLayer::permissive())
		.with_state(context)
}

#[derive(Deserialize)]
struct ConnectQuery {
	token: String,
}

async fn websocket(
	State(context): State<ApplicationContext>,
	Query(ConnectQuery { token }): Query<ConnectQuery>,
	upgrade: WebSocketUpgrade,
) -> Response {
	let user_id = match context.auth.verify(&token).await {
		Ok(user_id) => user_id,
		Err(error) => {
			warn!(%error, "Rejected websocket connection");
			return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
		}
	};

	upgrade
		.on_upgrade(move |websocket| {
			let (message_sender, message_receiver) = split_websocket(websocket);
			run_session(context.chat.clone(), user_id, message_sender, message_receiver)
		})
		.into_response()
}

fn split_websocket(websocket: WebSocket) -> (MessageSender, MessageReceiver) {
	let (sink, stream) = websocket.split();

	let message_sender = MessageSender::from(SinkMessageSender::new(sink));
	let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(
		// a transport error ends the session via the normal disconnect path
		stream.filter_map(|result| ready(result.ok())),
		message_sender.clone(),
	));

	(message_sender, message_receiver)
}

#[derive(Serialize)]
struct UploadResponse {
	url: String,
	kind: MessageKind,
}

/// Attachments are uploaded here, out-of-band of the chat socket; only the
/// returned URL travels through a subsequent `send` event.
async fn upload_file(
	State(context): State<ApplicationContext>,
	Query(ConnectQuery { token }): Query<ConnectQuery>,
	mut multipart: Multipart,
) -> Result<Json<UploadResponse>, Response> {
	if let Err(error) = context.auth.verify(&token).await {
		warn!(%error, "Rejected file upload");
		return Err((StatusCode::UNAUTHORIZED, "Invalid token").into_response());
	}

	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|error| (StatusCode::BAD_REQUEST, error.to_string()).into_response())?
	{
		if field.name() != Some("file") {
			continue;
		}

		let name = field.file_name().unwrap_or("upload").to_string();
		let bytes = field
			.bytes()
			.await
			.map_err(|error| (StatusCode::BAD_REQUEST, error.to_string()).into_response())?;

		let url = context.files.put(&bytes, &name).await.map_err(|error| {
			warn!(%error, "Failed to store upload");
			(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store file").into_response()
		})?;

		return Ok(Json(UploadResponse {
			url,
			kind: kind_for_file_name(&name),
		}));
	}

	Err((StatusCode::BAD_REQUEST, "Missing 'file' field").into_response())
}
