use crate::connection::sender::MessageSender;
use crate::message::client_request::ClientRequest;
use crate::message::error_message::{ErrorCode, ErrorMessage};
use crate::message::{MessageError, WebSocketMessage};
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use tracing::error;

pub type MessageReceiver = Pin<Box<dyn MessageReceiverTrait + Unpin + Send>>;

#[async_trait]
pub trait MessageReceiverTrait {
	/// Receive a request from the client or None if the connection has been closed.
	async fn receive(&mut self) -> Option<ClientRequest>;
}

pub struct StreamMessageReceiver<RequestStream> {
	request_stream: RequestStream,
	message_sender: MessageSender,
}

#[async_trait]
impl<RequestStream> MessageReceiverTrait for StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send,
{
	async fn receive(&mut self) -> Option<ClientRequest> {
		const MAXIMUM_RETRIES: usize = 10;

		let mut retries = 0;
		while retries < MAXIMUM_RETRIES {
			let websocket_message = self.request_stream.next().await?;

			match &websocket_message {
				WebSocketMessage::Close(_) => {
					self.message_sender.close().await;
					return None;
				}
				// heartbeats are the transport's concern
				WebSocketMessage::Ping(_) | WebSocketMessage::Pong(_) => continue,
				_ => {}
			}

			match ClientRequest::try_from(&websocket_message) {
				Ok(client_request) => return Some(client_request),
				Err(message_error) => {
					retries += 1;
					let message = match message_error {
						MessageError::DeserializationFailed { error, json } => {
							format!("Failed to deserialize client message with error: {error}, message was: {json}")
						}
						MessageError::WrongMessageType(message) => {
							format!("Client request has incorrect message type. Message was: {message:?}")
						}
					};
					error!("{message}");
					let _ = self
						.message_sender
						.send_event(
							ErrorMessage::builder()
								.code(ErrorCode::InvalidFormat)
								.message(message)
								.build()
								.into(),
						)
						.await;
				}
			}
		}

		let _ = self
			.message_sender
			.send_event(
				ErrorMessage::builder()
					.code(ErrorCode::InvalidFormat)
					.message("Too many invalid messages".to_string())
					.build()
					.into(),
			)
			.await;
		self.message_sender.close().await;
		None
	}
}

impl<RequestStream> StreamMessageReceiver<RequestStream>
where
	RequestStream: Stream<Item = WebSocketMessage>,
{
	pub fn new(request_stream: RequestStream, message_sender: MessageSender) -> Self {
		Self {
			request_stream,
			message_sender,
		}
	}
}

impl<RequestStream> From<StreamMessageReceiver<RequestStream>> for MessageReceiver
where
	RequestStream: Stream<Item = WebSocketMessage> + Unpin + Send + 'static,
{
	fn from(stream_message_receiver: StreamMessageReceiver<RequestStream>) -> Self {
		Box::pin(stream_message_receiver)
	}
}
