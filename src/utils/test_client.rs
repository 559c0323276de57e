use crate::chat::model::ChatMessage;
use crate::connection::receiver::{MessageReceiver, StreamMessageReceiver};
use crate::connection::sender::{MessageSender, SinkMessageSender};
use crate::message::WebSocketMessage;
use crate::message::client_request::ClientRequest;
use crate::message::error_message::ErrorMessage;
use crate::message::server_event::{HistoryEvent, ReadBroadcast, ServerEvent, TypingBroadcast};
use futures_channel::mpsc::{UnboundedReceiver, UnboundedSender};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;

/// The client side of an in-memory connection: what goes in through
/// [`ChatTestClient::send_request`] comes out of the paired
/// [`MessageReceiver`], and everything sent through the paired
/// [`MessageSender`] can be received here as typed events.
pub struct ChatTestClient {
	sender: UnboundedSender<WebSocketMessage>,
	receiver: UnboundedReceiver<WebSocketMessage>,
}

impl ChatTestClient {
	pub fn new() -> (MessageSender, MessageReceiver, Self) {
		let (client_sender, server_receiver) = futures_channel::mpsc::unbounded();
		let (server_sender, client_receiver) = futures_channel::mpsc::unbounded();

		let message_sender = MessageSender::from(SinkMessageSender::new(server_sender));
		let message_receiver = MessageReceiver::from(StreamMessageReceiver::new(
			server_receiver,
			message_sender.clone(),
		));

		let test_client = Self {
			sender: client_sender,
			receiver: client_receiver,
		};

		(message_sender, message_receiver, test_client)
	}

	pub async fn send_request(&mut self, request: impl Into<ClientRequest>) {
		let websocket_message = WebSocketMessage::from(&request.into());
		self.sender
			.send(websocket_message)
			.await
			.expect("Failed to send request via ChatTestClient.");
	}

	pub async fn receive_event(&mut self) -> ServerEvent {
		let websocket_message = self
			.receiver
			.next()
			.await
			.expect("Failed to receive event via ChatTestClient");
		ServerEvent::try_from(&websocket_message).expect("Failed to deserialize ServerEvent")
	}

	pub async fn receive_history_event(&mut self) -> HistoryEvent {
		match self.receive_event().await {
			ServerEvent::History(history) => history,
			event => panic!("Received event with incorrect type: {event:?}"),
		}
	}

	pub async fn receive_message_event(&mut self) -> ChatMessage {
		match self.receive_event().await {
			ServerEvent::Message(message) => message,
			event => panic!("Received event with incorrect type: {event:?}"),
		}
	}

	pub async fn receive_typing_event(&mut self) -> TypingBroadcast {
		match self.receive_event().await {
			ServerEvent::Typing(typing) => typing,
			event => panic!("Received event with incorrect type: {event:?}"),
		}
	}

	pub async fn receive_read_event(&mut self) -> ReadBroadcast {
		match self.receive_event().await {
			ServerEvent::Read(read) => read,
			event => panic!("Received event with incorrect type: {event:?}"),
		}
	}

	pub async fn receive_error_event(&mut self) -> ErrorMessage {
		match self.receive_event().await {
			ServerEvent::Error(error) => error,
			event => panic!("Received event with incorrect type: {event:?}"),
		}
	}

	/// Give the server a moment, then assert nothing has been delivered.
	pub async fn assert_no_event(&mut self) {
		tokio::time::sleep(Duration::from_millis(50)).await;
		if let Ok(Some(websocket_message)) = self.receiver.try_next() {
			panic!("Expected no event but received: {websocket_message:?}");
		}
	}
}
