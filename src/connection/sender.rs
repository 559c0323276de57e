use crate::message::WebSocketMessage;
use crate::message::server_event::ServerEvent;
use async_trait::async_trait;
use futures_util::{Sink, SinkExt};
use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;
use tracing::error;

pub type MessageSender = Pin<Arc<dyn MessageSenderTrait + Send + Sync>>;

#[async_trait]
pub trait MessageSenderTrait {
	async fn send_event(&self, event: ServerEvent) -> Result<(), ()>;
	async fn close(&self);
}

/// Adapts any websocket sink into a [`MessageSender`]. Sends are serialized
/// through a mutex so events from the inbound handler and the broadcast
/// writer never interleave mid-frame.
pub struct SinkMessageSender<EventSink> {
	sink: tokio::sync::Mutex<EventSink>,
}

#[async_trait]
impl<EventSink, SinkError> MessageSenderTrait for SinkMessageSender<EventSink>
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	async fn send_event(&self, event: ServerEvent) -> Result<(), ()> {
		let mut sink = self.sink.lock().await;

		let websocket_message = WebSocketMessage::from(&event);
		sink.send(websocket_message)
			.await
			.map_err(|error| error!(?error, "Error while sending event"))
	}

	async fn close(&self) {
		let mut sink = self.sink.lock().await;
		let _ = sink.send(WebSocketMessage::Close(None)).await;
	}
}

impl<EventSink, SinkError> SinkMessageSender<EventSink>
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Unpin,
	SinkError: Debug + 'static,
{
	pub fn new(sink: EventSink) -> Self {
		Self { sink: sink.into() }
	}
}

impl<EventSink, SinkError> From<SinkMessageSender<EventSink>> for MessageSender
where
	EventSink: Sink<WebSocketMessage, Error = SinkError> + Send + Unpin + 'static,
	SinkError: Debug + 'static,
{
	fn from(sink_message_sender: SinkMessageSender<EventSink>) -> Self {
		Arc::pin(sink_message_sender)
	}
}
