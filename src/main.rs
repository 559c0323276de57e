use crate::commandline::Commandline;
use crate::error::ServerError;
use clap::Parser;

mod auth;
mod chat;
mod commandline;
mod configuration;
mod connection;
mod context;
mod database;
mod error;
mod files;
mod lifecycle;
mod message;
mod rfq;
mod room;
mod server;
mod utils;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
	Commandline::parse().run().await
}
