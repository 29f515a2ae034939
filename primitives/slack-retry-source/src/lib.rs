//! Slack Retry Source - `/retry` Slash-Command Receiver
//!
//! Receives Slack `/retry` slash commands, verifies Slack's request
//! signature, and publishes a retry job for the employee-sync worker.
//!
//! Sources are SILENT - they only produce domain messages.
//! All lifecycle events are published by the engine.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod publisher;
pub mod secrets;
pub mod server;
pub mod signature;

pub use dispatch::{DispatchConfig, DispatchDecision, Dispatcher, IncomingRequest};
pub use error::DispatchError;
