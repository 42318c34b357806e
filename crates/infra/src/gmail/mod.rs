//! Gmail REST adapter for the mailbox port

mod dto;
pub mod gateway;

pub use gateway::{gateway_from_config, GmailGateway};
