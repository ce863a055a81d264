//! APNs push adapter.
//!
//! Composes gateway-ready notifications from application messages, dispatches
//! them one device at a time over a persistent gateway connection, records
//! per-device delivery outcomes, and polls the feedback channel for
//! invalidated device tokens.
//!
//! The binary wire protocol itself is an external collaborator: the adapter
//! drives any client satisfying [`GatewayClient`], obtained through a
//! [`GatewayConnector`]. No pooling, no retry scheduling, no queueing.

pub mod adapter;
pub mod config;
mod connection;
pub mod error;
pub mod gateway;
pub mod message;
pub mod notification;

pub use adapter::{ApnsAdapter, DeliveryOutcome};
pub use config::{ApnsConfig, Environment};
pub use error::AdapterError;
pub use gateway::{
    FeedbackRecord, GatewayClient, GatewayConnector, GatewayError, GatewayResponse, Purpose,
    ResultCode,
};
pub use message::{Device, Message, MessageOptions, PushRequest};
pub use notification::{Alert, Notification, compose};
