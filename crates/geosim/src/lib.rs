//! GeoSim - AI-assisted simulation records
//!
//! Turns a materials or mining process form into a prompt, sends it to a
//! chat-completion model, normalizes the answer into chartable JSON and
//! stores it as a record owned by the submitting account. Records are
//! private until their owner publishes them to the knowledge hub.

pub mod activity;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod normalizer;
pub mod prompt;
pub mod record;
pub mod render;
pub mod schema;
pub mod server;
pub mod session;
pub mod store;
pub mod templates;
pub mod views;
