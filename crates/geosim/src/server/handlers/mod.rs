//! Endpoint handlers

pub mod dashboard;
pub mod logs;
pub mod public;
pub mod simulate;
pub mod simulations;
pub mod status;
pub mod templates;
pub mod users;
