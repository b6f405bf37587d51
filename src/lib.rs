//! Sky photo → cloud type → rain probability, backed by a hosted
//! classification workflow.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod prediction;
pub mod rain;
