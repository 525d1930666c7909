//! HTTP request handlers.

pub mod cards;
pub mod intake;
