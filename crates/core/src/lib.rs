//! Domain logic for the arcana tarot backend.
//!
//! Pure, I/O-free building blocks: the card catalog and spread drawing,
//! intention validation/sanitization, and reading-request assembly with
//! prompt building and HTML rendering. Everything here is deterministic
//! given its inputs (the deck takes an explicit RNG for tests).

pub mod deck;
pub mod error;
pub mod intent;
pub mod reading;
