//! Domain layer - value objects, entities and pure rules.
//!
//! Nothing in this layer performs I/O or talks to a language model.

pub mod conversation;
pub mod foundation;
pub mod language;
pub mod translation;
