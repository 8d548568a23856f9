//! Formcraft - Conversational form-definition assistant
//!
//! This crate turns a free-text form request into a complete brief for a
//! form generator. A set of model-backed agents judges whether the request is
//! detailed enough, asks clarifying questions until it is, detects whether
//! the form should be multilingual and translates the generated form.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
