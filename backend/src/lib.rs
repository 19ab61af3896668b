//! Generative UI Backend Library
//!
//! Turns a natural-language request into a UI fragment built from a fixed
//! component vocabulary, by running three model calls: plan, generate and
//! explain. This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod llm;
pub mod text;
