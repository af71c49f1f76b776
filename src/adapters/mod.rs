//! Adapters layered over domain functionality.

pub mod cache;
