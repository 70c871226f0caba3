//! LLM integration for writerlens.
//!
//! This module provides an OpenAI-compatible chat-completions client used by
//! the insight extraction and report aggregation stages. Any provider that
//! speaks the OpenAI wire format works (OpenAI, LiteLLM proxies, OpenRouter).

mod client;

pub use client::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, OpenAiClient, Usage,
};
