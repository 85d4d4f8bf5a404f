//! Classifier boundary for Komando.
//!
//! The coordinator talks to an external language model only through
//! [`ClassifierClient`]: a request carries the system instruction, the
//! conversation history and the intent schemas; the response carries optional
//! free text plus the function calls the model chose.

pub mod client;
pub mod config;
pub mod gemini;
pub mod openai;

pub use client::{
    ClassifierClient, ClassifierRequest, ClassifierResponse, FunctionCall, HistoryEntry,
    HistoryRole, ToolDeclaration, UnconfiguredClassifier,
};
pub use config::{LlmConfig, build_classifier_client, build_classifier_client_with_key};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
