//! Ollama model host adapter
//!
//! [`OllamaClient`] implements [`LanguageModel`](toolbridge_application::LanguageModel)
//! for the classifier and [`ReadinessProbe`](toolbridge_application::ReadinessProbe)
//! for the startup gate.

mod client;

pub use client::{OllamaClient, model_http_client};
