//! Tool handler abstraction
//!
//! A [`ToolHandler`] is the asynchronous body of one tool. Providers own a
//! set of handlers keyed by [`ToolDescriptor`](super::entities::ToolDescriptor)
//! and invoke them once the arguments passed schema validation.
//!
//! Handlers are expected to be stateless with respect to individual calls:
//! a provider may serve several channels at once, and the only state a
//! handler shares between invocations is read-only configuration.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::entities::ToolArguments;
use super::validation::ValidationError;
use super::value_objects::CallToolResult;

/// The asynchronous body of a tool.
///
/// Implementations must not panic on bad input; failures are reported as a
/// [`CallToolResult::error`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: ToolArguments) -> CallToolResult;
}

#[async_trait]
impl<T: ToolHandler + ?Sized> ToolHandler for Arc<T> {
    async fn call(&self, arguments: ToolArguments) -> CallToolResult {
        (**self).call(arguments).await
    }
}

/// Decode validated arguments into a tool's typed argument struct
pub fn parse_arguments<A: DeserializeOwned>(arguments: ToolArguments) -> Result<A, ValidationError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ValidationError::Malformed(e.to_string()))
}

/// Encode a typed argument struct as call arguments
pub fn to_arguments<A: Serialize>(args: &A) -> ToolArguments {
    match serde_json::to_value(args) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => ToolArguments::new(),
    }
}

/// Handler backed by a closure over raw arguments
pub struct FnHandler<F>(F);

/// Wrap a closure `Fn(ToolArguments) -> impl Future<Output = CallToolResult>`
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(ToolArguments) -> Fut + Send + Sync,
    Fut: Future<Output = CallToolResult> + Send,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArguments) -> Fut + Send + Sync,
    Fut: Future<Output = CallToolResult> + Send,
{
    async fn call(&self, arguments: ToolArguments) -> CallToolResult {
        (self.0)(arguments).await
    }
}

/// Handler backed by a closure over a typed argument struct.
///
/// Decoding failures become an error result before the closure runs.
pub struct TypedHandler<A, F> {
    f: F,
    _args: PhantomData<fn() -> A>,
}

pub fn typed_handler<A, F, Fut>(f: F) -> TypedHandler<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = CallToolResult> + Send,
{
    TypedHandler {
        f,
        _args: PhantomData,
    }
}

#[async_trait]
impl<A, F, Fut> ToolHandler for TypedHandler<A, F>
where
    A: DeserializeOwned + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync,
    Fut: Future<Output = CallToolResult> + Send,
{
    async fn call(&self, arguments: ToolArguments) -> CallToolResult {
        match parse_arguments::<A>(arguments) {
            Ok(args) => (self.f)(args).await,
            Err(e) => CallToolResult::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::arguments::QueryArgs;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_fn_receives_arguments() {
        let handler = handler_fn(|args: ToolArguments| async move {
            CallToolResult::text(format!("{} args", args.len()))
        });

        let mut args = ToolArguments::new();
        args.insert("a".into(), json!(1));
        let result = handler.call(args).await;
        assert_eq!(result.text_content(), "1 args");
    }

    #[tokio::test]
    async fn test_typed_handler_decodes() {
        let handler =
            typed_handler(|args: QueryArgs| async move { CallToolResult::text(args.query) });

        let result = handler.call(to_arguments(&QueryArgs::new("Lemon"))).await;
        assert!(!result.is_error());
        assert_eq!(result.text_content(), "Lemon");
    }

    #[tokio::test]
    async fn test_typed_handler_rejects_malformed() {
        let handler =
            typed_handler(|args: QueryArgs| async move { CallToolResult::text(args.query) });

        let result = handler.call(ToolArguments::new()).await;
        assert!(result.is_error());
        assert!(result.text_content().contains("invalid arguments"));
    }

    #[tokio::test]
    async fn test_arc_handler_delegates() {
        let handler: Arc<dyn ToolHandler> =
            Arc::new(handler_fn(|_| async { CallToolResult::text("shared") }));
        let result = handler.call(ToolArguments::new()).await;
        assert_eq!(result.text_content(), "shared");
    }
}
