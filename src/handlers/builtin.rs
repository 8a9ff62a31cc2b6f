//! Handlers bundled with the server binary.
//!
//! - `Echo`: replies with its args, bindings and body as JSON
//! - `Text:show`: replies with `args.text` and an optional `args.status`

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::handlers::registry::{ActionCall, ConstructCall, HandlerError, HandlerRegistry, HandlerResult};

/// Add the bundled handlers to `registry`.
pub fn register(registry: &mut HandlerRegistry) {
    registry.construct("Echo", echo).action("Text", "show", text);
}

fn echo(call: ConstructCall<'_>) -> HandlerResult {
    let body = String::from_utf8_lossy(&call.body);
    Ok(Json(json!({
        "args": call.args,
        "variables": call.bindings,
        "body": body,
    }))
    .into_response())
}

fn text(call: ActionCall<'_>) -> HandlerResult {
    let status = match call.args.get("status").and_then(|s| s.as_u64()) {
        Some(code) => u16::try_from(code)
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .ok_or_else(|| HandlerError::from(format!("invalid status code {}", code)))?,
        None => StatusCode::OK,
    };
    let text = call
        .args
        .get("text")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    Ok((status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::dependency::Dependencies;
    use crate::routing::VariableBindings;
    use axum::body::{to_bytes, Bytes};

    #[tokio::test]
    async fn test_echo() {
        let args = json!({ "greeting": "hi" });
        let bindings: VariableBindings = [("id", "42")].into_iter().collect();
        let response = echo(ConstructCall {
            args: &args,
            bindings,
            body: Bytes::from_static(b"hello"),
        })
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["args"]["greeting"], "hi");
        assert_eq!(value["variables"]["id"], "42");
        assert_eq!(value["body"], "hello");
    }

    #[tokio::test]
    async fn test_text() {
        let args = json!({ "text": "gone", "status": 410 });
        let response = text(ActionCall {
            args: &args,
            dependencies: Dependencies::default(),
            bindings: VariableBindings::new(),
            body: Bytes::new(),
        })
        .unwrap();

        assert_eq!(response.status(), StatusCode::GONE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"gone");
    }

    #[test]
    fn test_text_rejects_bad_status() {
        let args = json!({ "status": 99999 });
        let result = text(ActionCall {
            args: &args,
            dependencies: Dependencies::default(),
            bindings: VariableBindings::new(),
            body: Bytes::new(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_register() {
        let mut registry = HandlerRegistry::new();
        register(&mut registry);
        assert!(registry.contains(&"Echo".parse().unwrap()));
        assert!(registry.contains(&"Text:show".parse().unwrap()));
    }
}
