//! HTTP endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::web::{self, Data};
use actix_web::{App, HttpResponse, HttpServer, Responder};
use tracing::info;

use super::handler::RpcHandler;

/// Default cap on a request body.
///
/// Leaves room for contract deployment transactions, whose hex encoded
/// cell data runs to megabytes.
pub const DEFAULT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Answers one JSON-RPC POST body.
///
/// A single notification gets `204 No Content`; everything else, parse
/// errors included, is a `200` JSON body.
pub async fn json_rpc<T>(handler: Data<RpcHandler<T>>, body: web::Bytes) -> impl Responder
where
    T: Clone + Send + Sync + 'static,
{
    match handler.handle_request(&body).await {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::NoContent().finish(),
    }
}

/// Mounts the endpoint at `/`, accepting bodies up to `body_limit` bytes.
///
/// Larger bodies are refused with `413 Payload Too Large`.
pub fn configure<T>(body_limit: usize) -> impl FnOnce(&mut web::ServiceConfig)
where
    T: Clone + Send + Sync + 'static,
{
    move |cfg| {
        cfg.app_data(web::PayloadConfig::new(body_limit))
            .route("/", web::post().to(json_rpc::<T>));
    }
}

/// Binds the HTTP server on `addr`.
///
/// # Errors
///
/// Returns the bind error if the address is unavailable.
pub fn serve<T>(
    addr: SocketAddr,
    handler: Arc<RpcHandler<T>>,
    body_limit: usize,
) -> std::io::Result<Server>
where
    T: Clone + Send + Sync + 'static,
{
    let data = Data::from(handler);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(configure::<T>(body_limit))
    })
    .bind(addr)?;

    for bound in server.addrs() {
        info!(addr = %bound, body_limit, "JSON-RPC server listening");
    }
    Ok(server.run())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::rpc::error::RpcError;

    async fn ping(_: (), _: Value) -> Result<Value, RpcError> {
        Ok(json!("pong"))
    }

    fn handler() -> Data<RpcHandler<()>> {
        let mut handler = RpcHandler::new(());
        handler.register_method("ping", crate::async_handler!(ping));
        Data::new(handler)
    }

    #[actix_web::test]
    async fn test_single_request() {
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(DEFAULT_BODY_LIMIT)),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/")
            .set_payload(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": "pong", "id": 1}));
    }

    #[actix_web::test]
    async fn test_notification_is_no_content() {
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(DEFAULT_BODY_LIMIT)),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/")
            .set_payload(r#"{"jsonrpc":"2.0","method":"ping"}"#)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_batch_of_notifications_is_empty_array() {
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(DEFAULT_BODY_LIMIT)),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/")
            .set_payload(r#"[{"jsonrpc":"2.0","method":"ping"}]"#)
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(response, json!([]));
    }

    #[actix_web::test]
    async fn test_parse_error_is_ok_status() {
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(DEFAULT_BODY_LIMIT)),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/")
            .set_payload("{")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"]["code"], json!(-32700));
    }

    /// A request whose single string parameter pads the body to `size` bytes.
    fn padded_request(size: usize) -> String {
        let envelope = r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":[""]}"#;
        let padding = "a".repeat(size.saturating_sub(envelope.len()));
        format!(r#"{{"jsonrpc":"2.0","id":1,"method":"ping","params":["{padding}"]}}"#)
    }

    #[actix_web::test]
    async fn test_body_over_actix_default_is_accepted() {
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(DEFAULT_BODY_LIMIT)),
        )
        .await;

        let body = padded_request(300 * 1024);
        assert!(body.len() > 256 * 1024);
        let request = test::TestRequest::post().uri("/").set_payload(body).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["result"], json!("pong"));
    }

    #[actix_web::test]
    async fn test_body_limit_boundary() {
        const LIMIT: usize = 4096;
        let app = test::init_service(
            App::new().app_data(handler()).configure(configure::<()>(LIMIT)),
        )
        .await;

        let body = padded_request(LIMIT);
        assert_eq!(body.len(), LIMIT);
        let request = test::TestRequest::post().uri("/").set_payload(body).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = test::TestRequest::post()
            .uri("/")
            .set_payload(padded_request(LIMIT + 1))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
