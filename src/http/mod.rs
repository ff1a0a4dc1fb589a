use std::{net::SocketAddr, str::FromStr};

use axum::{
    extract::Extension,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use tower::ServiceBuilder;
use tower_http::{trace::TraceLayer, ServiceBuilderExt};

use crate::{
    backends::github::middleware::VerifyGitHubSignatureLayer,
    config::{Config, ConfigError},
    error::{ErrorCode, ErrorCodeDetail},
    server_info::ServerInfo,
    service::ServiceHandler,
};

impl IntoResponse for ErrorCode {
    fn into_response(self) -> Response {
        let details: ErrorCodeDetail = (&self).into();
        tracing::error!(
            internal_code = details.internal_code(),
            status = %details.status_code(),
            message = details.message(),
        );

        (details.status_code(), details.public_message()).into_response()
    }
}

#[tracing::instrument(skip(services))]
async fn root(services: Extension<ServiceHandler>) -> Json<ServerInfo> {
    Json(ServerInfo::new(services.backlog().is_some()))
}

#[tracing::instrument(skip(services))]
pub async fn start_server(config: Config, services: ServiceHandler) -> color_eyre::Result<()> {
    let addr = SocketAddr::from_str(config.bind_ip())
        .map_err(|_| ConfigError::MalformedBindIp(config.bind_ip().to_owned()))?;
    let app = build_http_router(config, services);
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

pub(crate) fn build_http_router(config: Config, services: ServiceHandler) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .insert_response_header_if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );

    Router::new()
        .route("/", get(root))
        .route(
            "/webhook/github",
            post(super::backends::github::webhook).layer(VerifyGitHubSignatureLayer::new(
                config.webhook_secret().map(|x| x.to_owned()),
            )),
        )
        .layer(middleware.into_inner())
        .layer(Extension(config))
        .layer(Extension(services))
}
