//! OpenAPI document and the Swagger UI page that renders it.

use axum::{
    Json,
    extract::RawQuery,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{movements, reports, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tally API",
        description = "Incomes and expenses, user administration and reports."
    ),
    paths(
        movements::list,
        movements::get,
        movements::create,
        movements::update,
        movements::delete,
        users::list,
        users::get,
        users::update,
        users::delete,
        users::me,
        reports::get_report,
        reports::chart_csv,
    ),
    modifiers(&BasicAuth),
    security(("basic" = [])),
    tags(
        (name = "movements", description = "Financial movements"),
        (name = "users", description = "User administration (administrators only)"),
        (name = "reports", description = "Balance and monthly chart (administrators only)"),
    )
)]
pub struct ApiDoc;

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Tally API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.11.0/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5.11.0/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({
      url: "/docs?json=1",
      dom_id: "#swagger-ui",
      presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
    });
  </script>
</body>
</html>
"##;

fn wants_json(query: Option<&str>, headers: &HeaderMap) -> bool {
    let json_param = query
        .unwrap_or_default()
        .split('&')
        .any(|pair| pair == "json=1");
    let json_accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));
    json_param || json_accept
}

/// Swagger UI, or the raw OpenAPI document with `?json=1` or
/// `Accept: application/json`. Needs no credentials.
pub async fn docs(RawQuery(query): RawQuery, headers: HeaderMap) -> Response {
    if wants_json(query.as_deref(), &headers) {
        Json(ApiDoc::openapi()).into_response()
    } else {
        Html(SWAGGER_UI).into_response()
    }
}
