use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

const OPENAPI_JSON: &str = "/api-doc/openapi.json";

/// Swagger UI at `/docs` for the command, leaderboard and stream routes.
pub fn router(state: SharedState) -> Router<SharedState> {
    let swagger = SwaggerUi::new("/docs").url(OPENAPI_JSON, ApiDoc::openapi());
    Router::<SharedState>::from(swagger).with_state(state)
}
