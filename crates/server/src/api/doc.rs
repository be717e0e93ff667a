//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kairos API",
        version = "0.1.0",
        description = "Task management with schedule optimization.",
    ),
    tags(
        (name = "Health", description = "Liveness and counters"),
        (name = "Auth", description = "Registration and bearer tokens"),
        (name = "Tasks", description = "Task CRUD scoped to the caller"),
        (name = "Schedule", description = "Rank tasks into a schedule"),
        (name = "Users", description = "Account management"),
    ),
    paths(
        crate::api::health::health,
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::tasks::create_task,
        crate::api::tasks::list_tasks,
        crate::api::tasks::get_task,
        crate::api::tasks::update_task,
        crate::api::tasks::delete_task,
        crate::api::tasks::optimize_schedule,
        crate::api::users::delete_me,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::auth::Credentials,
        crate::api::tasks::TaskUpdate,
        crate::api::tasks::OptimizeRequest,
        kairos_auth::AccessToken,
        kairos_core::Task,
        kairos_core::TaskInput,
        kairos_core::TaskPatch,
        kairos_core::TaskPriority,
        kairos_core::TaskStatus,
        kairos_core::TaskCategory,
        kairos_core::UserPublic,
    )),
    modifiers(&BearerAuth),
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
