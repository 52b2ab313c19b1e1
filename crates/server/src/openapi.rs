use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub database: String, pub version: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct MovieDoc {
    pub id: i64,
    pub title: String,
    pub score: f64,
    pub count: i32,
    pub image: String,
    pub release_year: Option<i32>,
}

#[derive(utoipa::ToSchema)]
pub struct MovieInputDoc {
    pub title: String,
    pub release_year: Option<i32>,
    pub image: String,
}

#[derive(utoipa::ToSchema)]
pub struct MoviePageDoc {
    pub items: Vec<MovieDoc>,
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

#[derive(utoipa::ToSchema)]
pub struct ScoreDoc {
    pub movie_id: i64,
    /// 0.0 to 5.0
    pub score: f64,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::movies::list,
        crate::routes::movies::get,
        crate::routes::movies::create,
        crate::routes::movies::update,
        crate::routes::movies::delete,
        crate::routes::scores::save,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            MovieDoc,
            MovieInputDoc,
            MoviePageDoc,
            ScoreDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "movies"),
        (name = "scores")
    )
)]
pub struct ApiDoc;
