use rocket::Request;
use rocket::State;
use rocket::fs::NamedFile;
use rocket::http::{CookieJar, Status};
use rocket::response::status::Custom;
use rocket::serde::{
    Deserialize, Serialize,
    json::{self, Json},
};
use sqlx::{Pool, Sqlite};
use tracing::Instrument;
use validator::Validate;

use crate::auth::{self, AdminCredentials, Session};
use crate::config::AppConfig;
use crate::directory;
use crate::error::AppError;
use crate::ledger;
use crate::models::{ProjectFields, TrainerUpdate};
use crate::shaping::{GroupedProjects, TrainerView};
use crate::telemetry::RequestSpan;
use crate::validation::ValidateRequest;

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TrainerLoginResponse {
    pub success: bool,
    pub message: String,
    pub trainer_name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TrainersResponse {
    pub success: bool,
    pub trainers: Vec<TrainerView>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProjectsResponse {
    pub success: bool,
    pub projects: GroupedProjects,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionStatus {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trainer_name: Option<String>,
}

impl From<&Session> for SessionStatus {
    fn from(session: &Session) -> Self {
        match session {
            Session::Anonymous => Self {
                logged_in: false,
                user_type: None,
                trainer_name: None,
            },
            Session::Administrator => Self {
                logged_in: true,
                user_type: Some("admin".to_string()),
                trainer_name: None,
            },
            Session::Trainer(identity) => Self {
                logged_in: true,
                user_type: Some("trainer".to_string()),
                trainer_name: Some(identity.name.clone()),
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminLoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainerLoginRequest {
    #[serde(default)]
    trainer_name: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTrainerRequest {
    #[serde(default)]
    #[validate(
        required(message = "Trainer name and password are required"),
        length(min = 1, message = "Trainer name and password are required")
    )]
    trainer_name: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "Trainer name and password are required"),
        length(min = 1, message = "Trainer name and password are required")
    )]
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainerUpdateRequest {
    #[serde(default)]
    trainer_name: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl From<TrainerUpdateRequest> for TrainerUpdate {
    fn from(request: TrainerUpdateRequest) -> Self {
        Self {
            name: request.trainer_name,
            password: request.password,
        }
    }
}

#[get("/")]
pub async fn index(config: &State<AppConfig>) -> Option<NamedFile> {
    NamedFile::open(config.static_dir.join("index.html"))
        .await
        .ok()
}

/// A JSON body whose parse failure is handled by the route, after the
/// session check, instead of by the catcher.
type JsonBody<'r, T> = Result<Json<T>, json::Error<'r>>;

#[post("/admin/login", data = "<login>")]
pub async fn api_admin_login(
    login: Json<AdminLoginRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    admin: &State<AdminCredentials>,
    config: &State<AppConfig>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    auth::login_admin(
        db,
        cookies,
        admin,
        config.session_ttl(),
        &login.username,
        &login.password,
    )
    .instrument(span.0)
    .await?;

    Ok(Json(MessageResponse::success("Login successful")))
}

#[post("/admin/create_trainer", data = "<request>")]
pub async fn api_create_trainer(
    request: JsonBody<'_, CreateTrainerRequest>,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    session.require_admin()?;
    let request = request?;
    request.validate_request()?;

    directory::create_trainer(
        db,
        &session,
        request.trainer_name.as_deref().unwrap_or_default(),
        request.password.as_deref().unwrap_or_default(),
    )
    .instrument(span.0)
    .await?;

    Ok(Json(MessageResponse::success("Trainer created successfully")))
}

#[get("/admin/trainers")]
pub async fn api_get_trainers(
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<TrainersResponse>, AppError> {
    let trainers = directory::list_trainers(db, &session)
        .instrument(span.0)
        .await?;

    Ok(Json(TrainersResponse {
        success: true,
        trainers,
    }))
}

#[put("/admin/trainer/<id>", data = "<update>")]
pub async fn api_update_trainer(
    id: &str,
    update: JsonBody<'_, TrainerUpdateRequest>,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    session.require_admin()?;
    let update = TrainerUpdate::from(update?.into_inner());

    directory::update_trainer(db, &session, id, &update)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Trainer updated successfully")))
}

#[delete("/admin/trainer/<id>")]
pub async fn api_delete_trainer(
    id: &str,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    directory::delete_trainer(db, &session, id)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Trainer deleted successfully")))
}

#[get("/admin/projects")]
pub async fn api_get_all_projects(
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<ProjectsResponse>, AppError> {
    let projects = ledger::list_for_admin(db, &session)
        .instrument(span.0)
        .await?;

    Ok(Json(ProjectsResponse {
        success: true,
        projects,
    }))
}

#[put("/admin/project/<id>", data = "<fields>")]
pub async fn api_admin_update_project(
    id: &str,
    fields: JsonBody<'_, ProjectFields>,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    session.require_admin()?;
    let fields = fields?;

    ledger::update_as_admin(db, &session, id, &fields)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Project updated successfully")))
}

#[delete("/admin/project/<id>")]
pub async fn api_admin_delete_project(
    id: &str,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    ledger::delete_as_admin(db, &session, id)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Project deleted successfully")))
}

#[post("/user/login", data = "<login>")]
pub async fn api_trainer_login(
    login: Json<TrainerLoginRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
    span: RequestSpan,
) -> Result<Json<TrainerLoginResponse>, AppError> {
    let session = auth::login_trainer(
        db,
        cookies,
        config.session_ttl(),
        &login.trainer_name,
        &login.password,
    )
    .instrument(span.0)
    .await?;

    let trainer = session.require_trainer()?;

    Ok(Json(TrainerLoginResponse {
        success: true,
        message: "Login successful".to_string(),
        trainer_name: trainer.name.clone(),
    }))
}

#[get("/user/projects")]
pub async fn api_get_my_projects(
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<ProjectsResponse>, AppError> {
    let projects = ledger::list_for_trainer(db, &session)
        .instrument(span.0)
        .await?;

    Ok(Json(ProjectsResponse {
        success: true,
        projects,
    }))
}

#[post("/user/projects", data = "<fields>")]
pub async fn api_create_project(
    fields: JsonBody<'_, ProjectFields>,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    session.require_trainer()?;
    let fields = fields?;

    ledger::create_project(db, &session, &fields)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Project added successfully")))
}

#[put("/user/project/<id>", data = "<fields>")]
pub async fn api_update_my_project(
    id: &str,
    fields: JsonBody<'_, ProjectFields>,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    session.require_trainer()?;
    let fields = fields?;

    ledger::update_as_trainer(db, &session, id, &fields)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Project updated successfully")))
}

#[delete("/user/project/<id>")]
pub async fn api_delete_my_project(
    id: &str,
    session: Session,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Result<Json<MessageResponse>, AppError> {
    ledger::delete_as_trainer(db, &session, id)
        .instrument(span.0)
        .await?;

    Ok(Json(MessageResponse::success("Project deleted successfully")))
}

#[get("/check_session")]
pub fn api_check_session(session: Session) -> Json<SessionStatus> {
    Json(SessionStatus::from(&session))
}

#[post("/logout")]
pub async fn api_logout(
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    span: RequestSpan,
) -> Json<MessageResponse> {
    auth::logout(db, cookies).instrument(span.0).await;

    Json(MessageResponse::success("Logged out successfully"))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Answers every unhandled status with the same JSON failure body the
/// routes use.
#[catch(default)]
pub fn api_catcher(status: Status, _req: &Request) -> Custom<Json<MessageResponse>> {
    let message = match status {
        s if s == Status::BadRequest => "Malformed request body",
        s if s == Status::Unauthorized => "Unauthorized",
        s if s == Status::NotFound => "Resource not found",
        s if s == Status::UnprocessableEntity => "Request body has missing or unrecognized fields",
        s if s == Status::InternalServerError => "Internal server error",
        _ => status.reason().unwrap_or("An error occurred"),
    };

    Custom(status, Json(MessageResponse::failure(message)))
}
