use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use medobs_domain::pagination::Page;
use medobs_domain::user::Role;

use crate::domain::types::{Utilisateur, UtilisateurFilter, UtilisateurRow, UtilisateurSortBy};
use crate::error::MedobsError;
use crate::handlers::query;
use crate::state::AppState;
use crate::usecase::utilisateur::{
    CreateUtilisateurUseCase, DeleteUtilisateurUseCase, GetUtilisateurUseCase,
    ListUtilisateursUseCase, UpdateUtilisateurUseCase, UtilisateurInput,
};

fn parse_role(value: &str) -> Result<Role, MedobsError> {
    value
        .parse()
        .map_err(|e: medobs_domain::user::UnknownRole| MedobsError::InvalidChoice(e.to_string()))
}

fn email_or_blank(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn default_true() -> bool {
    true
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct UtilisateurRequest {
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 254), custom(function = "email_or_blank"))]
    pub email: String,
    pub role: String,
    pub service_rattachement: Option<Uuid>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl UtilisateurRequest {
    fn into_input(self) -> Result<UtilisateurInput, MedobsError> {
        self.validate()?;
        Ok(UtilisateurInput {
            role: parse_role(&self.role)?,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            service_rattachement_id: self.service_rattachement,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
        })
    }
}

#[derive(Serialize)]
pub struct UtilisateurResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub role_display: &'static str,
    pub service_rattachement: Option<Uuid>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_joined: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms_opt")]
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Utilisateur> for UtilisateurResponse {
    fn from(u: Utilisateur) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role,
            role_display: u.role.label(),
            service_rattachement: u.service_rattachement_id,
            is_staff: u.is_staff,
            is_superuser: u.is_superuser,
            is_active: u.is_active,
            date_joined: u.date_joined,
            last_login: u.last_login,
        }
    }
}

/// List row: the account plus its department name.
#[derive(Serialize)]
pub struct UtilisateurListItem {
    #[serde(flatten)]
    pub utilisateur: UtilisateurResponse,
    pub service_rattachement_nom: Option<String>,
}

impl From<UtilisateurRow> for UtilisateurListItem {
    fn from(row: UtilisateurRow) -> Self {
        Self {
            utilisateur: row.utilisateur.into(),
            service_rattachement_nom: row.service_rattachement,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct UtilisateurListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub role: Option<String>,
    pub service: Option<Uuid>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

// ── GET /admin/utilisateurs ──────────────────────────────────────────────────

pub async fn list_utilisateurs(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UtilisateurListItem>>, MedobsError> {
    let query: UtilisateurListQuery = query::parse(raw)?;
    let filter = UtilisateurFilter {
        terms: query::terms(query.q.as_deref()),
        role: query.role.as_deref().map(parse_role).transpose()?,
        service_id: query.service,
        is_staff: query.is_staff,
        is_superuser: query.is_superuser,
        is_active: query.is_active,
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), UtilisateurSortBy::from_kebab_case);
    let usecase = ListUtilisateursUseCase {
        repo: state.utilisateur_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(UtilisateurListItem::from)))
}

// ── POST /admin/utilisateurs ─────────────────────────────────────────────────

pub async fn create_utilisateur(
    State(state): State<AppState>,
    Json(body): Json<UtilisateurRequest>,
) -> Result<(StatusCode, Json<UtilisateurResponse>), MedobsError> {
    let input = body.into_input()?;
    let usecase = CreateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    };
    let utilisateur = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(utilisateur.into())))
}

// ── GET /admin/utilisateurs/{id} ─────────────────────────────────────────────

pub async fn get_utilisateur(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UtilisateurResponse>, MedobsError> {
    let usecase = GetUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/utilisateurs/{id} ─────────────────────────────────────────────

pub async fn update_utilisateur(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UtilisateurRequest>,
) -> Result<Json<UtilisateurResponse>, MedobsError> {
    let input = body.into_input()?;
    let usecase = UpdateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    };
    Ok(Json(usecase.execute(id, input).await?.into()))
}

// ── DELETE /admin/utilisateurs/{id} ──────────────────────────────────────────

pub async fn delete_utilisateur(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
