use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use medobs_domain::pagination::Page;

use crate::domain::types::{Competence, NomSortBy, SearchFilter};
use crate::error::MedobsError;
use crate::handlers::query;
use crate::state::AppState;
use crate::usecase::competence::{
    CompetenceInput, CreateCompetenceUseCase, DeleteCompetenceUseCase, GetCompetenceUseCase,
    ListCompetencesUseCase, UpdateCompetenceUseCase,
};

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CompetenceRequest {
    #[validate(length(min = 1, max = 100))]
    pub nom: String,
    #[serde(default)]
    pub description: String,
}

impl From<CompetenceRequest> for CompetenceInput {
    fn from(body: CompetenceRequest) -> Self {
        Self {
            nom: body.nom,
            description: body.description,
        }
    }
}

#[derive(Serialize)]
pub struct CompetenceResponse {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
}

impl From<Competence> for CompetenceResponse {
    fn from(competence: Competence) -> Self {
        Self {
            id: competence.id,
            nom: competence.nom,
            description: competence.description,
            date_creation: competence.date_creation,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CompetenceListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
}

// ── GET /admin/competences ───────────────────────────────────────────────────

pub async fn list_competences(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<CompetenceResponse>>, MedobsError> {
    let query: CompetenceListQuery = query::parse(raw)?;
    let filter = SearchFilter {
        terms: query::terms(query.q.as_deref()),
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), NomSortBy::from_kebab_case);
    let usecase = ListCompetencesUseCase {
        repo: state.competence_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(CompetenceResponse::from)))
}

// ── POST /admin/competences ──────────────────────────────────────────────────

pub async fn create_competence(
    State(state): State<AppState>,
    Json(body): Json<CompetenceRequest>,
) -> Result<(StatusCode, Json<CompetenceResponse>), MedobsError> {
    body.validate()?;
    let usecase = CreateCompetenceUseCase {
        repo: state.competence_repo(),
    };
    let competence = usecase.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(competence.into())))
}

// ── GET /admin/competences/{id} ──────────────────────────────────────────────

pub async fn get_competence(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetenceResponse>, MedobsError> {
    let usecase = GetCompetenceUseCase {
        repo: state.competence_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/competences/{id} ──────────────────────────────────────────────

pub async fn update_competence(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CompetenceRequest>,
) -> Result<Json<CompetenceResponse>, MedobsError> {
    body.validate()?;
    let usecase = UpdateCompetenceUseCase {
        repo: state.competence_repo(),
    };
    Ok(Json(usecase.execute(id, body.into()).await?.into()))
}

// ── DELETE /admin/competences/{id} ───────────────────────────────────────────

pub async fn delete_competence(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteCompetenceUseCase {
        repo: state.competence_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
