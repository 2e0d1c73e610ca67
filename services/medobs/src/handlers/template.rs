use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use medobs_domain::pagination::Page;

use crate::domain::types::{TemplateFilter, TemplateObservation, TemplateRow, TemplateSortBy};
use crate::error::MedobsError;
use crate::handlers::competence::CompetenceResponse;
use crate::handlers::query;
use crate::infra::db::{DbCompetenceRepository, DbServiceRepository, DbUtilisateurRepository};
use crate::state::AppState;
use crate::usecase::template::{
    CreateTemplateUseCase, DeleteTemplateUseCase, GetCompetenceSelectorUseCase,
    GetTemplateUseCase, ListTemplatesUseCase, TemplateInput, TemplateRefs, UpdateTemplateUseCase,
};

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_true() -> bool {
    true
}

fn refs(
    state: &AppState,
) -> TemplateRefs<DbServiceRepository, DbUtilisateurRepository, DbCompetenceRepository> {
    TemplateRefs {
        services: state.service_repo(),
        utilisateurs: state.utilisateur_repo(),
        competences: state.competence_repo(),
    }
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct TemplateRequest {
    #[validate(length(min = 1, max = 255))]
    pub nom: String,
    pub service: Uuid,
    pub cree_par: Option<Uuid>,
    /// JSON description of the form's sections and fields.
    #[serde(default = "empty_object")]
    pub structure: serde_json::Value,
    /// Full set of evaluated competences; replaces the current set.
    #[serde(default)]
    pub competences_evaluees: Vec<Uuid>,
    #[serde(default = "default_true")]
    pub actif: bool,
}

impl From<TemplateRequest> for TemplateInput {
    fn from(body: TemplateRequest) -> Self {
        Self {
            nom: body.nom,
            service_id: body.service,
            cree_par_id: body.cree_par,
            structure: body.structure,
            competences_evaluees: body.competences_evaluees,
            actif: body.actif,
        }
    }
}

#[derive(Serialize)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub nom: String,
    pub service: Uuid,
    pub cree_par: Option<Uuid>,
    pub structure: serde_json::Value,
    pub competences_evaluees: Vec<Uuid>,
    pub actif: bool,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
}

impl From<TemplateObservation> for TemplateResponse {
    fn from(t: TemplateObservation) -> Self {
        Self {
            id: t.id,
            nom: t.nom,
            service: t.service_id,
            cree_par: t.cree_par_id,
            structure: t.structure,
            competences_evaluees: t.competences_evaluees,
            actif: t.actif,
            date_creation: t.date_creation,
        }
    }
}

#[derive(Serialize)]
pub struct TemplateListItem {
    pub id: Uuid,
    pub libelle: String,
    pub nom: String,
    pub service: String,
    pub cree_par: Option<String>,
    pub actif: bool,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
}

impl From<TemplateRow> for TemplateListItem {
    fn from(row: TemplateRow) -> Self {
        Self {
            libelle: row.libelle(),
            id: row.template.id,
            nom: row.template.nom,
            service: row.service,
            cree_par: row.cree_par,
            actif: row.template.actif,
            date_creation: row.template.date_creation,
        }
    }
}

#[derive(Serialize)]
pub struct CompetenceSelectorResponse {
    pub selected: Vec<CompetenceResponse>,
    pub available: Vec<CompetenceResponse>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct TemplateListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub service: Option<Uuid>,
    pub actif: Option<bool>,
    pub date_creation: Option<String>,
}

// ── GET /admin/templates ─────────────────────────────────────────────────────

pub async fn list_templates(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<TemplateListItem>>, MedobsError> {
    let query: TemplateListQuery = query::parse(raw)?;
    let filter = TemplateFilter {
        terms: query::terms(query.q.as_deref()),
        service_id: query.service,
        actif: query.actif,
        date_creation: query::date_range(query.date_creation.as_deref())?,
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), TemplateSortBy::from_kebab_case);
    let usecase = ListTemplatesUseCase {
        repo: state.template_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(TemplateListItem::from)))
}

// ── POST /admin/templates ────────────────────────────────────────────────────

pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<TemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), MedobsError> {
    body.validate()?;
    let usecase = CreateTemplateUseCase {
        repo: state.template_repo(),
        refs: refs(&state),
    };
    let template = usecase.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(template.into())))
}

// ── GET /admin/templates/{id} ────────────────────────────────────────────────

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, MedobsError> {
    let usecase = GetTemplateUseCase {
        repo: state.template_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/templates/{id} ────────────────────────────────────────────────

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TemplateRequest>,
) -> Result<Json<TemplateResponse>, MedobsError> {
    body.validate()?;
    let usecase = UpdateTemplateUseCase {
        repo: state.template_repo(),
        refs: refs(&state),
    };
    Ok(Json(usecase.execute(id, body.into()).await?.into()))
}

// ── DELETE /admin/templates/{id} ─────────────────────────────────────────────

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteTemplateUseCase {
        repo: state.template_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/templates/{id}/competences ────────────────────────────────────

pub async fn get_competence_selector(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetenceSelectorResponse>, MedobsError> {
    let usecase = GetCompetenceSelectorUseCase {
        repo: state.template_repo(),
        competences: state.competence_repo(),
    };
    let selector = usecase.execute(id).await?;
    Ok(Json(CompetenceSelectorResponse {
        selected: selector.selected.into_iter().map(Into::into).collect(),
        available: selector.available.into_iter().map(Into::into).collect(),
    }))
}
