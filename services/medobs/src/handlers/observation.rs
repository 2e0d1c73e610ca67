use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medobs_domain::observation::{Statut, UnknownStatut};
use medobs_domain::pagination::Page;

use crate::domain::types::{Observation, ObservationFilter, ObservationRow, ObservationSortBy};
use crate::error::MedobsError;
use crate::handlers::query;
use crate::state::AppState;
use crate::usecase::observation::{
    ChangeStatutUseCase, CreateObservationUseCase, DeleteObservationUseCase,
    GetObservationUseCase, ListObservationsUseCase, ObservationInput, UpdateObservationUseCase,
};

fn parse_statut(value: &str) -> Result<Statut, MedobsError> {
    value
        .parse()
        .map_err(|e: UnknownStatut| MedobsError::InvalidChoice(e.to_string()))
}

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ObservationRequest {
    pub etudiant: Uuid,
    pub template: Uuid,
    pub statut: Option<String>,
    pub donnees: Option<serde_json::Value>,
}

impl ObservationRequest {
    fn into_input(self) -> Result<ObservationInput, MedobsError> {
        let statut = match self.statut.as_deref() {
            Some(s) => parse_statut(s)?,
            None => Statut::default(),
        };
        Ok(ObservationInput {
            etudiant_id: self.etudiant,
            template_id: self.template,
            statut,
            donnees: self.donnees,
        })
    }
}

#[derive(Deserialize)]
pub struct ChangeStatutRequest {
    pub statut: String,
}

#[derive(Serialize)]
pub struct ObservationResponse {
    pub id: Uuid,
    pub etudiant: Uuid,
    pub template: Uuid,
    pub statut: Statut,
    pub statut_display: &'static str,
    pub donnees: Option<serde_json::Value>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_modification: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms_opt")]
    pub date_soumission: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Observation> for ObservationResponse {
    fn from(o: Observation) -> Self {
        Self {
            id: o.id,
            etudiant: o.etudiant_id,
            template: o.template_id,
            statut: o.statut,
            statut_display: o.statut.label(),
            donnees: o.donnees,
            date_creation: o.date_creation,
            date_modification: o.date_modification,
            date_soumission: o.date_soumission,
        }
    }
}

#[derive(Serialize)]
pub struct ObservationListItem {
    pub id: Uuid,
    pub libelle: String,
    pub etudiant: String,
    pub template: String,
    pub statut: Statut,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms_opt")]
    pub date_soumission: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ObservationRow> for ObservationListItem {
    fn from(row: ObservationRow) -> Self {
        Self {
            libelle: row.libelle(),
            id: row.observation.id,
            etudiant: row.etudiant,
            template: row.template,
            statut: row.observation.statut,
            date_creation: row.observation.date_creation,
            date_soumission: row.observation.date_soumission,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ObservationListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub statut: Option<String>,
    pub service: Option<Uuid>,
    pub date_creation: Option<String>,
}

// ── GET /admin/observations ──────────────────────────────────────────────────

pub async fn list_observations(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<ObservationListItem>>, MedobsError> {
    let query: ObservationListQuery = query::parse(raw)?;
    let filter = ObservationFilter {
        terms: query::terms(query.q.as_deref()),
        statut: query.statut.as_deref().map(parse_statut).transpose()?,
        service_id: query.service,
        date_creation: query::date_range(query.date_creation.as_deref())?,
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), ObservationSortBy::from_kebab_case);
    let usecase = ListObservationsUseCase {
        repo: state.observation_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(ObservationListItem::from)))
}

// ── POST /admin/observations ─────────────────────────────────────────────────

pub async fn create_observation(
    State(state): State<AppState>,
    Json(body): Json<ObservationRequest>,
) -> Result<(StatusCode, Json<ObservationResponse>), MedobsError> {
    let input = body.into_input()?;
    let usecase = CreateObservationUseCase {
        repo: state.observation_repo(),
        utilisateurs: state.utilisateur_repo(),
        templates: state.template_repo(),
    };
    let observation = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(observation.into())))
}

// ── GET /admin/observations/{id} ─────────────────────────────────────────────

pub async fn get_observation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObservationResponse>, MedobsError> {
    let usecase = GetObservationUseCase {
        repo: state.observation_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/observations/{id} ─────────────────────────────────────────────

pub async fn update_observation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ObservationRequest>,
) -> Result<Json<ObservationResponse>, MedobsError> {
    let input = body.into_input()?;
    let usecase = UpdateObservationUseCase {
        repo: state.observation_repo(),
        utilisateurs: state.utilisateur_repo(),
        templates: state.template_repo(),
    };
    Ok(Json(usecase.execute(id, input).await?.into()))
}

// ── DELETE /admin/observations/{id} ──────────────────────────────────────────

pub async fn delete_observation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteObservationUseCase {
        repo: state.observation_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /admin/observations/{id}/statut ─────────────────────────────────────

pub async fn change_statut(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeStatutRequest>,
) -> Result<Json<ObservationResponse>, MedobsError> {
    let statut = parse_statut(&body.statut)?;
    let usecase = ChangeStatutUseCase {
        repo: state.observation_repo(),
    };
    Ok(Json(usecase.execute(id, statut).await?.into()))
}
