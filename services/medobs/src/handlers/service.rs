use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use medobs_domain::pagination::Page;

use crate::domain::types::{NomSortBy, SearchFilter, Service};
use crate::error::MedobsError;
use crate::handlers::query;
use crate::state::AppState;
use crate::usecase::service::{
    CreateServiceUseCase, DeleteServiceUseCase, GetServiceUseCase, ListServicesUseCase,
    ServiceInput, UpdateServiceUseCase,
};

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ServiceRequest {
    #[validate(length(min = 1, max = 150))]
    pub nom: String,
    #[serde(default)]
    pub description: String,
}

impl From<ServiceRequest> for ServiceInput {
    fn from(body: ServiceRequest) -> Self {
        Self {
            nom: body.nom,
            description: body.description,
        }
    }
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_creation: chrono::DateTime<chrono::Utc>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            nom: service.nom,
            description: service.description,
            date_creation: service.date_creation,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
}

// ── GET /admin/services ──────────────────────────────────────────────────────

pub async fn list_services(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<ServiceResponse>>, MedobsError> {
    let query: ServiceListQuery = query::parse(raw)?;
    let filter = SearchFilter {
        terms: query::terms(query.q.as_deref()),
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), NomSortBy::from_kebab_case);
    let usecase = ListServicesUseCase {
        repo: state.service_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(ServiceResponse::from)))
}

// ── POST /admin/services ─────────────────────────────────────────────────────

pub async fn create_service(
    State(state): State<AppState>,
    Json(body): Json<ServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), MedobsError> {
    body.validate()?;
    let usecase = CreateServiceUseCase {
        repo: state.service_repo(),
    };
    let service = usecase.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

// ── GET /admin/services/{id} ─────────────────────────────────────────────────

pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceResponse>, MedobsError> {
    let usecase = GetServiceUseCase {
        repo: state.service_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/services/{id} ─────────────────────────────────────────────────

pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ServiceRequest>,
) -> Result<Json<ServiceResponse>, MedobsError> {
    body.validate()?;
    let usecase = UpdateServiceUseCase {
        repo: state.service_repo(),
    };
    Ok(Json(usecase.execute(id, body.into()).await?.into()))
}

// ── DELETE /admin/services/{id} ──────────────────────────────────────────────

pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteServiceUseCase {
        repo: state.service_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
