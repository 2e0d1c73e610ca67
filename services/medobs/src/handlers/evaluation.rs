use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medobs_domain::pagination::Page;

use crate::domain::types::{
    Evaluation, EvaluationCompetence, EvaluationFilter, EvaluationRow, EvaluationSortBy, NoteRow,
};
use crate::error::MedobsError;
use crate::handlers::query;
use crate::state::AppState;
use crate::usecase::evaluation::{
    DeleteEvaluationUseCase, DeleteNoteUseCase, EvaluationInput, GetEvaluationUseCase,
    GetNoteUseCase, ListEvaluationsUseCase, ListNotesUseCase, NoteInput, SaveEvaluationUseCase,
    SaveNoteUseCase,
};

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EvaluationRequest {
    pub observation: Uuid,
    pub professeur: Option<Uuid>,
    #[serde(default)]
    pub commentaires_generaux: String,
}

impl From<EvaluationRequest> for EvaluationInput {
    fn from(body: EvaluationRequest) -> Self {
        Self {
            observation_id: body.observation,
            professeur_id: body.professeur,
            commentaires_generaux: body.commentaires_generaux,
        }
    }
}

#[derive(Serialize)]
pub struct EvaluationResponse {
    pub id: Uuid,
    pub libelle: String,
    pub observation: Uuid,
    pub professeur: Option<Uuid>,
    pub commentaires_generaux: String,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_evaluation: chrono::DateTime<chrono::Utc>,
}

impl From<Evaluation> for EvaluationResponse {
    fn from(e: Evaluation) -> Self {
        Self {
            libelle: e.libelle(),
            id: e.id,
            observation: e.observation_id,
            professeur: e.professeur_id,
            commentaires_generaux: e.commentaires_generaux,
            date_evaluation: e.date_evaluation,
        }
    }
}

#[derive(Serialize)]
pub struct EvaluationListItem {
    pub id: Uuid,
    pub observation: String,
    pub professeur: Option<String>,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_evaluation: chrono::DateTime<chrono::Utc>,
}

impl From<EvaluationRow> for EvaluationListItem {
    fn from(row: EvaluationRow) -> Self {
        Self {
            id: row.evaluation.id,
            observation: row.observation,
            professeur: row.professeur,
            date_evaluation: row.evaluation.date_evaluation,
        }
    }
}

#[derive(Deserialize)]
pub struct NoteRequest {
    pub competence: Uuid,
    pub note: i32,
    #[serde(default)]
    pub commentaire_specifique: String,
}

impl From<NoteRequest> for NoteInput {
    fn from(body: NoteRequest) -> Self {
        Self {
            competence_id: body.competence,
            note: body.note,
            commentaire_specifique: body.commentaire_specifique,
        }
    }
}

#[derive(Serialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub evaluation: Uuid,
    pub competence: Uuid,
    pub note: i32,
    pub commentaire_specifique: String,
}

impl From<EvaluationCompetence> for NoteResponse {
    fn from(n: EvaluationCompetence) -> Self {
        Self {
            id: n.id,
            evaluation: n.evaluation_id,
            competence: n.competence_id,
            note: n.note.into(),
            commentaire_specifique: n.commentaire_specifique,
        }
    }
}

#[derive(Serialize)]
pub struct NoteListItem {
    #[serde(flatten)]
    pub note: NoteResponse,
    pub libelle: String,
    pub competence_nom: String,
}

impl From<NoteRow> for NoteListItem {
    fn from(row: NoteRow) -> Self {
        Self {
            libelle: row.libelle(),
            note: row.note.into(),
            competence_nom: row.competence,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct EvaluationListQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub professeur: Option<Uuid>,
    pub date_evaluation: Option<String>,
}

// ── GET /admin/evaluations ───────────────────────────────────────────────────

pub async fn list_evaluations(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<EvaluationListItem>>, MedobsError> {
    let query: EvaluationListQuery = query::parse(raw)?;
    let filter = EvaluationFilter {
        terms: query::terms(query.q.as_deref()),
        professeur_id: query.professeur,
        date_evaluation: query::date_range(query.date_evaluation.as_deref())?,
    };
    let sort_by = query::sort_by(query.sort_by.as_deref(), EvaluationSortBy::from_kebab_case);
    let usecase = ListEvaluationsUseCase {
        repo: state.evaluation_repo(),
    };
    let page = usecase
        .execute(&filter, sort_by, query::page_request(query.page, query.per_page))
        .await?;
    Ok(Json(page.map(EvaluationListItem::from)))
}

// ── POST /admin/evaluations ──────────────────────────────────────────────────

pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(body): Json<EvaluationRequest>,
) -> Result<(StatusCode, Json<EvaluationResponse>), MedobsError> {
    let usecase = SaveEvaluationUseCase {
        repo: state.evaluation_repo(),
        observations: state.observation_repo(),
        utilisateurs: state.utilisateur_repo(),
    };
    let evaluation = usecase.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(evaluation.into())))
}

// ── GET /admin/evaluations/{id} ──────────────────────────────────────────────

pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EvaluationResponse>, MedobsError> {
    let usecase = GetEvaluationUseCase {
        repo: state.evaluation_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/evaluations/{id} ──────────────────────────────────────────────

pub async fn update_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, MedobsError> {
    let usecase = SaveEvaluationUseCase {
        repo: state.evaluation_repo(),
        observations: state.observation_repo(),
        utilisateurs: state.utilisateur_repo(),
    };
    Ok(Json(usecase.update(id, body.into()).await?.into()))
}

// ── DELETE /admin/evaluations/{id} ───────────────────────────────────────────

pub async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteEvaluationUseCase {
        repo: state.evaluation_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/evaluations/{id}/notes ────────────────────────────────────────

pub async fn list_notes(
    State(state): State<AppState>,
    Path(evaluation_id): Path<Uuid>,
) -> Result<Json<Vec<NoteListItem>>, MedobsError> {
    let usecase = ListNotesUseCase {
        repo: state.note_repo(),
        evaluations: state.evaluation_repo(),
    };
    let notes = usecase.execute(evaluation_id).await?;
    Ok(Json(notes.into_iter().map(Into::into).collect()))
}

// ── POST /admin/evaluations/{id}/notes ───────────────────────────────────────

pub async fn create_note(
    State(state): State<AppState>,
    Path(evaluation_id): Path<Uuid>,
    Json(body): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), MedobsError> {
    let usecase = SaveNoteUseCase {
        repo: state.note_repo(),
        evaluations: state.evaluation_repo(),
        competences: state.competence_repo(),
    };
    let note = usecase.create(evaluation_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

// ── GET /admin/notes/{id} ────────────────────────────────────────────────────

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteResponse>, MedobsError> {
    let usecase = GetNoteUseCase {
        repo: state.note_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/notes/{id} ────────────────────────────────────────────────────

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NoteRequest>,
) -> Result<Json<NoteResponse>, MedobsError> {
    let usecase = SaveNoteUseCase {
        repo: state.note_repo(),
        evaluations: state.evaluation_repo(),
        competences: state.competence_repo(),
    };
    Ok(Json(usecase.update(id, body.into()).await?.into()))
}

// ── DELETE /admin/notes/{id} ─────────────────────────────────────────────────

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteNoteUseCase {
        repo: state.note_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
