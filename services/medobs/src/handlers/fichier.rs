use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::types::FichierMedia;
use crate::error::MedobsError;
use crate::state::AppState;
use crate::usecase::fichier::{
    DeleteFichierUseCase, DownloadFichierUseCase, GetFichierUseCase, ListFichiersUseCase,
    UpdateFichierUseCase, UploadFichierInput, UploadFichierUseCase,
};

// ── Request / response types ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct FichierUpdateRequest {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub legende: String,
}

#[derive(Serialize)]
pub struct FichierResponse {
    pub id: Uuid,
    pub observation: Uuid,
    pub fichier: String,
    pub legende: String,
    #[serde(serialize_with = "medobs_core::serde::to_rfc3339_ms")]
    pub date_upload: chrono::DateTime<chrono::Utc>,
    pub libelle: String,
}

impl From<FichierMedia> for FichierResponse {
    fn from(f: FichierMedia) -> Self {
        let libelle = f.libelle();
        Self {
            id: f.id,
            observation: f.observation_id,
            fichier: f.fichier,
            legende: f.legende,
            date_upload: f.date_upload,
            libelle,
        }
    }
}

fn multipart_error(err: MultipartError) -> MedobsError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        MedobsError::FileTooLarge
    } else {
        MedobsError::MissingData
    }
}

/// Read the `fichier` and optional `legende` parts of an upload form.
async fn read_upload(
    observation_id: Uuid,
    mut multipart: Multipart,
) -> Result<UploadFichierInput, MedobsError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut legende = String::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        match field.name() {
            Some("fichier") => {
                let name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, bytes.to_vec()));
            }
            Some("legende") => {
                legende = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }
    let (file_name, contents) = file.ok_or(MedobsError::InvalidFile)?;
    let caption = FichierUpdateRequest { legende };
    caption.validate()?;
    Ok(UploadFichierInput {
        observation_id,
        file_name,
        contents,
        legende: caption.legende,
    })
}

// ── GET /admin/observations/{id}/fichiers ────────────────────────────────────

pub async fn list_fichiers(
    State(state): State<AppState>,
    Path(observation_id): Path<Uuid>,
) -> Result<Json<Vec<FichierResponse>>, MedobsError> {
    let usecase = ListFichiersUseCase {
        repo: state.fichier_repo(),
        observations: state.observation_repo(),
    };
    let fichiers = usecase.execute(observation_id).await?;
    Ok(Json(fichiers.into_iter().map(Into::into).collect()))
}

// ── POST /admin/observations/{id}/fichiers ───────────────────────────────────

pub async fn upload_fichier(
    State(state): State<AppState>,
    Path(observation_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FichierResponse>), MedobsError> {
    let input = read_upload(observation_id, multipart).await?;
    let usecase = UploadFichierUseCase {
        repo: state.fichier_repo(),
        observations: state.observation_repo(),
        storage: state.storage(),
    };
    let fichier = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(fichier.into())))
}

// ── GET /admin/fichiers/{id} ─────────────────────────────────────────────────

pub async fn get_fichier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FichierResponse>, MedobsError> {
    let usecase = GetFichierUseCase {
        repo: state.fichier_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PUT /admin/fichiers/{id} ─────────────────────────────────────────────────

pub async fn update_fichier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<FichierUpdateRequest>,
) -> Result<Json<FichierResponse>, MedobsError> {
    body.validate()?;
    let usecase = UpdateFichierUseCase {
        repo: state.fichier_repo(),
    };
    Ok(Json(usecase.execute(id, body.legende).await?.into()))
}

// ── DELETE /admin/fichiers/{id} ──────────────────────────────────────────────

pub async fn delete_fichier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, MedobsError> {
    let usecase = DeleteFichierUseCase {
        repo: state.fichier_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /admin/fichiers/{id}/contenu ─────────────────────────────────────────

pub async fn download_fichier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, MedobsError> {
    let usecase = DownloadFichierUseCase {
        repo: state.fichier_repo(),
        storage: state.storage(),
    };
    let (fichier, contents) = usecase.execute(id).await?;
    let disposition = format!("attachment; filename=\"{}\"", fichier.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        contents,
    ))
}
