use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{FichierRepository, MediaStorage, ObservationRepository};
use crate::domain::types::{FichierMedia, media_upload_path};
use crate::error::MedobsError;

// ── ListFichiers ─────────────────────────────────────────────────────────────

pub struct ListFichiersUseCase<R: FichierRepository, O: ObservationRepository> {
    pub repo: R,
    pub observations: O,
}

impl<R: FichierRepository, O: ObservationRepository> ListFichiersUseCase<R, O> {
    pub async fn execute(&self, observation_id: Uuid) -> Result<Vec<FichierMedia>, MedobsError> {
        self.observations
            .find_by_id(observation_id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)?;
        self.repo.list_by_observation(observation_id).await
    }
}

// ── UploadFichier ────────────────────────────────────────────────────────────

pub struct UploadFichierInput {
    pub observation_id: Uuid,
    /// Name supplied by the client. Only used to derive the stored name.
    pub file_name: String,
    pub contents: Vec<u8>,
    pub legende: String,
}

pub struct UploadFichierUseCase<R, O, M> {
    pub repo: R,
    pub observations: O,
    pub storage: M,
}

impl<R, O, M> UploadFichierUseCase<R, O, M>
where
    R: FichierRepository,
    O: ObservationRepository,
    M: MediaStorage,
{
    pub async fn execute(&self, input: UploadFichierInput) -> Result<FichierMedia, MedobsError> {
        if input.contents.is_empty() {
            return Err(MedobsError::InvalidFile);
        }
        self.observations
            .find_by_id(input.observation_id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)?;

        let now = Utc::now();
        let id = Uuid::now_v7();
        let fichier = FichierMedia {
            id,
            observation_id: input.observation_id,
            fichier: media_upload_path(now, id, &input.file_name),
            legende: input.legende,
            date_upload: now,
        };
        // Row before contents. A failed write takes the row back out.
        self.repo.create(&fichier).await?;
        if let Err(err) = self.storage.save(&fichier.fichier, &input.contents).await {
            if let Err(cleanup) = self.repo.delete(id).await {
                tracing::warn!(
                    fichier_id = %id,
                    error = %cleanup,
                    "fichier row left after storage failure"
                );
            }
            return Err(err);
        }
        tracing::info!(
            fichier_id = %id,
            observation_id = %fichier.observation_id,
            bytes = input.contents.len(),
            "fichier uploaded"
        );
        Ok(fichier)
    }
}

// ── GetFichier ───────────────────────────────────────────────────────────────

pub struct GetFichierUseCase<R: FichierRepository> {
    pub repo: R,
}

impl<R: FichierRepository> GetFichierUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<FichierMedia, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::FichierNotFound)
    }
}

// ── UpdateFichier ────────────────────────────────────────────────────────────

pub struct UpdateFichierUseCase<R: FichierRepository> {
    pub repo: R,
}

impl<R: FichierRepository> UpdateFichierUseCase<R> {
    /// Only the caption is editable; replacing contents means a new upload.
    pub async fn execute(&self, id: Uuid, legende: String) -> Result<FichierMedia, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::FichierNotFound)?;
        let fichier = FichierMedia { legende, ..existing };
        self.repo.update(&fichier).await?;
        Ok(fichier)
    }
}

// ── DeleteFichier ────────────────────────────────────────────────────────────

pub struct DeleteFichierUseCase<R: FichierRepository> {
    pub repo: R,
}

impl<R: FichierRepository> DeleteFichierUseCase<R> {
    /// Removes the record only. The stored contents stay under the media root.
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::FichierNotFound);
        }
        Ok(())
    }
}

// ── DownloadFichier ──────────────────────────────────────────────────────────

pub struct DownloadFichierUseCase<R: FichierRepository, M: MediaStorage> {
    pub repo: R,
    pub storage: M,
}

impl<R: FichierRepository, M: MediaStorage> DownloadFichierUseCase<R, M> {
    pub async fn execute(&self, id: Uuid) -> Result<(FichierMedia, Vec<u8>), MedobsError> {
        let fichier = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::FichierNotFound)?;
        let Some(contents) = self.storage.read(&fichier.fichier).await? else {
            tracing::warn!(fichier_id = %id, path = %fichier.fichier, "stored file missing");
            return Err(MedobsError::FichierNotFound);
        };
        Ok((fichier, contents))
    }
}
