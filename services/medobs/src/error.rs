use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use medobs_core::error::ErrorBody;
use medobs_domain::evaluation::NoteOutOfRange;
use medobs_domain::observation::Statut;

/// MedObs service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MedobsError {
    #[error("utilisateur not found")]
    UtilisateurNotFound,
    #[error("service not found")]
    ServiceNotFound,
    #[error("competence not found")]
    CompetenceNotFound,
    #[error("template not found")]
    TemplateNotFound,
    #[error("observation not found")]
    ObservationNotFound,
    #[error("fichier not found")]
    FichierNotFound,
    #[error("evaluation not found")]
    EvaluationNotFound,
    #[error("note not found")]
    NoteNotFound,
    #[error("username already exists")]
    UsernameTaken,
    #[error("service name already exists")]
    ServiceNomTaken,
    #[error("competence name already exists")]
    CompetenceNomTaken,
    #[error("observation already has an evaluation")]
    EvaluationAlreadyExists,
    #[error("competence already graded in this evaluation")]
    NoteAlreadyExists,
    #[error("deletion blocked by protected observations")]
    DeleteProtected,
    #[error("invalid choice: {0}")]
    InvalidChoice(String),
    #[error("invalid username")]
    InvalidUsername,
    #[error(transparent)]
    InvalidNote(#[from] NoteOutOfRange),
    #[error("cannot move observation from {from} to {to}")]
    InvalidTransition { from: Statut, to: Statut },
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),
    #[error("invalid file")]
    InvalidFile,
    #[error("file exceeds the upload limit")]
    FileTooLarge,
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MedobsError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UtilisateurNotFound => "UTILISATEUR_NOT_FOUND",
            Self::ServiceNotFound => "SERVICE_NOT_FOUND",
            Self::CompetenceNotFound => "COMPETENCE_NOT_FOUND",
            Self::TemplateNotFound => "TEMPLATE_NOT_FOUND",
            Self::ObservationNotFound => "OBSERVATION_NOT_FOUND",
            Self::FichierNotFound => "FICHIER_NOT_FOUND",
            Self::EvaluationNotFound => "EVALUATION_NOT_FOUND",
            Self::NoteNotFound => "NOTE_NOT_FOUND",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::ServiceNomTaken => "SERVICE_NOM_TAKEN",
            Self::CompetenceNomTaken => "COMPETENCE_NOM_TAKEN",
            Self::EvaluationAlreadyExists => "EVALUATION_ALREADY_EXISTS",
            Self::NoteAlreadyExists => "NOTE_ALREADY_EXISTS",
            Self::DeleteProtected => "DELETE_PROTECTED",
            Self::InvalidChoice(_) => "INVALID_CHOICE",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidNote(_) => "INVALID_NOTE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Validation(_) => "VALIDATION",
            Self::InvalidFile => "INVALID_FILE",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UtilisateurNotFound
            | Self::ServiceNotFound
            | Self::CompetenceNotFound
            | Self::TemplateNotFound
            | Self::ObservationNotFound
            | Self::FichierNotFound
            | Self::EvaluationNotFound
            | Self::NoteNotFound => StatusCode::NOT_FOUND,
            Self::UsernameTaken
            | Self::ServiceNomTaken
            | Self::CompetenceNomTaken
            | Self::EvaluationAlreadyExists
            | Self::NoteAlreadyExists
            | Self::DeleteProtected
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::InvalidChoice(_)
            | Self::InvalidUsername
            | Self::InvalidNote(_)
            | Self::Validation(_)
            | Self::InvalidFile
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for MedobsError {
    fn into_response(self) -> Response {
        let status = self.status();
        // The anyhow chain carries query details: logged, never returned.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), "internal error chain");
        }
        let mut body = ErrorBody::new(self.kind(), self.to_string());
        if let Self::Validation(ref errors) = self {
            if let Ok(fields) = serde_json::to_value(errors) {
                body = body.with_fields(fields);
            }
        }
        body.into_response_with(status)
    }
}
