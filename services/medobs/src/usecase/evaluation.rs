use chrono::Utc;
use uuid::Uuid;

use medobs_domain::evaluation::Note;
use medobs_domain::pagination::{Page, PageRequest};
use medobs_domain::user::Role;

use crate::domain::repository::{
    CompetenceRepository, EvaluationRepository, NoteRepository, ObservationRepository,
    UtilisateurRepository,
};
use crate::domain::types::{
    Evaluation, EvaluationCompetence, EvaluationFilter, EvaluationRow, EvaluationSortBy, NoteRow,
};
use crate::error::MedobsError;
use crate::usecase::require_role;

pub struct EvaluationInput {
    pub observation_id: Uuid,
    pub professeur_id: Option<Uuid>,
    pub commentaires_generaux: String,
}

// ── ListEvaluations ──────────────────────────────────────────────────────────

pub struct ListEvaluationsUseCase<R: EvaluationRepository> {
    pub repo: R,
}

impl<R: EvaluationRepository> ListEvaluationsUseCase<R> {
    pub async fn execute(
        &self,
        filter: &EvaluationFilter,
        sort_by: EvaluationSortBy,
        page: PageRequest,
    ) -> Result<Page<EvaluationRow>, MedobsError> {
        self.repo.list(filter, sort_by, page).await
    }
}

// ── GetEvaluation ────────────────────────────────────────────────────────────

pub struct GetEvaluationUseCase<R: EvaluationRepository> {
    pub repo: R,
}

impl<R: EvaluationRepository> GetEvaluationUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Evaluation, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::EvaluationNotFound)
    }
}

// ── CreateEvaluation / UpdateEvaluation ──────────────────────────────────────

pub struct SaveEvaluationUseCase<R, O, U> {
    pub repo: R,
    pub observations: O,
    pub utilisateurs: U,
}

impl<R, O, U> SaveEvaluationUseCase<R, O, U>
where
    R: EvaluationRepository,
    O: ObservationRepository,
    U: UtilisateurRepository,
{
    /// Check references and that no other evaluation targets the observation.
    async fn check(&self, input: &EvaluationInput, own_id: Option<Uuid>) -> Result<(), MedobsError> {
        self.observations
            .find_by_id(input.observation_id)
            .await?
            .ok_or(MedobsError::ObservationNotFound)?;
        if let Some(professeur_id) = input.professeur_id {
            require_role(&self.utilisateurs, professeur_id, Role::Professeur, "professeur")
                .await?;
        }
        if let Some(other) = self.repo.find_by_observation(input.observation_id).await? {
            if Some(other.id) != own_id {
                return Err(MedobsError::EvaluationAlreadyExists);
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: EvaluationInput) -> Result<Evaluation, MedobsError> {
        self.check(&input, None).await?;
        let evaluation = Evaluation {
            id: Uuid::now_v7(),
            observation_id: input.observation_id,
            professeur_id: input.professeur_id,
            commentaires_generaux: input.commentaires_generaux,
            date_evaluation: Utc::now(),
        };
        self.repo.create(&evaluation).await?;
        Ok(evaluation)
    }

    /// Full replacement. `date_evaluation` is refreshed on every save.
    pub async fn update(&self, id: Uuid, input: EvaluationInput) -> Result<Evaluation, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::EvaluationNotFound)?;
        self.check(&input, Some(id)).await?;
        let evaluation = Evaluation {
            observation_id: input.observation_id,
            professeur_id: input.professeur_id,
            commentaires_generaux: input.commentaires_generaux,
            date_evaluation: Utc::now(),
            ..existing
        };
        self.repo.update(&evaluation).await?;
        Ok(evaluation)
    }
}

// ── DeleteEvaluation ─────────────────────────────────────────────────────────

pub struct DeleteEvaluationUseCase<R: EvaluationRepository> {
    pub repo: R,
}

impl<R: EvaluationRepository> DeleteEvaluationUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::EvaluationNotFound);
        }
        Ok(())
    }
}

// ── Notes ────────────────────────────────────────────────────────────────────

pub struct NoteInput {
    pub competence_id: Uuid,
    /// Raw grade, checked against 0..=5.
    pub note: i32,
    pub commentaire_specifique: String,
}

pub struct ListNotesUseCase<N: NoteRepository, E: EvaluationRepository> {
    pub repo: N,
    pub evaluations: E,
}

impl<N: NoteRepository, E: EvaluationRepository> ListNotesUseCase<N, E> {
    pub async fn execute(&self, evaluation_id: Uuid) -> Result<Vec<NoteRow>, MedobsError> {
        self.evaluations
            .find_by_id(evaluation_id)
            .await?
            .ok_or(MedobsError::EvaluationNotFound)?;
        self.repo.list_by_evaluation(evaluation_id).await
    }
}

pub struct GetNoteUseCase<N: NoteRepository> {
    pub repo: N,
}

impl<N: NoteRepository> GetNoteUseCase<N> {
    pub async fn execute(&self, id: Uuid) -> Result<EvaluationCompetence, MedobsError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::NoteNotFound)
    }
}

pub struct SaveNoteUseCase<N, E, C> {
    pub repo: N,
    pub evaluations: E,
    pub competences: C,
}

impl<N, E, C> SaveNoteUseCase<N, E, C>
where
    N: NoteRepository,
    E: EvaluationRepository,
    C: CompetenceRepository,
{
    async fn check(&self, input: &NoteInput) -> Result<Note, MedobsError> {
        let note = Note::new(input.note)?;
        self.competences
            .find_by_id(input.competence_id)
            .await?
            .ok_or(MedobsError::CompetenceNotFound)?;
        Ok(note)
    }

    /// Grade a competence within `evaluation_id`. A competence is graded at
    /// most once per evaluation.
    pub async fn create(
        &self,
        evaluation_id: Uuid,
        input: NoteInput,
    ) -> Result<EvaluationCompetence, MedobsError> {
        self.evaluations
            .find_by_id(evaluation_id)
            .await?
            .ok_or(MedobsError::EvaluationNotFound)?;
        let note = self.check(&input).await?;
        let grade = EvaluationCompetence {
            id: Uuid::now_v7(),
            evaluation_id,
            competence_id: input.competence_id,
            note,
            commentaire_specifique: input.commentaire_specifique,
        };
        self.repo.create(&grade).await?;
        Ok(grade)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: NoteInput,
    ) -> Result<EvaluationCompetence, MedobsError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MedobsError::NoteNotFound)?;
        let note = self.check(&input).await?;
        let grade = EvaluationCompetence {
            competence_id: input.competence_id,
            note,
            commentaire_specifique: input.commentaire_specifique,
            ..existing
        };
        self.repo.update(&grade).await?;
        Ok(grade)
    }
}

pub struct DeleteNoteUseCase<N: NoteRepository> {
    pub repo: N,
}

impl<N: NoteRepository> DeleteNoteUseCase<N> {
    pub async fn execute(&self, id: Uuid) -> Result<(), MedobsError> {
        if !self.repo.delete(id).await? {
            return Err(MedobsError::NoteNotFound);
        }
        Ok(())
    }
}
