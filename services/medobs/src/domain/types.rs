use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use medobs_domain::date_filter::DateRange;
use medobs_domain::evaluation::Note;
use medobs_domain::observation::Statut;
use medobs_domain::pagination::Sort;
use medobs_domain::user::Role;

/// Longest accepted username.
pub const USERNAME_MAX_LEN: usize = 150;
/// Longest stored file path, relative to the media root.
pub const FICHIER_MAX_LEN: usize = 255;
/// Directory every upload lands under.
pub const UPLOAD_DIR: &str = "fichiers_observations";

/// MedObs account.
#[derive(Debug, Clone)]
pub struct Utilisateur {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    /// Home service. Only meaningful for professors.
    pub service_rattachement_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Utilisateur {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Full name, or the username when no name is set.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Hospital department.
#[derive(Debug, Clone)]
pub struct Service {
    pub id: Uuid,
    pub nom: String,
    pub description: String,
    pub date_creation: DateTime<Utc>,
}

/// Gradable clinical skill.
#[derive(Debug, Clone)]
pub struct Competence {
    pub id: Uuid,
    pub nom: String,
    /// Evaluation criteria.
    pub description: String,
    pub date_creation: DateTime<Utc>,
}

/// Observation form definition.
#[derive(Debug, Clone)]
pub struct TemplateObservation {
    pub id: Uuid,
    pub nom: String,
    pub service_id: Uuid,
    pub cree_par_id: Option<Uuid>,
    pub structure: serde_json::Value,
    pub competences_evaluees: Vec<Uuid>,
    pub actif: bool,
    pub date_creation: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Observation {
    pub id: Uuid,
    pub etudiant_id: Uuid,
    pub template_id: Uuid,
    pub statut: Statut,
    pub donnees: Option<serde_json::Value>,
    pub date_creation: DateTime<Utc>,
    pub date_modification: DateTime<Utc>,
    pub date_soumission: Option<DateTime<Utc>>,
}

impl Observation {
    /// Set the status, stamping `date_soumission` when the observation
    /// enters `EN_ATTENTE`.
    pub fn apply_statut(&mut self, statut: Statut, now: DateTime<Utc>) {
        if statut.is_submission() && self.statut != statut {
            self.date_soumission = Some(now);
        }
        self.statut = statut;
    }

    pub fn libelle(&self, etudiant_username: &str) -> String {
        format!("Observation #{} de {etudiant_username}", self.id)
    }
}

/// File attached to an observation.
#[derive(Debug, Clone)]
pub struct FichierMedia {
    pub id: Uuid,
    pub observation_id: Uuid,
    /// Path relative to the media root.
    pub fichier: String,
    pub legende: String,
    pub date_upload: DateTime<Utc>,
}

impl FichierMedia {
    pub fn libelle(&self) -> String {
        format!("Fichier {} pour l'observation #{}", self.id, self.observation_id)
    }

    /// Last path segment of the stored file.
    pub fn file_name(&self) -> &str {
        self.fichier.rsplit('/').next().unwrap_or(&self.fichier)
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub id: Uuid,
    pub observation_id: Uuid,
    pub professeur_id: Option<Uuid>,
    pub commentaires_generaux: String,
    pub date_evaluation: DateTime<Utc>,
}

impl Evaluation {
    pub fn libelle(&self) -> String {
        format!("Évaluation pour l'Observation #{}", self.observation_id)
    }
}

/// Grade of one competence within an evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationCompetence {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub competence_id: Uuid,
    pub note: Note,
    pub commentaire_specifique: String,
}

// ── List rows ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UtilisateurRow {
    pub utilisateur: Utilisateur,
    pub service_rattachement: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub template: TemplateObservation,
    pub service: String,
    pub cree_par: Option<String>,
}

impl TemplateRow {
    pub fn libelle(&self) -> String {
        format!("{} ({})", self.template.nom, self.service)
    }
}

#[derive(Debug, Clone)]
pub struct ObservationRow {
    pub observation: Observation,
    pub etudiant_username: String,
    pub etudiant: String,
    pub template: String,
}

impl ObservationRow {
    pub fn libelle(&self) -> String {
        self.observation.libelle(&self.etudiant_username)
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationRow {
    pub evaluation: Evaluation,
    pub observation: String,
    pub professeur: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NoteRow {
    pub note: EvaluationCompetence,
    pub competence: String,
}

impl NoteRow {
    pub fn libelle(&self) -> String {
        format!("Note pour {}: {}", self.competence, self.note.note)
    }
}

/// Dual-list view of a template's evaluated competences.
#[derive(Debug, Clone, Default)]
pub struct CompetenceSelector {
    pub selected: Vec<Competence>,
    pub available: Vec<Competence>,
}

impl CompetenceSelector {
    /// Split `all` by membership in `selected_ids`, keeping `all`'s order.
    pub fn split(all: Vec<Competence>, selected_ids: &[Uuid]) -> Self {
        let (selected, available) = all
            .into_iter()
            .partition(|c| selected_ids.contains(&c.id));
        Self {
            selected,
            available,
        }
    }
}

// ── Filters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct UtilisateurFilter {
    pub terms: Vec<String>,
    pub role: Option<Role>,
    pub service_id: Option<Uuid>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Free-text search only. Used by services and competences.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub terms: Vec<String>,
    pub service_id: Option<Uuid>,
    pub actif: Option<bool>,
    pub date_creation: Option<DateRange>,
}

#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub terms: Vec<String>,
    pub statut: Option<Statut>,
    /// Matches the template's service.
    pub service_id: Option<Uuid>,
    pub date_creation: Option<DateRange>,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationFilter {
    pub terms: Vec<String>,
    pub professeur_id: Option<Uuid>,
    pub date_evaluation: Option<DateRange>,
}

// ── Sort options ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum UtilisateurSortBy {
    Username(Sort),
    DateJoined(Sort),
}

impl Default for UtilisateurSortBy {
    fn default() -> Self {
        Self::Username(Sort::Asc)
    }
}

impl UtilisateurSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "username-asc" => Some(Self::Username(Sort::Asc)),
            "username-desc" => Some(Self::Username(Sort::Desc)),
            "date-joined-asc" => Some(Self::DateJoined(Sort::Asc)),
            "date-joined-desc" => Some(Self::DateJoined(Sort::Desc)),
            _ => None,
        }
    }
}

/// Sort options shared by services and competences.
#[derive(Debug, Clone, Copy)]
pub enum NomSortBy {
    Nom(Sort),
    DateCreation(Sort),
}

impl Default for NomSortBy {
    fn default() -> Self {
        Self::Nom(Sort::Asc)
    }
}

impl NomSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "nom-asc" => Some(Self::Nom(Sort::Asc)),
            "nom-desc" => Some(Self::Nom(Sort::Desc)),
            "date-creation-asc" => Some(Self::DateCreation(Sort::Asc)),
            "date-creation-desc" => Some(Self::DateCreation(Sort::Desc)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TemplateSortBy {
    DateCreation(Sort),
    Nom(Sort),
}

impl Default for TemplateSortBy {
    fn default() -> Self {
        Self::DateCreation(Sort::Desc)
    }
}

impl TemplateSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "date-creation-desc" => Some(Self::DateCreation(Sort::Desc)),
            "date-creation-asc" => Some(Self::DateCreation(Sort::Asc)),
            "nom-asc" => Some(Self::Nom(Sort::Asc)),
            "nom-desc" => Some(Self::Nom(Sort::Desc)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ObservationSortBy {
    DateCreation(Sort),
    DateSoumission(Sort),
}

impl Default for ObservationSortBy {
    fn default() -> Self {
        Self::DateCreation(Sort::Desc)
    }
}

impl ObservationSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "date-creation-desc" => Some(Self::DateCreation(Sort::Desc)),
            "date-creation-asc" => Some(Self::DateCreation(Sort::Asc)),
            "date-soumission-desc" => Some(Self::DateSoumission(Sort::Desc)),
            "date-soumission-asc" => Some(Self::DateSoumission(Sort::Asc)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EvaluationSortBy {
    DateEvaluation(Sort),
}

impl Default for EvaluationSortBy {
    fn default() -> Self {
        Self::DateEvaluation(Sort::Desc)
    }
}

impl EvaluationSortBy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "date-evaluation-desc" => Some(Self::DateEvaluation(Sort::Desc)),
            "date-evaluation-asc" => Some(Self::DateEvaluation(Sort::Asc)),
            _ => None,
        }
    }
}

// ── Validation helpers ───────────────────────────────────────────────────────

/// Validate a username: 1-150 characters, letters, digits and `@.+-_`.
pub fn validate_username(username: &str) -> bool {
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Storage path for an upload: `fichiers_observations/YYYY/MM/{id}_{name}`.
///
/// The original name is reduced to its last path segment and to
/// `[A-Za-z0-9._-]`, then shortened so the whole path fits
/// [`FICHIER_MAX_LEN`]. The extension survives shortening.
pub fn media_upload_path(at: DateTime<Utc>, id: Uuid, original_name: &str) -> String {
    let prefix = format!("{UPLOAD_DIR}/{:04}/{:02}/{id}_", at.year(), at.month());
    let name = sanitize_file_name(original_name);
    let budget = FICHIER_MAX_LEN.saturating_sub(prefix.len());
    format!("{prefix}{}", shorten_file_name(&name, budget))
}

fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name)
        .trim();
    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "fichier".to_owned()
    } else {
        cleaned.to_owned()
    }
}

fn shorten_file_name(name: &str, budget: usize) -> String {
    if name.len() <= budget {
        return name.to_owned();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 1 < budget => {
            let keep = budget - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        _ => name[..budget].to_owned(),
    }
}
