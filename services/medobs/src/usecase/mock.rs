//! In-memory ports for use case tests.
//!
//! Every trait is implemented for `&MemoryStore`, so one store can back
//! all the repositories a use case needs. Filters, sorting and paging are
//! ignored by `list`.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use medobs_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    CompetenceRepository, EvaluationRepository, FichierRepository, MediaStorage, NoteRepository,
    ObservationRepository, ServiceRepository, TemplateRepository, UtilisateurRepository,
};
use crate::domain::types::{
    Competence, Evaluation, EvaluationCompetence, EvaluationFilter, EvaluationRow,
    EvaluationSortBy, FichierMedia, NomSortBy, NoteRow, Observation, ObservationFilter,
    ObservationRow, ObservationSortBy, SearchFilter, Service, TemplateFilter, TemplateObservation,
    TemplateRow, TemplateSortBy, Utilisateur, UtilisateurFilter, UtilisateurRow,
    UtilisateurSortBy,
};
use crate::error::MedobsError;

#[derive(Default)]
pub struct MemoryStore {
    pub utilisateurs: Mutex<Vec<Utilisateur>>,
    pub services: Mutex<Vec<Service>>,
    pub competences: Mutex<Vec<Competence>>,
    pub templates: Mutex<Vec<TemplateObservation>>,
    pub observations: Mutex<Vec<Observation>>,
    pub fichiers: Mutex<Vec<FichierMedia>>,
    pub evaluations: Mutex<Vec<Evaluation>>,
    pub notes: Mutex<Vec<EvaluationCompetence>>,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

fn find<T: Clone>(rows: &Mutex<Vec<T>>, pred: impl Fn(&T) -> bool) -> Option<T> {
    rows.lock().unwrap().iter().find(|r| pred(r)).cloned()
}

fn replace<T>(rows: &Mutex<Vec<T>>, row: T, same: impl Fn(&T) -> bool) {
    let mut rows = rows.lock().unwrap();
    rows.retain(|r| !same(r));
    rows.push(row);
}

fn remove<T>(rows: &Mutex<Vec<T>>, pred: impl Fn(&T) -> bool) -> bool {
    let mut rows = rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|r| !pred(r));
    rows.len() != before
}

fn all<T: Clone>(rows: &Mutex<Vec<T>>, page: PageRequest) -> Page<T> {
    let items = rows.lock().unwrap().clone();
    let count = items.len() as u64;
    Page::new(items, count, page)
}

impl UtilisateurRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Utilisateur>, MedobsError> {
        Ok(find(&self.utilisateurs, |u| u.id == id))
    }
    async fn list(
        &self,
        _filter: &UtilisateurFilter,
        _sort_by: UtilisateurSortBy,
        page: PageRequest,
    ) -> Result<Page<UtilisateurRow>, MedobsError> {
        Ok(all(&self.utilisateurs, page).map(|utilisateur| UtilisateurRow {
            utilisateur,
            service_rattachement: None,
        }))
    }
    async fn create(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError> {
        if find(&self.utilisateurs, |u| u.username == utilisateur.username).is_some() {
            return Err(MedobsError::UsernameTaken);
        }
        self.utilisateurs.lock().unwrap().push(utilisateur.clone());
        Ok(())
    }
    async fn update(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError> {
        replace(&self.utilisateurs, utilisateur.clone(), |u| u.id == utilisateur.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.utilisateurs, |u| u.id == id))
    }
}

impl ServiceRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, MedobsError> {
        Ok(find(&self.services, |s| s.id == id))
    }
    async fn list(
        &self,
        _filter: &SearchFilter,
        _sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Service>, MedobsError> {
        Ok(all(&self.services, page))
    }
    async fn create(&self, service: &Service) -> Result<(), MedobsError> {
        if find(&self.services, |s| s.nom == service.nom).is_some() {
            return Err(MedobsError::ServiceNomTaken);
        }
        self.services.lock().unwrap().push(service.clone());
        Ok(())
    }
    async fn update(&self, service: &Service) -> Result<(), MedobsError> {
        replace(&self.services, service.clone(), |s| s.id == service.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.services, |s| s.id == id))
    }
}

impl CompetenceRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Competence>, MedobsError> {
        Ok(find(&self.competences, |c| c.id == id))
    }
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Competence>, MedobsError> {
        Ok(self
            .competences
            .lock()
            .unwrap()
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
    async fn list_all(&self) -> Result<Vec<Competence>, MedobsError> {
        let mut all = self.competences.lock().unwrap().clone();
        all.sort_by(|a, b| a.nom.cmp(&b.nom));
        Ok(all)
    }
    async fn list(
        &self,
        _filter: &SearchFilter,
        _sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Competence>, MedobsError> {
        Ok(all(&self.competences, page))
    }
    async fn create(&self, competence: &Competence) -> Result<(), MedobsError> {
        self.competences.lock().unwrap().push(competence.clone());
        Ok(())
    }
    async fn update(&self, competence: &Competence) -> Result<(), MedobsError> {
        replace(&self.competences, competence.clone(), |c| c.id == competence.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.competences, |c| c.id == id))
    }
}

impl TemplateRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TemplateObservation>, MedobsError> {
        Ok(find(&self.templates, |t| t.id == id))
    }
    async fn list(
        &self,
        _filter: &TemplateFilter,
        _sort_by: TemplateSortBy,
        page: PageRequest,
    ) -> Result<Page<TemplateRow>, MedobsError> {
        Ok(all(&self.templates, page).map(|template| TemplateRow {
            template,
            service: String::new(),
            cree_par: None,
        }))
    }
    async fn create(&self, template: &TemplateObservation) -> Result<(), MedobsError> {
        self.templates.lock().unwrap().push(template.clone());
        Ok(())
    }
    async fn update(&self, template: &TemplateObservation) -> Result<(), MedobsError> {
        replace(&self.templates, template.clone(), |t| t.id == template.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.templates, |t| t.id == id))
    }
    async fn count_observations(&self, id: Uuid) -> Result<u64, MedobsError> {
        Ok(self
            .observations
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.template_id == id)
            .count() as u64)
    }
}

impl ObservationRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Observation>, MedobsError> {
        Ok(find(&self.observations, |o| o.id == id))
    }
    async fn list(
        &self,
        _filter: &ObservationFilter,
        _sort_by: ObservationSortBy,
        page: PageRequest,
    ) -> Result<Page<ObservationRow>, MedobsError> {
        Ok(all(&self.observations, page).map(|observation| ObservationRow {
            observation,
            etudiant_username: String::new(),
            etudiant: String::new(),
            template: String::new(),
        }))
    }
    async fn create(&self, observation: &Observation) -> Result<(), MedobsError> {
        self.observations.lock().unwrap().push(observation.clone());
        Ok(())
    }
    async fn update(&self, observation: &Observation) -> Result<(), MedobsError> {
        replace(&self.observations, observation.clone(), |o| o.id == observation.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.observations, |o| o.id == id))
    }
}

impl FichierRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FichierMedia>, MedobsError> {
        Ok(find(&self.fichiers, |f| f.id == id))
    }
    async fn list_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Vec<FichierMedia>, MedobsError> {
        Ok(self
            .fichiers
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.observation_id == observation_id)
            .cloned()
            .collect())
    }
    async fn create(&self, fichier: &FichierMedia) -> Result<(), MedobsError> {
        self.fichiers.lock().unwrap().push(fichier.clone());
        Ok(())
    }
    async fn update(&self, fichier: &FichierMedia) -> Result<(), MedobsError> {
        replace(&self.fichiers, fichier.clone(), |f| f.id == fichier.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.fichiers, |f| f.id == id))
    }
}

impl EvaluationRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Evaluation>, MedobsError> {
        Ok(find(&self.evaluations, |e| e.id == id))
    }
    async fn find_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Option<Evaluation>, MedobsError> {
        Ok(find(&self.evaluations, |e| e.observation_id == observation_id))
    }
    async fn list(
        &self,
        _filter: &EvaluationFilter,
        _sort_by: EvaluationSortBy,
        page: PageRequest,
    ) -> Result<Page<EvaluationRow>, MedobsError> {
        Ok(all(&self.evaluations, page).map(|evaluation| EvaluationRow {
            observation: evaluation.libelle(),
            evaluation,
            professeur: None,
        }))
    }
    async fn create(&self, evaluation: &Evaluation) -> Result<(), MedobsError> {
        if find(&self.evaluations, |e| e.observation_id == evaluation.observation_id).is_some() {
            return Err(MedobsError::EvaluationAlreadyExists);
        }
        self.evaluations.lock().unwrap().push(evaluation.clone());
        Ok(())
    }
    async fn update(&self, evaluation: &Evaluation) -> Result<(), MedobsError> {
        replace(&self.evaluations, evaluation.clone(), |e| e.id == evaluation.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.evaluations, |e| e.id == id))
    }
}

impl NoteRepository for &MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EvaluationCompetence>, MedobsError> {
        Ok(find(&self.notes, |n| n.id == id))
    }
    async fn list_by_evaluation(&self, evaluation_id: Uuid) -> Result<Vec<NoteRow>, MedobsError> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.evaluation_id == evaluation_id)
            .map(|n| NoteRow {
                note: n.clone(),
                competence: String::new(),
            })
            .collect())
    }
    async fn create(&self, note: &EvaluationCompetence) -> Result<(), MedobsError> {
        let duplicate = find(&self.notes, |n| {
            n.evaluation_id == note.evaluation_id && n.competence_id == note.competence_id
        });
        if duplicate.is_some() {
            return Err(MedobsError::NoteAlreadyExists);
        }
        self.notes.lock().unwrap().push(note.clone());
        Ok(())
    }
    async fn update(&self, note: &EvaluationCompetence) -> Result<(), MedobsError> {
        replace(&self.notes, note.clone(), |n| n.id == note.id);
        Ok(())
    }
    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        Ok(remove(&self.notes, |n| n.id == id))
    }
}

impl MediaStorage for &MemoryStore {
    async fn save(&self, path: &str, contents: &[u8]) -> Result<(), MedobsError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_owned(), contents.to_vec());
        Ok(())
    }
    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MedobsError> {
        Ok(self.files.lock().unwrap().get(path).cloned())
    }
}
