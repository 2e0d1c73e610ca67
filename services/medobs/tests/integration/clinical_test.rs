use serde_json::json;
use uuid::Uuid;

use medobs::domain::repository::{
    CompetenceRepository, EvaluationRepository, FichierRepository, NoteRepository,
    ObservationRepository, ServiceRepository, TemplateRepository,
};
use medobs::domain::types::{
    NomSortBy, ObservationFilter, ObservationSortBy, SearchFilter, TemplateFilter, TemplateSortBy,
};
use medobs::error::MedobsError;
use medobs::infra::db::{DbCompetenceRepository, DbEvaluationRepository, DbNoteRepository};
use medobs::state::AppState;
use medobs::usecase::competence::DeleteCompetenceUseCase;
use medobs::usecase::evaluation::{NoteInput, SaveNoteUseCase};
use medobs::usecase::fichier::{UploadFichierInput, UploadFichierUseCase};
use medobs::usecase::observation::{
    ChangeStatutUseCase, CreateObservationUseCase, DeleteObservationUseCase, ObservationInput,
};
use medobs::usecase::service::{CreateServiceUseCase, DeleteServiceUseCase, ServiceInput};
use medobs::usecase::template::{
    CreateTemplateUseCase, DeleteTemplateUseCase, GetCompetenceSelectorUseCase, TemplateInput,
    TemplateRefs, UpdateTemplateUseCase,
};
use medobs_domain::date_filter::DateFilter;
use medobs_domain::observation::Statut;
use medobs_domain::pagination::PageRequest;
use medobs_domain::search::search_terms;
use medobs_domain::user::Role;
use medobs_testing::fixture::{
    link_competence, seed_competence, seed_evaluation, seed_observation, seed_service,
    seed_template, seed_utilisateur, seed_utilisateur_named,
};

use crate::helpers::test_state;

fn save_note(
    state: &AppState,
) -> SaveNoteUseCase<DbNoteRepository, DbEvaluationRepository, DbCompetenceRepository> {
    SaveNoteUseCase {
        repo: state.note_repo(),
        evaluations: state.evaluation_repo(),
        competences: state.competence_repo(),
    }
}

fn note(competence_id: Uuid, value: i32) -> NoteInput {
    NoteInput {
        competence_id,
        note: value,
        commentaire_specifique: String::new(),
    }
}

fn template_input(
    service_id: Uuid,
    cree_par_id: Option<Uuid>,
    competences: Vec<Uuid>,
) -> TemplateInput {
    TemplateInput {
        nom: "Examen cardiaque".into(),
        service_id,
        cree_par_id,
        structure: json!({ "sections": [{ "titre": "Anamnèse" }] }),
        competences_evaluees: competences,
        actif: true,
    }
}

/// Service, template, student and one observation in the given status.
async fn seed_observation_chain(state: &AppState, statut: Statut) -> (Uuid, Uuid, Uuid) {
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, statut).await;
    (service_id, template_id, observation_id)
}

// ── Services ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_duplicate_service_name() {
    let (state, _media) = test_state().await;
    let usecase = CreateServiceUseCase {
        repo: state.service_repo(),
    };
    let input = || ServiceInput {
        nom: "Cardiologie".into(),
        description: String::new(),
    };
    usecase.execute(input()).await.unwrap();
    let result = usecase.execute(input()).await;
    assert!(
        matches!(result, Err(MedobsError::ServiceNomTaken)),
        "expected ServiceNomTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_cascade_service_delete_to_templates() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;

    DeleteServiceUseCase {
        repo: state.service_repo(),
    }
    .execute(service_id)
    .await
    .unwrap();

    assert!(state.template_repo().find_by_id(template_id).await.unwrap().is_none());
}

#[tokio::test]
async fn should_protect_service_whose_template_is_used() {
    let (state, _media) = test_state().await;
    let (service_id, template_id, _) = seed_observation_chain(&state, Statut::Brouillon).await;

    let result = DeleteServiceUseCase {
        repo: state.service_repo(),
    }
    .execute(service_id)
    .await;
    assert!(
        matches!(result, Err(MedobsError::DeleteProtected)),
        "expected DeleteProtected, got {result:?}"
    );
    assert!(state.service_repo().find_by_id(service_id).await.unwrap().is_some());
    assert!(state.template_repo().find_by_id(template_id).await.unwrap().is_some());
}

#[tokio::test]
async fn should_search_and_page_services() {
    let (state, _media) = test_state().await;
    for nom in ["Cardiologie adulte", "Cardiologie pédiatrique", "Neurologie", "Urgences"] {
        seed_service(&state.db, nom).await;
    }
    let filter = SearchFilter {
        terms: search_terms("cardio"),
    };
    let page = state
        .service_repo()
        .list(
            &filter,
            NomSortBy::default(),
            PageRequest {
                per_page: 1,
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.num_pages(), 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].nom, "Cardiologie pédiatrique");
}

// ── Templates ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_protect_template_with_observations() {
    let (state, _media) = test_state().await;
    let (_, template_id, _) = seed_observation_chain(&state, Statut::Brouillon).await;

    let result = DeleteTemplateUseCase {
        repo: state.template_repo(),
    }
    .execute(template_id)
    .await;
    assert!(matches!(result, Err(MedobsError::DeleteProtected)));
    assert!(state.template_repo().find_by_id(template_id).await.unwrap().is_some());
}

#[tokio::test]
async fn should_protect_template_at_database_level() {
    let (state, _media) = test_state().await;
    let (_, template_id, _) = seed_observation_chain(&state, Statut::Brouillon).await;

    // Straight to the repository, skipping the use case's pre-check.
    let result = state.template_repo().delete(template_id).await;
    assert!(matches!(result, Err(MedobsError::DeleteProtected)));
}

#[tokio::test]
async fn should_require_professor_as_template_author() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let result = CreateTemplateUseCase {
        repo: state.template_repo(),
        refs: TemplateRefs {
            services: state.service_repo(),
            utilisateurs: state.utilisateur_repo(),
            competences: state.competence_repo(),
        },
    }
    .execute(template_input(service_id, Some(etudiant), vec![]))
    .await;
    assert!(
        matches!(result, Err(MedobsError::InvalidChoice(_))),
        "expected InvalidChoice, got {result:?}"
    );
}

#[tokio::test]
async fn should_replace_competence_links() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let anamnese = seed_competence(&state.db, "Anamnèse").await;
    let examen = seed_competence(&state.db, "Examen clinique").await;
    let synthese = seed_competence(&state.db, "Synthèse").await;
    let refs = || TemplateRefs {
        services: state.service_repo(),
        utilisateurs: state.utilisateur_repo(),
        competences: state.competence_repo(),
    };

    let template = CreateTemplateUseCase {
        repo: state.template_repo(),
        refs: refs(),
    }
    .execute(template_input(service_id, Some(prof), vec![anamnese, examen, anamnese]))
    .await
    .unwrap();
    let stored = state.template_repo().find_by_id(template.id).await.unwrap().unwrap();
    assert_eq!(stored.competences_evaluees.len(), 2);

    UpdateTemplateUseCase {
        repo: state.template_repo(),
        refs: refs(),
    }
    .execute(template.id, template_input(service_id, Some(prof), vec![synthese]))
    .await
    .unwrap();

    let selector = GetCompetenceSelectorUseCase {
        repo: state.template_repo(),
        competences: state.competence_repo(),
    }
    .execute(template.id)
    .await
    .unwrap();
    let selected: Vec<_> = selector.selected.iter().map(|c| c.id).collect();
    let available: Vec<_> = selector.available.iter().map(|c| c.nom.as_str()).collect();
    assert_eq!(selected, [synthese]);
    assert_eq!(available, ["Anamnèse", "Examen clinique"]);
}

#[tokio::test]
async fn should_reject_unknown_competence_without_partial_write() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let anamnese = seed_competence(&state.db, "Anamnèse").await;
    let result = CreateTemplateUseCase {
        repo: state.template_repo(),
        refs: TemplateRefs {
            services: state.service_repo(),
            utilisateurs: state.utilisateur_repo(),
            competences: state.competence_repo(),
        },
    }
    .execute(template_input(service_id, None, vec![anamnese, Uuid::now_v7()]))
    .await;
    assert!(matches!(result, Err(MedobsError::CompetenceNotFound)));

    let page = state
        .template_repo()
        .list(&TemplateFilter::default(), TemplateSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn should_search_templates_by_service_name() {
    let (state, _media) = test_state().await;
    let cardio = seed_service(&state.db, "Cardiologie").await;
    let neuro = seed_service(&state.db, "Neurologie").await;
    seed_template(&state.db, "Examen initial", cardio, None).await;
    seed_template(&state.db, "Examen initial", neuro, None).await;

    let filter = TemplateFilter {
        terms: search_terms("examen neuro"),
        ..Default::default()
    };
    let page = state
        .template_repo()
        .list(&filter, TemplateSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].service, "Neurologie");
    assert_eq!(page.items[0].libelle(), "Examen initial (Neurologie)");
}

// ── Observations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_student_for_observation() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let result = CreateObservationUseCase {
        repo: state.observation_repo(),
        utilisateurs: state.utilisateur_repo(),
        templates: state.template_repo(),
    }
    .execute(ObservationInput {
        etudiant_id: prof,
        template_id,
        statut: Statut::Brouillon,
        donnees: None,
    })
    .await;
    assert!(matches!(result, Err(MedobsError::InvalidChoice(_))));
}

#[tokio::test]
async fn should_stamp_submission_through_workflow() {
    let (state, _media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::Brouillon).await;
    let usecase = ChangeStatutUseCase {
        repo: state.observation_repo(),
    };

    let rejected = usecase.execute(observation_id, Statut::Validee).await;
    assert!(matches!(rejected, Err(MedobsError::InvalidTransition { .. })));

    usecase.execute(observation_id, Statut::EnAttente).await.unwrap();
    let stored = state
        .observation_repo()
        .find_by_id(observation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.statut, Statut::EnAttente);
    let submitted_at = stored.date_soumission.expect("date_soumission stamped");

    usecase.execute(observation_id, Statut::ACorriger).await.unwrap();
    let resubmitted = usecase.execute(observation_id, Statut::EnAttente).await.unwrap();
    assert!(resubmitted.date_soumission.unwrap() >= submitted_at);

    usecase.execute(observation_id, Statut::Validee).await.unwrap();
    let terminal = usecase.execute(observation_id, Statut::ACorriger).await;
    assert!(matches!(terminal, Err(MedobsError::InvalidTransition { .. })));
}

#[tokio::test]
async fn should_cascade_observation_delete() {
    let (state, media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    let fichier = UploadFichierUseCase {
        repo: state.fichier_repo(),
        observations: state.observation_repo(),
        storage: state.storage(),
    }
    .execute(UploadFichierInput {
        observation_id,
        file_name: "ecg.pdf".into(),
        contents: b"%PDF".to_vec(),
        legende: "ECG".into(),
    })
    .await
    .unwrap();
    let evaluation_id = seed_evaluation(&state.db, observation_id, None).await;
    let competence_id = seed_competence(&state.db, "Anamnèse").await;
    let grade = save_note(&state)
        .create(evaluation_id, note(competence_id, 4))
        .await
        .unwrap();

    DeleteObservationUseCase {
        repo: state.observation_repo(),
    }
    .execute(observation_id)
    .await
    .unwrap();

    assert!(state.fichier_repo().find_by_id(fichier.id).await.unwrap().is_none());
    assert!(state.evaluation_repo().find_by_id(evaluation_id).await.unwrap().is_none());
    assert!(state.note_repo().find_by_id(grade.id).await.unwrap().is_none());
    // Stored contents outlive the record.
    assert!(media.path().join(&fichier.fichier).exists());
}

#[tokio::test]
async fn should_combine_observation_filters() {
    let (state, _media) = test_state().await;
    let cardio = seed_service(&state.db, "Cardiologie").await;
    let neuro = seed_service(&state.db, "Neurologie").await;
    let cardio_template = seed_template(&state.db, "Examen", cardio, None).await;
    let neuro_template = seed_template(&state.db, "Examen", neuro, None).await;
    let marie = seed_utilisateur_named(&state.db, "mdupont", "Marie", "Dupont", Role::Etudiant).await;
    let paul = seed_utilisateur_named(&state.db, "pmartin", "Paul", "Martin", Role::Etudiant).await;
    seed_observation(&state.db, marie, cardio_template, Statut::EnAttente).await;
    seed_observation(&state.db, marie, neuro_template, Statut::EnAttente).await;
    seed_observation(&state.db, marie, cardio_template, Statut::Brouillon).await;
    seed_observation(&state.db, paul, cardio_template, Statut::EnAttente).await;

    let filter = ObservationFilter {
        terms: search_terms("marie"),
        statut: Some(Statut::EnAttente),
        service_id: Some(cardio),
        date_creation: Some(DateFilter::Today.range(chrono::Utc::now())),
    };
    let page = state
        .observation_repo()
        .list(&filter, ObservationSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].etudiant, "Marie Dupont");
    assert_eq!(page.items[0].template, "Examen (Cardiologie)");
    assert!(page.items[0].libelle().ends_with("de mdupont"));
}

// ── Evaluations and grades ───────────────────────────────────────────────────

#[tokio::test]
async fn should_bound_grades() {
    let (state, _media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    let evaluation_id = seed_evaluation(&state.db, observation_id, None).await;
    let usecase = save_note(&state);

    for bad in [6, -1] {
        let competence_id = seed_competence(&state.db, &format!("Compétence {bad}")).await;
        let result = usecase.create(evaluation_id, note(competence_id, bad)).await;
        assert!(
            matches!(result, Err(MedobsError::InvalidNote(_))),
            "grade {bad}: {result:?}"
        );
    }
    for good in [0, 5] {
        let competence_id = seed_competence(&state.db, &format!("Compétence {good}")).await;
        let grade = usecase.create(evaluation_id, note(competence_id, good)).await.unwrap();
        assert_eq!(i32::from(grade.note), good);
    }
    assert_eq!(state.note_repo().list_by_evaluation(evaluation_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn should_reject_second_grade_for_pair() {
    let (state, _media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    let evaluation_id = seed_evaluation(&state.db, observation_id, None).await;
    let competence_id = seed_competence(&state.db, "Anamnèse").await;
    let usecase = save_note(&state);

    usecase.create(evaluation_id, note(competence_id, 3)).await.unwrap();
    let result = usecase.create(evaluation_id, note(competence_id, 4)).await;
    assert!(
        matches!(result, Err(MedobsError::NoteAlreadyExists)),
        "expected NoteAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_second_evaluation_at_database_level() {
    let (state, _media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    seed_evaluation(&state.db, observation_id, None).await;
    let existing = state
        .evaluation_repo()
        .find_by_observation(observation_id)
        .await
        .unwrap()
        .unwrap();

    let duplicate = medobs::domain::types::Evaluation {
        id: Uuid::now_v7(),
        ..existing
    };
    let result = state.evaluation_repo().create(&duplicate).await;
    assert!(matches!(result, Err(MedobsError::EvaluationAlreadyExists)));
}

#[tokio::test]
async fn should_cascade_competence_delete() {
    let (state, _media) = test_state().await;
    let (_, template_id, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    let competence_id = seed_competence(&state.db, "Anamnèse").await;
    link_competence(&state.db, template_id, competence_id).await;
    let evaluation_id = seed_evaluation(&state.db, observation_id, None).await;
    save_note(&state)
        .create(evaluation_id, note(competence_id, 2))
        .await
        .unwrap();

    DeleteCompetenceUseCase {
        repo: state.competence_repo(),
    }
    .execute(competence_id)
    .await
    .unwrap();

    assert!(state.competence_repo().find_by_id(competence_id).await.unwrap().is_none());
    assert!(state.note_repo().list_by_evaluation(evaluation_id).await.unwrap().is_empty());
    let template = state.template_repo().find_by_id(template_id).await.unwrap().unwrap();
    assert!(template.competences_evaluees.is_empty());
}

#[tokio::test]
async fn should_list_grades_with_competence_names() {
    let (state, _media) = test_state().await;
    let (_, _, observation_id) = seed_observation_chain(&state, Statut::EnAttente).await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let evaluation_id = seed_evaluation(&state.db, observation_id, Some(prof)).await;
    let synthese = seed_competence(&state.db, "Synthèse").await;
    let anamnese = seed_competence(&state.db, "Anamnèse").await;
    let usecase = save_note(&state);
    usecase.create(evaluation_id, note(synthese, 4)).await.unwrap();
    usecase.create(evaluation_id, note(anamnese, 3)).await.unwrap();

    let rows = state.note_repo().list_by_evaluation(evaluation_id).await.unwrap();
    let labels: Vec<_> = rows.iter().map(|row| row.libelle()).collect();
    assert_eq!(labels, ["Note pour Anamnèse: 3/5", "Note pour Synthèse: 4/5"]);
}
