use medobs::domain::repository::{
    EvaluationRepository, ObservationRepository, TemplateRepository, UtilisateurRepository,
};
use medobs::domain::types::{UtilisateurFilter, UtilisateurSortBy};
use medobs::error::MedobsError;
use medobs::usecase::service::DeleteServiceUseCase;
use medobs::usecase::utilisateur::{
    CreateUtilisateurUseCase, DeleteUtilisateurUseCase, ListUtilisateursUseCase, UtilisateurInput,
};
use medobs_domain::observation::Statut;
use medobs_domain::pagination::{PageRequest, Sort};
use medobs_domain::search::search_terms;
use medobs_domain::user::Role;
use medobs_testing::fixture::{
    seed_evaluation, seed_observation, seed_service, seed_template, seed_utilisateur,
    seed_utilisateur_named,
};

use crate::helpers::test_state;

fn input(username: &str, role: Role) -> UtilisateurInput {
    UtilisateurInput {
        username: username.to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        role,
        service_rattachement_id: None,
        is_staff: false,
        is_superuser: false,
        is_active: true,
    }
}

// ── Uniqueness ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_duplicate_username() {
    let (state, _media) = test_state().await;
    let usecase = CreateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    };
    usecase.execute(input("jdupont", Role::Etudiant)).await.unwrap();
    let result = usecase.execute(input("jdupont", Role::Professeur)).await;
    assert!(
        matches!(result, Err(MedobsError::UsernameTaken)),
        "expected UsernameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_missing_service_rattachement() {
    let (state, _media) = test_state().await;
    let mut account = input("jdupont", Role::Etudiant);
    account.service_rattachement_id = Some(uuid::Uuid::now_v7());
    let result = CreateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    }
    .execute(account)
    .await;
    assert!(matches!(result, Err(MedobsError::ServiceNotFound)));
}

// ── Deletion effects ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_null_template_author_when_professor_deleted() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let template_id = seed_template(&state.db, "Examen", service_id, Some(prof)).await;

    DeleteUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    }
    .execute(prof)
    .await
    .unwrap();

    let template = state
        .template_repo()
        .find_by_id(template_id)
        .await
        .unwrap()
        .expect("template kept");
    assert_eq!(template.cree_par_id, None);
}

#[tokio::test]
async fn should_null_evaluation_author_when_professor_deleted() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::EnAttente).await;
    let evaluation_id = seed_evaluation(&state.db, observation_id, Some(prof)).await;

    DeleteUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    }
    .execute(prof)
    .await
    .unwrap();

    let evaluation = state
        .evaluation_repo()
        .find_by_id(evaluation_id)
        .await
        .unwrap()
        .expect("evaluation kept");
    assert_eq!(evaluation.professeur_id, None);
}

#[tokio::test]
async fn should_null_rattachement_when_service_deleted() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Pneumologie").await;
    let mut account = input("jdupont", Role::Etudiant);
    account.service_rattachement_id = Some(service_id);
    let utilisateur = CreateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    }
    .execute(account)
    .await
    .unwrap();

    DeleteServiceUseCase {
        repo: state.service_repo(),
    }
    .execute(service_id)
    .await
    .unwrap();

    let utilisateur = state
        .utilisateur_repo()
        .find_by_id(utilisateur.id)
        .await
        .unwrap()
        .expect("utilisateur kept");
    assert_eq!(utilisateur.service_rattachement_id, None);
}

#[tokio::test]
async fn should_delete_observations_with_student() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::Brouillon).await;

    DeleteUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    }
    .execute(etudiant)
    .await
    .unwrap();

    assert!(
        state
            .observation_repo()
            .find_by_id(observation_id)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(state.template_repo().count_observations(template_id).await.unwrap(), 0);
}

#[tokio::test]
async fn should_return_not_found_when_deleting_unknown_user() {
    let (state, _media) = test_state().await;
    let result = DeleteUtilisateurUseCase {
        repo: state.utilisateur_repo(),
    }
    .execute(uuid::Uuid::now_v7())
    .await;
    assert!(matches!(result, Err(MedobsError::UtilisateurNotFound)));
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_every_search_term() {
    let (state, _media) = test_state().await;
    seed_utilisateur_named(&state.db, "mdupont", "Marie", "Dupont", Role::Etudiant).await;
    seed_utilisateur_named(&state.db, "mmartin", "Marie", "Martin", Role::Etudiant).await;
    seed_utilisateur_named(&state.db, "pdupont", "Paul", "Dupont", Role::Professeur).await;

    let usecase = ListUtilisateursUseCase {
        repo: state.utilisateur_repo(),
    };
    let filter = UtilisateurFilter {
        terms: search_terms("marie DUPONT"),
        ..Default::default()
    };
    let page = usecase
        .execute(&filter, UtilisateurSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].utilisateur.username, "mdupont");

    let filter = UtilisateurFilter {
        terms: search_terms("dupont"),
        role: Some(Role::Professeur),
        ..Default::default()
    };
    let page = usecase
        .execute(&filter, UtilisateurSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].utilisateur.username, "pdupont");
}

#[tokio::test]
async fn should_page_usernames_in_order() {
    let (state, _media) = test_state().await;
    for username in ["charlie", "alice", "bob"] {
        seed_utilisateur(&state.db, username, Role::Etudiant).await;
    }
    let page = state
        .utilisateur_repo()
        .list(
            &UtilisateurFilter::default(),
            UtilisateurSortBy::Username(Sort::Desc),
            PageRequest {
                per_page: 2,
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.page, 2);
    let names: Vec<_> = page
        .items
        .iter()
        .map(|row| row.utilisateur.username.as_str())
        .collect();
    assert_eq!(names, ["alice"]);
}

#[tokio::test]
async fn should_show_service_name_in_list() {
    let (state, _media) = test_state().await;
    let service_id = seed_service(&state.db, "Pédiatrie").await;
    let mut account = input("jdupont", Role::Etudiant);
    account.service_rattachement_id = Some(service_id);
    CreateUtilisateurUseCase {
        repo: state.utilisateur_repo(),
        services: state.service_repo(),
    }
    .execute(account)
    .await
    .unwrap();

    let filter = UtilisateurFilter {
        service_id: Some(service_id),
        ..Default::default()
    };
    let page = state
        .utilisateur_repo()
        .list(&filter, UtilisateurSortBy::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].service_rattachement.as_deref(), Some("Pédiatrie"));
}
