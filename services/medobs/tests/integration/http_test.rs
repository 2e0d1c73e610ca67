use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

use medobs::router::build_router;
use medobs_domain::observation::Statut;
use medobs_domain::user::Role;
use medobs_testing::fixture::{
    seed_competence, seed_observation, seed_service, seed_template, seed_utilisateur,
};

use crate::helpers::{test_server, test_state};

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_ready_with_database() {
    let (server, _state, _media) = test_server().await;
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_echo_request_id() {
    let (server, _state, _media) = test_server().await;
    let response = server.get("/healthz").await;
    let id = response.header("x-request-id");
    assert!(id.to_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

// ── Services ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_and_list_services() {
    let (server, _state, _media) = test_server().await;
    let created = server
        .post("/admin/services")
        .json(&json!({ "nom": "Cardiologie", "description": "Adultes" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["nom"], "Cardiologie");
    assert!(body["date_creation"].as_str().unwrap().ends_with('Z'));

    let duplicate = server
        .post("/admin/services")
        .json(&json!({ "nom": "Cardiologie" }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);
    assert_eq!(duplicate.json::<Value>()["kind"], "SERVICE_NOM_TAKEN");

    let list: Value = server
        .get("/admin/services")
        .add_query_param("q", "cardio")
        .await
        .json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["page"], 1);
    assert_eq!(list["per_page"], 25);
    assert_eq!(list["items"][0]["nom"], "Cardiologie");
}

#[tokio::test]
async fn should_report_validation_fields() {
    let (server, _state, _media) = test_server().await;
    let response = server
        .post("/admin/services")
        .json(&json!({ "nom": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["fields"]["nom"].is_array());
}

#[tokio::test]
async fn should_return_not_found_for_unknown_service() {
    let (server, _state, _media) = test_server().await;
    let response = server
        .get(&format!("/admin/services/{}", uuid::Uuid::now_v7()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["kind"], "SERVICE_NOT_FOUND");
}

#[tokio::test]
async fn should_reject_malformed_list_query() {
    let (server, _state, _media) = test_server().await;
    let response = server
        .get("/admin/services")
        .add_query_param("page", "first")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "MISSING_DATA");
}

#[tokio::test]
async fn should_return_empty_page_past_the_last_one() {
    let (server, state, _media) = test_server().await;
    seed_service(&state.db, "Cardiologie").await;

    let response = server
        .get("/admin/services")
        .add_query_param("page", u32::MAX)
        .add_query_param("per-page", 100)
        .await;
    response.assert_status_ok();
    let list: Value = response.json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["page"], u32::MAX);
    assert!(list["items"].as_array().unwrap().is_empty());
}

// ── Utilisateurs ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_role() {
    let (server, _state, _media) = test_server().await;
    let response = server
        .post("/admin/utilisateurs")
        .json(&json!({ "username": "jdupont", "role": "ADMIN" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_CHOICE");
}

#[tokio::test]
async fn should_reject_invalid_username() {
    let (server, _state, _media) = test_server().await;
    let response = server
        .post("/admin/utilisateurs")
        .json(&json!({ "username": "jean dupont", "role": "ETUDIANT" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_USERNAME");
}

#[tokio::test]
async fn should_filter_users_by_role() {
    let (server, state, _media) = test_server().await;
    seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    seed_utilisateur(&state.db, "prof", Role::Professeur).await;

    let list: Value = server
        .get("/admin/utilisateurs")
        .add_query_param("role", "PROFESSEUR")
        .await
        .json();
    assert_eq!(list["count"], 1);
    assert_eq!(list["items"][0]["username"], "prof");
    assert_eq!(list["items"][0]["role"], "PROFESSEUR");
}

// ── Templates ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refuse_deleting_used_template() {
    let (server, state, _media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    seed_observation(&state.db, etudiant, template_id, Statut::Brouillon).await;

    let response = server
        .delete(&format!("/admin/templates/{template_id}"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["kind"], "DELETE_PROTECTED");
}

#[tokio::test]
async fn should_expose_competence_selector() {
    let (server, state, _media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let anamnese = seed_competence(&state.db, "Anamnèse").await;
    seed_competence(&state.db, "Synthèse").await;

    let created = server
        .post("/admin/templates")
        .json(&json!({
            "nom": "Examen cardiaque",
            "service": service_id,
            "cree_par": prof,
            "competences_evaluees": [anamnese],
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let template_id = created.json::<Value>()["id"].as_str().unwrap().to_owned();

    let selector: Value = server
        .get(&format!("/admin/templates/{template_id}/competences"))
        .await
        .json();
    assert_eq!(selector["selected"][0]["nom"], "Anamnèse");
    assert_eq!(selector["available"][0]["nom"], "Synthèse");
}

// ── Observations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_apply_workflow_transitions() {
    let (server, state, _media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;

    let created = server
        .post("/admin/observations")
        .json(&json!({
            "etudiant": etudiant,
            "template": template_id,
            "donnees": { "anamnese": "douleur thoracique" },
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["statut"], "BROUILLON");
    assert!(body["date_soumission"].is_null());
    let id = body["id"].as_str().unwrap().to_owned();

    let skipped = server
        .post(&format!("/admin/observations/{id}/statut"))
        .json(&json!({ "statut": "VALIDEE" }))
        .await;
    skipped.assert_status(StatusCode::CONFLICT);
    assert_eq!(skipped.json::<Value>()["kind"], "INVALID_TRANSITION");

    let submitted: Value = server
        .post(&format!("/admin/observations/{id}/statut"))
        .json(&json!({ "statut": "EN_ATTENTE" }))
        .await
        .json();
    assert_eq!(submitted["statut"], "EN_ATTENTE");
    assert!(submitted["date_soumission"].is_string());

    let list: Value = server
        .get("/admin/observations")
        .add_query_param("statut", "EN_ATTENTE")
        .add_query_param("date-creation", "today")
        .await
        .json();
    assert_eq!(list["count"], 1);
}

// ── Files ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_upload_and_download_file() {
    let (server, state, media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::Brouillon).await;

    let form = MultipartForm::new()
        .add_text("legende", "Radio de face")
        .add_part(
            "fichier",
            Part::bytes(b"\x89PNG".as_slice())
                .file_name("radio thorax.png")
                .mime_type("image/png"),
        );
    let uploaded = server
        .post(&format!("/admin/observations/{observation_id}/fichiers"))
        .multipart(form)
        .await;
    uploaded.assert_status(StatusCode::CREATED);
    let body: Value = uploaded.json();
    let path = body["fichier"].as_str().unwrap().to_owned();
    assert!(path.starts_with("fichiers_observations/"));
    assert!(media.path().join(&path).exists());
    assert_eq!(
        body["libelle"],
        format!("Fichier {} pour l'observation #{observation_id}", body["id"].as_str().unwrap())
    );

    let id = body["id"].as_str().unwrap().to_owned();
    let download = server.get(&format!("/admin/fichiers/{id}/contenu")).await;
    download.assert_status_ok();
    assert_eq!(download.as_bytes().as_ref(), b"\x89PNG");
    let disposition = download.header("content-disposition");
    assert!(disposition.to_str().unwrap().ends_with("_radio_thorax.png\""));

    let listed: Value = server
        .get(&format!("/admin/observations/{observation_id}/fichiers"))
        .await
        .json();
    assert_eq!(listed[0]["legende"], "Radio de face");
}

#[tokio::test]
async fn should_reject_upload_without_file() {
    let (server, state, _media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::Brouillon).await;

    let response = server
        .post(&format!("/admin/observations/{observation_id}/fichiers"))
        .multipart(MultipartForm::new().add_text("legende", "vide"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_FILE");
}

#[tokio::test]
async fn should_reject_upload_over_body_limit() {
    let (mut state, _media) = test_state().await;
    state.max_upload_bytes = 1024;
    let server = TestServer::new(build_router(state.clone())).unwrap();
    let service_id = seed_service(&state.db, "Radiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::Brouillon).await;

    let form = MultipartForm::new().add_part(
        "fichier",
        Part::bytes(vec![0u8; 8 * 1024])
            .file_name("radio.dcm")
            .mime_type("application/dicom"),
    );
    let response = server
        .post(&format!("/admin/observations/{observation_id}/fichiers"))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["kind"], "FILE_TOO_LARGE");

    let listed: Value = server
        .get(&format!("/admin/observations/{observation_id}/fichiers"))
        .await
        .json();
    assert!(listed.as_array().unwrap().is_empty());
}

// ── Evaluations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_grade_within_bounds() {
    let (server, state, _media) = test_server().await;
    let service_id = seed_service(&state.db, "Cardiologie").await;
    let template_id = seed_template(&state.db, "Examen", service_id, None).await;
    let etudiant = seed_utilisateur(&state.db, "etu", Role::Etudiant).await;
    let prof = seed_utilisateur(&state.db, "prof", Role::Professeur).await;
    let observation_id = seed_observation(&state.db, etudiant, template_id, Statut::EnAttente).await;
    let competence_id = seed_competence(&state.db, "Anamnèse").await;

    let created = server
        .post("/admin/evaluations")
        .json(&json!({ "observation": observation_id, "professeur": prof }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let evaluation_id = created.json::<Value>()["id"].as_str().unwrap().to_owned();

    let second = server
        .post("/admin/evaluations")
        .json(&json!({ "observation": observation_id }))
        .await;
    second.assert_status(StatusCode::CONFLICT);
    assert_eq!(second.json::<Value>()["kind"], "EVALUATION_ALREADY_EXISTS");

    let too_high = server
        .post(&format!("/admin/evaluations/{evaluation_id}/notes"))
        .json(&json!({ "competence": competence_id, "note": 6 }))
        .await;
    too_high.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(too_high.json::<Value>()["kind"], "INVALID_NOTE");

    server
        .post(&format!("/admin/evaluations/{evaluation_id}/notes"))
        .json(&json!({ "competence": competence_id, "note": 5 }))
        .await
        .assert_status(StatusCode::CREATED);

    let notes: Value = server
        .get(&format!("/admin/evaluations/{evaluation_id}/notes"))
        .await
        .json();
    assert_eq!(notes[0]["note"], 5);
    assert_eq!(notes[0]["libelle"], "Note pour Anamnèse: 5/5");
}
