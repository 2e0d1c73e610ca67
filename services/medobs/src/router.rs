use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use medobs_core::health::healthz;
use medobs_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    competence::{
        create_competence, delete_competence, get_competence, list_competences,
        update_competence,
    },
    evaluation::{
        create_evaluation, create_note, delete_evaluation, delete_note, get_evaluation, get_note,
        list_evaluations, list_notes, update_evaluation, update_note,
    },
    fichier::{
        delete_fichier, download_fichier, get_fichier, list_fichiers, update_fichier,
        upload_fichier,
    },
    health::readyz,
    observation::{
        change_statut, create_observation, delete_observation, get_observation,
        list_observations, update_observation,
    },
    service::{create_service, delete_service, get_service, list_services, update_service},
    template::{
        create_template, delete_template, get_competence_selector, get_template, list_templates,
        update_template,
    },
    utilisateur::{
        create_utilisateur, delete_utilisateur, get_utilisateur, list_utilisateurs,
        update_utilisateur,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Identity
        .route(
            "/admin/utilisateurs",
            get(list_utilisateurs).post(create_utilisateur),
        )
        .route(
            "/admin/utilisateurs/{id}",
            get(get_utilisateur)
                .put(update_utilisateur)
                .delete(delete_utilisateur),
        )
        // Services
        .route("/admin/services", get(list_services).post(create_service))
        .route(
            "/admin/services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        // Competences
        .route(
            "/admin/competences",
            get(list_competences).post(create_competence),
        )
        .route(
            "/admin/competences/{id}",
            get(get_competence)
                .put(update_competence)
                .delete(delete_competence),
        )
        // Templates
        .route("/admin/templates", get(list_templates).post(create_template))
        .route(
            "/admin/templates/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route(
            "/admin/templates/{id}/competences",
            get(get_competence_selector),
        )
        // Observations
        .route(
            "/admin/observations",
            get(list_observations).post(create_observation),
        )
        .route(
            "/admin/observations/{id}",
            get(get_observation)
                .put(update_observation)
                .delete(delete_observation),
        )
        .route("/admin/observations/{id}/statut", post(change_statut))
        // Files
        .route(
            "/admin/observations/{id}/fichiers",
            get(list_fichiers).post(upload_fichier).layer(upload_limit),
        )
        .route(
            "/admin/fichiers/{id}",
            get(get_fichier).put(update_fichier).delete(delete_fichier),
        )
        .route("/admin/fichiers/{id}/contenu", get(download_fichier))
        // Evaluations
        .route(
            "/admin/evaluations",
            get(list_evaluations).post(create_evaluation),
        )
        .route(
            "/admin/evaluations/{id}",
            get(get_evaluation)
                .put(update_evaluation)
                .delete(delete_evaluation),
        )
        .route(
            "/admin/evaluations/{id}/notes",
            get(list_notes).post(create_note),
        )
        .route(
            "/admin/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
