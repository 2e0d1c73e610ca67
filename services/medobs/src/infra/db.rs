use std::collections::HashMap;

use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait, sea_query::Query,
};
use uuid::Uuid;

use medobs_core::sea_ext::{
    all_terms, flatten_transaction_err, icontains, is_foreign_key_violation, is_unique_violation,
};
use medobs_domain::evaluation::Note;
use medobs_domain::observation::Statut;
use medobs_domain::pagination::{Page, PageRequest, Sort};
use medobs_domain::user::Role;
use medobs_schema::{
    competences, evaluation_competences, evaluations, fichiers_media, observations, services,
    template_competences, templates_observation, utilisateurs,
};

use crate::domain::repository::{
    CompetenceRepository, EvaluationRepository, FichierRepository, NoteRepository,
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

// ── Shared helpers ───────────────────────────────────────────────────────────

fn order(sort: Sort) -> Order {
    match sort {
        Sort::Asc => Order::Asc,
        Sort::Desc => Order::Desc,
    }
}

fn internal(err: DbErr, context: &'static str) -> MedobsError {
    MedobsError::Internal(anyhow::Error::new(err).context(context))
}

/// Map a unique violation to `conflict`, anything else to `Internal`.
fn conflict_or_internal(err: DbErr, conflict: MedobsError, context: &'static str) -> MedobsError {
    if is_unique_violation(&err) {
        conflict
    } else {
        internal(err, context)
    }
}

/// A foreign-key violation on delete means a protected row is still referenced.
fn protected_or_internal(err: DbErr, context: &'static str) -> MedobsError {
    if is_foreign_key_violation(&err) {
        MedobsError::DeleteProtected
    } else {
        internal(err, context)
    }
}

async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    page: PageRequest,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let request = page.clamped();
    let count = query.clone().count(db).await?;
    let models = query
        .offset(request.offset())
        .limit(u64::from(request.per_page))
        .all(db)
        .await?;
    Ok(Page::new(models, count, request))
}

async fn service_names(
    db: &DatabaseConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, MedobsError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = services::Entity::find()
        .filter(services::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await
        .context("load service names")?;
    Ok(models.into_iter().map(|m| (m.id, m.nom)).collect())
}

async fn utilisateurs_by_id(
    db: &DatabaseConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Utilisateur>, MedobsError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = utilisateurs::Entity::find()
        .filter(utilisateurs::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await
        .context("load utilisateurs by id")?;
    models
        .into_iter()
        .map(|m| Ok::<_, MedobsError>((m.id, utilisateur_from_model(m)?)))
        .collect()
}

/// Template labels `"{nom} ({service})"` keyed by template id.
async fn template_labels(
    db: &DatabaseConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, MedobsError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = templates_observation::Entity::find()
        .filter(templates_observation::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await
        .context("load template labels")?;
    let service_ids: Vec<Uuid> = models.iter().map(|m| m.service_id).collect();
    let services = service_names(db, &service_ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let service = services.get(&m.service_id).map(String::as_str).unwrap_or("");
            (m.id, format!("{} ({service})", m.nom))
        })
        .collect())
}

async fn competence_links(
    db: &DatabaseConnection,
    template_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, MedobsError> {
    if template_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = template_competences::Entity::find()
        .filter(template_competences::Column::TemplateId.is_in(template_ids.iter().copied()))
        .all(db)
        .await
        .context("load template competence links")?;
    let mut by_template: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        by_template
            .entry(link.template_id)
            .or_default()
            .push(link.competence_id);
    }
    Ok(by_template)
}

// ── Utilisateur repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUtilisateurRepository {
    pub db: DatabaseConnection,
}

impl UtilisateurRepository for DbUtilisateurRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Utilisateur>, MedobsError> {
        let model = utilisateurs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find utilisateur by id")?;
        model.map(utilisateur_from_model).transpose()
    }

    async fn list(
        &self,
        filter: &UtilisateurFilter,
        sort_by: UtilisateurSortBy,
        page: PageRequest,
    ) -> Result<Page<UtilisateurRow>, MedobsError> {
        let mut query = utilisateurs::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any()
                    .add(icontains((utilisateurs::Entity, utilisateurs::Column::Username), t))
                    .add(icontains((utilisateurs::Entity, utilisateurs::Column::FirstName), t))
                    .add(icontains((utilisateurs::Entity, utilisateurs::Column::LastName), t))
                    .add(icontains((utilisateurs::Entity, utilisateurs::Column::Email), t))
            }));
        }
        if let Some(role) = filter.role {
            query = query.filter(utilisateurs::Column::Role.eq(role.as_str()));
        }
        if let Some(service_id) = filter.service_id {
            query = query.filter(utilisateurs::Column::ServiceRattachementId.eq(service_id));
        }
        if let Some(is_staff) = filter.is_staff {
            query = query.filter(utilisateurs::Column::IsStaff.eq(is_staff));
        }
        if let Some(is_superuser) = filter.is_superuser {
            query = query.filter(utilisateurs::Column::IsSuperuser.eq(is_superuser));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(utilisateurs::Column::IsActive.eq(is_active));
        }
        query = match sort_by {
            UtilisateurSortBy::Username(sort) => {
                query.order_by(utilisateurs::Column::Username, order(sort))
            }
            UtilisateurSortBy::DateJoined(sort) => query
                .order_by(utilisateurs::Column::DateJoined, order(sort))
                .order_by_asc(utilisateurs::Column::Id),
        };

        let page = fetch_page(&self.db, query, page)
            .await
            .context("list utilisateurs")?;
        let service_ids: Vec<Uuid> = page
            .items
            .iter()
            .filter_map(|m| m.service_rattachement_id)
            .collect();
        let services = service_names(&self.db, &service_ids).await?;
        page.try_map(|model| {
            let service_rattachement = model
                .service_rattachement_id
                .and_then(|id| services.get(&id).cloned());
            Ok(UtilisateurRow {
                utilisateur: utilisateur_from_model(model)?,
                service_rattachement,
            })
        })
    }

    async fn create(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError> {
        utilisateur_active_model(utilisateur)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::UsernameTaken, "create utilisateur"))?;
        Ok(())
    }

    async fn update(&self, utilisateur: &Utilisateur) -> Result<(), MedobsError> {
        utilisateur_active_model(utilisateur)
            .update(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::UsernameTaken, "update utilisateur"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = utilisateurs::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| protected_or_internal(e, "delete utilisateur"))?;
        Ok(result.rows_affected > 0)
    }
}

fn utilisateur_active_model(u: &Utilisateur) -> utilisateurs::ActiveModel {
    utilisateurs::ActiveModel {
        id: Set(u.id),
        username: Set(u.username.clone()),
        first_name: Set(u.first_name.clone()),
        last_name: Set(u.last_name.clone()),
        email: Set(u.email.clone()),
        role: Set(u.role.as_str().to_owned()),
        service_rattachement_id: Set(u.service_rattachement_id),
        is_staff: Set(u.is_staff),
        is_superuser: Set(u.is_superuser),
        is_active: Set(u.is_active),
        date_joined: Set(u.date_joined),
        last_login: Set(u.last_login),
    }
}

fn utilisateur_from_model(model: utilisateurs::Model) -> Result<Utilisateur, MedobsError> {
    let role = model.role.parse::<Role>().context("stored utilisateur role")?;
    Ok(Utilisateur {
        id: model.id,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        role,
        service_rattachement_id: model.service_rattachement_id,
        is_staff: model.is_staff,
        is_superuser: model.is_superuser,
        is_active: model.is_active,
        date_joined: model.date_joined,
        last_login: model.last_login,
    })
}

// ── Service repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbServiceRepository {
    pub db: DatabaseConnection,
}

impl ServiceRepository for DbServiceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, MedobsError> {
        let model = services::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find service by id")?;
        Ok(model.map(service_from_model))
    }

    async fn list(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Service>, MedobsError> {
        let mut query = services::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any()
                    .add(icontains((services::Entity, services::Column::Nom), t))
                    .add(icontains((services::Entity, services::Column::Description), t))
            }));
        }
        query = match sort_by {
            NomSortBy::Nom(sort) => query.order_by(services::Column::Nom, order(sort)),
            NomSortBy::DateCreation(sort) => query
                .order_by(services::Column::DateCreation, order(sort))
                .order_by_asc(services::Column::Id),
        };
        let page = fetch_page(&self.db, query, page)
            .await
            .context("list services")?;
        Ok(page.map(service_from_model))
    }

    async fn create(&self, service: &Service) -> Result<(), MedobsError> {
        service_active_model(service)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::ServiceNomTaken, "create service"))?;
        Ok(())
    }

    async fn update(&self, service: &Service) -> Result<(), MedobsError> {
        service_active_model(service)
            .update(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::ServiceNomTaken, "update service"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = services::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| protected_or_internal(e, "delete service"))?;
        Ok(result.rows_affected > 0)
    }
}

fn service_active_model(service: &Service) -> services::ActiveModel {
    services::ActiveModel {
        id: Set(service.id),
        nom: Set(service.nom.clone()),
        description: Set(service.description.clone()),
        date_creation: Set(service.date_creation),
    }
}

fn service_from_model(model: services::Model) -> Service {
    Service {
        id: model.id,
        nom: model.nom,
        description: model.description,
        date_creation: model.date_creation,
    }
}

// ── Competence repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCompetenceRepository {
    pub db: DatabaseConnection,
}

impl CompetenceRepository for DbCompetenceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Competence>, MedobsError> {
        let model = competences::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find competence by id")?;
        Ok(model.map(competence_from_model))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Competence>, MedobsError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = competences::Entity::find()
            .filter(competences::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(competences::Column::Nom)
            .all(&self.db)
            .await
            .context("find competences by ids")?;
        Ok(models.into_iter().map(competence_from_model).collect())
    }

    async fn list_all(&self) -> Result<Vec<Competence>, MedobsError> {
        let models = competences::Entity::find()
            .order_by_asc(competences::Column::Nom)
            .all(&self.db)
            .await
            .context("list all competences")?;
        Ok(models.into_iter().map(competence_from_model).collect())
    }

    async fn list(
        &self,
        filter: &SearchFilter,
        sort_by: NomSortBy,
        page: PageRequest,
    ) -> Result<Page<Competence>, MedobsError> {
        let mut query = competences::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any()
                    .add(icontains((competences::Entity, competences::Column::Nom), t))
                    .add(icontains(
                        (competences::Entity, competences::Column::Description),
                        t,
                    ))
            }));
        }
        query = match sort_by {
            NomSortBy::Nom(sort) => query.order_by(competences::Column::Nom, order(sort)),
            NomSortBy::DateCreation(sort) => query
                .order_by(competences::Column::DateCreation, order(sort))
                .order_by_asc(competences::Column::Id),
        };
        let page = fetch_page(&self.db, query, page)
            .await
            .context("list competences")?;
        Ok(page.map(competence_from_model))
    }

    async fn create(&self, competence: &Competence) -> Result<(), MedobsError> {
        competence_active_model(competence)
            .insert(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, MedobsError::CompetenceNomTaken, "create competence")
            })?;
        Ok(())
    }

    async fn update(&self, competence: &Competence) -> Result<(), MedobsError> {
        competence_active_model(competence)
            .update(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, MedobsError::CompetenceNomTaken, "update competence")
            })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = competences::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| protected_or_internal(e, "delete competence"))?;
        Ok(result.rows_affected > 0)
    }
}

fn competence_active_model(competence: &Competence) -> competences::ActiveModel {
    competences::ActiveModel {
        id: Set(competence.id),
        nom: Set(competence.nom.clone()),
        description: Set(competence.description.clone()),
        date_creation: Set(competence.date_creation),
    }
}

fn competence_from_model(model: competences::Model) -> Competence {
    Competence {
        id: model.id,
        nom: model.nom,
        description: model.description,
        date_creation: model.date_creation,
    }
}

// ── Template repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTemplateRepository {
    pub db: DatabaseConnection,
}

impl TemplateRepository for DbTemplateRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TemplateObservation>, MedobsError> {
        let Some(model) = templates_observation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find template by id")?
        else {
            return Ok(None);
        };
        let mut links = competence_links(&self.db, &[id]).await?;
        let competences = links.remove(&id).unwrap_or_default();
        Ok(Some(template_from_model(model, competences)))
    }

    async fn list(
        &self,
        filter: &TemplateFilter,
        sort_by: TemplateSortBy,
        page: PageRequest,
    ) -> Result<Page<TemplateRow>, MedobsError> {
        let mut query = templates_observation::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any()
                    .add(icontains(
                        (templates_observation::Entity, templates_observation::Column::Nom),
                        t,
                    ))
                    .add(
                        templates_observation::Column::ServiceId.in_subquery(
                            Query::select()
                                .column(services::Column::Id)
                                .from(services::Entity)
                                .and_where(icontains((services::Entity, services::Column::Nom), t))
                                .to_owned(),
                        ),
                    )
            }));
        }
        if let Some(service_id) = filter.service_id {
            query = query.filter(templates_observation::Column::ServiceId.eq(service_id));
        }
        if let Some(actif) = filter.actif {
            query = query.filter(templates_observation::Column::Actif.eq(actif));
        }
        if let Some(range) = filter.date_creation {
            query = query
                .filter(templates_observation::Column::DateCreation.gte(range.start))
                .filter(templates_observation::Column::DateCreation.lt(range.end));
        }
        query = match sort_by {
            TemplateSortBy::DateCreation(sort) => {
                query.order_by(templates_observation::Column::DateCreation, order(sort))
            }
            TemplateSortBy::Nom(sort) => {
                query.order_by(templates_observation::Column::Nom, order(sort))
            }
        }
        .order_by_asc(templates_observation::Column::Id);

        let page = fetch_page(&self.db, query, page)
            .await
            .context("list templates")?;
        let template_ids: Vec<Uuid> = page.items.iter().map(|m| m.id).collect();
        let service_ids: Vec<Uuid> = page.items.iter().map(|m| m.service_id).collect();
        let author_ids: Vec<Uuid> = page.items.iter().filter_map(|m| m.cree_par_id).collect();
        let mut links = competence_links(&self.db, &template_ids).await?;
        let services = service_names(&self.db, &service_ids).await?;
        let authors = utilisateurs_by_id(&self.db, &author_ids).await?;

        Ok(page.map(|model| {
            let service = services.get(&model.service_id).cloned().unwrap_or_default();
            let cree_par = model
                .cree_par_id
                .and_then(|id| authors.get(&id))
                .map(Utilisateur::display_name);
            let competences = links.remove(&model.id).unwrap_or_default();
            TemplateRow {
                template: template_from_model(model, competences),
                service,
                cree_par,
            }
        }))
    }

    async fn create(&self, template: &TemplateObservation) -> Result<(), MedobsError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let template = template.clone();
                Box::pin(async move {
                    template_active_model(&template).insert(txn).await?;
                    insert_competence_links(txn, template.id, &template.competences_evaluees)
                        .await
                })
            })
            .await
            .map_err(|e| internal(flatten_transaction_err(e), "create template"))?;
        Ok(())
    }

    async fn update(&self, template: &TemplateObservation) -> Result<(), MedobsError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let template = template.clone();
                Box::pin(async move {
                    template_active_model(&template).update(txn).await?;
                    template_competences::Entity::delete_many()
                        .filter(template_competences::Column::TemplateId.eq(template.id))
                        .exec(txn)
                        .await?;
                    insert_competence_links(txn, template.id, &template.competences_evaluees)
                        .await
                })
            })
            .await
            .map_err(|e| internal(flatten_transaction_err(e), "update template"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = templates_observation::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| protected_or_internal(e, "delete template"))?;
        Ok(result.rows_affected > 0)
    }

    async fn count_observations(&self, id: Uuid) -> Result<u64, MedobsError> {
        let count = observations::Entity::find()
            .filter(observations::Column::TemplateId.eq(id))
            .count(&self.db)
            .await
            .context("count template observations")?;
        Ok(count)
    }
}

async fn insert_competence_links(
    txn: &DatabaseTransaction,
    template_id: Uuid,
    competence_ids: &[Uuid],
) -> Result<(), DbErr> {
    if competence_ids.is_empty() {
        return Ok(());
    }
    let links = competence_ids
        .iter()
        .map(|&competence_id| template_competences::ActiveModel {
            template_id: Set(template_id),
            competence_id: Set(competence_id),
        });
    template_competences::Entity::insert_many(links)
        .exec(txn)
        .await?;
    Ok(())
}

fn template_active_model(template: &TemplateObservation) -> templates_observation::ActiveModel {
    templates_observation::ActiveModel {
        id: Set(template.id),
        nom: Set(template.nom.clone()),
        service_id: Set(template.service_id),
        cree_par_id: Set(template.cree_par_id),
        structure: Set(template.structure.clone()),
        date_creation: Set(template.date_creation),
        actif: Set(template.actif),
    }
}

fn template_from_model(
    model: templates_observation::Model,
    competences_evaluees: Vec<Uuid>,
) -> TemplateObservation {
    TemplateObservation {
        id: model.id,
        nom: model.nom,
        service_id: model.service_id,
        cree_par_id: model.cree_par_id,
        structure: model.structure,
        competences_evaluees,
        actif: model.actif,
        date_creation: model.date_creation,
    }
}

// ── Observation repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbObservationRepository {
    pub db: DatabaseConnection,
}

impl ObservationRepository for DbObservationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Observation>, MedobsError> {
        let model = observations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find observation by id")?;
        model.map(observation_from_model).transpose()
    }

    async fn list(
        &self,
        filter: &ObservationFilter,
        sort_by: ObservationSortBy,
        page: PageRequest,
    ) -> Result<Page<ObservationRow>, MedobsError> {
        let mut query = observations::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any().add(
                    observations::Column::EtudiantId.in_subquery(
                        Query::select()
                            .column(utilisateurs::Column::Id)
                            .from(utilisateurs::Entity)
                            .cond_where(
                                Condition::any()
                                    .add(icontains(
                                        (utilisateurs::Entity, utilisateurs::Column::Username),
                                        t,
                                    ))
                                    .add(icontains(
                                        (utilisateurs::Entity, utilisateurs::Column::FirstName),
                                        t,
                                    ))
                                    .add(icontains(
                                        (utilisateurs::Entity, utilisateurs::Column::LastName),
                                        t,
                                    )),
                            )
                            .to_owned(),
                    ),
                )
            }));
        }
        if let Some(statut) = filter.statut {
            query = query.filter(observations::Column::Statut.eq(statut.as_str()));
        }
        if let Some(service_id) = filter.service_id {
            query = query.filter(
                observations::Column::TemplateId.in_subquery(
                    Query::select()
                        .column(templates_observation::Column::Id)
                        .from(templates_observation::Entity)
                        .and_where(templates_observation::Column::ServiceId.eq(service_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(range) = filter.date_creation {
            query = query
                .filter(observations::Column::DateCreation.gte(range.start))
                .filter(observations::Column::DateCreation.lt(range.end));
        }
        query = match sort_by {
            ObservationSortBy::DateCreation(sort) => {
                query.order_by(observations::Column::DateCreation, order(sort))
            }
            ObservationSortBy::DateSoumission(sort) => {
                query.order_by(observations::Column::DateSoumission, order(sort))
            }
        }
        .order_by_asc(observations::Column::Id);

        let page = fetch_page(&self.db, query, page)
            .await
            .context("list observations")?;
        let etudiant_ids: Vec<Uuid> = page.items.iter().map(|m| m.etudiant_id).collect();
        let template_ids: Vec<Uuid> = page.items.iter().map(|m| m.template_id).collect();
        let etudiants = utilisateurs_by_id(&self.db, &etudiant_ids).await?;
        let templates = template_labels(&self.db, &template_ids).await?;

        page.try_map(|model| {
            let observation = observation_from_model(model)?;
            let (etudiant_username, etudiant) = etudiants
                .get(&observation.etudiant_id)
                .map(|u| (u.username.clone(), u.display_name()))
                .unwrap_or_default();
            let template = templates
                .get(&observation.template_id)
                .cloned()
                .unwrap_or_default();
            Ok(ObservationRow {
                observation,
                etudiant_username,
                etudiant,
                template,
            })
        })
    }

    async fn create(&self, observation: &Observation) -> Result<(), MedobsError> {
        observation_active_model(observation)
            .insert(&self.db)
            .await
            .context("create observation")?;
        Ok(())
    }

    async fn update(&self, observation: &Observation) -> Result<(), MedobsError> {
        observation_active_model(observation)
            .update(&self.db)
            .await
            .context("update observation")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = observations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| protected_or_internal(e, "delete observation"))?;
        Ok(result.rows_affected > 0)
    }
}

fn observation_active_model(observation: &Observation) -> observations::ActiveModel {
    observations::ActiveModel {
        id: Set(observation.id),
        etudiant_id: Set(observation.etudiant_id),
        template_id: Set(observation.template_id),
        statut: Set(observation.statut.as_str().to_owned()),
        donnees: Set(observation.donnees.clone()),
        date_creation: Set(observation.date_creation),
        date_modification: Set(observation.date_modification),
        date_soumission: Set(observation.date_soumission),
    }
}

fn observation_from_model(model: observations::Model) -> Result<Observation, MedobsError> {
    let statut = model.statut.parse::<Statut>().context("stored observation statut")?;
    Ok(Observation {
        id: model.id,
        etudiant_id: model.etudiant_id,
        template_id: model.template_id,
        statut,
        donnees: model.donnees,
        date_creation: model.date_creation,
        date_modification: model.date_modification,
        date_soumission: model.date_soumission,
    })
}

// ── Fichier repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFichierRepository {
    pub db: DatabaseConnection,
}

impl FichierRepository for DbFichierRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FichierMedia>, MedobsError> {
        let model = fichiers_media::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find fichier by id")?;
        Ok(model.map(fichier_from_model))
    }

    async fn list_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Vec<FichierMedia>, MedobsError> {
        let models = fichiers_media::Entity::find()
            .filter(fichiers_media::Column::ObservationId.eq(observation_id))
            .order_by_asc(fichiers_media::Column::DateUpload)
            .order_by_asc(fichiers_media::Column::Id)
            .all(&self.db)
            .await
            .context("list fichiers by observation")?;
        Ok(models.into_iter().map(fichier_from_model).collect())
    }

    async fn create(&self, fichier: &FichierMedia) -> Result<(), MedobsError> {
        fichier_active_model(fichier)
            .insert(&self.db)
            .await
            .context("create fichier")?;
        Ok(())
    }

    async fn update(&self, fichier: &FichierMedia) -> Result<(), MedobsError> {
        fichier_active_model(fichier)
            .update(&self.db)
            .await
            .context("update fichier")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = fichiers_media::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete fichier")?;
        Ok(result.rows_affected > 0)
    }
}

fn fichier_active_model(fichier: &FichierMedia) -> fichiers_media::ActiveModel {
    fichiers_media::ActiveModel {
        id: Set(fichier.id),
        observation_id: Set(fichier.observation_id),
        fichier: Set(fichier.fichier.clone()),
        legende: Set(fichier.legende.clone()),
        date_upload: Set(fichier.date_upload),
    }
}

fn fichier_from_model(model: fichiers_media::Model) -> FichierMedia {
    FichierMedia {
        id: model.id,
        observation_id: model.observation_id,
        fichier: model.fichier,
        legende: model.legende,
        date_upload: model.date_upload,
    }
}

// ── Evaluation repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEvaluationRepository {
    pub db: DatabaseConnection,
}

impl EvaluationRepository for DbEvaluationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Evaluation>, MedobsError> {
        let model = evaluations::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find evaluation by id")?;
        Ok(model.map(evaluation_from_model))
    }

    async fn find_by_observation(
        &self,
        observation_id: Uuid,
    ) -> Result<Option<Evaluation>, MedobsError> {
        let model = evaluations::Entity::find()
            .filter(evaluations::Column::ObservationId.eq(observation_id))
            .one(&self.db)
            .await
            .context("find evaluation by observation")?;
        Ok(model.map(evaluation_from_model))
    }

    async fn list(
        &self,
        filter: &EvaluationFilter,
        sort_by: EvaluationSortBy,
        page: PageRequest,
    ) -> Result<Page<EvaluationRow>, MedobsError> {
        let username_matches = |t: &str| {
            Query::select()
                .column(utilisateurs::Column::Id)
                .from(utilisateurs::Entity)
                .and_where(icontains(
                    (utilisateurs::Entity, utilisateurs::Column::Username),
                    t,
                ))
                .to_owned()
        };
        let mut query = evaluations::Entity::find();
        if !filter.terms.is_empty() {
            query = query.filter(all_terms(&filter.terms, |t| {
                Condition::any()
                    .add(
                        evaluations::Column::ObservationId.in_subquery(
                            Query::select()
                                .column(observations::Column::Id)
                                .from(observations::Entity)
                                .and_where(
                                    observations::Column::EtudiantId
                                        .in_subquery(username_matches(t)),
                                )
                                .to_owned(),
                        ),
                    )
                    .add(evaluations::Column::ProfesseurId.in_subquery(username_matches(t)))
            }));
        }
        if let Some(professeur_id) = filter.professeur_id {
            query = query.filter(evaluations::Column::ProfesseurId.eq(professeur_id));
        }
        if let Some(range) = filter.date_evaluation {
            query = query
                .filter(evaluations::Column::DateEvaluation.gte(range.start))
                .filter(evaluations::Column::DateEvaluation.lt(range.end));
        }
        query = match sort_by {
            EvaluationSortBy::DateEvaluation(sort) => {
                query.order_by(evaluations::Column::DateEvaluation, order(sort))
            }
        }
        .order_by_asc(evaluations::Column::Id);

        let page = fetch_page(&self.db, query, page)
            .await
            .context("list evaluations")?;
        let observation_ids: Vec<Uuid> = page.items.iter().map(|m| m.observation_id).collect();
        let observations = if observation_ids.is_empty() {
            vec![]
        } else {
            observations::Entity::find()
                .filter(observations::Column::Id.is_in(observation_ids))
                .all(&self.db)
                .await
                .context("load evaluated observations")?
        };
        let user_ids: Vec<Uuid> = observations
            .iter()
            .map(|o| o.etudiant_id)
            .chain(page.items.iter().filter_map(|m| m.professeur_id))
            .collect();
        let users = utilisateurs_by_id(&self.db, &user_ids).await?;
        let observation_labels: HashMap<Uuid, String> = observations
            .into_iter()
            .map(|o| {
                let username = users
                    .get(&o.etudiant_id)
                    .map(|u| u.username.as_str())
                    .unwrap_or("");
                (o.id, format!("Observation #{} de {username}", o.id))
            })
            .collect();

        Ok(page.map(|model| {
            let observation = observation_labels
                .get(&model.observation_id)
                .cloned()
                .unwrap_or_default();
            let professeur = model
                .professeur_id
                .and_then(|id| users.get(&id))
                .map(Utilisateur::display_name);
            EvaluationRow {
                evaluation: evaluation_from_model(model),
                observation,
                professeur,
            }
        }))
    }

    async fn create(&self, evaluation: &Evaluation) -> Result<(), MedobsError> {
        evaluation_active_model(evaluation)
            .insert(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, MedobsError::EvaluationAlreadyExists, "create evaluation")
            })?;
        Ok(())
    }

    async fn update(&self, evaluation: &Evaluation) -> Result<(), MedobsError> {
        evaluation_active_model(evaluation)
            .update(&self.db)
            .await
            .map_err(|e| {
                conflict_or_internal(e, MedobsError::EvaluationAlreadyExists, "update evaluation")
            })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = evaluations::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete evaluation")?;
        Ok(result.rows_affected > 0)
    }
}

fn evaluation_active_model(evaluation: &Evaluation) -> evaluations::ActiveModel {
    evaluations::ActiveModel {
        id: Set(evaluation.id),
        observation_id: Set(evaluation.observation_id),
        professeur_id: Set(evaluation.professeur_id),
        commentaires_generaux: Set(evaluation.commentaires_generaux.clone()),
        date_evaluation: Set(evaluation.date_evaluation),
    }
}

fn evaluation_from_model(model: evaluations::Model) -> Evaluation {
    Evaluation {
        id: model.id,
        observation_id: model.observation_id,
        professeur_id: model.professeur_id,
        commentaires_generaux: model.commentaires_generaux,
        date_evaluation: model.date_evaluation,
    }
}

// ── Note repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbNoteRepository {
    pub db: DatabaseConnection,
}

impl NoteRepository for DbNoteRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EvaluationCompetence>, MedobsError> {
        let model = evaluation_competences::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find note by id")?;
        model.map(note_from_model).transpose()
    }

    async fn list_by_evaluation(&self, evaluation_id: Uuid) -> Result<Vec<NoteRow>, MedobsError> {
        let rows = evaluation_competences::Entity::find()
            .filter(evaluation_competences::Column::EvaluationId.eq(evaluation_id))
            .find_also_related(competences::Entity)
            .order_by_asc(competences::Column::Nom)
            .all(&self.db)
            .await
            .context("list notes by evaluation")?;
        rows.into_iter()
            .map(|(model, competence)| {
                Ok::<_, MedobsError>(NoteRow {
                    note: note_from_model(model)?,
                    competence: competence.map(|c| c.nom).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn create(&self, note: &EvaluationCompetence) -> Result<(), MedobsError> {
        note_active_model(note)
            .insert(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::NoteAlreadyExists, "create note"))?;
        Ok(())
    }

    async fn update(&self, note: &EvaluationCompetence) -> Result<(), MedobsError> {
        note_active_model(note)
            .update(&self.db)
            .await
            .map_err(|e| conflict_or_internal(e, MedobsError::NoteAlreadyExists, "update note"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, MedobsError> {
        let result = evaluation_competences::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete note")?;
        Ok(result.rows_affected > 0)
    }
}

fn note_active_model(note: &EvaluationCompetence) -> evaluation_competences::ActiveModel {
    evaluation_competences::ActiveModel {
        id: Set(note.id),
        evaluation_id: Set(note.evaluation_id),
        competence_id: Set(note.competence_id),
        note: Set(i16::from(note.note.value())),
        commentaire_specifique: Set(note.commentaire_specifique.clone()),
    }
}

fn note_from_model(model: evaluation_competences::Model) -> Result<EvaluationCompetence, MedobsError> {
    let note = Note::new(i32::from(model.note)).context("stored note")?;
    Ok(EvaluationCompetence {
        id: model.id,
        evaluation_id: model.evaluation_id,
        competence_id: model.competence_id,
        note,
        commentaire_specifique: model.commentaire_specifique,
    })
}
