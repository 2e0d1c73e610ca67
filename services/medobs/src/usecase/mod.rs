pub mod competence;
pub mod evaluation;
pub mod fichier;
pub mod observation;
pub mod service;
pub mod template;
pub mod utilisateur;

#[cfg(test)]
mod mock;

use uuid::Uuid;

use medobs_domain::user::Role;

use crate::domain::repository::UtilisateurRepository;
use crate::domain::types::Utilisateur;
use crate::error::MedobsError;

/// Load the account referenced by `field` and check it has `role`.
async fn require_role<U: UtilisateurRepository>(
    utilisateurs: &U,
    id: Uuid,
    role: Role,
    field: &str,
) -> Result<Utilisateur, MedobsError> {
    let utilisateur = utilisateurs
        .find_by_id(id)
        .await?
        .ok_or(MedobsError::UtilisateurNotFound)?;
    if utilisateur.role != role {
        return Err(MedobsError::InvalidChoice(format!(
            "{field} must be a {role}"
        )));
    }
    Ok(utilisateur)
}
