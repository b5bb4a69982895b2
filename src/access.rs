//! Contrôle d'accès du moteur
//!
//! Deux niveaux de capacité : un propriétaire unique fixé à la
//! construction (le transfert de propriété n'est pas implémenté) et un
//! ensemble mutable d'administrateurs. Le propriétaire est toujours
//! implicitement administrateur et ne peut pas perdre ce statut.

use crate::error::EngineError;
use std::collections::HashSet;

pub struct AccessControl {
    owner: String,
    admins: HashSet<String>,
}

impl AccessControl {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            admins: HashSet::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        identity == self.owner
    }

    /// Vérifie si une identité est administrateur (lecture publique)
    pub fn is_admin(&self, identity: &str) -> bool {
        self.is_owner(identity) || self.admins.contains(identity)
    }

    /// Garde explicite : l'appelant doit être le propriétaire
    pub fn require_owner(&self, caller: &str) -> Result<(), EngineError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(EngineError::unauthorized(caller, "Owner"))
        }
    }

    /// Garde explicite : l'appelant doit être au moins administrateur
    pub fn require_admin(&self, caller: &str) -> Result<(), EngineError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(EngineError::unauthorized(caller, "Admin"))
        }
    }

    /// Accorde le rôle administrateur à une identité (propriétaire seul)
    pub fn add_admin(&mut self, caller: &str, identity: &str) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        if identity.trim().is_empty() {
            return Err(EngineError::InvalidArgument(
                "l'identité d'un administrateur ne peut pas être vide",
            ));
        }
        self.admins.insert(identity.to_string());
        Ok(())
    }

    /// Retire le rôle administrateur (propriétaire seul)
    ///
    /// Le statut d'administrateur du propriétaire est permanent.
    pub fn remove_admin(&mut self, caller: &str, identity: &str) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        if self.is_owner(identity) {
            return Err(EngineError::InvalidState(
                "le propriétaire ne peut pas perdre son statut d'administrateur",
            ));
        }
        self.admins.remove(identity);
        Ok(())
    }
}
