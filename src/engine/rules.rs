//! Catalogue de règles déclaratives
//!
//! Les identifiants partent de 1 et ne sont jamais réutilisés : la
//! suppression retire l'enregistrement sans décrémenter le compteur.
//! La vérification de borne (`id == 0` ou au-delà du dernier identifiant
//! émis) reproduit celle du contrat de référence : une mise à jour ou une
//! suppression visant un identifiant déjà supprimé mais dans la plage est
//! un no-op silencieux, seule la lecture distingue ce cas par `NotFound`.

use super::FirewallEngine;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::{FirewallRule, RuleSpec};
use log::info;

impl FirewallEngine {
    /// Crée une règle et retourne son identifiant
    ///
    /// Aucune détection de doublon : plusieurs règles identiques sont
    /// permises, comme dans le contrat de référence.
    pub fn create_rule(&mut self, caller: &str, spec: RuleSpec) -> Result<u64, EngineError> {
        self.access.require_admin(caller)?;

        self.rule_counter += 1;
        let id = self.rule_counter;
        let now = self.now();

        let rule = FirewallRule {
            id,
            name: spec.name.clone(),
            source_pattern: spec.source_pattern,
            destination_pattern: spec.destination_pattern,
            source_port: spec.source_port,
            destination_port: spec.destination_port,
            protocol: spec.protocol,
            action: spec.action,
            priority: spec.priority,
            is_active: true,
            created_at: now,
            created_by: caller.to_string(),
        };
        self.rules.insert(id, rule);
        self.touch_stats();

        info!("Règle #{} '{}' créée par {}", id, spec.name, caller);
        self.emit(EngineEvent::RuleCreated {
            id,
            name: spec.name,
            by: caller.to_string(),
        });

        Ok(id)
    }

    /// Active ou désactive une règle
    pub fn update_rule_status(
        &mut self,
        caller: &str,
        id: u64,
        is_active: bool,
    ) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.check_rule_bounds(id)?;

        // Un identifiant supprimé mais dans la plage passe la borne et
        // ne modifie rien (sémantique de mapping du contrat)
        if let Some(rule) = self.rules.get_mut(&id) {
            rule.is_active = is_active;
            self.touch_stats();
            info!(
                "Règle #{} {}",
                id,
                if is_active { "activée" } else { "désactivée" }
            );
            self.emit(EngineEvent::RuleStatusUpdated { id, is_active });
        }

        Ok(())
    }

    /// Supprime une règle ; son identifiant n'est jamais réémis
    pub fn delete_rule(&mut self, caller: &str, id: u64) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.check_rule_bounds(id)?;

        if self.rules.remove(&id).is_some() {
            self.touch_stats();
            info!("Règle #{} supprimée par {}", id, caller);
            self.emit(EngineEvent::RuleDeleted { id });
        }

        Ok(())
    }

    /// Lit une règle (lecture publique, instantané possédé)
    pub fn rule(&self, id: u64) -> Result<FirewallRule, EngineError> {
        self.check_rule_bounds(id)?;
        self.rules
            .get(&id)
            .cloned()
            .ok_or(EngineError::not_found("règle", id))
    }

    /// Liste des règles existantes, triées par identifiant
    pub fn rules(&self) -> Vec<FirewallRule> {
        let mut rules: Vec<FirewallRule> = self.rules.values().cloned().collect();
        rules.sort_by_key(|r| r.id);
        rules
    }

    fn check_rule_bounds(&self, id: u64) -> Result<(), EngineError> {
        if id == 0 || id > self.rule_counter {
            return Err(EngineError::not_found("règle", id));
        }
        Ok(())
    }
}
