//! Listes noire et blanche et journalisation manuelle des menaces
//!
//! Les deux listes sont des ensembles d'appartenance indépendants :
//! aucune exclusion mutuelle n'est imposée, une source présente dans les
//! deux est autorisée puisque la liste blanche est vérifiée en premier
//! dans `scan_packet`.

use super::FirewallEngine;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::ThreatLevel;
use log::{info, warn};

impl FirewallEngine {
    /// Met une source en liste noire manuellement
    ///
    /// Le contrat de référence incrémente ici le même compteur
    /// `auto_blocked_ips` que le blocage automatique ; cette bizarrerie
    /// est préservée, les deux compteurs restent indépendants.
    pub fn blacklist_ip(&mut self, caller: &str, source: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.blacklist.insert(source.to_string());
        self.stats.auto_blocked_ips += 1;
        self.touch_stats();
        warn!("{} mise en liste noire par {}", source, caller);
        self.emit(EngineEvent::Blacklisted {
            source: source.to_string(),
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Retire une source de la liste noire
    pub fn remove_from_blacklist(&mut self, caller: &str, source: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.blacklist.remove(source);
        self.touch_stats();
        info!("{} retirée de la liste noire par {}", source, caller);
        self.emit(EngineEvent::BlacklistRemoved {
            source: source.to_string(),
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Met une source en liste blanche (jamais scorée, jamais bloquée)
    pub fn whitelist_ip(&mut self, caller: &str, source: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.whitelist.insert(source.to_string());
        self.touch_stats();
        info!("{} mise en liste blanche par {}", source, caller);
        self.emit(EngineEvent::Whitelisted {
            source: source.to_string(),
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Retire une source de la liste blanche
    pub fn remove_from_whitelist(&mut self, caller: &str, source: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.whitelist.remove(source);
        self.touch_stats();
        info!("{} retirée de la liste blanche par {}", source, caller);
        self.emit(EngineEvent::WhitelistRemoved {
            source: source.to_string(),
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Vérifie l'appartenance à la liste noire (lecture publique)
    pub fn is_blacklisted(&self, source: &str) -> bool {
        self.blacklist.contains(source)
    }

    /// Vérifie l'appartenance à la liste blanche (lecture publique)
    pub fn is_whitelisted(&self, source: &str) -> bool {
        self.whitelist.contains(source)
    }

    /// Instantané trié de la liste noire
    pub fn blacklisted_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.blacklist.iter().cloned().collect();
        sources.sort();
        sources
    }

    /// Instantané trié de la liste blanche
    pub fn whitelisted_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.whitelist.iter().cloned().collect();
        sources.sort();
        sources
    }

    /// Journalise une menace signalée par un administrateur
    ///
    /// Retourne l'identifiant de l'entrée créée. Si `should_block` est
    /// vrai, la source est mise en liste noire et `threats_blocked` est
    /// incrémenté, sinon `alerts_triggered` l'est.
    pub fn log_manual_threat(
        &mut self,
        caller: &str,
        source: &str,
        attack_type: &str,
        level: ThreatLevel,
        description: &str,
        should_block: bool,
    ) -> Result<u64, EngineError> {
        self.access.require_admin(caller)?;

        if should_block {
            self.blacklist.insert(source.to_string());
            self.stats.threats_blocked += 1;
        } else {
            self.stats.alerts_triggered += 1;
        }
        self.touch_stats();

        let connection_attempts = self
            .traffic
            .get(source)
            .map(|t| t.connection_count)
            .unwrap_or(0);

        let log_id = self.append_threat(
            source,
            attack_type.to_string(),
            level,
            description.to_string(),
            should_block,
            connection_attempts,
        );

        warn!(
            "Menace #{} [{}] signalée par {} depuis {}{}",
            log_id,
            level.as_str(),
            caller,
            source,
            if should_block { " (bloquée)" } else { "" }
        );

        self.emit(EngineEvent::ThreatDetected {
            log_id,
            source: source.to_string(),
            level,
            is_blocked: should_block,
        });
        if should_block {
            self.emit(EngineEvent::Blacklisted {
                source: source.to_string(),
                by: caller.to_string(),
            });
        }

        Ok(log_id)
    }
}
