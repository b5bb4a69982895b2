//! Moteur de pare-feu auto-détectant
//!
//! Le moteur possède l'intégralité de l'état (règles, traqueur de trafic,
//! listes noire et blanche, journal des menaces, statistiques) comme un
//! unique domaine de cohérence. Chaque opération mutante prend `&mut self`
//! et s'applique entièrement ou pas du tout : les gardes sont évaluées
//! avant la première mutation. Les hôtes l'enveloppent dans un
//! `Arc<RwLock<FirewallEngine>>` pour sérialiser les écritures, les
//! lectures renvoient des instantanés possédés.

mod lists;
mod rules;
mod scan;

pub use scan::AUTO_DETECTED_ATTACK;

use crate::access::AccessControl;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::{
    FirewallRule, IpTraffic, NetworkStats, SystemStatus, ThreatLogEntry,
};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct FirewallEngine {
    /// Contrôle d'accès (propriétaire + administrateurs)
    access: AccessControl,
    /// Catalogue de règles déclaratives, indexé par identifiant
    rules: HashMap<u64, FirewallRule>,
    /// Dernier identifiant de règle émis, jamais décrémenté
    rule_counter: u64,
    /// Journal des menaces, append-only, identifiants 1-indexés
    threat_log: Vec<ThreatLogEntry>,
    /// Traqueur de trafic par identifiant source
    traffic: HashMap<String, IpTraffic>,
    /// Liste noire (appartenance booléenne)
    blacklist: HashSet<String>,
    /// Liste blanche, prioritaire sur la liste noire et sur le scoring
    whitelist: HashSet<String>,
    /// Statistiques globales
    stats: NetworkStats,
    /// État de fonctionnement du système
    running: bool,
    /// Détection automatique armée ou non, orthogonale à `running`
    auto_detection: bool,
    max_connections_per_minute: u64,
    suspicion_threshold: u64,
    auto_block_threshold: u64,
    /// Canal de notification des abonnés
    event_tx: Option<mpsc::Sender<EngineEvent>>,
    clock: Arc<dyn Clock>,
}

impl FirewallEngine {
    /// Crée un moteur arrêté avec les seuils par défaut du contrat
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            access: AccessControl::new(owner),
            rules: HashMap::new(),
            rule_counter: 0,
            threat_log: Vec::new(),
            traffic: HashMap::new(),
            blacklist: HashSet::new(),
            whitelist: HashSet::new(),
            stats: NetworkStats::default(),
            running: false,
            auto_detection: true,
            max_connections_per_minute: 100,
            suspicion_threshold: 500,
            auto_block_threshold: 1000,
            event_tx: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Crée un moteur à partir d'une configuration chargée
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut engine = Self::new(config.owner.clone());
        engine.max_connections_per_minute = config.max_connections_per_minute;
        engine.suspicion_threshold = config.suspicion_threshold;
        engine.auto_block_threshold = config.auto_block_threshold;
        engine.auto_detection = config.auto_detection;
        engine
    }

    /// Branche le canal d'événements
    pub fn with_events(mut self, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Remplace l'horloge système (tests, simulation déterministe)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ----- Machine d'état du système -----

    /// Démarre le système de détection
    pub fn start_system(&mut self, caller: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        if self.running {
            return Err(EngineError::InvalidState("le système est déjà démarré"));
        }
        self.running = true;
        info!("Système démarré par {}", caller);
        self.emit(EngineEvent::SystemStarted {
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Arrête le système de détection
    pub fn stop_system(&mut self, caller: &str) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        if !self.running {
            return Err(EngineError::InvalidState("le système est déjà arrêté"));
        }
        self.running = false;
        info!("Système arrêté par {}", caller);
        self.emit(EngineEvent::SystemStopped {
            by: caller.to_string(),
        });
        Ok(())
    }

    /// Active le bloc de scoring de `scan_packet`
    pub fn enable_auto_detection(&mut self, caller: &str) -> Result<(), EngineError> {
        self.set_auto_detection(caller, true)
    }

    /// Désactive le scoring ; les paquets restent comptés et les listes
    /// noire et blanche continuent de s'appliquer
    pub fn disable_auto_detection(&mut self, caller: &str) -> Result<(), EngineError> {
        self.set_auto_detection(caller, false)
    }

    fn set_auto_detection(&mut self, caller: &str, enabled: bool) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.auto_detection = enabled;
        info!(
            "Détection automatique {} par {}",
            if enabled { "activée" } else { "désactivée" },
            caller
        );
        self.emit(EngineEvent::AutoDetectionToggled {
            enabled,
            by: caller.to_string(),
        });
        Ok(())
    }

    // ----- Seuils de configuration -----

    /// Met à jour le seuil de connexions par minute
    pub fn update_max_connections(&mut self, caller: &str, value: u64) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.max_connections_per_minute = value;
        self.emit(EngineEvent::ThresholdUpdated {
            name: "max_connections_per_minute".to_string(),
            value,
        });
        Ok(())
    }

    /// Met à jour le seuil d'alerte
    pub fn update_suspicion_threshold(
        &mut self,
        caller: &str,
        value: u64,
    ) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.suspicion_threshold = value;
        if value > self.auto_block_threshold {
            warn!(
                "Seuil de suspicion {} au-delà du seuil de blocage {}: la branche alerte devient inatteignable",
                value, self.auto_block_threshold
            );
        }
        self.emit(EngineEvent::ThresholdUpdated {
            name: "suspicion_threshold".to_string(),
            value,
        });
        Ok(())
    }

    /// Met à jour le seuil de blocage automatique
    pub fn update_auto_block_threshold(
        &mut self,
        caller: &str,
        value: u64,
    ) -> Result<(), EngineError> {
        self.access.require_admin(caller)?;
        self.auto_block_threshold = value;
        self.emit(EngineEvent::ThresholdUpdated {
            name: "auto_block_threshold".to_string(),
            value,
        });
        Ok(())
    }

    // ----- Rôles -----

    /// Accorde le rôle administrateur (propriétaire seul)
    pub fn add_admin(&mut self, caller: &str, identity: &str) -> Result<(), EngineError> {
        self.access.add_admin(caller, identity)?;
        info!("Administrateur {} ajouté par {}", identity, caller);
        self.emit(EngineEvent::AdminAdded {
            identity: identity.to_string(),
        });
        Ok(())
    }

    /// Retire le rôle administrateur (propriétaire seul)
    pub fn remove_admin(&mut self, caller: &str, identity: &str) -> Result<(), EngineError> {
        self.access.remove_admin(caller, identity)?;
        info!("Administrateur {} retiré par {}", identity, caller);
        self.emit(EngineEvent::AdminRemoved {
            identity: identity.to_string(),
        });
        Ok(())
    }

    /// Vérifie si une identité est administrateur (lecture publique)
    pub fn is_admin(&self, identity: &str) -> bool {
        self.access.is_admin(identity)
    }

    pub fn owner(&self) -> &str {
        self.access.owner()
    }

    // ----- Lectures publiques -----

    /// Statistiques globales (instantané possédé)
    pub fn network_stats(&self) -> NetworkStats {
        self.stats.clone()
    }

    /// Suivi du trafic d'une source
    ///
    /// Une source inconnue renvoie un enregistrement à zéro plutôt qu'une
    /// erreur : c'est le comportement "soft miss" du contrat de référence,
    /// distinct du `NotFound` des règles et du journal.
    pub fn ip_traffic(&self, source: &str) -> IpTraffic {
        self.traffic.get(source).cloned().unwrap_or_default()
    }

    /// Entrée du journal des menaces par identifiant
    pub fn threat_entry(&self, id: u64) -> Result<ThreatLogEntry, EngineError> {
        if id == 0 || id > self.threat_log.len() as u64 {
            return Err(EngineError::not_found("entrée de journal", id));
        }
        Ok(self.threat_log[(id - 1) as usize].clone())
    }

    /// Nombre d'entrées du journal des menaces
    pub fn threat_count(&self) -> u64 {
        self.threat_log.len() as u64
    }

    /// Nombre d'identifiants de règle émis (les suppressions ne le réduisent pas)
    pub fn rule_count(&self) -> u64 {
        self.rule_counter
    }

    /// Instantané de l'état du système
    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            running: self.running,
            auto_detection: self.auto_detection,
            max_connections_per_minute: self.max_connections_per_minute,
            suspicion_threshold: self.suspicion_threshold,
            auto_block_threshold: self.auto_block_threshold,
            rule_count: self.rule_counter,
            threat_count: self.threat_log.len() as u64,
        }
    }

    // ----- Mécanique interne -----

    /// Horodatage courant en secondes Unix
    pub(crate) fn now(&self) -> u64 {
        self.clock.now_secs()
    }

    /// Ajoute une entrée au journal des menaces et retourne son identifiant
    pub(crate) fn append_threat(
        &mut self,
        source: &str,
        attack_type: String,
        level: crate::models::ThreatLevel,
        description: String,
        is_blocked: bool,
        connection_attempts: u64,
    ) -> u64 {
        let now = self.now();
        let id = self.threat_log.len() as u64 + 1;
        self.threat_log.push(ThreatLogEntry {
            id,
            source: source.to_string(),
            attack_type,
            level,
            timestamp: now,
            description,
            is_blocked,
            connection_attempts,
        });
        id
    }

    /// Émet un événement vers les abonnés
    ///
    /// Utilise try_send pour ne jamais bloquer une opération du moteur ;
    /// une file pleine est signalée mais ne fait pas échouer l'opération.
    pub(crate) fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.event_tx {
            if let Err(e) = tx.try_send(event) {
                warn!("Échec de l'envoi d'un événement: {}", e);
            }
        }
    }

    pub(crate) fn touch_stats(&mut self) {
        self.stats.last_update_time = self.now();
    }
}
