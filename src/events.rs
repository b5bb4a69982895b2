use crate::models::ThreatLevel;
use serde::{Deserialize, Serialize};

/// Événements émis par le moteur
///
/// Chaque événement est envoyé de manière synchrone à l'intérieur de
/// l'opération qui le provoque : un abonné ne peut jamais observer un
/// événement dont la mutation d'état correspondante n'est pas déjà
/// appliquée. Le canal est fourni à la construction du moteur, les
/// abonnés le consomment comme un flux de notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Système démarré
    SystemStarted { by: String },
    /// Système arrêté
    SystemStopped { by: String },
    /// Bascule de la détection automatique
    AutoDetectionToggled { enabled: bool, by: String },
    /// Règle créée
    RuleCreated { id: u64, name: String, by: String },
    /// Statut d'une règle mis à jour
    RuleStatusUpdated { id: u64, is_active: bool },
    /// Règle supprimée
    RuleDeleted { id: u64 },
    /// Télémétrie de scan
    PacketScanned {
        source: String,
        connection_count: u64,
        suspicion_score: u64,
    },
    /// Menace détectée (automatique ou manuelle)
    ThreatDetected {
        log_id: u64,
        source: String,
        level: ThreatLevel,
        is_blocked: bool,
    },
    /// Source mise en liste noire par le détecteur
    AutoBlocked {
        source: String,
        suspicion_score: u64,
        connection_count: u64,
    },
    /// Source mise en liste noire manuellement
    Blacklisted { source: String, by: String },
    /// Source retirée de la liste noire
    BlacklistRemoved { source: String, by: String },
    /// Source mise en liste blanche
    Whitelisted { source: String, by: String },
    /// Source retirée de la liste blanche
    WhitelistRemoved { source: String, by: String },
    /// Administrateur ajouté
    AdminAdded { identity: String },
    /// Administrateur retiré
    AdminRemoved { identity: String },
    /// Seuil de configuration mis à jour
    ThresholdUpdated { name: String, value: u64 },
}
