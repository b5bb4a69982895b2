//! Bibliothèque Sentinelle : moteur de pare-feu auto-détectant
//!
//! Cette bibliothèque fournit un moteur de détection d'anomalies avec
//! mise en liste noire automatique : un traqueur de trafic par source
//! accumule un score de suspicion à partir des motifs de connexion
//! observés et bloque de manière autonome les sources franchissant le
//! seuil configuré.
//!
//! Le moteur est une machine d'état autonome et rejouable : un hôte
//! (service REST, CLI) le pilote à travers des opérations atomiques,
//! chaque décision est journalisée et notifiée aux abonnés.

// Modules principaux
pub mod access; // Contrôle d'accès (propriétaire + administrateurs)
pub mod clock; // Horloge injectable en secondes Unix
pub mod config; // Configuration du service
pub mod engine; // Moteur de détection et magasins d'état
pub mod error; // Taxonomie d'erreurs du moteur
pub mod events; // Événements notifiés aux abonnés
pub mod models; // Structures de données et modèles

// Modules utilitaires et services
pub mod api; // Surface REST pilotant le moteur
pub mod cli; // Interface en ligne de commande
pub mod journal; // Journal d'audit des menaces
pub mod log_mode; // Modes de journalisation
pub mod service; // Service hôte (verrou unique + drainage des événements)

// Re-export des structures principales pour faciliter l'utilisation
pub use engine::{FirewallEngine, AUTO_DETECTED_ATTACK};
pub use error::EngineError;
pub use events::EngineEvent;
pub use models::{
    FirewallRule, IpTraffic, NetworkStats, Protocol, RuleAction, RuleSpec, ScanVerdict,
    SystemStatus, ThreatLevel, ThreatLogEntry,
};
pub use service::FirewallService;
