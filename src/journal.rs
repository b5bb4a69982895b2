//! Journal d'audit des menaces et des événements du moteur
//!
//! Le moteur conserve son journal des menaces en mémoire ; ce module
//! fournit la trace d'audit externe, soit dans un fichier local, soit
//! via systemd-journal selon le mode configuré.

use crate::events::EngineEvent;
use crate::log_mode::LogMode;
use crate::models::ThreatLogEntry;
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;

pub struct Journal {
    log_file: Mutex<Option<File>>,
    log_path: String,
    log_mode: LogMode,
}

impl Journal {
    pub fn new(log_path: String) -> Self {
        Self::new_with_mode(log_path, LogMode::File)
    }

    pub fn new_with_mode(log_path: String, log_mode: LogMode) -> Self {
        // Si le mode de journalisation est fichier, initialiser le fichier de log
        let file = if log_mode == LogMode::File {
            // Créer le répertoire si nécessaire
            if let Some(parent) = Path::new(&log_path).parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!("Erreur lors de la création du répertoire de logs: {}", e);
                }
            }

            // Essayer d'ouvrir le fichier de log
            match OpenOptions::new().create(true).append(true).open(&log_path) {
                Ok(file) => Some(file),
                Err(e) => {
                    error!(
                        "Erreur lors de l'ouverture du fichier de log {}: {}",
                        log_path, e
                    );
                    None
                }
            }
        } else {
            // En mode systemd-journal, pas besoin de fichier
            None
        };

        Self {
            log_file: Mutex::new(file),
            log_path,
            log_mode,
        }
    }

    /// Trace une entrée du journal des menaces
    pub fn log_threat(&self, entry: &ThreatLogEntry) {
        let formatted_time = Self::now_formatted();

        let status = if entry.is_blocked { "BLOCKED" } else { "LOGGED" };
        let log_entry = format!(
            "[{}] [THREAT #{}] [{}] [{}] {} | {} | {} connexion(s) au moment du log",
            formatted_time,
            entry.id,
            entry.level.as_str(),
            status,
            entry.source,
            entry.attack_type,
            entry.connection_attempts
        );

        match self.log_mode {
            LogMode::File => {
                self.write_to_log(&format!("{}\n", log_entry));
            }
            LogMode::SystemdJournal => {
                // Pour systemd-journal, on passe par le crate log
                match entry.level {
                    crate::models::ThreatLevel::Low => info!("{}", log_entry),
                    crate::models::ThreatLevel::Medium => warn!("{}", log_entry),
                    _ => error!("{}", log_entry),
                }
            }
        }
    }

    /// Trace un événement du moteur
    pub fn log_event(&self, event: &EngineEvent) {
        let formatted_time = Self::now_formatted();
        let (tag, message) = Self::describe_event(event);
        let log_entry = format!("[{}] [{}] {}", formatted_time, tag, message);

        match self.log_mode {
            LogMode::File => {
                self.write_to_log(&format!("{}\n", log_entry));
            }
            LogMode::SystemdJournal => match event {
                EngineEvent::AutoBlocked { .. } | EngineEvent::ThreatDetected { .. } => {
                    warn!("{}", log_entry)
                }
                EngineEvent::PacketScanned { .. } => debug!("{}", log_entry),
                _ => info!("{}", log_entry),
            },
        }
    }

    fn describe_event(event: &EngineEvent) -> (&'static str, String) {
        match event {
            EngineEvent::SystemStarted { by } => {
                ("SYSTEM", format!("Système démarré par {}", by))
            }
            EngineEvent::SystemStopped { by } => ("SYSTEM", format!("Système arrêté par {}", by)),
            EngineEvent::AutoDetectionToggled { enabled, by } => (
                "SYSTEM",
                format!(
                    "Détection automatique {} par {}",
                    if *enabled { "activée" } else { "désactivée" },
                    by
                ),
            ),
            EngineEvent::RuleCreated { id, name, by } => {
                ("RULE", format!("Règle #{} '{}' créée par {}", id, name, by))
            }
            EngineEvent::RuleStatusUpdated { id, is_active } => (
                "RULE",
                format!(
                    "Règle #{} {}",
                    id,
                    if *is_active { "activée" } else { "désactivée" }
                ),
            ),
            EngineEvent::RuleDeleted { id } => ("RULE", format!("Règle #{} supprimée", id)),
            EngineEvent::PacketScanned {
                source,
                connection_count,
                suspicion_score,
            } => (
                "SCAN",
                format!(
                    "{} | {} connexion(s) | score {}",
                    source, connection_count, suspicion_score
                ),
            ),
            EngineEvent::ThreatDetected {
                log_id,
                source,
                level,
                is_blocked,
            } => (
                "THREAT",
                format!(
                    "Menace #{} [{}] depuis {}{}",
                    log_id,
                    level.as_str(),
                    source,
                    if *is_blocked { " (bloquée)" } else { "" }
                ),
            ),
            EngineEvent::AutoBlocked {
                source,
                suspicion_score,
                connection_count,
            } => (
                "AUTOBLOCK",
                format!(
                    "{} bloquée automatiquement (score {}, {} connexions)",
                    source, suspicion_score, connection_count
                ),
            ),
            EngineEvent::Blacklisted { source, by } => (
                "BLACKLIST",
                format!("{} mise en liste noire par {}", source, by),
            ),
            EngineEvent::BlacklistRemoved { source, by } => (
                "BLACKLIST",
                format!("{} retirée de la liste noire par {}", source, by),
            ),
            EngineEvent::Whitelisted { source, by } => (
                "WHITELIST",
                format!("{} mise en liste blanche par {}", source, by),
            ),
            EngineEvent::WhitelistRemoved { source, by } => (
                "WHITELIST",
                format!("{} retirée de la liste blanche par {}", source, by),
            ),
            EngineEvent::AdminAdded { identity } => {
                ("ADMIN", format!("Administrateur {} ajouté", identity))
            }
            EngineEvent::AdminRemoved { identity } => {
                ("ADMIN", format!("Administrateur {} retiré", identity))
            }
            EngineEvent::ThresholdUpdated { name, value } => {
                ("CONFIG", format!("Seuil {} mis à jour: {}", name, value))
            }
        }
    }

    fn now_formatted() -> String {
        let timestamp: DateTime<Local> = SystemTime::now().into();
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    fn write_to_log(&self, message: &str) {
        // Ne rien faire si on est en mode systemd-journal
        if self.log_mode == LogMode::SystemdJournal {
            return;
        }

        let mut log_file_guard = match self.log_file.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!(
                    "Erreur lors de l'acquisition du verrou pour le fichier de log: {}",
                    e
                );
                return;
            }
        };

        if let Some(file) = log_file_guard.as_mut() {
            if let Err(e) = file.write_all(message.as_bytes()) {
                error!("Erreur lors de l'écriture dans le fichier de log: {}", e);

                // Essayer de réouvrir le fichier
                *log_file_guard = match OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.log_path)
                {
                    Ok(file) => Some(file),
                    Err(e) => {
                        error!("Erreur lors de la réouverture du fichier de log: {}", e);
                        None
                    }
                };
            }
        }
    }
}
