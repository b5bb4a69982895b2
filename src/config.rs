use crate::log_mode::LogMode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "/etc/sentinelle/config.json";
const CONFIG_DIR: &str = "/etc/sentinelle";

/// Configuration du service
///
/// Les seuils reprennent les valeurs par défaut du contrat de référence.
/// Aucune validation croisée n'est faite entre eux : un seuil de
/// suspicion supérieur au seuil de blocage rend simplement la branche
/// alerte inatteignable, c'est la responsabilité de l'appelant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Version actuelle du logiciel
    pub version: String,

    /// Identité du propriétaire du moteur, fixée à l'initialisation
    pub owner: String,

    /// Nombre de connexions par minute avant crédit de suspicion
    pub max_connections_per_minute: u64,

    /// Seuil de score déclenchant une alerte sans blocage
    pub suspicion_threshold: u64,

    /// Seuil de score déclenchant le blocage automatique
    pub auto_block_threshold: u64,

    /// Détection automatique armée dès la construction du moteur
    pub auto_detection: bool,

    /// Adresse d'écoute de l'API REST
    pub listen_addr: String,

    /// Chemin vers le fichier de journal des menaces
    pub log_file: String,

    /// Niveau de log
    pub log_level: String,

    /// Mode de journalisation (fichier ou systemd-journal)
    pub log_mode: LogMode,

    /// Taille de la file d'événements du moteur
    pub event_queue_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            version: env!("CARGO_PKG_VERSION").to_string(),
            owner: "root".to_string(),
            max_connections_per_minute: 100,
            suspicion_threshold: 500,
            auto_block_threshold: 1000,
            auto_detection: true,
            listen_addr: "127.0.0.1:8484".to_string(),
            log_file: "/var/log/sentinelle/threats.log".to_string(),
            log_level: "info".to_string(),
            log_mode: LogMode::File,
            event_queue_size: 1000,
        }
    }
}

impl EngineConfig {
    /// Charge la configuration depuis le fichier par défaut
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::load_from(CONFIG_FILE)
    }

    /// Charge la configuration depuis un chemin explicite
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();

        if !path.exists() {
            // Créer la configuration par défaut si elle n'existe pas
            let default_config = EngineConfig::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let config_content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&config_content)?;

        Ok(config)
    }

    /// Sauvegarde la configuration dans le fichier par défaut
    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        if !Path::new(CONFIG_DIR).exists() {
            fs::create_dir_all(CONFIG_DIR)?;
        }
        self.save_to(CONFIG_FILE)
    }

    /// Sauvegarde la configuration vers un chemin explicite
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        let path = path.as_ref();

        // Créer le répertoire si nécessaire
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let config_json = serde_json::to_string_pretty(self)?;
        fs::write(path, config_json)?;

        Ok(())
    }
}
