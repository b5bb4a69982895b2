use serde::{Deserialize, Serialize};

/// Protocole réseau visé par une règle ou un scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Http,
    Https,
    All,
}

/// Action déclarative portée par une règle de pare-feu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleAction {
    Allow,
    Block,
    Alert,
}

/// Niveau de gravité d'une menace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "LOW",
            ThreatLevel::Medium => "MEDIUM",
            ThreatLevel::High => "HIGH",
            ThreatLevel::Critical => "CRITICAL",
        }
    }
}

/// Règle de pare-feu déclarative
///
/// Les règles forment un catalogue consulté par les intégrations externes.
/// Elles ne participent jamais au chemin de détection automatique de
/// `scan_packet`, qui reste purement procédural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    /// Identifiant unique, strictement croissant, jamais réutilisé
    pub id: u64,
    pub name: String,
    /// Motif source (correspondance exacte, pas de joker)
    pub source_pattern: String,
    /// Motif destination (correspondance exacte, pas de joker)
    pub destination_pattern: String,
    /// Port source, 0 = tous
    pub source_port: u16,
    /// Port destination, 0 = tous
    pub destination_port: u16,
    pub protocol: Protocol,
    pub action: RuleAction,
    /// Priorité indicative, l'ordre d'application relève du consommateur
    pub priority: u32,
    pub is_active: bool,
    /// Horodatage de création (secondes Unix)
    pub created_at: u64,
    /// Identité de l'administrateur créateur
    pub created_by: String,
}

/// Champs fournis par un administrateur à la création d'une règle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    pub source_pattern: String,
    pub destination_pattern: String,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: Protocol,
    pub action: RuleAction,
    pub priority: u32,
}

/// Entrée du journal des menaces
///
/// Le journal est strictement append-only : les entrées ne sont jamais
/// modifiées ni supprimées, et le compteur d'identifiants est partagé
/// entre les entrées manuelles et automatiques.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatLogEntry {
    pub id: u64,
    /// Identifiant source (IP ou équivalent)
    pub source: String,
    pub attack_type: String,
    pub level: ThreatLevel,
    /// Horodatage (secondes Unix)
    pub timestamp: u64,
    pub description: String,
    /// Vrai si cette entrée a causé ou accompagné une mise en liste noire
    pub is_blocked: bool,
    /// Instantané du compteur de connexions du traqueur au moment du log
    pub connection_attempts: u64,
}

/// Suivi du trafic pour un identifiant source
///
/// Créé paresseusement au premier scan d'une source inconnue, jamais
/// supprimé ensuite. Le score de suspicion ne décroît jamais : aucun
/// mécanisme d'oubli n'est implémenté (limitation connue, voir DESIGN.md).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpTraffic {
    pub connection_count: u64,
    /// Horodatage du dernier scan (secondes Unix, 0 = jamais scanné)
    pub last_access_time: u64,
    pub suspicion_score: u64,
    pub is_monitored: bool,
}

/// Statistiques globales du moteur
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_packets_scanned: u64,
    pub threats_blocked: u64,
    pub alerts_triggered: u64,
    /// Compteur partagé entre blocage automatique et blocage manuel,
    /// comme dans le contrat de référence : aucune relation d'ordre avec
    /// `threats_blocked` n'est garantie
    pub auto_blocked_ips: u64,
    pub last_update_time: u64,
}

/// Verdict rendu par `scan_packet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanVerdict {
    /// Trafic autorisé, aucun seuil franchi
    Clean,
    /// Source en liste blanche, court-circuit avant tout scoring
    Whitelisted,
    /// Source déjà en liste noire, trafic rejeté
    Blacklisted,
    /// Seuil de blocage automatique franchi pendant ce scan
    AutoBlocked,
    /// Seuil de suspicion franchi, alerte émise sans blocage
    Alerted,
}

impl ScanVerdict {
    /// Indique si le trafic est autorisé à passer
    pub fn allowed(&self) -> bool {
        matches!(
            self,
            ScanVerdict::Clean | ScanVerdict::Whitelisted | ScanVerdict::Alerted
        )
    }
}

/// Instantané de l'état du système, exposé aux intégrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub running: bool,
    pub auto_detection: bool,
    pub max_connections_per_minute: u64,
    pub suspicion_threshold: u64,
    pub auto_block_threshold: u64,
    pub rule_count: u64,
    pub threat_count: u64,
}
