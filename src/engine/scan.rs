//! Chemin de détection automatique
//!
//! `scan_packet` est le point d'entrée unique du chemin procédural :
//! liste blanche, puis liste noire, puis mise à jour du traqueur, puis
//! scoring et décision. Le catalogue de règles n'est jamais consulté ici,
//! la séparation déclaratif/procédural du contrat de référence est
//! préservée.

use super::FirewallEngine;
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::models::{Protocol, ScanVerdict, ThreatLevel};
use log::{debug, info, warn};

/// Type d'attaque des entrées générées par le détecteur
pub const AUTO_DETECTED_ATTACK: &str = "Auto-Detected Suspicious Activity";

impl FirewallEngine {
    /// Évalue un paquet observé depuis `source`
    ///
    /// Requiert le rôle administrateur et un système démarré. L'ordre des
    /// vérifications est fixe : une source à la fois en liste blanche et
    /// en liste noire est toujours autorisée.
    pub fn scan_packet(
        &mut self,
        caller: &str,
        source: &str,
        destination: &str,
        port: u16,
        protocol: Protocol,
    ) -> Result<ScanVerdict, EngineError> {
        self.access.require_admin(caller)?;
        if !self.running {
            return Err(EngineError::InvalidState(
                "le système doit être démarré pour scanner",
            ));
        }

        let now = self.now();
        self.stats.total_packets_scanned += 1;
        self.stats.last_update_time = now;

        debug!(
            "Scan de {} -> {} (port {}, {:?})",
            source, destination, port, protocol
        );

        // La liste blanche court-circuite tout : ni traqueur, ni scoring
        if self.whitelist.contains(source) {
            return Ok(ScanVerdict::Whitelisted);
        }

        // Source déjà bloquée : comptabiliser et rejeter sans re-scorer
        if self.blacklist.contains(source) {
            self.stats.threats_blocked += 1;
            return Ok(ScanVerdict::Blacklisted);
        }

        // Mise à jour du traqueur (création paresseuse à la première vue)
        let traffic = self.traffic.entry(source.to_string()).or_default();
        traffic.connection_count += 1;
        traffic.is_monitored = true;

        if self.auto_detection {
            if traffic.connection_count > self.max_connections_per_minute {
                traffic.suspicion_score += 100;
            }

            // Re-scan instantané : l'ancien last_access_time est comparé
            // avant sa mise à jour, le crédit ne part que si deux scans
            // tombent dans la même seconde indivisible
            if traffic.connection_count > 1
                && now.saturating_sub(traffic.last_access_time) < 1
            {
                traffic.suspicion_score += 50;
            }

            traffic.last_access_time = now;

            let connection_count = traffic.connection_count;
            let suspicion_score = traffic.suspicion_score;

            self.emit(EngineEvent::PacketScanned {
                source: source.to_string(),
                connection_count,
                suspicion_score,
            });

            if suspicion_score >= self.auto_block_threshold {
                self.auto_block(source, connection_count, suspicion_score);
                return Ok(ScanVerdict::AutoBlocked);
            }

            if suspicion_score >= self.suspicion_threshold {
                self.alert_only(source, connection_count, suspicion_score);
                return Ok(ScanVerdict::Alerted);
            }
        }

        Ok(ScanVerdict::Clean)
    }

    /// Blocage automatique : liste noire, journal HIGH, compteurs
    fn auto_block(&mut self, source: &str, connection_count: u64, suspicion_score: u64) {
        self.blacklist.insert(source.to_string());
        self.stats.auto_blocked_ips += 1;
        self.stats.threats_blocked += 1;

        let log_id = self.append_threat(
            source,
            AUTO_DETECTED_ATTACK.to_string(),
            ThreatLevel::High,
            format!(
                "Score de suspicion {} au-delà du seuil de blocage automatique",
                suspicion_score
            ),
            true,
            connection_count,
        );

        warn!(
            "Blocage automatique de {} (score {}, {} connexions)",
            source, suspicion_score, connection_count
        );

        self.emit(EngineEvent::AutoBlocked {
            source: source.to_string(),
            suspicion_score,
            connection_count,
        });
        self.emit(EngineEvent::ThreatDetected {
            log_id,
            source: source.to_string(),
            level: ThreatLevel::High,
            is_blocked: true,
        });
    }

    /// Alerte sans blocage : journal MEDIUM, compteur d'alertes
    fn alert_only(&mut self, source: &str, connection_count: u64, suspicion_score: u64) {
        self.stats.alerts_triggered += 1;

        let log_id = self.append_threat(
            source,
            AUTO_DETECTED_ATTACK.to_string(),
            ThreatLevel::Medium,
            format!(
                "Score de suspicion {} au-delà du seuil d'alerte",
                suspicion_score
            ),
            false,
            connection_count,
        );

        info!(
            "Alerte pour {} (score {}, {} connexions)",
            source, suspicion_score, connection_count
        );

        self.emit(EngineEvent::ThreatDetected {
            log_id,
            source: source.to_string(),
            level: ThreatLevel::Medium,
            is_blocked: false,
        });
    }
}
