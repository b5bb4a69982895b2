//! Service hôte du moteur
//!
//! Enveloppe le moteur derrière un verrou unique couvrant tout son état
//! (une opération mutante ne s'entrelace jamais avec une autre) et draine
//! le canal d'événements vers le journal d'audit et le log applicatif.

use crate::config::EngineConfig;
use crate::engine::FirewallEngine;
use crate::events::EngineEvent;
use crate::journal::Journal;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

pub struct FirewallService {
    engine: Arc<RwLock<FirewallEngine>>,
    event_task: JoinHandle<()>,
}

impl FirewallService {
    /// Construit le moteur, branche le canal d'événements et démarre la
    /// tâche de drainage vers le journal
    pub fn new(config: &EngineConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(config.event_queue_size);

        let engine = FirewallEngine::from_config(config).with_events(event_tx);
        let engine = Arc::new(RwLock::new(engine));
        let journal = Arc::new(Journal::new_with_mode(
            config.log_file.clone(),
            config.log_mode,
        ));

        let event_task = Self::spawn_event_loop(event_rx, Arc::clone(&engine), journal);

        info!(
            "Service initialisé (propriétaire: {}, seuils: {}/{}/{})",
            config.owner,
            config.max_connections_per_minute,
            config.suspicion_threshold,
            config.auto_block_threshold
        );

        Self { engine, event_task }
    }

    /// Accès partagé au moteur pour les intégrations (API, CLI)
    pub fn engine(&self) -> Arc<RwLock<FirewallEngine>> {
        Arc::clone(&self.engine)
    }

    /// Arrête la tâche de drainage des événements
    pub fn shutdown(&self) {
        self.event_task.abort();
    }

    fn spawn_event_loop(
        mut event_rx: mpsc::Receiver<EngineEvent>,
        engine: Arc<RwLock<FirewallEngine>>,
        journal: Arc<Journal>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                journal.log_event(&event);

                // Une menace détectée est aussi tracée avec son entrée
                // complète du journal des menaces
                if let EngineEvent::ThreatDetected { log_id, .. } = &event {
                    match engine.read().await.threat_entry(*log_id) {
                        Ok(entry) => journal.log_threat(&entry),
                        Err(e) => warn!("Entrée de menace introuvable: {}", e),
                    }
                }

                process_event(&event);
            }
            debug!("Canal d'événements fermé, fin de la tâche de drainage");
        })
    }
}

/// Relaie un événement vers le log applicatif
fn process_event(event: &EngineEvent) {
    match event {
        EngineEvent::AutoBlocked {
            source,
            suspicion_score,
            ..
        } => {
            warn!(
                "ALERTE: {} bloquée automatiquement (score {})",
                source, suspicion_score
            );
        }
        EngineEvent::ThreatDetected {
            log_id,
            source,
            level,
            ..
        } => {
            warn!(
                "Menace #{} [{}] détectée depuis {}",
                log_id,
                level.as_str(),
                source
            );
        }
        EngineEvent::PacketScanned { .. } => {
            // Télémétrie pure, déjà tracée au niveau debug par le moteur
        }
        _ => {
            info!("Événement: {:?}", event);
        }
    }
}
