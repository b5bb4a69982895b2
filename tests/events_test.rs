use sentinelle::clock::ManualClock;
use sentinelle::models::{Protocol, RuleAction, RuleSpec, ThreatLevel};
use sentinelle::{EngineEvent, FirewallEngine};
use std::sync::Arc;
use tokio::sync::mpsc;

const OWNER: &str = "owner";

fn engine_with_events() -> (FirewallEngine, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let clock = Arc::new(ManualClock::new(1_000_000));
    let engine = FirewallEngine::new(OWNER)
        .with_events(tx)
        .with_clock(clock);
    (engine, rx)
}

#[test]
fn test_evenements_du_cycle_systeme() {
    let (mut engine, mut rx) = engine_with_events();

    engine.start_system(OWNER).unwrap();
    engine.disable_auto_detection(OWNER).unwrap();
    engine.stop_system(OWNER).unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::SystemStarted {
            by: OWNER.to_string()
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::AutoDetectionToggled {
            enabled: false,
            by: OWNER.to_string()
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::SystemStopped {
            by: OWNER.to_string()
        }
    );
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_aucun_evenement_sur_echec() {
    let (mut engine, mut rx) = engine_with_events();

    // Un abonné ne peut pas observer un événement sans la mutation associée
    assert!(engine.stop_system(OWNER).is_err());
    assert!(engine.start_system("intrus").is_err());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_telemetrie_de_scan() {
    let (mut engine, mut rx) = engine_with_events();
    engine.start_system(OWNER).unwrap();
    let _ = rx.try_recv(); // SystemStarted

    engine
        .scan_packet(OWNER, "1.2.3.4", "192.168.1.1", 443, Protocol::Tcp)
        .unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::PacketScanned {
            source: "1.2.3.4".to_string(),
            connection_count: 1,
            suspicion_score: 0,
        }
    );
}

#[test]
fn test_evenements_de_blocage_automatique() {
    let (mut engine, mut rx) = engine_with_events();
    engine.start_system(OWNER).unwrap();

    // Abaisser les seuils pour déclencher le blocage au premier scan
    engine.update_max_connections(OWNER, 0).unwrap();
    engine.update_auto_block_threshold(OWNER, 100).unwrap();
    while rx.try_recv().is_ok() {}

    engine
        .scan_packet(OWNER, "6.6.6.6", "192.168.1.1", 22, Protocol::Tcp)
        .unwrap();

    // Télémétrie, puis blocage, puis menace : la mutation précède toujours
    assert!(matches!(
        rx.try_recv().unwrap(),
        EngineEvent::PacketScanned { .. }
    ));
    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::AutoBlocked {
            source: "6.6.6.6".to_string(),
            suspicion_score: 100,
            connection_count: 1,
        }
    );
    assert!(matches!(
        rx.try_recv().unwrap(),
        EngineEvent::ThreatDetected {
            log_id: 1,
            level: ThreatLevel::High,
            is_blocked: true,
            ..
        }
    ));
}

#[test]
fn test_evenements_des_regles_et_des_listes() {
    let (mut engine, mut rx) = engine_with_events();

    let id = engine
        .create_rule(
            OWNER,
            RuleSpec {
                name: "block-ssh".to_string(),
                source_pattern: "0.0.0.0".to_string(),
                destination_pattern: "192.168.1.1".to_string(),
                source_port: 0,
                destination_port: 22,
                protocol: Protocol::Tcp,
                action: RuleAction::Block,
                priority: 1,
            },
        )
        .unwrap();
    engine.update_rule_status(OWNER, id, false).unwrap();
    engine.delete_rule(OWNER, id).unwrap();
    engine.whitelist_ip(OWNER, "7.7.7.7").unwrap();

    assert!(matches!(
        rx.try_recv().unwrap(),
        EngineEvent::RuleCreated { id: 1, .. }
    ));
    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::RuleStatusUpdated {
            id: 1,
            is_active: false
        }
    );
    assert_eq!(rx.try_recv().unwrap(), EngineEvent::RuleDeleted { id: 1 });
    assert_eq!(
        rx.try_recv().unwrap(),
        EngineEvent::Whitelisted {
            source: "7.7.7.7".to_string(),
            by: OWNER.to_string()
        }
    );
}
