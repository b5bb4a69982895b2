use sentinelle::clock::ManualClock;
use sentinelle::models::{Protocol, RuleAction, RuleSpec, ScanVerdict, ThreatLevel};
use sentinelle::{EngineError, FirewallEngine, AUTO_DETECTED_ATTACK};
use std::sync::Arc;

const OWNER: &str = "owner";

/// Crée un moteur piloté par une horloge manuelle
fn engine_with_clock() -> (FirewallEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000_000));
    let engine = FirewallEngine::new(OWNER).with_clock(clock.clone());
    (engine, clock)
}

fn scan(engine: &mut FirewallEngine, source: &str) -> ScanVerdict {
    engine
        .scan_packet(OWNER, source, "192.168.1.1", 443, Protocol::Tcp)
        .expect("le scan doit réussir")
}

fn rule_spec(name: &str, action: RuleAction) -> RuleSpec {
    RuleSpec {
        name: name.to_string(),
        source_pattern: "0.0.0.0".to_string(),
        destination_pattern: "192.168.1.1".to_string(),
        source_port: 0,
        destination_port: 22,
        protocol: Protocol::Tcp,
        action,
        priority: 10,
    }
}

#[test]
fn test_montee_en_score_et_blocage_automatique() {
    // Scénario A : moteur neuf, seuils par défaut (100/500/1000)
    let (mut engine, clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();

    // 100 premiers scans espacés d'une seconde : aucun crédit de suspicion
    for _ in 0..100 {
        clock.advance(1);
        assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::Clean);
    }
    assert_eq!(engine.ip_traffic("1.2.3.4").suspicion_score, 0);

    // 101e scan : le compteur dépasse le seuil de connexions, +100
    clock.advance(1);
    assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::Clean);
    assert_eq!(engine.ip_traffic("1.2.3.4").suspicion_score, 100);
    assert!(!engine.is_blacklisted("1.2.3.4"));

    // Scans 102 à 104 : 200 à 400, toujours sous le seuil d'alerte
    for expected in [200, 300, 400] {
        clock.advance(1);
        assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::Clean);
        assert_eq!(engine.ip_traffic("1.2.3.4").suspicion_score, expected);
    }

    // Scans 105 à 109 : 500 à 900, la branche alerte sans blocage
    for expected in [500, 600, 700, 800, 900] {
        clock.advance(1);
        assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::Alerted);
        assert_eq!(engine.ip_traffic("1.2.3.4").suspicion_score, expected);
        assert!(!engine.is_blacklisted("1.2.3.4"));
    }
    assert_eq!(engine.network_stats().alerts_triggered, 5);

    // 110e scan : 1000, seuil de blocage automatique franchi
    clock.advance(1);
    assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::AutoBlocked);
    assert!(engine.is_blacklisted("1.2.3.4"));

    let stats = engine.network_stats();
    assert_eq!(stats.auto_blocked_ips, 1);
    assert_eq!(stats.threats_blocked, 1);

    // L'entrée de journal du blocage est de niveau HIGH, marquée bloquée
    let entry = engine.threat_entry(engine.threat_count()).unwrap();
    assert_eq!(entry.level, ThreatLevel::High);
    assert!(entry.is_blocked);
    assert_eq!(entry.attack_type, AUTO_DETECTED_ATTACK);
    assert_eq!(entry.connection_attempts, 110);

    // Les scans suivants court-circuitent sur la liste noire, sans re-scorer
    clock.advance(1);
    assert_eq!(scan(&mut engine, "1.2.3.4"), ScanVerdict::Blacklisted);
    assert_eq!(engine.ip_traffic("1.2.3.4").suspicion_score, 1000);
    assert_eq!(engine.network_stats().threats_blocked, 2);
    assert_eq!(engine.network_stats().total_packets_scanned, 111);
}

#[test]
fn test_priorite_de_la_liste_blanche() {
    let (mut engine, _clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();

    // Une source à la fois en liste blanche et en liste noire est autorisée
    engine.whitelist_ip(OWNER, "9.9.9.9").unwrap();
    engine.blacklist_ip(OWNER, "9.9.9.9").unwrap();
    assert!(engine.is_whitelisted("9.9.9.9"));
    assert!(engine.is_blacklisted("9.9.9.9"));

    let verdict = scan(&mut engine, "9.9.9.9");
    assert_eq!(verdict, ScanVerdict::Whitelisted);
    assert!(verdict.allowed());

    // Le court-circuit précède le traqueur : aucun suivi n'est créé
    let traffic = engine.ip_traffic("9.9.9.9");
    assert_eq!(traffic.connection_count, 0);
    assert!(!traffic.is_monitored);
}

#[test]
fn test_total_scans_compte_tous_les_verdicts() {
    let (mut engine, clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();

    engine.whitelist_ip(OWNER, "1.1.1.1").unwrap();
    engine.blacklist_ip(OWNER, "2.2.2.2").unwrap();

    clock.advance(1);
    scan(&mut engine, "1.1.1.1"); // liste blanche
    clock.advance(1);
    scan(&mut engine, "2.2.2.2"); // liste noire
    clock.advance(1);
    scan(&mut engine, "3.3.3.3"); // propre

    assert_eq!(engine.network_stats().total_packets_scanned, 3);
}

#[test]
fn test_rescan_instantane_meme_seconde() {
    // Le crédit de +50 ne part que si deux scans tombent dans la même
    // seconde indivisible (résolution explicite de l'horloge)
    let (mut engine, clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();

    // Premier scan : pas de scan précédent, pas de crédit
    scan(&mut engine, "4.4.4.4");
    assert_eq!(engine.ip_traffic("4.4.4.4").suspicion_score, 0);

    // Deuxième et troisième scans dans la même seconde : +50 chacun
    scan(&mut engine, "4.4.4.4");
    assert_eq!(engine.ip_traffic("4.4.4.4").suspicion_score, 50);
    scan(&mut engine, "4.4.4.4");
    assert_eq!(engine.ip_traffic("4.4.4.4").suspicion_score, 100);

    // Une seconde plus tard : plus de crédit
    clock.advance(1);
    scan(&mut engine, "4.4.4.4");
    assert_eq!(engine.ip_traffic("4.4.4.4").suspicion_score, 100);
}

#[test]
fn test_identifiants_de_regles_jamais_reutilises() {
    // Scénario B
    let (mut engine, _clock) = engine_with_clock();

    let id = engine
        .create_rule(OWNER, rule_spec("block-ssh", RuleAction::Block))
        .unwrap();
    assert_eq!(id, 1);

    let rule = engine.rule(1).unwrap();
    assert_eq!(rule.name, "block-ssh");
    assert!(rule.is_active);
    assert_eq!(rule.created_by, OWNER);

    engine.delete_rule(OWNER, 1).unwrap();
    assert_eq!(
        engine.rule(1),
        Err(EngineError::NotFound {
            kind: "règle",
            id: 1
        })
    );

    // Le compteur n'est jamais décrémenté : la règle suivante prend l'id 2
    let id = engine
        .create_rule(OWNER, rule_spec("allow-dns", RuleAction::Allow))
        .unwrap();
    assert_eq!(id, 2);
    assert_eq!(engine.rule_count(), 2);
}

#[test]
fn test_bornes_des_identifiants_de_regles() {
    let (mut engine, _clock) = engine_with_clock();

    // Aucune règle émise : tout identifiant est hors plage
    assert!(matches!(
        engine.rule(1),
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        engine.update_rule_status(OWNER, 1, false),
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        engine.delete_rule(OWNER, 0),
        Err(EngineError::NotFound { .. })
    ));

    engine
        .create_rule(OWNER, rule_spec("r1", RuleAction::Alert))
        .unwrap();
    engine.delete_rule(OWNER, 1).unwrap();

    // Identifiant supprimé mais dans la plage : no-op silencieux,
    // sémantique de mapping du contrat de référence
    assert_eq!(engine.update_rule_status(OWNER, 1, false), Ok(()));
    assert_eq!(engine.delete_rule(OWNER, 1), Ok(()));
}

#[test]
fn test_journalisation_manuelle_avec_blocage() {
    // Scénario C
    let (mut engine, _clock) = engine_with_clock();

    let log_id = engine
        .log_manual_threat(
            OWNER,
            "5.6.7.8",
            "Manual Test",
            ThreatLevel::Critical,
            "desc",
            true,
        )
        .unwrap();
    assert_eq!(log_id, 1);
    assert!(engine.is_blacklisted("5.6.7.8"));

    let stats = engine.network_stats();
    assert_eq!(stats.threats_blocked, 1);
    assert_eq!(stats.alerts_triggered, 0);

    let entry = engine.threat_entry(1).unwrap();
    assert_eq!(entry.level, ThreatLevel::Critical);
    assert_eq!(entry.attack_type, "Manual Test");
    assert!(entry.is_blocked);
    assert_eq!(entry.connection_attempts, 0);
}

#[test]
fn test_journalisation_manuelle_sans_blocage() {
    let (mut engine, _clock) = engine_with_clock();

    let log_id = engine
        .log_manual_threat(
            OWNER,
            "5.6.7.8",
            "Scan de ports",
            ThreatLevel::Low,
            "activité observée",
            false,
        )
        .unwrap();
    assert_eq!(log_id, 1);
    assert!(!engine.is_blacklisted("5.6.7.8"));

    let stats = engine.network_stats();
    assert_eq!(stats.threats_blocked, 0);
    assert_eq!(stats.alerts_triggered, 1);
}

#[test]
fn test_scan_refuse_si_systeme_arrete() {
    // Scénario D : aucun compteur ne bouge sur un échec
    let (mut engine, _clock) = engine_with_clock();

    let result = engine.scan_packet(OWNER, "1.2.3.4", "192.168.1.1", 80, Protocol::Http);
    assert!(matches!(result, Err(EngineError::InvalidState(_))));

    let stats = engine.network_stats();
    assert_eq!(stats.total_packets_scanned, 0);
    assert_eq!(stats.threats_blocked, 0);
    assert_eq!(engine.ip_traffic("1.2.3.4").connection_count, 0);
}

#[test]
fn test_machine_etat_du_systeme() {
    let (mut engine, _clock) = engine_with_clock();

    assert!(!engine.system_status().running);
    engine.start_system(OWNER).unwrap();
    assert!(engine.system_status().running);

    // Transition vers l'état courant refusée
    assert!(matches!(
        engine.start_system(OWNER),
        Err(EngineError::InvalidState(_))
    ));

    engine.stop_system(OWNER).unwrap();
    assert!(matches!(
        engine.stop_system(OWNER),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn test_detection_desactivee_compte_sans_scorer() {
    let (mut engine, clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();
    engine.disable_auto_detection(OWNER).unwrap();
    assert!(!engine.system_status().auto_detection);

    // Les scans restent comptés et le traqueur suit les connexions,
    // mais aucun score n'est accumulé même en re-scan instantané
    scan(&mut engine, "6.6.6.6");
    scan(&mut engine, "6.6.6.6");
    let traffic = engine.ip_traffic("6.6.6.6");
    assert_eq!(traffic.connection_count, 2);
    assert_eq!(traffic.suspicion_score, 0);
    assert!(traffic.is_monitored);
    assert_eq!(engine.network_stats().total_packets_scanned, 2);

    // Les listes noire et blanche continuent de s'appliquer
    engine.blacklist_ip(OWNER, "6.6.6.6").unwrap();
    clock.advance(1);
    assert_eq!(scan(&mut engine, "6.6.6.6"), ScanVerdict::Blacklisted);
}

#[test]
fn test_lecture_douce_du_traqueur() {
    // Une source jamais vue renvoie un enregistrement à zéro, pas d'erreur
    let (engine, _clock) = engine_with_clock();
    let traffic = engine.ip_traffic("inconnue");
    assert_eq!(traffic.connection_count, 0);
    assert_eq!(traffic.suspicion_score, 0);
    assert!(!traffic.is_monitored);
}

#[test]
fn test_liste_blanche_idempotente() {
    let (mut engine, _clock) = engine_with_clock();

    engine.whitelist_ip(OWNER, "7.7.7.7").unwrap();
    engine.whitelist_ip(OWNER, "7.7.7.7").unwrap();

    assert!(engine.is_whitelisted("7.7.7.7"));
    assert_eq!(engine.whitelisted_sources(), vec!["7.7.7.7".to_string()]);
    assert_eq!(engine.threat_count(), 0);
}

#[test]
fn test_blocage_manuel_incremente_le_compteur_partage() {
    // Bizarrerie du contrat de référence : le blocage manuel partage le
    // compteur auto_blocked_ips avec le blocage automatique
    let (mut engine, _clock) = engine_with_clock();

    engine.blacklist_ip(OWNER, "8.8.8.8").unwrap();
    assert_eq!(engine.network_stats().auto_blocked_ips, 1);
    assert_eq!(engine.network_stats().threats_blocked, 0);

    engine.remove_from_blacklist(OWNER, "8.8.8.8").unwrap();
    assert!(!engine.is_blacklisted("8.8.8.8"));
    // Le compteur ne redescend jamais
    assert_eq!(engine.network_stats().auto_blocked_ips, 1);
}

#[test]
fn test_mise_a_jour_des_seuils() {
    let (mut engine, _clock) = engine_with_clock();
    engine.start_system(OWNER).unwrap();

    engine.update_max_connections(OWNER, 0).unwrap();
    engine.update_auto_block_threshold(OWNER, 100).unwrap();

    let status = engine.system_status();
    assert_eq!(status.max_connections_per_minute, 0);
    assert_eq!(status.auto_block_threshold, 100);

    // Avec un seuil de connexions à 0, le premier scan crédite déjà 100
    // et franchit le seuil de blocage abaissé
    assert_eq!(scan(&mut engine, "11.11.11.11"), ScanVerdict::AutoBlocked);
    assert!(engine.is_blacklisted("11.11.11.11"));
}

#[test]
fn test_seuils_sans_validation_croisee() {
    // Rien n'empêche un seuil de suspicion au-delà du seuil de blocage :
    // la branche alerte devient simplement inatteignable
    let (mut engine, _clock) = engine_with_clock();
    engine.update_suspicion_threshold(OWNER, 2000).unwrap();
    let status = engine.system_status();
    assert_eq!(status.suspicion_threshold, 2000);
    assert_eq!(status.auto_block_threshold, 1000);
}

#[test]
fn test_bornes_du_journal_des_menaces() {
    let (mut engine, _clock) = engine_with_clock();

    assert!(matches!(
        engine.threat_entry(0),
        Err(EngineError::NotFound { .. })
    ));
    assert!(matches!(
        engine.threat_entry(1),
        Err(EngineError::NotFound { .. })
    ));

    engine
        .log_manual_threat(OWNER, "x", "Test", ThreatLevel::Low, "d", false)
        .unwrap();
    assert!(engine.threat_entry(1).is_ok());
    assert!(matches!(
        engine.threat_entry(2),
        Err(EngineError::NotFound { .. })
    ));
}
