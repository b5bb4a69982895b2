use clap::Parser;
use log::{error, info};
use sentinelle::cli::{Cli, Command};
use sentinelle::config::EngineConfig;
use sentinelle::engine::FirewallEngine;
use sentinelle::log_mode::LogMode;
use sentinelle::models::{Protocol, ScanVerdict};
use sentinelle::service::FirewallService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Analyser les arguments de ligne de commande
    let cli = Cli::parse();

    // Charger la configuration pour déterminer le mode de log
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path).unwrap_or_else(|e| {
            eprintln!("Erreur lors du chargement de la configuration: {}", e);
            EngineConfig::default()
        }),
        None => EngineConfig::load().unwrap_or_else(|_| EngineConfig::default()),
    };

    // Initialiser le logger approprié
    init_logger(&config);

    match cli.command {
        Command::Serve { listen, owner } => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(owner) = owner {
                config.owner = owner;
            }
            serve(config).await
        }
        Command::Simulate { packets, sources } => {
            simulate(&config, packets, sources);
            Ok(())
        }
    }
}

fn init_logger(config: &EngineConfig) {
    match config.log_mode {
        LogMode::File => {
            // Initialiser le logger de fichier standard
            env_logger::init_from_env(
                env_logger::Env::default().default_filter_or(&config.log_level),
            );
        }
        LogMode::SystemdJournal => {
            // Initialiser le logger systemd-journal uniquement si la feature est activée
            #[cfg(feature = "systemd")]
            {
                use systemd_journal_logger::JournalLog;

                let log_level = match config.log_level.to_lowercase().as_str() {
                    "trace" => log::LevelFilter::Trace,
                    "debug" => log::LevelFilter::Debug,
                    "info" => log::LevelFilter::Info,
                    "warn" => log::LevelFilter::Warn,
                    "error" => log::LevelFilter::Error,
                    _ => log::LevelFilter::Info,
                };

                match JournalLog::new() {
                    Ok(logger) => {
                        if let Err(e) = logger
                            .with_syslog_identifier("sentinelle".to_string())
                            .install()
                        {
                            eprintln!("Erreur lors de l'installation du logger systemd: {}", e);
                            env_logger::init_from_env(
                                env_logger::Env::default().default_filter_or(&config.log_level),
                            );
                        } else {
                            log::set_max_level(log_level);
                            info!("Logger systemd initialisé avec niveau: {}", config.log_level);
                        }
                    }
                    Err(e) => {
                        eprintln!("Erreur lors de l'initialisation du logger systemd: {}", e);
                        env_logger::init_from_env(
                            env_logger::Env::default().default_filter_or(&config.log_level),
                        );
                    }
                }
            }

            // Fallback si la feature systemd n'est pas activée
            #[cfg(not(feature = "systemd"))]
            {
                eprintln!(
                    "AVERTISSEMENT: Le mode SystemdJournal n'est pas disponible (feature 'systemd' non activée). Utilisation du logger standard à la place."
                );
                env_logger::init_from_env(
                    env_logger::Env::default().default_filter_or(&config.log_level),
                );
            }
        }
    }
}

/// Démarre le service REST
async fn serve(config: EngineConfig) -> anyhow::Result<()> {
    let service = FirewallService::new(&config);
    let router = sentinelle::api::create_router(service.engine());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("API REST à l'écoute sur {}", config.listen_addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Erreur du serveur REST: {}", e);
        return Err(e.into());
    }

    service.shutdown();
    Ok(())
}

/// Simule un trafic de scans aléatoires contre un moteur local
///
/// Dans un système réel, les scans proviendraient d'une intégration hôte ;
/// ici nous générons des paquets simulés pour exercer le chemin de
/// détection de bout en bout.
fn simulate(config: &EngineConfig, packets: u32, sources: u32) {
    use rand::Rng;

    let owner = config.owner.clone();
    let mut engine = FirewallEngine::from_config(config);

    if let Err(e) = engine.start_system(&owner) {
        error!("Impossible de démarrer le moteur: {}", e);
        return;
    }

    let mut rng = rand::rng();
    let sources = sources.max(1);

    let mut allowed = 0u64;
    let mut blocked = 0u64;
    let mut alerted = 0u64;

    for _ in 0..packets {
        // Concentrer une partie du trafic sur quelques sources bruyantes
        let index = if rng.random_range(0..100) < 40 {
            rng.random_range(0..sources.min(3))
        } else {
            rng.random_range(0..sources)
        };
        let source = format!("10.0.{}.{}", index / 256, index % 256);

        let protocol = match rng.random_range(0..100) {
            0..=70 => Protocol::Tcp,
            71..=85 => Protocol::Udp,
            _ => Protocol::Icmp,
        };
        let port = rng.random_range(1..65535);

        match engine.scan_packet(&owner, &source, "192.168.1.1", port, protocol) {
            Ok(verdict) => match verdict {
                ScanVerdict::AutoBlocked | ScanVerdict::Blacklisted => blocked += 1,
                ScanVerdict::Alerted => alerted += 1,
                _ => allowed += 1,
            },
            Err(e) => {
                error!("Erreur de scan: {}", e);
                break;
            }
        }
    }

    let stats = engine.network_stats();
    println!("\nRésultats de la simulation:");
    println!("  Paquets scannés: {}", stats.total_packets_scanned);
    println!("  Autorisés: {}", allowed);
    println!("  Alertes: {}", alerted);
    println!("  Rejetés: {}", blocked);
    println!("  Menaces bloquées: {}", stats.threats_blocked);
    println!("  Alertes déclenchées: {}", stats.alerts_triggered);
    println!("  Sources bloquées automatiquement: {}", stats.auto_blocked_ips);
    println!("  Entrées de journal: {}\n", engine.threat_count());
}
