use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interface en ligne de commande de Sentinelle
#[derive(Parser, Debug)]
#[command(name = "sentinelle", version, about = "Moteur de pare-feu auto-détectant")]
pub struct Cli {
    /// Chemin vers un fichier de configuration alternatif
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Démarre le service REST pilotant le moteur
    Serve {
        /// Adresse d'écoute (remplace la configuration)
        #[arg(long)]
        listen: Option<String>,

        /// Identité du propriétaire du moteur (remplace la configuration)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Simule un trafic de scans aléatoires contre un moteur local
    Simulate {
        /// Nombre de paquets à simuler
        #[arg(long, default_value_t = 1000)]
        packets: u32,

        /// Nombre de sources distinctes
        #[arg(long, default_value_t = 20)]
        sources: u32,
    },
}
