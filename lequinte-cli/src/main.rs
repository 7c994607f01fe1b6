mod display;
mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use lequinte_db::models::RaceType;
use lequinte_db::store::{WeightStore, load_store, reset_store, store_path};
use lequinte_engine::config::{EngineConfig, load_config};
use lequinte_engine::generator::{count_qualifying, generate_candidates};
use lequinte_engine::learning::learn_from_text;

use crate::display::{display_candidates, display_learn_report, display_weights};
use crate::interactive::prompt;

#[derive(Parser)]
#[command(name = "lequinte", about = "Suggestions de combinaisons hippiques à 5 numéros")]
struct Cli {
    /// Fichier des poids (défaut : data/weights.json)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Configuration JSON du moteur (top_k, bonus_step)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Générer le Top 10 des combinaisons pour un type de course
    Generate {
        /// Type de course (plat, attele, handicap)
        #[arg(short, long, default_value = "plat")]
        race: RaceType,
    },

    /// Apprendre d'un résultat réel (ex: 5/2/3/6/16)
    Learn {
        /// Numéros à l'arrivée, séparés par /
        result: String,
    },

    /// Afficher les poids actuels
    Weights,

    /// Remettre tous les poids à 1.0
    Reset {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Afficher le chemin du fichier des poids
    StorePath,

    /// Mode interactif
    Interactive,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let path = cli.store.unwrap_or_else(store_path);
    log::debug!("Fichier des poids : {}", path.display());
    let config = match &cli.config {
        Some(config_path) => load_config(config_path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::StorePath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Reset { yes } => cmd_reset(&path, yes),
        Command::Generate { race } => {
            let store = open_store(&path)?;
            cmd_generate(&store, race, &config)
        }
        Command::Learn { result } => {
            let mut store = open_store(&path)?;
            cmd_learn(&mut store, &result, &config, &path)
        }
        Command::Weights => {
            let store = open_store(&path)?;
            display_weights(&store);
            Ok(())
        }
        Command::Interactive => {
            let mut store = open_store(&path)?;
            interactive::run_interactive(&mut store, &config, &path)
        }
    }
}

fn open_store(path: &Path) -> Result<WeightStore> {
    load_store(path)
        .with_context(|| format!("Impossible de charger les poids depuis {}", path.display()))
}

pub(crate) fn cmd_generate(store: &WeightStore, race_type: RaceType, config: &EngineConfig) -> Result<()> {
    let candidates = generate_candidates(race_type, store, config);
    // Jamais vide avec la table de bornes actuelle (voir generate_in_bounds).
    if candidates.is_empty() {
        log::warn!("Aucune combinaison pour {race_type} {:?}", race_type.sum_bounds());
        println!("⚠️  Aucune combinaison dans les bornes pour ce type de course ({race_type}).");
        return Ok(());
    }
    display_candidates(race_type, count_qualifying(race_type), &candidates);
    Ok(())
}

pub(crate) fn cmd_learn(store: &mut WeightStore, input: &str, config: &EngineConfig, path: &Path) -> Result<()> {
    match learn_from_text(store, input, config, path) {
        Ok(report) => {
            println!("✅ Modèle mis à jour : le système s'améliore à chaque course");
            display_learn_report(&report, store);
            Ok(())
        }
        Err(e) if e.is_input_error() => bail!("❌ Format incorrect : {e}"),
        Err(e) => Err(e).context("Échec de la mise à jour des poids"),
    }
}

fn cmd_reset(path: &Path, yes: bool) -> Result<()> {
    if !yes {
        let confirm = prompt(&format!("Réinitialiser tous les poids dans {} ? (o/n) : ", path.display()))?;
        if confirm.to_lowercase() != "o" {
            println!("Réinitialisation annulée.");
            return Ok(());
        }
    }
    let store = reset_store(path).context("Échec de la réinitialisation")?;
    log::info!("Poids réinitialisés dans {}", path.display());
    println!("Poids réinitialisés.");
    display_weights(&store);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_race_labels_any_case() {
        let cases = [
            ("Plat", RaceType::Plat),
            ("plat", RaceType::Plat),
            ("Attelé", RaceType::Attele),
            ("attele", RaceType::Attele),
            ("HANDICAP", RaceType::Handicap),
            ("h", RaceType::Handicap),
        ];
        for (label, expected) in cases {
            let cli = Cli::try_parse_from(["lequinte", "generate", "--race", label]).unwrap();
            match cli.command {
                Command::Generate { race } => assert_eq!(race, expected, "label {label}"),
                _ => panic!("expected generate"),
            }
        }
    }

    #[test]
    fn test_cli_race_default_and_unknown() {
        let cli = Cli::try_parse_from(["lequinte", "generate"]).unwrap();
        match cli.command {
            Command::Generate { race } => assert_eq!(race, RaceType::Plat),
            _ => panic!("expected generate"),
        }
        assert!(Cli::try_parse_from(["lequinte", "generate", "--race", "galop"]).is_err());
    }

    #[test]
    fn test_cmd_generate_every_race() {
        let store = WeightStore::new();
        for race_type in RaceType::ALL {
            assert!(cmd_generate(&store, race_type, &EngineConfig::default()).is_ok());
        }
    }

    #[test]
    fn test_cli_parses_learn_and_global_store() {
        let cli = Cli::try_parse_from(["lequinte", "learn", "5/2/3/6/16", "--store", "w.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("w.json")));
        match cli.command {
            Command::Learn { result } => assert_eq!(result, "5/2/3/6/16"),
            _ => panic!("expected learn"),
        }
    }

    #[test]
    fn test_cmd_learn_rejects_short_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();
        let err = cmd_learn(&mut store, "5/2", &EngineConfig::default(), &path).unwrap_err();
        assert!(err.to_string().contains("Format incorrect"));
        assert!(!path.exists());
    }

    #[test]
    fn test_cmd_learn_updates_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        let mut store = WeightStore::new();
        cmd_learn(&mut store, "5/2/3/6/16", &EngineConfig::default(), &path).unwrap();
        assert_eq!(load_store(&path).unwrap(), store);
        assert!((store.get(5).unwrap() - 2.5).abs() < 1e-9);
    }
}
