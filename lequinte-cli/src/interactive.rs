use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use lequinte_db::models::RaceType;
use lequinte_db::store::WeightStore;
use lequinte_engine::config::EngineConfig;

use crate::display::display_weights;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Generate,
    Learn,
    Weights,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "generer" | "générer" | "generate" | "gen" | "top" => Some(InteractiveCommand::Generate),
        "2" | "apprendre" | "learn" | "resultat" | "résultat" => Some(InteractiveCommand::Learn),
        "3" | "poids" | "weights" => Some(InteractiveCommand::Weights),
        "4" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. generer    Top 10 pour un type de course");
    println!("  2. apprendre  Saisir le résultat réel");
    println!("  3. poids      Afficher les poids");
    println!("  4. quitter    Quitter");
    println!();
}

pub(crate) fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        anyhow::bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}] : ", msg, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn race_menu() -> String {
    RaceType::ALL
        .iter()
        .enumerate()
        .map(|(i, race)| {
            let (min, max) = race.sum_bounds();
            format!("{}={} ({}-{})", i + 1, race, min, max)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accepts a menu index ("2") or anything `RaceType` parses ("attelé", "H").
fn parse_race_choice(input: &str) -> Option<RaceType> {
    if let Ok(idx) = input.trim().parse::<usize>() {
        return idx.checked_sub(1).and_then(|i| RaceType::ALL.get(i).copied());
    }
    input.parse().ok()
}

fn prompt_race_type() -> Result<RaceType> {
    let menu = race_menu();
    loop {
        let input = prompt_with_default(&format!("Type de course ({menu})"), "1")?;
        match parse_race_choice(&input) {
            Some(race_type) => return Ok(race_type),
            None => println!("Type de course inconnu : '{input}'. Réessayez."),
        }
    }
}

fn cmd_generate_interactive(store: &WeightStore, config: &EngineConfig) -> Result<()> {
    let race_type = prompt_race_type()?;
    super::cmd_generate(store, race_type, config)
}

fn cmd_learn_interactive(store: &mut WeightStore, config: &EngineConfig, path: &Path) -> Result<()> {
    let input = prompt("Résultat réel (ex: 5/2/3/6/16) : ")?;
    super::cmd_learn(store, &input, config, path)
}

pub fn run_interactive(store: &mut WeightStore, config: &EngineConfig, path: &Path) -> Result<()> {
    println!("🐎 Bienvenue dans lequinte : le modèle apprend après chaque course.");

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Generate) => {
                if let Err(e) = cmd_generate_interactive(store, config) {
                    println!("Erreur: {e:#}");
                }
            }
            Some(InteractiveCommand::Learn) => {
                if let Err(e) = cmd_learn_interactive(store, config, path) {
                    println!("{e:#}");
                }
            }
            Some(InteractiveCommand::Weights) => display_weights(store),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-4) ou un nom de commande.", input);
            }
        }
    }

    Ok(())
}
