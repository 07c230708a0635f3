use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use cashball_db::Dataset;
use cashball_db::models::validate_balls;
use cashball_model::PredictorConfig;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Regress,
    Classify,
    Ticket,
    History,
    Stats,
    Chart,
    Summary,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "regression" | "régression" | "regress" | "reg" => Some(InteractiveCommand::Regress),
        "2" | "classer" | "classify" | "cls" => Some(InteractiveCommand::Classify),
        "3" | "grille" | "ticket" => Some(InteractiveCommand::Ticket),
        "4" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "5" | "statistiques" | "stats" => Some(InteractiveCommand::Stats),
        "6" | "graphique" | "chart" => Some(InteractiveCommand::Chart),
        "7" | "resume" | "résumé" | "summary" => Some(InteractiveCommand::Summary),
        "8" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  1. regression   Prédire la première boule pour une date");
    println!("  2. classer      Prédire la cash ball de 5 boules");
    println!("  3. grille       Générer une grille");
    println!("  4. historique   Derniers tirages");
    println!("  5. stats        Fréquences et retards");
    println!("  6. graphique    Première boule dans le temps");
    println!("  7. resume       Résumé du jeu de données");
    println!("  8. quitter      Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de l'entrée standard");
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

fn parse_ball_line(input: &str) -> Option<[u8; 5]> {
    let nums: Vec<u8> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if nums.len() != 5 {
        return None;
    }
    let arr = [nums[0], nums[1], nums[2], nums[3], nums[4]];
    validate_balls(&arr).ok()?;
    Some(arr)
}

fn prompt_balls() -> Result<[u8; 5]> {
    loop {
        let input = prompt("5 boules (séparées par des espaces, 1-60) : ")?;
        match parse_ball_line(&input) {
            Some(balls) => return Ok(balls),
            None => println!("Entrez exactement 5 numéros entre 1 et 60. Réessayez."),
        }
    }
}

fn prompt_date() -> Result<Option<String>> {
    let raw = prompt_with_default("Date (AAAA-MM-JJ ou MM/JJ/AAAA)", "aujourd'hui")?;
    if raw == "aujourd'hui" {
        Ok(None)
    } else {
        Ok(Some(raw))
    }
}

fn cmd_regress_interactive(dataset: &Dataset, config: &PredictorConfig) -> Result<()> {
    let date = prompt_date()?;
    super::cmd_regress(dataset, config, date.as_deref())
}

fn cmd_classify_interactive(dataset: &Dataset, config: &PredictorConfig) -> Result<()> {
    let balls = prompt_balls()?;
    super::cmd_classify(dataset, config, &balls)
}

fn cmd_ticket_interactive(dataset: &Dataset, config: &PredictorConfig) -> Result<()> {
    let date = prompt_date()?;

    let seed_str = prompt_with_default("Seed (vide = date du jour)", "")?;
    let seed: Option<u64> = if seed_str.is_empty() {
        None
    } else {
        Some(seed_str.parse().context("Seed invalide")?)
    };

    super::cmd_ticket(dataset, config, date.as_deref(), seed)
}

fn cmd_history_interactive(dataset: &Dataset) -> Result<()> {
    let n_str = prompt_with_default("Nombre de tirages", "10")?;
    let n: usize = n_str.parse().context("Nombre invalide")?;
    super::cmd_history(dataset, n)
}

fn cmd_stats_interactive(dataset: &Dataset) -> Result<()> {
    let default = dataset.len().to_string();
    let n_str = prompt_with_default("Fenêtre (nombre de tirages)", &default)?;
    let window: usize = n_str.parse().context("Nombre invalide")?;
    super::cmd_stats(dataset, Some(window))
}

/// Boucle interactive ; le jeu de données est chargé une seule fois par l'appelant.
pub fn run_interactive(dataset: &Dataset, path: &Path, config: &PredictorConfig) -> Result<()> {
    println!("Bienvenue dans le mode interactif de cashball !");
    println!("{} tirages chargés depuis {}", dataset.len(), path.display());

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Regress) => cmd_regress_interactive(dataset, config),
            Some(InteractiveCommand::Classify) => cmd_classify_interactive(dataset, config),
            Some(InteractiveCommand::Ticket) => cmd_ticket_interactive(dataset, config),
            Some(InteractiveCommand::History) => cmd_history_interactive(dataset),
            Some(InteractiveCommand::Stats) => cmd_stats_interactive(dataset),
            Some(InteractiveCommand::Chart) => super::cmd_chart(dataset, config),
            Some(InteractiveCommand::Summary) => super::cmd_summary(dataset, path),
            None => {
                println!("Commande inconnue : '{}'. Tapez un numéro (1-8) ou un nom.", input);
                Ok(())
            }
        };

        if let Err(e) = result {
            log::debug!("commande interactive en échec : {e:?}");
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
