mod analysis;
mod display;
mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cashball_db::{Dataset, Source};
use cashball_db::dataset::{default_data_path, load_dataset};
use cashball_db::models::{BALL_MAX, parse_draw_date};
use cashball_model::{EvaluationMode, Predictor, PredictorConfig};
use cashball_model::regression::fit_regressor;
use cashball_model::ticket::{date_seed, make_rng};

use crate::analysis::{cash_ball_counts, compute_stats};

#[derive(Parser)]
#[command(
    name = "cashball",
    about = "Analyseur de tirages Cash4Life (régression linéaire et arbre de décision)"
)]
struct Cli {
    /// Fichier CSV des tirages (défaut : data/cash4life.csv)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Configuration JSON du prédicteur
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mode d'évaluation des modèles (remplace la configuration)
    #[arg(long, global = true)]
    eval: Option<EvaluationMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Résumé du jeu de données
    Summary,

    /// Lister les derniers tirages
    History {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Fréquences des boules et répartition des cash balls
    Stats {
        /// Fenêtre d'analyse (défaut : tous les tirages)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Prédire la première boule pour une date
    Regress {
        /// Date (AAAA-MM-JJ ou MM/JJ/AAAA, défaut : aujourd'hui)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Prédire la cash ball à partir de 5 boules
    Classify {
        /// 5 boules (1-60)
        balls: Vec<u8>,
    },

    /// Générer une grille : boule du modèle + 4 numéros au hasard
    Ticket {
        /// Date du tirage visé (défaut : aujourd'hui)
        #[arg(short, long)]
        date: Option<String>,

        /// Seed pour la reproductibilité (défaut : configuration, sinon date du jour)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Graphique de la première boule dans le temps
    Chart,

    /// Mode interactif (REPL)
    Interactive,

    /// Afficher la configuration effective en JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.eval)?;

    match cli.command {
        Command::Config => cmd_config(&config),
        command => {
            let path = cli.file.unwrap_or_else(default_data_path);
            let dataset = load_source(&path, &config)?;
            run(command, &dataset, &path, &config)
        }
    }
}

fn run(command: Command, dataset: &Dataset, path: &Path, config: &PredictorConfig) -> Result<()> {
    match command {
        Command::Summary => cmd_summary(dataset, path),
        Command::History { last } => cmd_history(dataset, last),
        Command::Stats { window } => cmd_stats(dataset, window),
        Command::Regress { date } => cmd_regress(dataset, config, date.as_deref()),
        Command::Classify { balls } => cmd_classify(dataset, config, &balls),
        Command::Ticket { date, seed } => cmd_ticket(dataset, config, date.as_deref(), seed),
        Command::Chart => cmd_chart(dataset, config),
        Command::Interactive => interactive::run_interactive(dataset, path, config),
        Command::Config => cmd_config(config),
    }
}

fn load_config(path: Option<&Path>, eval: Option<EvaluationMode>) -> Result<PredictorConfig> {
    let mut config = match path {
        Some(p) => PredictorConfig::from_json_file(p)?,
        None => PredictorConfig::default(),
    };
    if let Some(mode) = eval {
        config.evaluation = mode;
    }
    Ok(config)
}

fn load_source(path: &Path, config: &PredictorConfig) -> Result<Dataset> {
    let source = load_dataset(path, &config.columns)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    match source {
        Source::Loaded(dataset) => Ok(dataset),
        Source::Missing { path, reason } => bail!(
            "Fichier de tirages introuvable : {} ({reason}). Indiquez-le avec --file.",
            path.display()
        ),
    }
}

/// Contrôle préalable aux commandes qui exploitent les boules.
fn require_valid(dataset: &Dataset) -> Result<()> {
    dataset.validate().context("Jeu de données invalide")?;
    if dataset.is_empty() {
        bail!("Aucun tirage dans le fichier.");
    }
    Ok(())
}

fn parse_date_arg(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => parse_draw_date(s)
            .with_context(|| format!("Date invalide '{}' (AAAA-MM-JJ ou MM/JJ/AAAA)", s)),
    }
}

fn parse_balls(numbers: &[u8]) -> Result<[u8; 5]> {
    if numbers.len() != 5 {
        bail!("Attendu 5 boules. Reçu : {}", numbers.len());
    }
    Ok([numbers[0], numbers[1], numbers[2], numbers[3], numbers[4]])
}

pub(crate) fn cmd_summary(dataset: &Dataset, path: &Path) -> Result<()> {
    display::display_summary(dataset, path);
    Ok(())
}

pub(crate) fn cmd_history(dataset: &Dataset, last: usize) -> Result<()> {
    display::display_draws(dataset, last);
    Ok(())
}

pub(crate) fn cmd_stats(dataset: &Dataset, window: Option<usize>) -> Result<()> {
    require_valid(dataset)?;
    let effective_window = window.unwrap_or(dataset.len()).min(dataset.len());

    // Du plus récent au plus ancien
    let balls: Vec<[u8; 5]> = dataset
        .balls()?
        .iter()
        .rev()
        .take(effective_window)
        .copied()
        .collect();
    let labels: Vec<u8> = dataset
        .records()
        .iter()
        .rev()
        .take(effective_window)
        .map(|r| r.cash_ball)
        .collect();

    let ball_stats = compute_stats(&balls, BALL_MAX);
    let cash_counts = cash_ball_counts(&labels);
    display::display_stats(&ball_stats, &cash_counts, effective_window);
    Ok(())
}

pub(crate) fn cmd_regress(
    dataset: &Dataset,
    config: &PredictorConfig,
    date: Option<&str>,
) -> Result<()> {
    require_valid(dataset)?;
    let date = parse_date_arg(date)?;
    let predictor = Predictor::new(dataset, config.clone());
    let prediction = predictor.predict_ball(date)?;
    display::display_ball_prediction(&prediction);
    Ok(())
}

pub(crate) fn cmd_classify(
    dataset: &Dataset,
    config: &PredictorConfig,
    numbers: &[u8],
) -> Result<()> {
    let balls = parse_balls(numbers)?;
    require_valid(dataset)?;
    let predictor = Predictor::new(dataset, config.clone());
    let prediction = predictor.predict_cash_ball(&balls)?;
    display::display_cash_prediction(&prediction);
    Ok(())
}

pub(crate) fn cmd_ticket(
    dataset: &Dataset,
    config: &PredictorConfig,
    date: Option<&str>,
    seed: Option<u64>,
) -> Result<()> {
    require_valid(dataset)?;
    let date = parse_date_arg(date)?;

    let predictor = Predictor::new(dataset, config.clone());
    let effective_seed = seed.or(predictor.config().ticket_seed).unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed du jour : {ds})");
        ds
    });
    let mut rng = make_rng(Some(effective_seed));

    let ticket = predictor.ticket(date, &mut rng)?;
    let cash = predictor.predict_cash_ball(&ticket.ticket.numbers())?;
    display::display_ticket(&ticket, Some(&cash));
    Ok(())
}

pub(crate) fn cmd_chart(dataset: &Dataset, config: &PredictorConfig) -> Result<()> {
    require_valid(dataset)?;
    let fit = fit_regressor(dataset, config)?;
    display::display_trend_chart(dataset, dataset.balls()?, &fit);
    Ok(())
}

fn cmd_config(config: &PredictorConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    println!("{json}");
    Ok(())
}
