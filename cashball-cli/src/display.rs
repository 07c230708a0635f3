use std::path::Path;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use textplots::Plot;

use cashball_db::Dataset;
use cashball_db::models::{BallColumns, NumberStats};
use cashball_model::{BallPrediction, CashBallPrediction, TicketPrediction};
use cashball_model::regression::RegressionFit;

fn join_balls(balls: &[u8]) -> String {
    balls
        .iter()
        .map(|b| format!("{:2}", b))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// R² non défini sous deux tirages évalués.
fn format_r2(r2: Option<f64>) -> String {
    match r2 {
        Some(v) => format!("{:.4}", v),
        None => "n/a".to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn display_summary(dataset: &Dataset, path: &Path) {
    println!("\n== Jeu de données ==\n");

    let mut table = new_table();
    table.set_header(vec!["Champ", "Valeur"]);
    table.add_row(vec!["Fichier".to_string(), path.display().to_string()]);
    table.add_row(vec!["Tirages".to_string(), dataset.len().to_string()]);

    let span = match dataset.date_span() {
        Some((first, last)) => format!("{first} → {last}"),
        None => "—".to_string(),
    };
    table.add_row(vec!["Période".to_string(), span]);
    table.add_row(vec!["Empreinte".to_string(), format!("{:016x}", dataset.fingerprint())]);

    let status = match dataset.ball_columns() {
        BallColumns::Present(_) => Cell::new("OK").fg(Color::Green),
        BallColumns::Absent { row, reason } => {
            Cell::new(format!("ABSENTES (tirage {row} : {reason})")).fg(Color::Red)
        }
    };
    table.add_row(vec![Cell::new("Colonnes boules"), status]);

    println!("{table}");
}

pub fn display_draws(dataset: &Dataset, last: usize) {
    if dataset.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec!["Date", "Boules", "Cash Ball"]);

    let balls = dataset.balls().ok();
    for (i, record) in dataset.records().iter().enumerate().rev().take(last) {
        let balls_str = match balls {
            Some(balls) => {
                let mut sorted = balls[i];
                sorted.sort();
                join_balls(&sorted)
            }
            None => record.winning_numbers.clone(),
        };
        table.add_row(vec![
            record.date.format("%Y-%m-%d").to_string(),
            balls_str,
            record.cash_ball.to_string(),
        ]);
    }

    println!("{table}");
}

pub fn display_stats(ball_stats: &[NumberStats], cash_counts: &[u32], window: usize) {
    println!("\n📊 Statistiques sur les {} derniers tirages\n", window);

    println!("── Boules (1-60) ──");
    let mut table = new_table();
    table.set_header(vec!["Numéro", "Fréquence", "Retard"]);

    let mut sorted = ball_stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    for stat in &sorted {
        table.add_row(vec![
            format!("{:2}", stat.number),
            stat.frequency.to_string(),
            stat.gap.to_string(),
        ]);
    }
    println!("{table}");

    println!("\n── Cash Ball (1-4) ──");
    let mut table = new_table();
    table.set_header(vec!["Cash Ball", "Tirages", "Part", ""]);

    let total: u32 = cash_counts.iter().sum();
    for (i, &count) in cash_counts.iter().enumerate() {
        let share = if total > 0 { count as f64 / total as f64 } else { 0.0 };
        let bar = "█".repeat((share * 40.0).round() as usize);
        table.add_row(vec![
            (i + 1).to_string(),
            count.to_string(),
            format!("{:.1} %", share * 100.0),
            bar,
        ]);
    }
    println!("{table}");
}

pub fn display_ball_prediction(pred: &BallPrediction) {
    println!("\n📈 Régression linéaire (date → première boule)\n");

    let mut table = new_table();
    table.set_header(vec!["Métrique", "Valeur"]);
    table.add_row(vec![Cell::new("Date"), Cell::new(pred.date.to_string())]);
    table.add_row(vec![Cell::new("Estimation brute"), Cell::new(format!("{:.3}", pred.estimate))]);
    table.add_row(vec![
        Cell::new("Boule prédite"),
        Cell::new(pred.ball.to_string()).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Pente (par jour)"),
        Cell::new(format!("{:+.6}", pred.slope_per_day)),
    ]);
    table.add_row(vec![
        Cell::new(format!("R² ({})", pred.mode)),
        Cell::new(format_r2(pred.r_squared)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Erreur absolue moyenne ({})", pred.mode)),
        Cell::new(format!("{:.3}", pred.mean_absolute_error)),
    ]);
    table.add_row(vec![
        Cell::new("Tirages (entraînement / évaluation)"),
        Cell::new(format!("{} / {}", pred.train_size, pred.eval_size)),
    ]);
    println!("{table}");
}

pub fn display_cash_prediction(pred: &CashBallPrediction) {
    println!("\n🌳 Arbre de décision (5 boules → cash ball)\n");
    println!("  Boules : {}", join_balls(&pred.balls));
    println!(
        "  Cash ball prédite : {}   (précision {} : {:.1} %, profondeur {})",
        pred.label,
        pred.mode,
        pred.accuracy * 100.0,
        pred.depth
    );
    println!(
        "  Tirages : {} en entraînement, {} en évaluation",
        pred.train_size, pred.eval_size
    );

    let mut table = new_table();
    table.set_header(vec!["Cash Ball", "Confiance", ""]);
    for (i, &p) in pred.probabilities.iter().enumerate() {
        let label = i as u8 + 1;
        let bar = "█".repeat((p * 40.0).round() as usize);
        let color = if label == pred.label { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(label.to_string()).fg(color),
            Cell::new(format!("{:.4}", p)),
            Cell::new(bar),
        ]);
    }
    println!("{table}");
}

pub fn display_ticket(pred: &TicketPrediction, cash: Option<&CashBallPrediction>) {
    println!("\n🎲 Grille suggérée pour le {}\n", pred.ball.date);

    let mut table = new_table();
    table.set_header(vec!["Boules", "Cash Ball"]);
    // Boule du modèle entre crochets
    let balls_str = pred
        .ticket
        .numbers()
        .iter()
        .map(|&n| {
            if n == pred.ticket.model_ball {
                format!("[{:2}]", n)
            } else {
                format!("{:2}", n)
            }
        })
        .collect::<Vec<_>>()
        .join(" - ");

    let cash_str = cash.map(|c| c.label.to_string()).unwrap_or_else(|| "—".to_string());
    table.add_row(vec![balls_str, cash_str]);
    println!("{table}");

    println!(
        "  Seule la boule {} vient de la régression (R² {}), les quatre autres sont au hasard.",
        pred.ticket.model_ball,
        format_r2(pred.ball.r_squared)
    );
}

/// Nuage des premières boules et droite de régression, `None` sans tirage.
pub fn render_trend_chart(
    dataset: &Dataset,
    balls: &[[u8; 5]],
    fit: &RegressionFit,
) -> Option<String> {
    let ordinals = dataset.ordinals();
    let (&first, &last) = (ordinals.first()?, ordinals.last()?);

    let points: Vec<(f32, f32)> = ordinals
        .iter()
        .zip(balls)
        .map(|(&o, b)| ((o - first) as f32, b[0] as f32))
        .collect();
    let line: Vec<(f32, f32)> = [first, last]
        .iter()
        .map(|&o| ((o - first) as f32, fit.model.estimate(o) as f32))
        .collect();

    let scatter = textplots::Shape::Points(&points);
    let trend = textplots::Shape::Lines(&line);
    let x_max = ((last - first) as f32).max(1.0);
    let mut chart = textplots::Chart::new_with_y_range(120, 40, 0.0, x_max, 0.0, 61.0);
    let plotted = chart.lineplot(&scatter).lineplot(&trend);
    // Display n'affiche que le canevas : les formes sont tracées par figures()
    plotted.figures();
    Some(plotted.to_string())
}

pub fn display_trend_chart(dataset: &Dataset, balls: &[[u8; 5]], fit: &RegressionFit) {
    println!("\n== Première boule dans le temps ==\n");

    let Some(rendered) = render_trend_chart(dataset, balls, fit) else {
        println!("  (Pas de données à afficher)");
        return;
    };
    println!("{rendered}");
    println!(
        "  x : jours depuis le {}   y : première boule   R² ({}) = {}   ({} / {} tirages)",
        dataset.records()[0].date,
        fit.mode,
        format_r2(fit.r_squared),
        fit.train_size,
        fit.eval_size
    );
}
