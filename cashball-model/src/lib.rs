pub mod config;
pub mod error;
pub mod linalg;
pub mod metrics;
pub mod predictor;
pub mod regression;
pub mod split;
pub mod ticket;
pub mod tree;

pub use config::{EvaluationMode, PredictorConfig};
pub use error::PredictError;
pub use predictor::{BallPrediction, CashBallPrediction, Predictor, TicketPrediction};

use chrono::{Days, NaiveDate};

use cashball_db::Dataset;
use cashball_db::models::DrawRecord;

/// Jeu de données synthétique : un tirage tous les 3 jours depuis le 16/06/2014,
/// cash ball déterminée par la tranche de la première boule.
pub fn make_test_dataset(n: usize) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2014, 6, 16).unwrap_or_default();
    let records = (0..n)
        .map(|i| {
            let base = (i * 11 % 56) as u8 + 1;
            DrawRecord {
                date: start + Days::new(i as u64 * 3),
                winning_numbers: (base..base + 5)
                    .map(|b| b.to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                cash_ball: 1 + (base - 1) / 15,
            }
        })
        .collect();
    Dataset::prepare(records)
}
