use chrono::NaiveDate;
use rand::Rng;

use cashball_db::Dataset;
use cashball_db::models::Ticket;

use crate::config::{EvaluationMode, PredictorConfig};
use crate::error::PredictError;
use crate::regression::fit_regressor;
use crate::ticket::assemble_ticket;
use crate::tree::{N_CLASSES, fit_classifier};

#[derive(Debug, Clone)]
pub struct BallPrediction {
    pub date: NaiveDate,
    pub estimate: f64,
    pub ball: u8,
    pub slope_per_day: f64,
    pub r_squared: Option<f64>,
    pub mean_absolute_error: f64,
    pub mode: EvaluationMode,
    pub train_size: usize,
    pub eval_size: usize,
}

#[derive(Debug, Clone)]
pub struct CashBallPrediction {
    pub balls: [u8; 5],
    pub label: u8,
    pub probabilities: [f64; N_CLASSES],
    pub accuracy: f64,
    pub depth: usize,
    pub mode: EvaluationMode,
    pub train_size: usize,
    pub eval_size: usize,
}

#[derive(Debug, Clone)]
pub struct TicketPrediction {
    pub ticket: Ticket,
    pub ball: BallPrediction,
}

/// Requêtes de prédiction sur un jeu de données figé.
///
/// Chaque appel réentraîne le modèle concerné ; rien n'est conservé entre deux appels.
pub struct Predictor<'a> {
    dataset: &'a Dataset,
    config: PredictorConfig,
}

impl<'a> Predictor<'a> {
    pub fn new(dataset: &'a Dataset, config: PredictorConfig) -> Self {
        Self { dataset, config }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn predict_ball(&self, date: NaiveDate) -> Result<BallPrediction, PredictError> {
        let fit = fit_regressor(self.dataset, &self.config)?;
        Ok(BallPrediction {
            date,
            estimate: fit.model.estimate_date(date),
            ball: fit.model.predict_ball(date),
            slope_per_day: fit.model.slope_per_day(),
            r_squared: fit.r_squared,
            mean_absolute_error: fit.mean_absolute_error,
            mode: fit.mode,
            train_size: fit.train_size,
            eval_size: fit.eval_size,
        })
    }

    pub fn predict_cash_ball(&self, balls: &[u8; 5]) -> Result<CashBallPrediction, PredictError> {
        cashball_db::models::validate_balls(balls)?;
        let fit = fit_classifier(self.dataset, &self.config)?;
        let prediction = fit.model.predict(balls)?;
        Ok(CashBallPrediction {
            balls: *balls,
            label: prediction.label,
            probabilities: prediction.probabilities,
            accuracy: fit.accuracy,
            depth: fit.model.depth(),
            mode: fit.mode,
            train_size: fit.train_size,
            eval_size: fit.eval_size,
        })
    }

    /// Boule du modèle pour `date` plus quatre compagnes aléatoires.
    pub fn ticket<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<TicketPrediction, PredictError> {
        let ball = self.predict_ball(date)?;
        let ticket = assemble_ticket(ball.ball, rng)?;
        Ok(TicketPrediction { ticket, ball })
    }
}
