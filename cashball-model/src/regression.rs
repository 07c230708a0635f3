use chrono::NaiveDate;
use ndarray::{Array1, Array2};

use cashball_db::Dataset;
use cashball_db::models::{BALL_MAX, BALL_MIN, date_ordinal};

use crate::config::{EvaluationMode, PredictorConfig};
use crate::error::PredictError;
use crate::linalg::least_squares;
use crate::metrics::{mean_absolute_error, r_squared};
use crate::split::DataSplit;

/// Straight line over the date ordinal: `ball ≈ intercept + slope * (ordinal - center)`.
///
/// The ordinal is centered on the training mean so the normal equations stay
/// well conditioned with ordinals in the hundreds of thousands.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    intercept: f64,
    slope: f64,
    center: f64,
}

impl LinearRegressor {
    pub fn fit(ordinals: &[i64], targets: &[f64]) -> Result<Self, PredictError> {
        let n = ordinals.len();
        if n == 0 {
            return Err(PredictError::InsufficientData { needed: 2, got: 0 });
        }
        if ordinals.iter().all(|&o| o == ordinals[0]) {
            return Err(PredictError::DegenerateData(format!(
                "{n} draw(s) all on the same date, the slope is undefined"
            )));
        }

        let center = ordinals.iter().map(|&o| o as f64).sum::<f64>() / n as f64;
        let design = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                1.0
            } else {
                ordinals[i] as f64 - center
            }
        });
        let y = Array1::from_vec(targets.to_vec());
        let coefs = least_squares(&design, &y)?;

        log::debug!(
            "Regression fitted on {n} draws: intercept={:.4}, slope={:.6}/day",
            coefs[0],
            coefs[1]
        );

        Ok(Self {
            intercept: coefs[0],
            slope: coefs[1],
            center,
        })
    }

    pub fn slope_per_day(&self) -> f64 {
        self.slope
    }

    pub fn estimate(&self, ordinal: i64) -> f64 {
        self.intercept + self.slope * (ordinal as f64 - self.center)
    }

    pub fn estimate_date(&self, date: NaiveDate) -> f64 {
        self.estimate(date_ordinal(date))
    }

    pub fn predict_ball(&self, date: NaiveDate) -> u8 {
        clamp_ball(self.estimate_date(date))
    }
}

/// Round half to even, then clamp to [1, 60] on both sides.
pub fn clamp_ball(estimate: f64) -> u8 {
    if estimate.is_nan() {
        return BALL_MIN;
    }
    estimate
        .round_ties_even()
        .clamp(BALL_MIN as f64, BALL_MAX as f64) as u8
}

#[derive(Debug, Clone)]
pub struct RegressionFit {
    pub model: LinearRegressor,
    pub mode: EvaluationMode,
    /// `None` when fewer than two draws were scored.
    pub r_squared: Option<f64>,
    pub mean_absolute_error: f64,
    pub train_size: usize,
    pub eval_size: usize,
}

/// Fit date → first ball on the dataset and score it according to the configured mode.
pub fn fit_regressor(
    dataset: &Dataset,
    config: &PredictorConfig,
) -> Result<RegressionFit, PredictError> {
    let balls = dataset.balls()?;
    let ordinals = dataset.ordinals();
    let targets: Vec<f64> = balls.iter().map(|b| b[0] as f64).collect();

    let split = match config.evaluation {
        EvaluationMode::Full => DataSplit::full(dataset.len()),
        EvaluationMode::Holdout => {
            DataSplit::holdout(dataset.len(), config.holdout_fraction, config.holdout_seed)?
        }
    };

    let train_x: Vec<i64> = split.train.iter().map(|&i| ordinals[i]).collect();
    let train_y: Vec<f64> = split.train.iter().map(|&i| targets[i]).collect();
    let model = LinearRegressor::fit(&train_x, &train_y)?;

    let eval_y: Vec<f64> = split.test.iter().map(|&i| targets[i]).collect();
    let eval_pred: Vec<f64> = split.test.iter().map(|&i| model.estimate(ordinals[i])).collect();

    Ok(RegressionFit {
        model,
        mode: config.evaluation,
        r_squared: r_squared(&eval_y, &eval_pred),
        mean_absolute_error: mean_absolute_error(&eval_y, &eval_pred),
        train_size: split.train.len(),
        eval_size: split.test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_dataset;
    use cashball_db::models::DrawRecord;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fit_exact_line() {
        let ordinals = [100, 110, 120, 130];
        let targets = [10.0, 20.0, 30.0, 40.0];
        let model = LinearRegressor::fit(&ordinals, &targets).unwrap();
        assert!((model.slope_per_day() - 1.0).abs() < 1e-9);
        assert!((model.estimate(140) - 50.0).abs() < 1e-9);
        assert!((model.estimate(105) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_ball_bounds() {
        assert_eq!(clamp_ball(-12.3), 1);
        assert_eq!(clamp_ball(0.4), 1);
        assert_eq!(clamp_ball(60.4), 60);
        assert_eq!(clamp_ball(1e9), 60);
        assert_eq!(clamp_ball(f64::NEG_INFINITY), 1);
        assert_eq!(clamp_ball(f64::NAN), 1);
    }

    #[test]
    fn test_clamp_ball_rounds_half_to_even() {
        assert_eq!(clamp_ball(22.5), 22);
        assert_eq!(clamp_ball(23.5), 24);
        assert_eq!(clamp_ball(22.51), 23);
    }

    #[test]
    fn test_prediction_always_in_range() {
        let dataset = make_test_dataset(80);
        let fit = fit_regressor(&dataset, &PredictorConfig::default()).unwrap();
        for date in [day(1900, 1, 1), day(2014, 6, 1), day(2020, 2, 29), day(2400, 12, 31)] {
            let ball = fit.model.predict_ball(date);
            assert!((1..=60).contains(&ball), "{date}: {ball}");
        }
    }

    #[test]
    fn test_steep_trend_extrapolation_is_clamped() {
        let records: Vec<DrawRecord> = (0..10)
            .map(|i| DrawRecord {
                date: day(2014, 6, 1) + chrono::Days::new(i * 7),
                winning_numbers: format!("{} 2 3 4 5", 10 + i * 5),
                cash_ball: 1,
            })
            .collect();
        let dataset = Dataset::prepare(records);
        let fit = fit_regressor(&dataset, &PredictorConfig::default()).unwrap();
        assert!(fit.model.estimate_date(day(2030, 1, 1)) > 60.0);
        assert_eq!(fit.model.predict_ball(day(2030, 1, 1)), 60);
        assert!(fit.model.estimate_date(day(2000, 1, 1)) < 1.0);
        assert_eq!(fit.model.predict_ball(day(2000, 1, 1)), 1);
        assert!((fit.r_squared.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_idempotent() {
        let dataset = make_test_dataset(50);
        let config = PredictorConfig::default();
        let date = day(2026, 10, 18);
        let a = fit_regressor(&dataset, &config).unwrap().model.predict_ball(date);
        let b = fit_regressor(&dataset, &config).unwrap().model.predict_ball(date);
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_record_is_degenerate() {
        let dataset = Dataset::prepare(vec![DrawRecord {
            date: day(2014, 6, 1),
            winning_numbers: "1 2 3 4 5".to_string(),
            cash_ball: 2,
        }]);
        let err = fit_regressor(&dataset, &PredictorConfig::default()).unwrap_err();
        assert!(matches!(err, PredictError::DegenerateData(_)), "{err:?}");
    }

    #[test]
    fn test_same_date_is_degenerate() {
        let records = (0..3)
            .map(|i| DrawRecord {
                date: day(2014, 6, 1),
                winning_numbers: format!("{} 2 3 4 5", i + 1),
                cash_ball: 1,
            })
            .collect();
        let dataset = Dataset::prepare(records);
        assert!(matches!(
            fit_regressor(&dataset, &PredictorConfig::default()),
            Err(PredictError::DegenerateData(_))
        ));
    }

    #[test]
    fn test_empty_dataset_is_insufficient() {
        let dataset = Dataset::prepare(Vec::new());
        assert!(matches!(
            fit_regressor(&dataset, &PredictorConfig::default()),
            Err(PredictError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_malformed_balls_is_precondition_error() {
        let records = vec![
            DrawRecord {
                date: day(2014, 6, 1),
                winning_numbers: "1 2 3".to_string(),
                cash_ball: 2,
            },
            DrawRecord {
                date: day(2014, 6, 5),
                winning_numbers: "4 5 6".to_string(),
                cash_ball: 3,
            },
        ];
        let dataset = Dataset::prepare(records);
        assert!(matches!(
            fit_regressor(&dataset, &PredictorConfig::default()),
            Err(PredictError::Dataset(cashball_db::DatasetError::MalformedBalls { .. }))
        ));
    }

    #[test]
    fn test_holdout_mode_scores_on_held_out_part() {
        let dataset = make_test_dataset(50);
        let config = PredictorConfig {
            evaluation: EvaluationMode::Holdout,
            ..Default::default()
        };
        let fit = fit_regressor(&dataset, &config).unwrap();
        assert_eq!(fit.mode, EvaluationMode::Holdout);
        assert_eq!(fit.eval_size, 10);
        assert_eq!(fit.train_size, 40);
        assert!(fit.r_squared.unwrap().is_finite());
    }

    #[test]
    fn test_full_mode_r_squared_bounds() {
        let dataset = make_test_dataset(60);
        let fit = fit_regressor(&dataset, &PredictorConfig::default()).unwrap();
        assert_eq!(fit.train_size, 60);
        assert_eq!(fit.eval_size, 60);
        // Least squares with an intercept never does worse than the mean on its own training data.
        let r2 = fit.r_squared.unwrap();
        assert!((-1e-9..=1.0 + 1e-9).contains(&r2), "{r2}");
        assert!(fit.mean_absolute_error >= 0.0);
    }

    #[test]
    fn test_single_held_out_draw_has_no_r_squared() {
        let dataset = make_test_dataset(4);
        let config = PredictorConfig {
            evaluation: EvaluationMode::Holdout,
            ..Default::default()
        };
        let fit = fit_regressor(&dataset, &config).unwrap();
        assert_eq!(fit.eval_size, 1);
        assert_eq!(fit.train_size, 3);
        assert_eq!(fit.r_squared, None);
        assert!(fit.mean_absolute_error.is_finite());
    }
}
