use chrono::Datelike;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use cashball_db::DatasetError;
use cashball_db::models::{BALL_MAX, BALL_MIN, Ticket};

use crate::error::PredictError;

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Complète la boule du modèle avec quatre numéros distincts tirés uniformément
/// parmi les 59 restants.
///
/// Les compagnes sont du pur hasard : elles ne sortent d'aucun modèle.
pub fn assemble_ticket<R: Rng + ?Sized>(
    model_ball: u8,
    rng: &mut R,
) -> Result<Ticket, PredictError> {
    if !(BALL_MIN..=BALL_MAX).contains(&model_ball) {
        return Err(DatasetError::BallOutOfRange {
            position: 1,
            value: model_ball,
        }
        .into());
    }

    let remaining = (BALL_MAX - BALL_MIN) as usize;
    let picks = rand::seq::index::sample(rng, remaining, 4);

    let mut companions = [0u8; 4];
    for (slot, idx) in companions.iter_mut().zip(picks.into_iter()) {
        // idx parcourt [1, 60] privé de model_ball
        let number = idx as u8 + BALL_MIN;
        *slot = if number >= model_ball { number + 1 } else { number };
    }
    companions.sort();

    Ok(Ticket {
        model_ball,
        companions,
    })
}
