use chrono::{Datelike, NaiveDate};

use crate::error::DatasetError;

pub const BALL_MIN: u8 = 1;
pub const BALL_MAX: u8 = 60;
pub const BALLS_PER_DRAW: usize = 5;
pub const CASH_BALL_MIN: u8 = 1;
pub const CASH_BALL_MAX: u8 = 4;

/// Formats acceptés pour la colonne date (export officiel puis ISO).
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub date: NaiveDate,
    pub winning_numbers: String,
    pub cash_ball: u8,
}

/// Colonnes boules dérivées du texte brut, tout ou rien pour le jeu de données.
#[derive(Debug, Clone, PartialEq)]
pub enum BallColumns {
    Present(Vec<[u8; 5]>),
    Absent { row: usize, reason: String },
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

/// Une grille affichée : une boule issue du modèle et quatre compagnes tirées au hasard.
///
/// Les compagnes ne sont pas une prédiction : elles complètent la grille pour l'affichage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub model_ball: u8,
    pub companions: [u8; 4],
}

impl Ticket {
    /// Les cinq numéros triés par ordre croissant.
    pub fn numbers(&self) -> [u8; 5] {
        let mut numbers = [
            self.model_ball,
            self.companions[0],
            self.companions[1],
            self.companions[2],
            self.companions[3],
        ];
        numbers.sort();
        numbers
    }
}

/// Days since 0001-01-01 (proleptic Gregorian), day one being 1.
pub fn date_ordinal(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64
}

pub fn parse_draw_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Découpe le texte des numéros gagnants en exactement cinq entiers.
///
/// La plage n'est pas vérifiée ici : seule la forme du texte compte.
pub fn tokenize_balls(raw: &str) -> Result<[u8; 5], String> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != BALLS_PER_DRAW {
        return Err(format!(
            "{} numéros trouvés dans '{}', {} attendus",
            tokens.len(),
            raw.trim(),
            BALLS_PER_DRAW
        ));
    }
    let mut balls = [0u8; 5];
    for (slot, token) in balls.iter_mut().zip(&tokens) {
        *slot = token
            .parse::<u8>()
            .map_err(|_| format!("numéro invalide '{}' dans '{}'", token, raw.trim()))?;
    }
    Ok(balls)
}

pub fn validate_balls(balls: &[u8; 5]) -> Result<(), DatasetError> {
    for (position, &value) in balls.iter().enumerate() {
        if !(BALL_MIN..=BALL_MAX).contains(&value) {
            return Err(DatasetError::BallOutOfRange {
                position: position + 1,
                value,
            });
        }
    }
    Ok(())
}

pub fn validate_cash_ball(value: u8) -> bool {
    (CASH_BALL_MIN..=CASH_BALL_MAX).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_balls_ok() {
        assert_eq!(tokenize_balls("10 20 30 40 50").unwrap(), [10, 20, 30, 40, 50]);
        assert_eq!(tokenize_balls("  1  2 3\t4 60 ").unwrap(), [1, 2, 3, 4, 60]);
    }

    #[test]
    fn test_tokenize_balls_wrong_count() {
        assert!(tokenize_balls("1 2 3").is_err());
        assert!(tokenize_balls("1 2 3 4 5 6").is_err());
        assert!(tokenize_balls("").is_err());
    }

    #[test]
    fn test_tokenize_balls_not_numeric() {
        let err = tokenize_balls("1 2 x 4 5").unwrap_err();
        assert!(err.contains("'x'"), "{err}");
        assert!(tokenize_balls("1 2 3 4 300").is_err());
    }

    #[test]
    fn test_validate_balls_range() {
        assert!(validate_balls(&[1, 2, 3, 4, 60]).is_ok());
        assert!(matches!(
            validate_balls(&[1, 2, 0, 4, 5]),
            Err(DatasetError::BallOutOfRange { position: 3, value: 0 })
        ));
        assert!(validate_balls(&[1, 2, 3, 4, 61]).is_err());
    }

    #[test]
    fn test_validate_cash_ball() {
        assert!(validate_cash_ball(1));
        assert!(validate_cash_ball(4));
        assert!(!validate_cash_ball(0));
        assert!(!validate_cash_ball(5));
    }

    #[test]
    fn test_parse_draw_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2014, 6, 16).unwrap();
        assert_eq!(parse_draw_date("06/16/2014"), Some(expected));
        assert_eq!(parse_draw_date("2014-06-16"), Some(expected));
        assert_eq!(parse_draw_date("16.06.2014"), None);
    }

    #[test]
    fn test_date_ordinal_monotonic() {
        let a = NaiveDate::from_ymd_opt(2014, 6, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2014, 6, 2).unwrap();
        assert_eq!(date_ordinal(b) - date_ordinal(a), 1);
        assert_eq!(date_ordinal(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()), 1);
    }

    #[test]
    fn test_ticket_numbers_sorted() {
        let ticket = Ticket {
            model_ball: 30,
            companions: [55, 2, 41, 7],
        };
        assert_eq!(ticket.numbers(), [2, 7, 30, 41, 55]);
    }
}
