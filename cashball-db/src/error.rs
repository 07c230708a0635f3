use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("colonne '{0}' absente de l'en-tête CSV")]
    MissingColumn(String),

    #[error("ligne {row} : date invalide '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("ligne {row} : cash ball invalide '{value}' (1-4 attendu)")]
    InvalidCashBall { row: usize, value: String },

    #[error("colonnes boules indisponibles (tirage {row} : {reason})")]
    MalformedBalls { row: usize, reason: String },

    #[error("boule {position} hors limites : {value} (1-60)")]
    BallOutOfRange { position: usize, value: u8 },

    #[error("lecture CSV impossible : {0}")]
    Csv(#[from] csv::Error),
}
