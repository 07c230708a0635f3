use cashball_db::models::{CASH_BALL_MAX, NumberStats};

/// Fréquence et retard de chaque numéro ; draws[0] = tirage le plus récent.
pub fn compute_stats(draws: &[[u8; 5]], pool_size: u8) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (1..=pool_size)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: 0,
        })
        .collect();
    let mut seen = vec![false; pool_size as usize];

    for (i, balls) in draws.iter().enumerate() {
        for &n in balls {
            let Some(idx) = (n as usize).checked_sub(1) else {
                continue;
            };
            if idx < stats.len() {
                stats[idx].frequency += 1;
                if !seen[idx] {
                    seen[idx] = true;
                    stats[idx].gap = i as u32;
                }
            }
        }
    }

    for (stat, &was_seen) in stats.iter_mut().zip(&seen) {
        if !was_seen {
            stat.gap = draws.len() as u32;
        }
    }

    stats
}

/// Nombre de tirages par cash ball (index 0 = cash ball 1).
pub fn cash_ball_counts(labels: &[u8]) -> [u32; CASH_BALL_MAX as usize] {
    let mut counts = [0u32; CASH_BALL_MAX as usize];
    for &label in labels {
        if (1..=CASH_BALL_MAX).contains(&label) {
            counts[(label - 1) as usize] += 1;
        }
    }
    counts
}
