pub mod patterns;
pub mod sampler;

use lotofacil_db::models::{DRAW_SIZE, NumberStats, POOL_SIZE};

/// Frequência de cada dezena (1-25) na janela. Dezenas ausentes ficam com
/// contagem zero; o domínio completo está sempre presente.
pub fn compute_frequency(draws: &[[u8; DRAW_SIZE]]) -> [u32; POOL_SIZE as usize] {
    let mut counts = [0u32; POOL_SIZE as usize];
    for draw in draws {
        for &n in draw {
            counts[(n - 1) as usize] += 1;
        }
    }
    counts
}

pub fn compute_stats(draws: &[[u8; DRAW_SIZE]]) -> Vec<NumberStats> {
    let freq = compute_frequency(draws);
    let mut stats: Vec<NumberStats> = (1..=POOL_SIZE)
        .map(|n| NumberStats {
            number: n,
            frequency: freq[(n - 1) as usize],
            gap: 0,
        })
        .collect();

    // O histórico é cronológico; o atraso conta a partir do concurso mais recente.
    for (i, draw) in draws.iter().rev().enumerate() {
        for &n in draw {
            let stat = &mut stats[(n - 1) as usize];
            if stat.gap == 0 {
                stat.gap = i as u32;
            }
        }
    }

    for stat in &mut stats {
        if stat.frequency == 0 {
            stat.gap = draws.len() as u32;
        }
    }

    stats
}

/// Soma das dezenas de cada concurso.
pub fn compute_sums(draws: &[[u8; DRAW_SIZE]]) -> Vec<u32> {
    draws
        .iter()
        .map(|draw| draw.iter().map(|&n| n as u32).sum())
        .collect()
}
