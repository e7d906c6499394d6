use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::Datelike;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::patterns::{GRID_SIDE, grid_col, grid_row};
use lotofacil_db::models::{DRAW_SIZE, POOL_SIZE};

/// Limite de tentativas da amostragem por rejeição.
const MAX_ATTEMPTS: usize = 100_000;

/// Menor soma possível de 15 dezenas distintas do volante (1+…+15).
pub const MIN_SUM: u32 = 120;
/// Maior soma possível (11+…+25).
pub const MAX_SUM: u32 = 270;

pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Seed determinístico baseado na data do dia (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

fn all_numbers() -> Vec<u8> {
    (1..=POOL_SIZE).collect()
}

/// Dezenas ordenadas por frequência; empates resolvidos pela menor dezena.
fn ranked_by_frequency(freq: &[u32; POOL_SIZE as usize], descending: bool) -> Vec<u8> {
    let mut numbers = all_numbers();
    numbers.sort_by(|a, b| {
        let fa = freq[(*a - 1) as usize];
        let fb = freq[(*b - 1) as usize];
        if descending {
            fb.cmp(&fa).then(a.cmp(b))
        } else {
            fa.cmp(&fb).then(a.cmp(b))
        }
    });
    numbers
}

fn sample_combination(pool: &[u8], rng: &mut StdRng) -> Result<[u8; DRAW_SIZE]> {
    if pool.len() < DRAW_SIZE {
        bail!(
            "Conjunto de candidatos insuficiente: {} dezenas (mínimo {})",
            pool.len(),
            DRAW_SIZE
        );
    }
    let mut combination = [0u8; DRAW_SIZE];
    for (slot, &n) in combination.iter_mut().zip(pool.choose_multiple(rng, DRAW_SIZE)) {
        *slot = n;
    }
    combination.sort();
    Ok(combination)
}

/// Combinação uniforme de 15 dezenas do volante.
pub fn random_combination(rng: &mut StdRng) -> [u8; DRAW_SIZE] {
    let numbers = all_numbers();
    let mut combination = [0u8; DRAW_SIZE];
    for (slot, &n) in combination.iter_mut().zip(numbers.choose_multiple(rng, DRAW_SIZE)) {
        *slot = n;
    }
    combination.sort();
    combination
}

/// Amostra 15 dezenas entre as `pool_size` mais frequentes.
pub fn most_frequent(
    freq: &[u32; POOL_SIZE as usize],
    pool_size: usize,
    rng: &mut StdRng,
) -> Result<[u8; DRAW_SIZE]> {
    if pool_size < DRAW_SIZE {
        bail!(
            "Conjunto de {} dezenas menor que uma aposta ({})",
            pool_size,
            DRAW_SIZE
        );
    }
    if pool_size > POOL_SIZE as usize {
        bail!(
            "Conjunto de {} dezenas maior que o volante ({})",
            pool_size,
            POOL_SIZE
        );
    }
    let ranked = ranked_by_frequency(freq, true);
    sample_combination(&ranked[..pool_size], rng)
}

/// Amostra 15 dezenas entre as `pool_size` menos frequentes.
pub fn least_frequent(
    freq: &[u32; POOL_SIZE as usize],
    pool_size: usize,
    rng: &mut StdRng,
) -> Result<[u8; DRAW_SIZE]> {
    if pool_size < DRAW_SIZE {
        bail!(
            "Conjunto de {} dezenas menor que uma aposta ({})",
            pool_size,
            DRAW_SIZE
        );
    }
    if pool_size > POOL_SIZE as usize {
        bail!(
            "Conjunto de {} dezenas maior que o volante ({})",
            pool_size,
            POOL_SIZE
        );
    }
    let ranked = ranked_by_frequency(freq, false);
    sample_combination(&ranked[..pool_size], rng)
}

/// Amostra 15 dezenas da união das `most` mais frequentes com as `least`
/// menos frequentes. Falha se a união não cobre uma aposta.
pub fn mix_frequencies(
    freq: &[u32; POOL_SIZE as usize],
    most: usize,
    least: usize,
    rng: &mut StdRng,
) -> Result<[u8; DRAW_SIZE]> {
    if most + least < DRAW_SIZE {
        bail!(
            "Mix de {} + {} dezenas não forma uma aposta de {}",
            most,
            least,
            DRAW_SIZE
        );
    }
    if most > POOL_SIZE as usize || least > POOL_SIZE as usize {
        bail!("Mix pede mais dezenas que o volante ({})", POOL_SIZE);
    }

    let top = ranked_by_frequency(freq, true);
    let bottom = ranked_by_frequency(freq, false);

    let mut pool: Vec<u8> = top[..most].to_vec();
    for &n in &bottom[..least] {
        if !pool.contains(&n) {
            pool.push(n);
        }
    }
    if pool.len() < DRAW_SIZE {
        bail!(
            "Conjuntos mais/menos frequentes se sobrepõem: {} dezenas distintas (mínimo {})",
            pool.len(),
            DRAW_SIZE
        );
    }
    sample_combination(&pool, rng)
}

/// Amostragem por rejeição até a soma cair na faixa pedida.
pub fn by_sum_range(min_sum: u32, max_sum: u32, rng: &mut StdRng) -> Result<[u8; DRAW_SIZE]> {
    if min_sum > max_sum {
        bail!("Faixa de soma invertida: {} > {}", min_sum, max_sum);
    }
    if max_sum < MIN_SUM || min_sum > MAX_SUM {
        bail!(
            "Faixa de soma inviável: [{}, {}] não intercepta [{}, {}]",
            min_sum,
            max_sum,
            MIN_SUM,
            MAX_SUM
        );
    }

    for _ in 0..MAX_ATTEMPTS {
        let combination = random_combination(rng);
        let sum: u32 = combination.iter().map(|&n| n as u32).sum();
        if sum >= min_sum && sum <= max_sum {
            return Ok(combination);
        }
    }
    bail!(
        "Faixa de soma [{}, {}] não alcançada em {} tentativas",
        min_sum,
        max_sum,
        MAX_ATTEMPTS
    )
}

/// Amostragem por rejeição até a maioria pedida: mais de 6 pares
/// (ou mais de 6 ímpares).
pub fn by_parity(prefer_even: bool, rng: &mut StdRng) -> Result<[u8; DRAW_SIZE]> {
    for _ in 0..MAX_ATTEMPTS {
        let combination = random_combination(rng);
        let even = combination.iter().filter(|&&n| n % 2 == 0).count();
        let odd = DRAW_SIZE - even;
        if (prefer_even && even > 6) || (!prefer_even && odd > 6) {
            return Ok(combination);
        }
    }
    bail!("Paridade desejada não alcançada em {} tentativas", MAX_ATTEMPTS)
}

/// Cotas por linha do volante 5×5, completadas por dezenas das colunas
/// permitidas em ordem aleatória.
pub fn by_grid(
    row_targets: &BTreeMap<usize, usize>,
    allowed_columns: &[usize],
    rng: &mut StdRng,
) -> Result<[u8; DRAW_SIZE]> {
    let mut quota = 0usize;
    for (&row, &count) in row_targets {
        if row >= GRID_SIDE {
            bail!("Linha {} inexistente no volante 5×5", row);
        }
        if count > GRID_SIDE {
            bail!("Linha {}: {} dezenas pedidas, máximo {}", row, count, GRID_SIDE);
        }
        quota += count;
    }
    if quota > DRAW_SIZE {
        bail!("Cotas por linha somam {} dezenas, máximo {}", quota, DRAW_SIZE);
    }
    for &col in allowed_columns {
        if col >= GRID_SIDE {
            bail!("Coluna {} inexistente no volante 5×5", col);
        }
    }

    let mut chosen: Vec<u8> = Vec::with_capacity(DRAW_SIZE);
    for (&row, &count) in row_targets {
        let row_numbers: Vec<u8> = (1..=POOL_SIZE).filter(|&n| grid_row(n) == row).collect();
        chosen.extend(row_numbers.choose_multiple(rng, count));
    }

    // Completa com dezenas das colunas permitidas, pulando as já escolhidas.
    let mut remaining = all_numbers();
    remaining.shuffle(rng);
    for n in remaining {
        if chosen.len() == DRAW_SIZE {
            break;
        }
        if allowed_columns.contains(&grid_col(n)) && !chosen.contains(&n) {
            chosen.push(n);
        }
    }

    if chosen.len() < DRAW_SIZE {
        bail!(
            "Candidatos esgotados: {} dezenas escolhidas, faltam {}",
            chosen.len(),
            DRAW_SIZE - chosen.len()
        );
    }

    let mut combination = [0u8; DRAW_SIZE];
    combination.copy_from_slice(&chosen);
    combination.sort();
    Ok(combination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(combination: &[u8; DRAW_SIZE]) {
        assert!(combination[0] >= 1);
        assert!(combination[DRAW_SIZE - 1] <= POOL_SIZE);
        for pair in combination.windows(2) {
            assert!(pair[0] < pair[1], "não ordenada ou com repetição: {:?}", combination);
        }
    }

    fn freq_boosting(numbers: &[u8]) -> [u32; POOL_SIZE as usize] {
        let mut freq = [0u32; POOL_SIZE as usize];
        for &n in numbers {
            freq[(n - 1) as usize] = 10;
        }
        freq
    }

    #[test]
    fn test_date_seed_format() {
        let seed = date_seed();
        let s = seed.to_string();
        assert_eq!(s.len(), 8, "seed deveria ter 8 dígitos: {s}");
    }

    #[test]
    fn test_random_combination_valid() {
        let mut rng = rng_from_seed(Some(42));
        for _ in 0..50 {
            assert_valid(&random_combination(&mut rng));
        }
    }

    #[test]
    fn test_most_frequent_uses_top_pool() {
        let high: Vec<u8> = (1..=15).collect();
        let freq = freq_boosting(&high);
        let mut rng = rng_from_seed(Some(1));

        let combination = most_frequent(&freq, 15, &mut rng).unwrap();
        assert_valid(&combination);
        assert_eq!(combination.to_vec(), high);
    }

    #[test]
    fn test_most_frequent_tie_break_lowest_first() {
        // Frequências todas iguais: o conjunto é 1..=pool_size.
        let freq = [0u32; POOL_SIZE as usize];
        let mut rng = rng_from_seed(Some(1));
        let combination = most_frequent(&freq, 15, &mut rng).unwrap();
        assert_eq!(combination.to_vec(), (1..=15).collect::<Vec<u8>>());
    }

    #[test]
    fn test_most_frequent_pool_bounds() {
        let freq = [0u32; POOL_SIZE as usize];
        let mut rng = rng_from_seed(Some(1));
        assert!(most_frequent(&freq, 14, &mut rng).is_err());
        assert!(most_frequent(&freq, 26, &mut rng).is_err());
        assert!(most_frequent(&freq, 25, &mut rng).is_ok());
    }

    #[test]
    fn test_least_frequent_uses_bottom_pool() {
        let high: Vec<u8> = (1..=10).collect();
        let freq = freq_boosting(&high);
        let mut rng = rng_from_seed(Some(1));

        let combination = least_frequent(&freq, 15, &mut rng).unwrap();
        assert_valid(&combination);
        assert_eq!(combination.to_vec(), (11..=25).collect::<Vec<u8>>());
    }

    #[test]
    fn test_mix_frequencies_combines_pools() {
        // Topo = {1..7}; as 8 menos frequentes (zeradas, menor primeiro) = {8..15}.
        let freq = freq_boosting(&[1, 2, 3, 4, 5, 6, 7]);
        let mut rng = rng_from_seed(Some(1));

        let combination = mix_frequencies(&freq, 7, 8, &mut rng).unwrap();
        assert_valid(&combination);
        assert_eq!(combination.to_vec(), (1..=15).collect::<Vec<u8>>());
    }

    #[test]
    fn test_mix_frequencies_too_few() {
        let freq = [0u32; POOL_SIZE as usize];
        let mut rng = rng_from_seed(Some(1));
        assert!(mix_frequencies(&freq, 7, 7, &mut rng).is_err());
    }

    #[test]
    fn test_mix_frequencies_overlapping_pools() {
        // Frequências todas iguais: topo-7 = {1..7} e fundo-8 = {1..8} se
        // sobrepõem; a união tem 8 dezenas e deve falhar.
        let freq = [0u32; POOL_SIZE as usize];
        let mut rng = rng_from_seed(Some(1));
        assert!(mix_frequencies(&freq, 7, 8, &mut rng).is_err());
    }

    #[test]
    fn test_by_sum_range_within_bounds() {
        let mut rng = rng_from_seed(Some(7));
        let combination = by_sum_range(180, 220, &mut rng).unwrap();
        assert_valid(&combination);
        let sum: u32 = combination.iter().map(|&n| n as u32).sum();
        assert!(sum >= 180 && sum <= 220, "soma {} fora da faixa", sum);
    }

    #[test]
    fn test_by_sum_range_infeasible_fails_fast() {
        let mut rng = rng_from_seed(Some(7));
        assert!(by_sum_range(1000, 2000, &mut rng).is_err());
        assert!(by_sum_range(10, 50, &mut rng).is_err());
        assert!(by_sum_range(220, 180, &mut rng).is_err());
    }

    #[test]
    fn test_by_sum_range_full_span_always_succeeds() {
        let mut rng = rng_from_seed(Some(7));
        assert!(by_sum_range(MIN_SUM, MAX_SUM, &mut rng).is_ok());
    }

    #[test]
    fn test_by_parity_even_majority() {
        let mut rng = rng_from_seed(Some(11));
        let combination = by_parity(true, &mut rng).unwrap();
        assert_valid(&combination);
        let even = combination.iter().filter(|&&n| n % 2 == 0).count();
        assert!(even > 6, "apenas {} pares", even);
    }

    #[test]
    fn test_by_parity_odd_majority() {
        let mut rng = rng_from_seed(Some(11));
        let combination = by_parity(false, &mut rng).unwrap();
        assert_valid(&combination);
        let odd = combination.iter().filter(|&&n| n % 2 == 1).count();
        assert!(odd > 6, "apenas {} ímpares", odd);
    }

    #[test]
    fn test_by_grid_row_quotas_and_columns() {
        // Linhas 0 e 1 inteiras (1..10) + 5 dezenas das colunas 0 e 1.
        let rows = BTreeMap::from([(0, 5), (1, 5)]);
        let cols = vec![0, 1];
        let mut rng = rng_from_seed(Some(3));

        let combination = by_grid(&rows, &cols, &mut rng).unwrap();
        assert_valid(&combination);
        for n in 1..=10u8 {
            assert!(combination.contains(&n), "dezena {} ausente", n);
        }
        for &n in combination.iter().filter(|&&n| n > 10) {
            assert!(cols.contains(&grid_col(n)), "dezena {} fora das colunas", n);
        }
    }

    #[test]
    fn test_by_grid_invalid_quotas() {
        let mut rng = rng_from_seed(Some(3));
        assert!(by_grid(&BTreeMap::from([(0, 6)]), &[0], &mut rng).is_err());
        assert!(by_grid(&BTreeMap::from([(5, 1)]), &[0], &mut rng).is_err());
        assert!(by_grid(&BTreeMap::from([(0, 5)]), &[5], &mut rng).is_err());
    }

    #[test]
    fn test_by_grid_exhausted_candidates() {
        // Uma única coluna tem 5 dezenas; impossível completar 15.
        let mut rng = rng_from_seed(Some(3));
        assert!(by_grid(&BTreeMap::new(), &[0], &mut rng).is_err());
    }

    #[test]
    fn test_seed_determinism() {
        let freq = freq_boosting(&[2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 1, 3, 5, 7, 9]);

        let a = most_frequent(&freq, 20, &mut rng_from_seed(Some(99))).unwrap();
        let b = most_frequent(&freq, 20, &mut rng_from_seed(Some(99))).unwrap();
        assert_eq!(a, b);

        let a = by_sum_range(170, 230, &mut rng_from_seed(Some(99))).unwrap();
        let b = by_sum_range(170, 230, &mut rng_from_seed(Some(99))).unwrap();
        assert_eq!(a, b);
    }
}
