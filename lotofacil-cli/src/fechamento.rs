use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use lotofacil_db::models::{DRAW_SIZE, POOL_SIZE};

/// Dezenas do grupo principal, presentes em todas as apostas.
pub const CORE_SIZE: usize = 10;
/// Dezenas que completam cada aposta.
const EXTRA_SIZE: usize = DRAW_SIZE - CORE_SIZE;

fn build_bet(core: &[u8], pool: &[u8], rng: &mut StdRng) -> [u8; DRAW_SIZE] {
    let mut bet = [0u8; DRAW_SIZE];
    bet[..CORE_SIZE].copy_from_slice(core);
    for (slot, &n) in bet[CORE_SIZE..]
        .iter_mut()
        .zip(pool.choose_multiple(rng, EXTRA_SIZE))
    {
        *slot = n;
    }
    bet.sort();
    bet
}

/// Fechamento de 4 apostas em torno de um grupo principal de 10 dezenas.
/// As 15 dezenas restantes são particionadas ao acaso nos grupos A, B e C;
/// as apostas 1-3 completam o grupo principal com um grupo cada, e a
/// aposta 4 com 5 dezenas de A∪B∪C.
pub fn generate_fechamento(core: &[u8], rng: &mut StdRng) -> Result<Vec<[u8; DRAW_SIZE]>> {
    if core.len() != CORE_SIZE {
        bail!(
            "O grupo principal precisa de {} dezenas, {} recebidas",
            CORE_SIZE,
            core.len()
        );
    }
    for &n in core {
        if n < 1 || n > POOL_SIZE {
            bail!("Dezena {} fora do intervalo (1-{})", n, POOL_SIZE);
        }
    }
    for i in 0..core.len() {
        for j in (i + 1)..core.len() {
            if core[i] == core[j] {
                bail!("Dezena duplicada no grupo principal: {}", core[i]);
            }
        }
    }

    let mut remaining: Vec<u8> = (1..=POOL_SIZE).filter(|n| !core.contains(n)).collect();
    remaining.shuffle(rng);

    let mut bets = Vec::with_capacity(4);
    for pool in remaining.chunks(EXTRA_SIZE) {
        bets.push(build_bet(core, pool, rng));
    }
    bets.push(build_bet(core, &remaining, rng));
    Ok(bets)
}
