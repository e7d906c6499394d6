mod analysis;
mod display;
mod fechamento;
mod import;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::analysis::patterns::{
    compute_repeated_triples, compute_repetition, grid_profile, parity_profile,
};
use crate::analysis::sampler::{self, date_seed, rng_from_seed};
use crate::analysis::{compute_frequency, compute_stats, compute_sums};
use crate::display::{
    display_combinations, display_draws, display_fechamento, display_grid_profile,
    display_import_summary, display_number_chart, display_parity_profile, display_repetition,
    display_stats, display_sums, display_triples,
};
use lotofacil_db::db::{
    count_draws, db_path, fetch_history, fetch_last_draws, insert_draw, migrate, open_db,
};
use lotofacil_db::models::{DRAW_SIZE, Draw, validate_numbers};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Strategy {
    /// Dezenas mais frequentes na janela
    #[default]
    MostFrequent,
    /// Dezenas menos frequentes na janela
    LeastFrequent,
    /// Mix das mais e menos frequentes
    Mix,
    /// Soma das dezenas dentro de uma faixa
    SumRange,
    /// Maioria de pares ou de ímpares
    Parity,
    /// Cotas por linha e colunas do volante 5×5
    Grid,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum ParityPreference {
    #[default]
    Even,
    Odd,
}

#[derive(Parser)]
#[command(name = "lotofacil", about = "Analisador de resultados da Lotofácil")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importar os concursos de um arquivo CSV
    Import {
        /// Caminho do arquivo CSV
        #[arg(short, long, default_value = "assets/lotofacil.csv")]
        file: PathBuf,
    },

    /// Exibir o caminho da base de dados
    DbPath,

    /// Listar os últimos concursos
    List {
        /// Número de concursos a exibir
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Exibir estatísticas: frequências, atrasos, somas e padrões
    Stats {
        /// Janela de análise (número de concursos)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Analisar repetições de dezenas e trincas entre concursos
    Patterns {
        /// Gráfico de terminal para as tabelas de repetição
        #[arg(long)]
        chart: Option<ChartKind>,

        /// Número de trincas a exibir
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Gerar combinações candidatas
    Generate {
        /// Estratégia de geração
        #[arg(short, long, default_value = "most-frequent")]
        strategy: Strategy,

        /// Janela de análise para as estratégias de frequência
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Número de combinações a gerar
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Tamanho do conjunto de candidatos (most-frequent/least-frequent)
        #[arg(long, default_value = "15")]
        pool_size: usize,

        /// Dezenas mais frequentes no mix
        #[arg(long, default_value = "7")]
        most: usize,

        /// Dezenas menos frequentes no mix
        #[arg(long, default_value = "8")]
        least: usize,

        /// Soma mínima (sum-range)
        #[arg(long, default_value = "180")]
        min_sum: u32,

        /// Soma máxima (sum-range)
        #[arg(long, default_value = "220")]
        max_sum: u32,

        /// Maioria desejada (parity)
        #[arg(long, default_value = "even")]
        parity: ParityPreference,

        /// Cotas por linha do volante, ex.: 0:2,2:3 (grid)
        #[arg(long, default_value = "0:2,2:3")]
        rows: String,

        /// Colunas permitidas para completar a aposta, ex.: 0,2,3 (grid)
        #[arg(long, default_value = "0,2,3")]
        columns: String,

        /// Seed para reprodutibilidade (padrão: data do dia YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Gerar um fechamento de 4 apostas a partir de 10 dezenas
    Fechamento {
        /// As 10 dezenas do grupo principal
        numbers: Vec<u8>,

        /// Seed para reprodutibilidade (padrão: data do dia YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Adicionar um concurso manualmente
    Add,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window } => cmd_stats(&conn, window),
        Command::Patterns { chart, top } => cmd_patterns(&conn, chart, top),
        Command::Generate {
            strategy,
            window,
            count,
            pool_size,
            most,
            least,
            min_sum,
            max_sum,
            parity,
            rows,
            columns,
            seed,
        } => cmd_generate(
            &conn, strategy, window, count, pool_size, most, least, min_sum, max_sum, parity,
            &rows, &columns, seed,
        ),
        Command::Fechamento { numbers, seed } => cmd_fechamento(&numbers, seed),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &lotofacil_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &lotofacil_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vazia. Execute primeiro: lotofacil import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &lotofacil_db::rusqlite::Connection, window: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vazia. Execute primeiro: lotofacil import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let history = fetch_history(conn, effective_window)?;

    display_stats(&compute_stats(&history), effective_window);
    display_sums(&compute_sums(&history));
    display_parity_profile(&parity_profile(&history));
    display_grid_profile(&grid_profile(&history));
    Ok(())
}

fn cmd_patterns(
    conn: &lotofacil_db::rusqlite::Connection,
    chart: Option<ChartKind>,
    top: usize,
) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vazia. Execute primeiro: lotofacil import");
        return Ok(());
    }
    if n < 2 {
        println!("São necessários pelo menos 2 concursos para analisar repetições.");
        return Ok(());
    }
    let history = fetch_history(conn, n)?;

    let analysis = compute_repetition(&history)?;
    display_repetition(&analysis);

    let triples = compute_repeated_triples(&history)?;
    display_triples(&triples, top);

    if let Some(kind) = chart {
        display_number_chart(&analysis.lag1, "Repetição no concurso seguinte", kind);
        display_number_chart(&analysis.lag2, "Repetição 2 concursos depois", kind);
        display_number_chart(&analysis.lag3, "Repetição 3 concursos depois", kind);
        display_number_chart(&analysis.general, "Ocorrências no histórico", kind);
    }
    Ok(())
}

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::MostFrequent => "mais frequentes",
        Strategy::LeastFrequent => "menos frequentes",
        Strategy::Mix => "mix de frequências",
        Strategy::SumRange => "faixa de soma",
        Strategy::Parity => "paridade",
        Strategy::Grid => "linhas e colunas",
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    conn: &lotofacil_db::rusqlite::Connection,
    strategy: Strategy,
    window: u32,
    count: usize,
    pool_size: usize,
    most: usize,
    least: usize,
    min_sum: u32,
    max_sum: u32,
    parity: ParityPreference,
    rows: &str,
    columns: &str,
    seed: Option<u64>,
) -> Result<()> {
    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed do dia : {ds})");
        ds
    });
    let mut rng = rng_from_seed(Some(effective_seed));

    let combinations: Vec<[u8; DRAW_SIZE]> = match strategy {
        Strategy::MostFrequent | Strategy::LeastFrequent | Strategy::Mix => {
            let n = count_draws(conn)?;
            if n == 0 {
                println!("Base vazia. Execute primeiro: lotofacil import");
                return Ok(());
            }
            let effective_window = window.min(n);
            let history = fetch_history(conn, effective_window)?;
            let freq = compute_frequency(&history);

            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(match strategy {
                    Strategy::MostFrequent => sampler::most_frequent(&freq, pool_size, &mut rng)?,
                    Strategy::LeastFrequent => sampler::least_frequent(&freq, pool_size, &mut rng)?,
                    _ => sampler::mix_frequencies(&freq, most, least, &mut rng)?,
                });
            }
            out
        }
        Strategy::SumRange => (0..count)
            .map(|_| sampler::by_sum_range(min_sum, max_sum, &mut rng))
            .collect::<Result<_>>()?,
        Strategy::Parity => {
            let prefer_even = matches!(parity, ParityPreference::Even);
            (0..count)
                .map(|_| sampler::by_parity(prefer_even, &mut rng))
                .collect::<Result<_>>()?
        }
        Strategy::Grid => {
            let row_targets = parse_row_targets(rows)?;
            let allowed_columns = parse_columns(columns)?;
            (0..count)
                .map(|_| sampler::by_grid(&row_targets, &allowed_columns, &mut rng))
                .collect::<Result<_>>()?
        }
    };

    display_combinations(&combinations, strategy_label(strategy));
    Ok(())
}

fn cmd_fechamento(numbers: &[u8], seed: Option<u64>) -> Result<()> {
    let core: Vec<u8> = if numbers.is_empty() {
        prompt_core()?
    } else {
        numbers.to_vec()
    };

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed do dia : {ds})");
        ds
    });
    let mut rng = rng_from_seed(Some(effective_seed));

    let bets = fechamento::generate_fechamento(&core, &mut rng)?;
    display_fechamento(&bets);
    Ok(())
}

fn cmd_add(conn: &lotofacil_db::rusqlite::Connection) -> Result<()> {
    println!("Adicionar um concurso manualmente\n");

    let contest = prompt("Número do concurso (ex.: 3001): ")?;
    let raw_date = prompt("Data (DD/MM/AAAA): ")?;

    let date_parts: Vec<&str> = raw_date.split('/').collect();
    if date_parts.len() != 3 {
        bail!("Formato de data inválido");
    }
    let date = format!("{}-{}-{}", date_parts[2], date_parts[1], date_parts[0]);

    let numbers = prompt_numbers()?;

    let draw = Draw {
        contest,
        date,
        numbers,
    };

    println!("\nConcurso a inserir:");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirmar a inserção? (s/n): ")?;
    if confirm.trim().to_lowercase() == "s" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Concurso inserido com sucesso.");
        } else {
            println!("Este concurso já existe (duplicado ignorado).");
        }
    } else {
        println!("Inserção cancelada.");
    }

    Ok(())
}

fn parse_row_targets(spec: &str) -> Result<BTreeMap<usize, usize>> {
    let mut targets = BTreeMap::new();
    for part in spec.split(',').filter(|p| !p.trim().is_empty()) {
        let part = part.trim();
        let (row, count) = part
            .split_once(':')
            .with_context(|| format!("Cota inválida '{}' (formato linha:quantidade)", part))?;
        let row: usize = row
            .trim()
            .parse()
            .with_context(|| format!("Linha inválida '{}'", row.trim()))?;
        let count: usize = count
            .trim()
            .parse()
            .with_context(|| format!("Quantidade inválida '{}'", count.trim()))?;
        if targets.insert(row, count).is_some() {
            bail!("Linha {} repetida nas cotas", row);
        }
    }
    Ok(targets)
}

fn parse_columns(spec: &str) -> Result<Vec<usize>> {
    spec.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .with_context(|| format!("Coluna inválida '{}'", part.trim()))
        })
        .collect()
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input).context("Erro de leitura")?;
    Ok(input.trim().to_string())
}

fn prompt_core() -> Result<Vec<u8>> {
    loop {
        let input = prompt(
            "As 10 dezenas do grupo principal, separadas por vírgula (ex.: 2,4,6,7,8,10,12,15,16,17): ",
        )?;
        let parsed: Result<Vec<u8>, _> = input.split(',').map(|s| s.trim().parse::<u8>()).collect();
        match parsed {
            Ok(core) if core.len() == 10 => {
                let in_range = core.iter().all(|&n| n >= 1 && n <= 25);
                let distinct = core.iter().enumerate().all(|(i, n)| !core[..i].contains(n));
                if in_range && distinct {
                    return Ok(core);
                }
                println!("Informe 10 dezenas válidas entre 1 e 25, sem repetição. Tente novamente.");
            }
            Ok(_) => println!("Informe exatamente 10 dezenas. Tente novamente."),
            Err(_) => {
                println!("Entrada inválida. Informe apenas números inteiros separados por vírgula.")
            }
        }
    }
}

fn prompt_numbers() -> Result<[u8; DRAW_SIZE]> {
    loop {
        let input = prompt("15 dezenas (separadas por espaço, 1-25): ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == DRAW_SIZE => {
                let mut numbers = [0u8; DRAW_SIZE];
                numbers.copy_from_slice(&v);
                if validate_numbers(&numbers).is_ok() {
                    return Ok(numbers);
                }
                println!("Dezenas inválidas (1-25, sem repetição). Tente novamente.");
            }
            _ => println!("Informe exatamente 15 dezenas. Tente novamente."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_targets() {
        let targets = parse_row_targets("0:2,2:3").unwrap();
        assert_eq!(targets, BTreeMap::from([(0, 2), (2, 3)]));
        assert!(parse_row_targets("0-2").is_err());
        assert!(parse_row_targets("0:x").is_err());
        assert!(parse_row_targets("0:1,0:2").is_err());
    }

    #[test]
    fn test_parse_columns() {
        assert_eq!(parse_columns("0,2,3").unwrap(), vec![0, 2, 3]);
        assert_eq!(parse_columns(" 1 , 4 ").unwrap(), vec![1, 4]);
        assert!(parse_columns("a").is_err());
    }
}
