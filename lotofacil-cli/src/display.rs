use std::collections::BTreeMap;

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use crate::ChartKind;
use crate::analysis::patterns::{GridDistribution, ParityCount, RepetitionAnalysis};
use crate::import::ImportResult;
use lotofacil_db::models::{DRAW_SIZE, Draw, NumberStats};

fn numbers_str(numbers: &[u8]) -> String {
    let mut sorted = numbers.to_vec();
    sorted.sort();
    sorted
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Nenhum concurso para exibir.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Concurso", "Data", "Dezenas"]);

    for draw in draws {
        table.add_row(vec![&draw.contest, &draw.date, &numbers_str(&draw.numbers)]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Importação concluída:");
    println!("  Linhas lidas        : {}", result.total_records);
    println!("  Inseridos           : {}", result.inserted);
    println!("  Duplicados ignorados: {}", result.skipped);
    if result.errors > 0 {
        println!("  Erros               : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStats], window: u32) {
    println!("\n📊 Estatísticas dos últimos {} concursos\n", window);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Dezena", "Frequência", "Atraso"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    for stat in &sorted {
        table.add_row(vec![
            &format!("{:2}", stat.number),
            &stat.frequency.to_string(),
            &stat.gap.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_sums(sums: &[u32]) {
    if sums.is_empty() {
        return;
    }
    let min = sums.iter().min().copied().unwrap_or(0);
    let max = sums.iter().max().copied().unwrap_or(0);
    let mean = sums.iter().sum::<u32>() as f64 / sums.len() as f64;

    println!("\n── Soma das dezenas por concurso ──");
    println!("  Mínima: {}   Média: {:.1}   Máxima: {}", min, mean, max);
}

pub fn display_parity_profile(profile: &[ParityCount]) {
    println!("\n── Pares e ímpares por concurso ──");

    let mut splits: BTreeMap<(u8, u8), u32> = BTreeMap::new();
    for parity in profile {
        *splits.entry((parity.even, parity.odd)).or_insert(0) += 1;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Pares", "Ímpares", "Concursos"]);

    for ((even, odd), count) in &splits {
        table.add_row(vec![
            &even.to_string(),
            &odd.to_string(),
            &count.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_grid_profile(profile: &[GridDistribution]) {
    if profile.is_empty() {
        return;
    }
    println!("\n── Distribuição no volante 5×5 ──");

    let mut row_totals = [0u32; 5];
    let mut col_totals = [0u32; 5];
    for dist in profile {
        for (total, &c) in row_totals.iter_mut().zip(&dist.rows) {
            *total += c as u32;
        }
        for (total, &c) in col_totals.iter_mut().zip(&dist.cols) {
            *total += c as u32;
        }
    }

    let n = profile.len() as f64;
    for (label, totals) in [("Linha", &row_totals), ("Coluna", &col_totals)] {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![label, "Total", "Média por concurso"]);

        for (i, &total) in totals.iter().enumerate() {
            table.add_row(vec![
                &i.to_string(),
                &total.to_string(),
                &format!("{:.2}", total as f64 / n),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_combinations(combinations: &[[u8; DRAW_SIZE]], label: &str) {
    println!("\n🎲 Combinações geradas ({label})\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Dezenas", "Soma", "Pares/Ímpares"]);

    for (i, combination) in combinations.iter().enumerate() {
        let sum: u32 = combination.iter().map(|&n| n as u32).sum();
        let even = combination.iter().filter(|&&n| n % 2 == 0).count();
        table.add_row(vec![
            &format!("{}", i + 1),
            &numbers_str(combination),
            &sum.to_string(),
            &format!("{}/{}", even, DRAW_SIZE - even),
        ]);
    }
    println!("{table}");
}

pub fn display_fechamento(bets: &[[u8; DRAW_SIZE]]) {
    println!("\n🎯 Apostas do fechamento\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Aposta", "Dezenas"]);

    for (i, bet) in bets.iter().enumerate() {
        table.add_row(vec![&format!("{}", i + 1), &numbers_str(bet)]);
    }
    println!("{table}");
}

pub fn display_repetition(analysis: &RepetitionAnalysis) {
    println!("\n🔁 Repetição de dezenas entre concursos\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Dezena",
            "Geral",
            "Concurso seguinte",
            "2 concursos depois",
            "3 concursos depois",
        ]);

    for i in 0..analysis.general.len() {
        table.add_row(vec![
            &format!("{:2}", i + 1),
            &analysis.general[i].to_string(),
            &analysis.lag1[i].to_string(),
            &analysis.lag2[i].to_string(),
            &analysis.lag3[i].to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_triples(triples: &BTreeMap<[u8; 3], u32>, top: usize) {
    println!("\n── Trincas repetidas no concurso seguinte ──");

    if triples.is_empty() {
        println!("  (Nenhuma trinca repetida)");
        return;
    }

    let mut sorted: Vec<(&[u8; 3], &u32)> = triples.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Trinca", "Frequência"]);

    for (triple, count) in sorted.iter().take(top) {
        table.add_row(vec![&numbers_str(&triple[..]), &count.to_string()]);
    }
    println!("{table}");
}

/// Gráfico de terminal para uma tabela dezena→contagem: barras absolutas
/// ou participação percentual no total.
pub fn display_number_chart(counts: &[u32; 25], title: &str, kind: ChartKind) {
    println!("\n── {} ──", title);

    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        println!("  (Sem dados para exibir)");
        return;
    }
    let total: u32 = counts.iter().sum();

    for (i, &count) in counts.iter().enumerate() {
        let bar = "█".repeat(((count as f64 / max as f64) * 40.0).round() as usize);
        match kind {
            ChartKind::Bar => println!("  {:2} │ {:<40} {}", i + 1, bar, count),
            ChartKind::Pie => {
                let share = 100.0 * count as f64 / total as f64;
                println!("  {:2} │ {:<40} {:5.1}%", i + 1, bar, share);
            }
        }
    }
}
