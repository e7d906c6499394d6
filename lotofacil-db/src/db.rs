use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    contest       TEXT PRIMARY KEY,
    date          TEXT NOT NULL,
    ball_1        INTEGER NOT NULL,
    ball_2        INTEGER NOT NULL,
    ball_3        INTEGER NOT NULL,
    ball_4        INTEGER NOT NULL,
    ball_5        INTEGER NOT NULL,
    ball_6        INTEGER NOT NULL,
    ball_7        INTEGER NOT NULL,
    ball_8        INTEGER NOT NULL,
    ball_9        INTEGER NOT NULL,
    ball_10       INTEGER NOT NULL,
    ball_11       INTEGER NOT NULL,
    ball_12       INTEGER NOT NULL,
    ball_13       INTEGER NOT NULL,
    ball_14       INTEGER NOT NULL,
    ball_15       INTEGER NOT NULL
);
";

const BALL_COLUMNS: &str = "ball_1, ball_2, ball_3, ball_4, ball_5, ball_6, ball_7, ball_8, \
     ball_9, ball_10, ball_11, ball_12, ball_13, ball_14, ball_15";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotofacil.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossível criar o diretório {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossível abrir a base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Falha na migração")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let sql = format!(
        "INSERT OR IGNORE INTO draws (contest, date, {})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        BALL_COLUMNS
    );
    let mut params: Vec<&dyn rusqlite::ToSql> = vec![&draw.contest, &draw.date];
    for ball in &draw.numbers {
        params.push(ball);
    }
    let changed = conn
        .execute(&sql, params.as_slice())
        .context("Falha na inserção")?;
    Ok(changed > 0)
}

fn row_numbers(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<[u8; 15]> {
    let mut numbers = [0u8; 15];
    for (i, n) in numbers.iter_mut().enumerate() {
        *n = row.get::<_, u8>(offset + i)?;
    }
    Ok(numbers)
}

/// Últimos concursos, do mais recente para o mais antigo (para exibição).
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let sql = format!(
        "SELECT contest, date, {} FROM draws
         ORDER BY date DESC, contest DESC LIMIT ?1",
        BALL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let draws = stmt
        .query_map([limit], |row| {
            Ok(Draw {
                contest: row.get(0)?,
                date: row.get(1)?,
                numbers: row_numbers(row, 2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Janela de análise em ordem cronológica (do mais antigo para o mais
/// recente). A análise de repetições depende dessa ordem.
pub fn fetch_history(conn: &Connection, limit: u32) -> Result<Vec<[u8; 15]>> {
    let sql = format!(
        "SELECT {} FROM draws ORDER BY date DESC, contest DESC LIMIT ?1",
        BALL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([limit], |row| row_numbers(row, 0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().rev().collect())
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(contest: &str, date: &str, first: u8) -> Draw {
        let mut numbers = [0u8; 15];
        for (i, n) in numbers.iter_mut().enumerate() {
            *n = first + i as u8;
        }
        Draw {
            contest: contest.to_string(),
            date: date.to_string(),
            numbers,
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_last_draws_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        insert_draw(&conn, &test_draw("0002", "2024-01-05", 2)).unwrap();
        insert_draw(&conn, &test_draw("0003", "2024-01-03", 3)).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].date, "2024-01-05");
        assert_eq!(draws[1].date, "2024-01-03");
        assert_eq!(draws[2].date, "2024-01-01");
    }

    #[test]
    fn test_fetch_history_chronological() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        insert_draw(&conn, &test_draw("0002", "2024-01-03", 2)).unwrap();
        insert_draw(&conn, &test_draw("0003", "2024-01-05", 3)).unwrap();

        let history = fetch_history(&conn, 10).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0][0], 1);
        assert_eq!(history[2][0], 3);
    }

    #[test]
    fn test_fetch_history_window_keeps_most_recent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw("0001", "2024-01-01", 1)).unwrap();
        insert_draw(&conn, &test_draw("0002", "2024-01-03", 2)).unwrap();
        insert_draw(&conn, &test_draw("0003", "2024-01-05", 3)).unwrap();

        // A janela limita aos mais recentes, mas mantém a ordem cronológica.
        let history = fetch_history(&conn, 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0][0], 2);
        assert_eq!(history[1][0], 3);
    }

    #[test]
    fn test_roundtrip_preserves_draw_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let mut draw = test_draw("0001", "2024-01-01", 1);
        draw.numbers = [13, 2, 25, 4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 14, 15];
        insert_draw(&conn, &draw).unwrap();

        let draws = fetch_last_draws(&conn, 1).unwrap();
        assert_eq!(draws[0].numbers, draw.numbers);
    }
}
