use super::{LoadReport, SourceFormat};
use crate::error::Result;
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 100;

#[derive(Clone, Copy)]
enum Lex {
    Code,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Split a dump into statements on `;`, dropping `--` and `/* */` comments.
/// Quoted literals are copied verbatim, so semicolons or dashes inside text
/// values never break a statement.
pub fn split_statements(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = Lex::Code;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Lex::Code => match c {
                '\'' => {
                    current.push(c);
                    state = Lex::SingleQuoted;
                }
                '"' => {
                    current.push(c);
                    state = Lex::DoubleQuoted;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = Lex::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    current.push(' ');
                    state = Lex::BlockComment;
                }
                ';' => push_statement(&mut statements, &mut current),
                _ => current.push(c),
            },
            Lex::SingleQuoted => {
                current.push(c);
                if c == '\'' {
                    state = Lex::Code;
                }
            }
            Lex::DoubleQuoted => {
                current.push(c);
                if c == '"' {
                    state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Lex::Code;
                }
            }
        }
    }
    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    current.clear();
}

/// Dumps produced by `sqlite3 .dump` wrap everything in their own
/// transaction; the loader already owns one.
fn is_transaction_control(stmt: &str) -> bool {
    let first = stmt
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(
        first.as_str(),
        "BEGIN" | "COMMIT" | "END" | "ROLLBACK" | "SAVEPOINT" | "RELEASE"
    )
}

fn preview(stmt: &str) -> String {
    stmt.chars().take(PREVIEW_CHARS).collect()
}

/// Execute every statement of the dump on `conn`. Failing statements are
/// logged and counted as skipped; they do not abort the load.
pub async fn load(conn: &mut SqliteConnection, path: &Path) -> Result<LoadReport> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut report = LoadReport::new(path, SourceFormat::SqlDump);

    for stmt in split_statements(&content) {
        if is_transaction_control(&stmt) {
            debug!(statement = %stmt, "ignoring transaction control statement in dump");
            continue;
        }
        match sqlx::raw_sql(&stmt).execute(&mut *conn).await {
            Ok(done) => report.loaded += done.rows_affected(),
            Err(e) => {
                report.skipped += 1;
                warn!(error = %e, statement = %preview(&stmt), "skipping failed dump statement");
            }
        }
    }

    info!(
        path = %path.display(),
        rows = report.loaded,
        skipped = report.skipped,
        "sql dump applied"
    );
    Ok(report)
}
