//! SQL script splitting.
//!
//! Scripts separate statements with a token on a line of its own (`//` by
//! default), because `;` also terminates statements inside procedural blocks:
//!
//! ```sql
//! DELETE FROM stage_orders;
//! //
//! BEGIN
//!   refresh_totals();
//! END;
//! //
//! ```

/// Statement terminator stripped from plain statements.
const TERMINATOR: char = ';';

/// Keywords that open a procedural block.
const PROCEDURAL_KEYWORDS: [&str; 2] = ["BEGIN", "DECLARE"];

/// A statement ready to be submitted to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  pub sql: String,
  /// Procedural blocks keep their trailing terminator.
  pub procedural: bool,
}

/// Split a script into statements.
///
/// Candidates are trimmed and empty candidates dropped. Plain statements lose
/// one trailing `;`; procedural blocks are kept verbatim.
pub fn split_statements(script: &str, separator: &str) -> Vec<Statement> {
  let mut statements = Vec::new();
  let mut current = String::new();

  for line in script.lines() {
    if line.trim() == separator {
      statements.extend(prepare(&current));
      current.clear();
    } else {
      current.push_str(line);
      current.push('\n');
    }
  }
  statements.extend(prepare(&current));

  statements
}

fn prepare(candidate: &str) -> Option<Statement> {
  let candidate = candidate.trim();
  if candidate.is_empty() {
    return None;
  }

  let procedural = is_procedural(candidate);
  let sql = if procedural {
    candidate
  } else {
    candidate.strip_suffix(TERMINATOR).unwrap_or(candidate)
  };

  Some(Statement {
    sql: sql.to_string(),
    procedural,
  })
}

/// Whether a statement opens with the keyword `BEGIN` or `DECLARE`,
/// case-insensitively.
///
/// Only whole keywords count: the keyword must end the text or be followed
/// by a character that cannot continue an identifier, so `BEGINNING_TOTAL`
/// and `declared_items` are plain statements.
pub fn is_procedural(statement: &str) -> bool {
  PROCEDURAL_KEYWORDS
    .iter()
    .any(|keyword| starts_with_keyword(statement, keyword))
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
  let Some(head) = text.get(..keyword.len()) else {
    return false;
  };
  head.eq_ignore_ascii_case(keyword)
    && !text[keyword.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_')
}
