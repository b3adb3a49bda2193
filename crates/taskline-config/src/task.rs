//! Task descriptors and the task table loader.

use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// The kind of work a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
  /// A SQL script run statement by statement against the database session.
  Sql,
  /// An external script run as a child process.
  Process,
}

impl TaskType {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskType::Sql => "SQL",
      TaskType::Process => "PROCESS",
    }
  }
}

impl fmt::Display for TaskType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error returned when a `task_type` column value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTaskType(pub String);

impl FromStr for TaskType {
  type Err = UnknownTaskType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "SQL" => Ok(TaskType::Sql),
      // Older task tables call process tasks PYTHON.
      "PYTHON" | "PROCESS" => Ok(TaskType::Process),
      _ => Err(UnknownTaskType(s.to_string())),
    }
  }
}

/// One row of the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
  /// Sort key. Ties keep file order.
  pub order: i64,
  /// Task name used in logs, notifications and the summary.
  pub name: String,
  /// Parsed task type. `None` only for a disabled row whose type is not
  /// recognised; enabled rows always carry one.
  pub task_type: Option<TaskType>,
  /// The `task_type` column as written, trimmed.
  pub type_name: String,
  /// Disabled tasks are skipped without a summary row.
  pub enabled: bool,
  /// Script reference, resolved only when the task runs.
  pub script_path: PathBuf,
  /// Line of the row in the source table.
  pub line: u64,
}

impl TaskDescriptor {
  /// Resolve the script path against an optional base directory.
  ///
  /// Absolute paths are returned unchanged.
  pub fn resolve_script(&self, base: Option<&Path>) -> PathBuf {
    match base {
      Some(base) if self.script_path.is_relative() => base.join(&self.script_path),
      _ => self.script_path.clone(),
    }
  }
}

/// Column layout of the task table.
#[derive(Debug, Deserialize)]
struct TaskRow {
  task_order: String,
  task_name: String,
  task_type: String,
  enabled: String,
  script_path: String,
}

/// Load the task table at `path`, sorted ascending by `task_order`.
///
/// The sort is stable, so rows sharing an order value keep their file order.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<TaskDescriptor>, ConfigError> {
  let path = path.as_ref();

  let file = match File::open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      return Err(ConfigError::NotFound {
        path: path.to_path_buf(),
      });
    }
    Err(e) => {
      return Err(ConfigError::Read {
        path: path.to_path_buf(),
        source: e.into(),
      });
    }
  };

  let mut tasks = parse_tasks(file).map_err(|e| match e {
    ParseError::Csv(source) => ConfigError::Read {
      path: path.to_path_buf(),
      source,
    },
    ParseError::Config(e) => e,
  })?;

  tasks.sort_by_key(|task| task.order);

  debug!(path = %path.display(), tasks = tasks.len(), "loaded task table");

  Ok(tasks)
}

enum ParseError {
  Csv(csv::Error),
  Config(ConfigError),
}

fn parse_tasks(input: impl std::io::Read) -> Result<Vec<TaskDescriptor>, ParseError> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(input);

  let headers = reader.headers().map_err(ParseError::Csv)?.clone();
  let mut tasks = Vec::new();

  for record in reader.records() {
    let record = record.map_err(ParseError::Csv)?;
    let line = record.position().map(|p| p.line()).unwrap_or_default();

    let row: TaskRow = record.deserialize(Some(&headers)).map_err(|e| {
      ParseError::Config(ConfigError::InvalidRow {
        line,
        message: e.to_string(),
      })
    })?;

    tasks.push(descriptor_from_row(row, line).map_err(ParseError::Config)?);
  }

  Ok(tasks)
}

fn descriptor_from_row(row: TaskRow, line: u64) -> Result<TaskDescriptor, ConfigError> {
  let order = row
    .task_order
    .parse::<i64>()
    .map_err(|e| ConfigError::InvalidRow {
      line,
      message: format!("task_order '{}' is not an integer: {}", row.task_order, e),
    })?;

  let enabled = row.enabled == "1";

  // Disabled rows are never run, so a stale type there is not an error.
  let task_type = match row.task_type.parse::<TaskType>() {
    Ok(task_type) => Some(task_type),
    Err(UnknownTaskType(value)) if enabled => {
      return Err(ConfigError::UnknownTaskType {
        task_name: row.task_name,
        value,
        line,
      });
    }
    Err(_) => {
      debug!(
        task = %row.task_name,
        value = %row.task_type,
        line,
        "unrecognised type on disabled task"
      );
      None
    }
  };

  Ok(TaskDescriptor {
    order,
    name: row.task_name,
    task_type,
    type_name: row.task_type,
    enabled,
    script_path: PathBuf::from(row.script_path),
    line,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_table(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_task_type_parsing() {
    assert_eq!("sql".parse::<TaskType>(), Ok(TaskType::Sql));
    assert_eq!(" Python ".parse::<TaskType>(), Ok(TaskType::Process));
    assert_eq!("PROCESS".parse::<TaskType>(), Ok(TaskType::Process));
    assert_eq!(
      "shell".parse::<TaskType>(),
      Err(UnknownTaskType("shell".to_string()))
    );
  }

  #[test]
  fn test_load_sorts_by_order() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       3,third,SQL,1,c.sql\n\
       1,first,PYTHON,1,a.py\n\
       2,second,sql,0,b.sql\n",
    );

    let tasks = load_tasks(file.path()).unwrap();
    let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(names, ["first", "second", "third"]);
    assert_eq!(tasks[0].task_type, Some(TaskType::Process));
    assert_eq!(tasks[0].type_name, "PYTHON");
    assert!(!tasks[1].enabled);
    assert_eq!(tasks[2].script_path, PathBuf::from("c.sql"));
  }

  #[test]
  fn test_load_keeps_file_order_for_ties() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       5,b,SQL,1,b.sql\n\
       1,a,SQL,1,a.sql\n\
       5,c,SQL,1,c.sql\n\
       5,d,SQL,1,d.sql\n",
    );

    let tasks = load_tasks(file.path()).unwrap();
    let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(names, ["a", "b", "c", "d"]);
  }

  #[test]
  fn test_only_one_enables() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       1,a,SQL,1,a.sql\n\
       2,b,SQL,true,b.sql\n\
       3,c,SQL,,c.sql\n\
       4,d,SQL, 1 ,d.sql\n",
    );

    let enabled: Vec<_> = load_tasks(file.path())
      .unwrap()
      .into_iter()
      .map(|t| t.enabled)
      .collect();

    assert_eq!(enabled, [true, false, false, true]);
  }

  #[test]
  fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline_tasks.csv");

    let err = load_tasks(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { path: p } if p == path));
  }

  #[test]
  fn test_unknown_task_type_rejected_at_load() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       1,ok,SQL,1,a.sql\n\
       2,bad,BASH,1,b.sh\n",
    );

    match load_tasks(file.path()).unwrap_err() {
      ConfigError::UnknownTaskType {
        task_name,
        value,
        line,
      } => {
        assert_eq!(task_name, "bad");
        assert_eq!(value, "BASH");
        assert_eq!(line, 3);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn test_unknown_task_type_allowed_on_disabled_row() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       1,ok,SQL,1,a.sql\n\
       2,legacy,SHELL,0,old.sh\n",
    );

    let tasks = load_tasks(file.path()).unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].task_type, Some(TaskType::Sql));
    assert_eq!(tasks[1].task_type, None);
    assert_eq!(tasks[1].type_name, "SHELL");
    assert!(!tasks[1].enabled);
  }

  #[test]
  fn test_invalid_order() {
    let file = write_table(
      "task_order,task_name,task_type,enabled,script_path\n\
       first,a,SQL,1,a.sql\n",
    );

    let err = load_tasks(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRow { line: 2, .. }));
  }

  #[test]
  fn test_missing_column() {
    let file = write_table(
      "task_order,task_name,enabled,script_path\n\
       1,a,1,a.sql\n",
    );

    let err = load_tasks(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRow { .. }));
  }

  #[test]
  fn test_resolve_script() {
    let task = TaskDescriptor {
      order: 1,
      name: "a".to_string(),
      task_type: Some(TaskType::Sql),
      type_name: "SQL".to_string(),
      enabled: true,
      script_path: PathBuf::from("sql/a.sql"),
      line: 2,
    };

    assert_eq!(task.resolve_script(None), PathBuf::from("sql/a.sql"));
    assert_eq!(
      task.resolve_script(Some(Path::new("/opt/pipeline"))),
      PathBuf::from("/opt/pipeline/sql/a.sql")
    );
  }
}
