use crate::{
  exec::{Command, ExecOutcome, Executor, Output},
  NodeError, Result,
};
use std::{
  fs,
  path::{Path, PathBuf},
  sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeResponse {
  Exited(Output),
  TimedOut,
  /// The program could not be started.
  Missing,
}

impl FakeResponse {
  pub fn success(text: impl Into<String>) -> Self {
    FakeResponse::Exited(Output::success(text))
  }

  pub fn failure(code: i32, text: impl Into<String>) -> Self {
    FakeResponse::Exited(Output::new(Some(code), text))
  }
}

struct Rule {
  pattern: String,
  response: FakeResponse,
  once: bool,
}

struct FakeExecutorInner {
  log: Vec<Command>,
  rules: Vec<Rule>,
  mount_table: Option<PathBuf>,
}

/// Records every command and answers from scripted responses. Commands with
/// no matching response succeed with empty output.
///
/// When given a mount table, successful `mount` and `umount` commands edit
/// that file the way the kernel would edit `/proc/mounts`.
pub struct FakeExecutor(Mutex<FakeExecutorInner>);

impl Default for FakeExecutor {
  fn default() -> Self {
    FakeExecutor::new()
  }
}

impl FakeExecutor {
  pub fn new() -> Self {
    let inner = FakeExecutorInner {
      log: Vec::new(),
      rules: Vec::new(),
      mount_table: None,
    };

    Self(Mutex::new(inner))
  }

  pub fn with_mount_table(path: impl Into<PathBuf>) -> Self {
    let fake = FakeExecutor::new();
    fake.lock().mount_table = Some(path.into());
    fake
  }

  fn lock(&self) -> MutexGuard<'_, FakeExecutorInner> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Answers every command whose line starts with `pattern`. The program
  /// may be given by base name. Later responses take precedence.
  pub fn respond(&self, pattern: impl Into<String>, response: FakeResponse) {
    self.lock().rules.push(Rule {
      pattern: pattern.into(),
      response,
      once: false,
    });
  }

  /// Like [`respond`](Self::respond), but only for the next matching command.
  pub fn respond_once(&self, pattern: impl Into<String>, response: FakeResponse) {
    self.lock().rules.push(Rule {
      pattern: pattern.into(),
      response,
      once: true,
    });
  }

  pub fn reset_log(&self) {
    self.lock().log.clear();
  }

  pub fn get_log(&self) -> Vec<Command> {
    self.lock().log.clone()
  }

  /// Logged command lines, with programs shortened to their base name.
  pub fn get_lines(&self) -> Vec<String> {
    self.lock().log.iter().map(short_line).collect()
  }
}

fn short_line(command: &Command) -> String {
  let mut line = command.name().to_owned();
  for arg in command.arguments() {
    line.push(' ');
    line.push_str(arg);
  }
  line
}

impl Executor for FakeExecutor {
  fn execute(&self, command: &Command) -> Result<ExecOutcome> {
    let mut inner = self.lock();
    inner.log.push(command.clone());

    let full = command.to_string();
    let short = short_line(command);
    let matched = inner
      .rules
      .iter()
      .rposition(|r| full.starts_with(&r.pattern) || short.starts_with(&r.pattern));

    let response = match matched {
      Some(i) if inner.rules[i].once => inner.rules.remove(i).response,
      Some(i) => inner.rules[i].response.clone(),
      None => FakeResponse::success(""),
    };

    match response {
      FakeResponse::Exited(output) => {
        if output.is_success() {
          if let Some(table) = &inner.mount_table {
            apply_mount(table, command)?;
          }
        }
        Ok(ExecOutcome::Exited(output))
      }
      FakeResponse::TimedOut => Ok(ExecOutcome::TimedOut),
      FakeResponse::Missing => Err(NodeError::ExternalTool {
        command: full,
        status: None,
        output: format!("{} not found", command.program()),
      }),
    }
  }
}

fn apply_mount(table: &Path, command: &Command) -> Result<()> {
  let args = command.arguments();
  let content = match fs::read_to_string(table) {
    Ok(content) => content,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
    Err(e) => return Err(e.into()),
  };

  let mut lines = content
    .lines()
    .filter(|l| !l.is_empty())
    .map(str::to_owned)
    .collect::<Vec<_>>();

  let mount_of = |path: &str, lines: &[String]| {
    lines
      .iter()
      .map(|l| l.split_whitespace().collect::<Vec<_>>())
      .find(|f| f.get(1) == Some(&path))
      .map(|f| (f[0].to_owned(), f[2].to_owned()))
  };

  match (command.name(), args) {
    ("mount", [bind, source, target]) if bind == "--bind" => {
      // Bind mounts show the original device, not the source directory.
      let (device, fstype) =
        mount_of(source.as_str(), &lines).unwrap_or_else(|| (source.clone(), "none".into()));
      lines.push(format!("{} {} {} rw,bind 0 0", device, target, fstype));
      info!("Fake executor: bound {} to {}", source, target);
    }
    ("mount", [t, fstype, s, source, tg, target])
      if t == "-t" && s == "--source" && tg == "--target" =>
    {
      lines.push(format!("{} {} {} rw 0 0", source, target, fstype));
      info!("Fake executor: mounted {} to {}", source, target);
    }
    ("umount", [target]) => {
      if let Some(i) = lines
        .iter()
        .rposition(|l| l.split_whitespace().nth(1) == Some(target.as_str()))
      {
        lines.remove(i);
        info!("Fake executor: unmounted {}", target);
      }
    }
    _ => return Ok(()),
  }

  let mut content = lines.join("\n");
  content.push('\n');

  // Replaced whole so concurrent readers never see a partial table.
  let tmp = table.with_extension("fake-tmp");
  fs::write(&tmp, content)?;
  fs::rename(&tmp, table)?;
  Ok(())
}
