//! # Worker Script
//!
//! The scheduler runs the same script once per array task. Rendering turns a
//! [`WorkerScript`] value into that script's text through a minijinja
//! template; the template itself lives in `templates/worker.sh.j2` so it can
//! be read and diffed as plain shell.
//!
//! The user's command template may reference these placeholders:
//!
//! | placeholder     | value                                    |
//! |-----------------|------------------------------------------|
//! | `{query}`       | the task's query entry (its input file)  |
//! | `{input_file}`  | `<input>/<slice>/<task_id>`              |
//! | `{output_file}` | `<output>/<slice>/<task_id>`             |
//! | `{error_file}`  | `<error>/<slice>/<task_id>`              |
//! | `{target}`      | the configured target                    |
//! | `{work_dir}`    | the job's work directory                 |
//! | `{task_id}`     | the item index                           |
//! | `{slice}`       | the item's slice number                  |
//!
//! Each becomes a double-quoted reference to a shell variable the script
//! sets, so values are never re-split by the shell. Other brace groups, such
//! as `awk '{print $1}'`, are left alone.

use crate::config::TaskEnv;
use crate::error::{JobError, Result};
use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const WORKER_TEMPLATE: &str = include_str!("templates/worker.sh.j2");

pub const PLACEHOLDERS: &[&str] = &[
    "query",
    "target",
    "work_dir",
    "task_id",
    "slice",
    "input_file",
    "output_file",
    "error_file",
];

#[derive(Debug, Clone, Serialize)]
pub struct WorkerScript {
    pub work_dir: String,
    pub input_dir: String,
    pub output_dir: String,
    pub error_dir: String,
    pub target: String,
    /// Command template, placeholders not yet rewritten
    pub command: String,
    pub slice_size: u64,
    pub task_env: TaskEnv,
}

/// Renders `template` for `script`. Pure: nothing is written.
pub fn render(template: &str, script: &WorkerScript) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("shquote", |value: String| shell_quote(&value));
    env.add_template("worker", template)?;

    let text = env.get_template("worker")?.render(context! {
        script => script,
        command => shell_command(&script.command),
        version => env!("CARGO_PKG_VERSION"),
    })?;
    Ok(text)
}

/// Writes the rendered script and marks it executable.
pub fn write(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| JobError::fs(parent, e))?;
        }
    }
    fs::write(path, text).map_err(|e| JobError::fs(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| JobError::fs(path, e))?;
    }
    Ok(())
}

/// Rewrites `{placeholder}` markers into quoted shell variable references.
pub fn shell_command(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if PLACEHOLDERS.contains(&&after[..close]) => {
                out.push_str("\"${");
                out.push_str(&after[..close]);
                out.push_str("}\"");
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Quotes a word for POSIX sh, leaving plain words untouched.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}
