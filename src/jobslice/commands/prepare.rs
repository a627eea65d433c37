use crate::commands::{extract, CmdMessage, CmdResult, IndexRange, JobPaths};
use crate::config::JobConfig;
use crate::error::{JobError, Result};
use crate::script::{self, WorkerScript, WORKER_TEMPLATE};
use crate::source::RecordSource;
use std::fs;
use std::path::Path;
use tracing::info;

/// Extracts the query (unless already done), then (re)writes the worker
/// script and saves the configuration next to it.
///
/// The configuration is checked before anything is written.
pub fn run<R, F>(paths: &JobPaths, config: &JobConfig, open: F) -> Result<CmdResult>
where
    R: RecordSource,
    F: FnOnce(&Path) -> Result<R>,
{
    config.validate()?;
    let (query, command) = config.require_prepare()?;

    let work_dir = paths.work_dir();
    if !work_dir.exists() {
        fs::create_dir_all(work_dir).map_err(|e| JobError::fs(work_dir, e))?;
    }
    config.save(work_dir)?;

    let mut result = CmdResult::default();

    let manifest = paths.manifest();
    let report = extract::run(
        || open(query),
        &manifest,
        &paths.input_slices(config.slice_size),
        IndexRange::new(config.index_min, config.index_max),
    )?;
    if report.skipped {
        result.add_message(CmdMessage::info(format!(
            "Manifest {} already exists; reusing {} item(s). Run `jobslice clean` to extract again.",
            manifest.path().display(),
            report.total
        )));
    } else {
        result.add_message(CmdMessage::success(format!(
            "Extracted {} of {} record(s) into {}",
            report.written,
            report.total,
            paths.input_dir().display()
        )));
    }

    let worker = WorkerScript {
        work_dir: work_dir.display().to_string(),
        input_dir: paths.input_dir().display().to_string(),
        output_dir: paths.output_dir().display().to_string(),
        error_dir: paths.error_dir().display().to_string(),
        target: config.target.clone().unwrap_or_default(),
        command: command.to_string(),
        slice_size: config.slice_size,
        task_env: config.task_env.clone(),
    };
    let script_path = paths.script_path();
    script::write(&script_path, &script::render(WORKER_TEMPLATE, &worker)?)?;
    info!(script = %script_path.display(), "wrote worker script");
    result.add_message(CmdMessage::success(format!(
        "Wrote worker script {}",
        script_path.display()
    )));

    Ok(result.with_extract(report).with_script_path(script_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, CONFIG_FILENAME};
    use crate::source::{MemorySource, Record};
    use std::path::PathBuf;

    fn config() -> JobConfig {
        JobConfig {
            query: Some(PathBuf::from("query.fa")),
            target: Some("db".to_string()),
            command: Some("cat {query}".to_string()),
            ..JobConfig::default()
        }
    }

    fn source(_query: &Path) -> Result<MemorySource> {
        Ok(MemorySource::new(vec![
            Record::new("A", "a\n"),
            Record::new("B", "b\n"),
        ]))
    }

    #[test]
    fn test_prepare_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path().join("job"), Layout::default());

        let result = run(&paths, &config(), source).unwrap();

        assert_eq!(result.extract.as_ref().unwrap().written, 2);
        assert!(paths.manifest().exists());
        assert!(paths.script_path().is_file());
        assert!(paths.work_dir().join(CONFIG_FILENAME).is_file());
        assert_eq!(JobConfig::load(paths.work_dir()).unwrap(), config());

        let text = fs::read_to_string(paths.script_path()).unwrap();
        assert!(text.contains(r#"( cat "${query}" )"#));
        assert!(text.contains("target=db\n"));
    }

    #[test]
    fn test_prepare_passes_query_to_opener() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path(), Layout::default());

        run(&paths, &config(), |query: &Path| {
            assert_eq!(query, Path::new("query.fa"));
            source(query)
        })
        .unwrap();
    }

    #[test]
    fn test_rerun_regenerates_script_only() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path(), Layout::default());
        run(&paths, &config(), source).unwrap();

        let changed = JobConfig {
            command: Some("wc -l {input_file}".to_string()),
            ..config()
        };
        let result = run(&paths, &changed, |_: &Path| -> Result<MemorySource> {
            Err(JobError::Source("must not be opened".into()))
        })
        .unwrap();

        assert!(result.extract.unwrap().skipped);
        let text = fs::read_to_string(paths.script_path()).unwrap();
        assert!(text.contains(r#"( wc -l "${input_file}" )"#));
    }

    #[test]
    fn test_missing_command_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path().join("job"), Layout::default());
        let incomplete = JobConfig {
            command: None,
            ..config()
        };

        let err = run(&paths, &incomplete, source).unwrap_err();
        assert!(matches!(err, JobError::Config(_)));
        assert!(!paths.work_dir().exists());
    }
}
