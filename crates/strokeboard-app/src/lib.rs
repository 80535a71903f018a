//! Strokeboard command-line shell.
//!
//! Replays a newline-delimited JSON operation log through a replica and either
//! exports every page as PNG or prints page snapshots.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use strokeboard_core::{
    ConfigError, DrawingConfig, DrawingSession, Operation, OperationLog, PageKey, SnapshotError,
};
use strokeboard_render::{
    RasterRenderer, RendererError, Replica, ReplicaError, render_ledger,
};
use thiserror::Error;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "strokeboard")]
#[command(about = "Replay collaborative drawing logs")]
#[command(version)]
pub struct Cli {
    /// Drawing config (defaults to <config dir>/strokeboard/config.json)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a log and write every page as page-<key>.png
    Replay {
        /// Operation log, one JSON operation per line
        log: PathBuf,
        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,
    },
    /// Replay a log and print every page record as JSON
    Snapshot {
        /// Operation log, one JSON operation per line
        log: PathBuf,
    },
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{path}:{line}: invalid operation: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("Replica error: {0}")]
    Replica(#[from] ReplicaError),
}

/// Result type for the application.
pub type AppResult<T> = Result<T, AppError>;

/// Run a parsed command line, writing any textual output to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> AppResult<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Replay { log, out: dir } => {
            let written = export_pages(&replay_log(&log, &config)?, &dir)?;
            for path in written {
                writeln!(out, "{}", path.display())?;
            }
        }
        Command::Snapshot { log } => {
            let mut session = replay_log(&log, &config)?;
            for key in session.pages().keys() {
                if let Some(json) = session.snapshot(key)? {
                    writeln!(out, "{}", json)?;
                }
            }
        }
    }
    Ok(())
}

/// Explicit path, then the user config file if present, then defaults.
pub fn load_config(path: Option<&Path>) -> AppResult<DrawingConfig> {
    if let Some(path) = path {
        return Ok(DrawingConfig::load(path)?);
    }
    match default_config_path() {
        Some(path) if path.exists() => Ok(DrawingConfig::load(&path)?),
        _ => {
            log::debug!("No config file, using defaults");
            Ok(DrawingConfig::default())
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strokeboard").join("config.json"))
}

/// Parse a newline-delimited operation log. Blank lines are skipped.
pub fn read_operations(path: &Path) -> AppResult<Vec<Operation>> {
    let text = fs::read_to_string(path)?;
    let mut ops = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let op = Operation::from_json(line).map_err(|source| AppError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        ops.push(op);
    }
    Ok(ops)
}

/// Feed a log file through an operation log into a fresh replica.
pub fn replay_log(path: &Path, config: &DrawingConfig) -> AppResult<DrawingSession> {
    let ops = read_operations(path)?;
    log::info!("Replaying {} operations from {}", ops.len(), path.display());

    let mut log = OperationLog::new();
    let mut reader = log.subscribe();
    for op in ops {
        log.append(op);
    }

    let session = DrawingSession::new(config.page_width, config.page_height);
    let renderer = RasterRenderer::new(config.page_width, config.page_height)?;
    let mut replica = Replica::new(session, renderer)?;
    replica.sync(&mut reader)?;
    Ok(replica.into_session())
}

/// Render every page of a session into `dir`. Returns the written paths.
pub fn export_pages(session: &DrawingSession, dir: &Path) -> AppResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for key in session.pages().keys() {
        let Some(ledger) = session.pages().get(key) else {
            continue;
        };
        let path = dir.join(page_file_name(key));
        render_ledger(ledger)?.save_png(&path)?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

fn page_file_name(key: PageKey) -> String {
    format!("page-{}.png", key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokeboard_core::PageRecord;

    const LOG: &str = r#"
{"type":"start_gesture","page":0,"contributor":"u1"}
{"type":"append_segment","page":0,"segment":{"x0":0,"y0":0,"x1":10,"y1":10,"color":{"r":0,"g":0,"b":0,"a":255},"contributor":"u1"},"is_new":true}
{"type":"append_segment","page":0,"segment":{"x0":10,"y0":10,"x1":20,"y1":20,"color":{"r":0,"g":0,"b":0,"a":255},"contributor":"u1"},"is_new":false}
{"type":"page_changed","page":1,"width":32,"height":32}
{"type":"append_segment","page":1,"segment":{"x0":1,"y0":1,"x1":5,"y1":5,"color":{"r":255,"g":0,"b":0,"a":255},"contributor":"u2"},"is_new":true}
{"type":"undo","contributor":"u2"}
"#;

    fn write_log(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("ops.jsonl");
        fs::write(&path, text).unwrap();
        path
    }

    fn small_config() -> DrawingConfig {
        DrawingConfig {
            page_width: 64,
            page_height: 64,
            ..DrawingConfig::default()
        }
    }

    #[test]
    fn test_read_operations_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let ops = read_operations(&write_log(dir.path(), LOG)).unwrap();
        assert_eq!(ops.len(), 6);
        assert!(matches!(ops[5], Operation::Undo { .. }));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(dir.path(), "{\"type\":\"undo\",\"contributor\":\"u1\"}\nnot json\n");
        match read_operations(&path) {
            Err(AppError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_log_builds_pages() {
        let dir = tempfile::tempdir().unwrap();
        let session = replay_log(&write_log(dir.path(), LOG), &small_config()).unwrap();

        assert_eq!(session.current_key(), PageKey(1));
        assert_eq!(session.current().active_count(), 0);
        let page0 = session.pages().get(PageKey(0)).unwrap();
        assert_eq!(page0.strokes().next().unwrap().len(), 2);
        assert_eq!((page0.width(), page0.height()), (64, 64));
    }

    #[test]
    fn test_export_pages_writes_png_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let session = replay_log(&write_log(dir.path(), LOG), &small_config()).unwrap();
        let out = dir.path().join("out");

        let written = export_pages(&session, &out).unwrap();
        assert_eq!(written, vec![out.join("page-0.png"), out.join("page-1.png")]);
        let bytes = fs::read(&written[0]).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_snapshot_command_prints_records() {
        let dir = tempfile::tempdir().unwrap();
        let log = write_log(dir.path(), LOG);
        let config = dir.path().join("config.json");
        fs::write(&config, r#"{"page_width": 48, "page_height": 48}"#).unwrap();

        let cli = Cli::parse_from([
            "strokeboard",
            "--config",
            config.to_str().unwrap(),
            "snapshot",
            log.to_str().unwrap(),
        ]);
        let mut out = Vec::new();
        run(cli, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let records: Vec<PageRecord> = text
            .lines()
            .map(|line| PageRecord::from_json(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, PageKey(0));
        assert_eq!(records[0].width, 48);
        assert!(!records[1].strokes[0].is_active());
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(AppError::Config(ConfigError::Io(_)))));
    }
}
