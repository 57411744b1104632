use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::LedgerConfig;
use crate::model::ledger::Ledger;
use crate::model::workspace::Workspace;

pub const GOALPOST_DIR: &str = ".goalpost";
pub const CONFIG_FILE: &str = "goalpost.toml";
pub const LEDGER_FILE: &str = "ledger.json";

/// Error type for ledger I/O operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("not a goalpost directory: no .goalpost/ found")]
    NotALedger,
    #[error("a ledger already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse goalpost.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse goalpost.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("unknown config key '{0}' (expected ledger.name, tree.indent_width, tree.orphans or display.currency)")]
    UnknownConfigKey(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidConfigValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("could not parse {path}: {source}")]
    LedgerParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize ledger: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// Discover the ledger by walking up from the given directory, looking for a
/// `.goalpost/` subdirectory with a config file.
pub fn discover_ledger(start: &Path) -> Result<PathBuf, LedgerError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(GOALPOST_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(LedgerError::NotALedger);
        }
    }
}

/// Create `.goalpost/` under `root` with a default config and an empty
/// ledger. Returns the new directory.
pub fn init_ledger(root: &Path, name: &str) -> Result<PathBuf, LedgerError> {
    let dir = root.join(GOALPOST_DIR);
    if dir.join(CONFIG_FILE).exists() {
        return Err(LedgerError::AlreadyExists(dir));
    }
    fs::create_dir_all(&dir).map_err(|e| LedgerError::WriteError {
        path: dir.clone(),
        source: e,
    })?;

    let mut doc = toml_edit::DocumentMut::new();
    doc["ledger"] = toml_edit::table();
    doc["ledger"]["name"] = toml_edit::value(name);
    doc["tree"] = toml_edit::table();
    doc["tree"]["indent_width"] = toml_edit::value(24);
    doc["tree"]["orphans"] = toml_edit::value("drop");
    doc["display"] = toml_edit::table();
    doc["display"]["currency"] = toml_edit::value("$");
    write_file(&dir.join(CONFIG_FILE), doc.to_string().as_bytes())?;
    save_ledger(&dir, &Ledger::default())?;
    tracing::info!(path = %dir.display(), "initialized ledger");
    Ok(dir)
}

/// Load the config and ledger under `root`. A missing ledger.json reads as an
/// empty ledger.
pub fn load_workspace(root: &Path) -> Result<Workspace, LedgerError> {
    let dir = root.join(GOALPOST_DIR);
    if !dir.is_dir() {
        return Err(LedgerError::NotALedger);
    }

    let config_path = dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| LedgerError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: LedgerConfig = toml::from_str(&config_text)?;

    let ledger = load_ledger(&dir)?;
    tracing::debug!(
        goals = ledger.goals.len(),
        tasks = ledger.tasks.len(),
        "loaded ledger"
    );

    Ok(Workspace {
        root: root.to_path_buf(),
        dir,
        config,
        ledger,
    })
}

pub fn load_ledger(dir: &Path) -> Result<Ledger, LedgerError> {
    let path = dir.join(LEDGER_FILE);
    if !path.exists() {
        return Ok(Ledger::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| LedgerError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| LedgerError::LedgerParseError { path, source: e })
}

/// Replace ledger.json with the given records.
pub fn save_ledger(dir: &Path, ledger: &Ledger) -> Result<(), LedgerError> {
    let mut content = serde_json::to_vec_pretty(ledger)?;
    content.push(b'\n');
    write_file(&dir.join(LEDGER_FILE), &content)?;
    tracing::debug!(bytes = content.len(), tasks = ledger.tasks.len(), "saved ledger");
    Ok(())
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), LedgerError> {
    atomic_write(path, content).map_err(|e| LedgerError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write via a temp file in the same directory and rename over the target,
/// so readers never see a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
