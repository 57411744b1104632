use std::path::PathBuf;

use super::config::LedgerConfig;
use super::ledger::Ledger;

/// A fully loaded goalpost directory
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `.goalpost/`
    pub root: PathBuf,
    /// Path to the `.goalpost/` directory
    pub dir: PathBuf,
    /// Parsed goalpost.toml
    pub config: LedgerConfig,
    /// Records from ledger.json
    pub ledger: Ledger,
}
