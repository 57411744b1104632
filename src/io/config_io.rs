use std::fs;
use std::path::Path;

use crate::io::ledger_io::{CONFIG_FILE, LedgerError, atomic_write};
use crate::model::config::{LedgerConfig, OrphanPolicy};

/// Read goalpost.toml, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(dir: &Path) -> Result<(LedgerConfig, toml_edit::DocumentMut), LedgerError> {
    let config_path = dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| LedgerError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: LedgerConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), LedgerError> {
    let config_path = dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| LedgerError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Set one `section.key` in the document after validating the value.
/// Comments and unrelated keys are left untouched.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<(), LedgerError> {
    let invalid = |reason: &str| LedgerError::InvalidConfigValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (section, field, item) = match key {
        "ledger.name" => ("ledger", "name", toml_edit::value(value)),
        "tree.indent_width" => {
            let width: u32 = value
                .parse()
                .map_err(|_| invalid("expected a positive whole number"))?;
            if width == 0 {
                return Err(invalid("must be greater than zero"));
            }
            ("tree", "indent_width", toml_edit::value(i64::from(width)))
        }
        "tree.orphans" => {
            let policy: OrphanPolicy = value.parse().map_err(|e: String| invalid(&e))?;
            ("tree", "orphans", toml_edit::value(policy.to_string()))
        }
        "display.currency" => ("display", "currency", toml_edit::value(value)),
        other => return Err(LedgerError::UnknownConfigKey(other.to_string())),
    };

    if !doc.contains_key(section) {
        doc[section] = toml_edit::table();
    }
    doc[section][field] = item;
    Ok(())
}

/// Read, edit and write back a single key. Returns the new parsed config.
pub fn update_config(dir: &Path, key: &str, value: &str) -> Result<LedgerConfig, LedgerError> {
    let (_, mut doc) = read_config(dir)?;
    set_config_value(&mut doc, key, value)?;
    let config: LedgerConfig = toml::from_str(&doc.to_string())?;
    write_config(dir, &doc)?;
    tracing::debug!(key, value, "updated config");
    Ok(config)
}
