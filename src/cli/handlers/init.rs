use std::path::Path;

use serde::Serialize;

use super::Context;
use crate::cli::commands::InitArgs;
use crate::io::ledger_io;

#[derive(Serialize)]
struct InitJson {
    name: String,
    path: String,
}

/// Infer a ledger name from a directory name: hyphens and underscores become
/// spaces, each word title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let root = match &ctx.ledger_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    // Nested ledgers are allowed but usually a mistake
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = ledger_io::discover_ledger(parent)
    {
        eprintln!(
            "Note: parent ledger found at {}/",
            parent_root.join(ledger_io::GOALPOST_DIR).display()
        );
    }

    let name = args
        .name
        .unwrap_or_else(|| infer_name(dir_name(&root)));
    let dir = ledger_io::init_ledger(&root, &name)?;

    if ctx.json {
        let out = InitJson {
            name,
            path: dir.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Initialized ledger: {}", name);
    }
    Ok(())
}

fn dir_name(root: &Path) -> &str {
    root.file_name().and_then(|n| n.to_str()).unwrap_or("ledger")
}
