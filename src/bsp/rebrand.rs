//! esp32 → nuttyfi32 identifier renames.
//!
//! Applies the rebranding edits to an extracted BSP tree: the package index
//! template is renamed, `platform.txt` gets the nuttyfi32 display name and
//! `python3` tool invocations, and `boards.txt` gains a nuttyfi32 board
//! section mirroring the ESP32 Dev Module one. Only package identity is
//! touched; the `esp32` architecture and core files stay as they are.

use std::io;
use std::path::Path;

use crate::error::Result;

/// `platform.txt` keys whose tool command lines must call `python3`.
const PYTHON_KEYS: [&str; 4] = [
    "tools.esptool_py.network_cmd",
    "tools.gen_esp32part.cmd",
    "recipe.objcopy.bin.pattern.linux",
    "tools.esptool_py.upload.pattern.linux",
];

const BOARDS_MARKER: &str = "esp32.name=ESP32 Dev Module";

/// What the rebranding pass actually changed.
#[derive(Debug, Default)]
pub struct RebrandReport {
    pub renamed_template: bool,
    pub platform_updated: bool,
    pub boards_updated: bool,
}

/// Rebrands the BSP tree rooted at `root` in place.
///
/// Each edit is applied only where its target file exists; vendor trees
/// vary, and a missing `boards.txt` is not an error.
pub async fn rebrand_tree(root: &Path) -> Result<RebrandReport> {
    let mut report = RebrandReport::default();

    let old_template = root
        .join("package")
        .join("package_esp32_index.template.json");
    if tokio::fs::try_exists(&old_template).await.unwrap_or(false) {
        let new_template = root
            .join("package")
            .join("package_nuttyfi32_index.template.json");
        tokio::fs::rename(&old_template, &new_template).await?;
        log::info!("renamed package index template to {}", new_template.display());
        report.renamed_template = true;
    }

    report.platform_updated = rewrite_file(&root.join("platform.txt"), rewrite_platform).await?;
    report.boards_updated = rewrite_file(&root.join("boards.txt"), rewrite_boards).await?;

    Ok(report)
}

/// Reads a text file, applies `rewrite`, writes it back if it changed.
/// A missing file is skipped.
async fn rewrite_file(
    path: &Path,
    rewrite: fn(&str) -> Option<String>,
) -> Result<bool> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    match rewrite(&content) {
        Some(updated) => {
            tokio::fs::write(path, updated).await?;
            log::info!("updated {}", path.display());
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Rewrites `platform.txt`: the first ESP32 `name=` line becomes the
/// nuttyfi32 display name, and the known tool keys invoke `python3`.
///
/// Returns `None` when nothing changed.
fn rewrite_platform(content: &str) -> Option<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let mut changed = false;

    for line in &mut lines {
        if line.starts_with("name=") && line.contains("ESP32") {
            *line = "name=nuttyfi32 Arduino".to_string();
            changed = true;
            break;
        }
    }

    for line in &mut lines {
        for key in PYTHON_KEYS {
            let prefix = format!("{key}=python");
            if let Some(rest) = line.strip_prefix(&prefix) {
                // Leave lines already on python3 alone.
                if !rest.starts_with('3') {
                    *line = format!("{key}=python3{rest}");
                    changed = true;
                }
            }
        }
    }

    changed.then(|| lines.join("\n"))
}

/// Rewrites `boards.txt`: duplicates the ESP32 Dev Module section as a
/// `nuttyfi32.` section inserted right after it, keeping comments and blank
/// lines.
///
/// Returns `None` when the esp32 section is absent or the nuttyfi32 board
/// is already present.
fn rewrite_boards(content: &str) -> Option<String> {
    if content.contains("nuttyfi32.name=") {
        return None;
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let start = lines.iter().position(|l| l.trim() == BOARDS_MARKER)?;

    // The esp32 section ends at the first non-blank, non-comment line that
    // belongs to another board.
    let mut end = lines.len();
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with("esp32.") {
            end = i;
            break;
        }
    }

    let mut section: Vec<String> = vec![
        String::new(),
        "#".repeat(62),
        "# nuttyfi32 Dev Module".to_string(),
        "#".repeat(62),
        String::new(),
    ];
    for line in &lines[start..end] {
        let trimmed = line.trim();
        if trimmed.starts_with("esp32.") {
            section.push(line.replacen("esp32.", "nuttyfi32.", 1));
        } else if trimmed.is_empty() || trimmed.starts_with('#') {
            section.push((*line).to_string());
        }
    }

    let mut out: Vec<String> = lines[..end].iter().map(|s| (*s).to_string()).collect();
    out.extend(section);
    out.extend(lines[end..].iter().map(|s| (*s).to_string()));

    Some(out.join("\n"))
}
