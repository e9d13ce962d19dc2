use super::types::{Group, RawStep, DEFAULT_GROUP};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const FLOW_EXTENSIONS: &[&str] = &["flow", "txt", "md"];

/// Read a flow file from disk
pub fn read_flow_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Resolve a file or directory argument into the flow files to run, sorted
pub fn collect_flow_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("Path not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| FLOW_EXTENSIONS.contains(&ext))
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}

/// Split flow text into ordered groups of steps.
///
/// `#` lines open a group, `N.` lines are steps, anything else is ignored.
/// Groups are returned in the order their name first appeared; steps
/// written under a repeated heading are appended to the first group of
/// that name. Groups without steps are never emitted.
pub fn parse_flow(text: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut current = DEFAULT_GROUP.to_string();
    let mut buffer: Vec<RawStep> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(heading) = line.strip_prefix('#') {
            flush(&mut groups, &current, &mut buffer);
            current = heading.trim().to_string();
        } else if let Some(ordinal) = leading_ordinal(line) {
            buffer.push(RawStep {
                ordinal,
                line: line.to_string(),
            });
        } else {
            log::debug!("Ignoring non-step line: {}", line);
        }
    }
    flush(&mut groups, &current, &mut buffer);

    groups
}

fn flush(groups: &mut Vec<Group>, name: &str, buffer: &mut Vec<RawStep>) {
    if buffer.is_empty() {
        return;
    }
    match groups.iter_mut().find(|g| g.name == name) {
        Some(group) => group.steps.append(buffer),
        None => {
            let mut group = Group::new(name);
            group.steps.append(buffer);
            groups.push(group);
        }
    }
}

/// Parse the `N` of a line starting with `N.`
fn leading_ordinal(line: &str) -> Option<u32> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || !line[digits..].starts_with('.') {
        return None;
    }
    // Absurdly long ordinals still count as steps
    Some(line[..digits].parse().unwrap_or(u32::MAX))
}
