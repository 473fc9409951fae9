use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::model::Story;

/// Serialize a story; `indent == 0` gives compact JSON.
pub fn to_json(story: &Story, indent: usize) -> Result<String> {
    if indent == 0 {
        return Ok(serde_json::to_string(story)?);
    }

    let spaces = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(spaces.as_bytes()));
    story.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// Write the story to `path`, or stdout when there is none.
pub fn write_json(story: &Story, path: Option<&Path>, indent: usize) -> Result<()> {
    let mut json = to_json(story, indent)?;
    json.push('\n');

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {:?}", parent))?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
