//! YAML front-matter splitting.
//!
//! A document may start with a `---` line, a YAML mapping, and a closing
//! `---` (or `...`) line. Everything after that is the body. Documents
//! without front matter have empty metadata.

use serde_yaml::{Mapping, Value};

use crate::error::Result;

/// Split `content` into its front-matter mapping and body.
pub fn split(content: &str) -> Result<(Mapping, &str)> {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((Mapping::new(), content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((parse_mapping(yaml)?, body));
        }
        offset += line.len();
    }

    // An opening marker without a closing one is treated as plain content.
    Ok((Mapping::new(), content))
}

fn parse_mapping(yaml: &str) -> Result<Mapping> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Ok(Mapping::new()),
    }
}
