//! Structured doc-comment parsing.
//!
//! Tools can carry a Google-style documentation block: free description
//! text followed by an `Args:` section of `name: description` entries.
//! The parser extracts both; the deriver later checks every documented
//! name against the real argument list.

use caplet_core::{Error, Result};

/// Parsed documentation block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocComment {
    pub description: String,
    pub args: Vec<(String, String)>,
}

impl DocComment {
    pub fn arg_description(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, description)| description.as_str())
    }
}

/// Parses a Google-style doc comment.
///
/// Everything before an `Args:` line is the free-text description. Inside
/// the `Args:` block, each `name: description` line starts an entry and
/// indented text without a name continues the previous one; a
/// `Returns:`/`Raises:`/`Yields:`/`Examples:` heading ends the block. In
/// strict mode a line that fits neither shape is a descriptive error;
/// otherwise it is skipped.
pub fn parse_doc_comment(doc: &str, strict: bool) -> Result<DocComment> {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut args: Vec<(String, String)> = Vec::new();
    let mut in_args = false;
    let mut args_done = false;

    for line in doc.lines() {
        let trimmed = line.trim();

        if !in_args {
            if matches!(trimmed, "Args:" | "Arguments:") && !args_done {
                in_args = true;
                continue;
            }
            if !args_done {
                description_lines.push(trimmed);
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "Returns:" | "Raises:" | "Yields:" | "Examples:") {
            in_args = false;
            args_done = true;
            continue;
        }

        match split_arg_line(trimmed) {
            Some((name, description)) => args.push((name, description)),
            None => {
                if let Some((_, last)) = args.last_mut() {
                    // Continuation of the previous entry
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(trimmed);
                } else if strict {
                    return Err(Error::config(format!(
                        "malformed doc comment: expected `name: description` in Args block, got `{trimmed}`"
                    )));
                }
            }
        }
    }

    Ok(DocComment {
        description: description_lines.join("\n").trim().to_string(),
        args,
    })
}

/// Splits an `Args:` entry into its name and description. Accepts a bare
/// identifier or an identifier followed by a parenthesized type hint.
fn split_arg_line(line: &str) -> Option<(String, String)> {
    let (head, tail) = line.split_once(':')?;
    let name = head.trim().split_whitespace().next()?;
    if name.is_empty()
        || !name
            .chars()
            .all(|character| character.is_alphanumeric() || character == '_')
    {
        return None;
    }
    Some((name.to_string(), tail.trim().to_string()))
}
