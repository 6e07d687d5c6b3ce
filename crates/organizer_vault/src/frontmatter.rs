use serde_yaml::{Mapping, Value};

const BOM: char = '\u{feff}';

/// Parsed state of a document's leading YAML block.
#[derive(Debug, Clone, PartialEq)]
pub enum Frontmatter {
    Absent,
    Parsed(Mapping),
    /// A block exists but is not a YAML mapping. Never rewritten.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument<'a> {
    pub frontmatter: Frontmatter,
    /// Everything after the closing delimiter line, byte for byte.
    pub body: &'a str,
    pub bom: bool,
}

/// Split markdown content into its frontmatter block and body.
///
/// The first line must be `---` (optionally after a BOM); the block ends at the next
/// `---` or `...` line. Without a closing line the whole input is treated as body.
pub fn split_frontmatter(input: &str) -> SplitDocument<'_> {
    let (content, bom) = match input.strip_prefix(BOM) {
        Some(rest) => (rest, true),
        None => (input, false),
    };
    let absent = SplitDocument {
        frontmatter: Frontmatter::Absent,
        body: content,
        bom,
    };

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return absent;
    };
    if first.trim_end() != "---" {
        return absent;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let raw_yaml = &content[yaml_start..offset];
            return SplitDocument {
                frontmatter: parse_block(raw_yaml),
                body: &content[offset + line.len()..],
                bom,
            };
        }
        offset += line.len();
    }

    absent
}

fn parse_block(yaml: &str) -> Frontmatter {
    if yaml.trim().is_empty() {
        return Frontmatter::Parsed(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => Frontmatter::Parsed(map),
        Ok(Value::Null) => Frontmatter::Parsed(Mapping::new()),
        Ok(_) => Frontmatter::Malformed("frontmatter is not a mapping".to_string()),
        Err(e) => Frontmatter::Malformed(e.to_string()),
    }
}

/// Serialize frontmatter and body back into one markdown document.
///
/// `separate` inserts a blank line between the block and the body, used when the
/// document had no frontmatter before.
pub fn render_document(
    frontmatter: &Mapping,
    body: &str,
    bom: bool,
    separate: bool,
) -> Result<String, serde_yaml::Error> {
    let mut out = String::with_capacity(body.len() + 64);
    if bom {
        out.push(BOM);
    }
    out.push_str("---\n");
    if !frontmatter.is_empty() {
        let yaml = serde_yaml::to_string(frontmatter)?;
        out.push_str(yaml.trim_end());
        out.push('\n');
    }
    out.push_str("---\n");
    if separate {
        out.push('\n');
    }
    out.push_str(body);
    Ok(out)
}
