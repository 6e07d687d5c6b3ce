//! Detection of redirect and template stubs left behind by wiki imports.

use organizer_core::CleanupConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StubKind {
    Redirect,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubDetector {
    redirect_markers: Vec<String>,
    template_prefixes: Vec<String>,
}

impl StubDetector {
    /// `None` when cleanup is disabled.
    pub fn from_config(config: &CleanupConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self::new(&config.redirect_markers, &config.template_prefixes))
    }

    pub fn new(redirect_markers: &[String], template_prefixes: &[String]) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            redirect_markers: lower(redirect_markers),
            template_prefixes: lower(template_prefixes),
        }
    }

    /// Redirect: the first non-blank body line starts with a marker followed by
    /// whitespace, `[` or the end of the line, so `#redirection-policy` is a tag.
    /// Template: the file stem starts with a template prefix.
    pub fn detect(&self, stem: &str, body: &str) -> Option<StubKind> {
        let stem = stem.to_lowercase();
        if self.template_prefixes.iter().any(|p| stem.starts_with(p)) {
            return Some(StubKind::Template);
        }
        let first = body.lines().map(str::trim).find(|line| !line.is_empty())?;
        let first = first.to_lowercase();
        if self.redirect_markers.iter().any(|m| starts_with_marker(&first, m)) {
            return Some(StubKind::Redirect);
        }
        None
    }
}

fn starts_with_marker(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker).is_some_and(|rest| {
        rest.chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c == '[')
    })
}
