//! External hint collaborator
//!
//! A hint provider contributes extra keyword strings to pattern analysis,
//! typically backed by an external suggestion service. Providers are allowed
//! to fail; composition degrades to an empty hint list.

pub type HintError = Box<dyn std::error::Error + Send + Sync>;

pub trait HintProvider: Send + Sync {
    fn hints(&self, context_text: &str, platform: &str) -> Result<Vec<String>, HintError>;
}

/// Provider that never contributes hints
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHints;

impl HintProvider for NoHints {
    fn hints(&self, _context_text: &str, _platform: &str) -> Result<Vec<String>, HintError> {
        Ok(Vec::new())
    }
}

/// Provider returning a fixed hint list
#[derive(Debug, Clone, Default)]
pub struct StaticHints {
    hints: Vec<String>,
}

impl StaticHints {
    pub fn new<I, S>(hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hints: hints.into_iter().map(Into::into).collect(),
        }
    }
}

impl HintProvider for StaticHints {
    fn hints(&self, _context_text: &str, _platform: &str) -> Result<Vec<String>, HintError> {
        Ok(self.hints.clone())
    }
}
