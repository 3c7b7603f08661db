//! Hidden button sequences.
//!
//! Rules are tested in declaration order after every press and the first
//! rule whose codes end the press history wins. When two rules share a
//! trailing overlap the earlier one shadows the later one, so the order of
//! the `sequences` list in the configuration is significant.

use tracing::debug;

use crate::errors::JukeboxError;
use crate::model::{ButtonCode, HiddenAction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRule {
    pub name: String,
    pub codes: Vec<ButtonCode>,
    pub action: HiddenAction,
}

impl SequenceRule {
    pub fn new(name: &str, codes: Vec<ButtonCode>, action: HiddenAction) -> Self {
        Self {
            name: name.to_string(),
            codes,
            action,
        }
    }
}

#[derive(Debug)]
pub struct SequenceDetector {
    rules: Vec<SequenceRule>,
    history: Vec<ButtonCode>,
    max_rule_len: usize,
}

impl SequenceDetector {
    pub fn new(rules: Vec<SequenceRule>) -> Result<Self, JukeboxError> {
        if let Some(rule) = rules.iter().find(|rule| rule.codes.is_empty()) {
            return Err(JukeboxError::InvalidRule(
                rule.name.clone(),
                "empty button sequence".to_string(),
            ));
        }
        let max_rule_len = rules.iter().map(|rule| rule.codes.len()).max().unwrap_or(0);

        Ok(Self {
            rules,
            history: Vec::with_capacity(max_rule_len + 1),
            max_rule_len,
        })
    }

    /// Appends `code` and returns the first rule matching the end of the
    /// history. A match clears the history; the caller runs its action.
    pub fn record(&mut self, code: ButtonCode) -> Option<&SequenceRule> {
        self.history.push(code);
        if self.history.len() > self.max_rule_len {
            let excess = self.history.len() - self.max_rule_len;
            self.history.drain(..excess);
        }

        let matched = self
            .rules
            .iter()
            .find(|rule| self.history.ends_with(&rule.codes));

        if let Some(rule) = matched {
            debug!(rule = rule.name.as_str(), "Hidden sequence matched");
            self.history.clear();
        }
        matched
    }

    pub fn history(&self) -> &[ButtonCode] {
        &self.history
    }

    pub fn rules(&self) -> &[SequenceRule] {
        &self.rules
    }

    pub fn max_rule_len(&self) -> usize {
        self.max_rule_len
    }
}
