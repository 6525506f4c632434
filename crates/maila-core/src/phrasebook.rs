//! Phrase selection.
//!
//! Every reply family has a few interchangeable phrasings. The
//! [`Phrasebook`] picks one, either at random (the interactive default) or
//! always the first, which keeps tests and scripted runs reproducible.

use rand::seq::SliceRandom;

/// Picks one phrasing out of several and fills `{placeholders}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrasebook {
    randomize: bool,
}

impl Phrasebook {
    pub fn new(randomize: bool) -> Self {
        Self { randomize }
    }

    /// Always pick the first phrasing.
    pub fn deterministic() -> Self {
        Self::new(false)
    }

    /// Pick one of `options`. Empty input yields an empty string.
    pub fn pick<'a>(&self, options: &[&'a str]) -> &'a str {
        let choice = if self.randomize {
            options.choose(&mut rand::thread_rng())
        } else {
            options.first()
        };
        choice.copied().unwrap_or_default()
    }

    /// Pick one of `options` and substitute `{key}` placeholders.
    pub fn render(&self, options: &[&str], vars: &[(&str, &str)]) -> String {
        fill(self.pick(options), vars)
    }
}

impl Default for Phrasebook {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Substitute `{key}` placeholders in a template.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
