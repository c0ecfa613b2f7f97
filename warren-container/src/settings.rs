//! Container settings.
//!
//! Settings are plain data with `serde` support, so they can live
//! inside an application's own config file.

use serde::{Deserialize, Serialize};

/// Tunables for a [`Container`](crate::container::Container).
///
/// # Examples
/// ```
/// use warren_container::settings::Settings;
///
/// let settings = Settings::default().max_suggestions(5);
/// assert_eq!(settings.max_suggestions, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many "did you mean?" names an error may list.
    pub max_suggestions: usize,
}

impl Settings {
    /// Sets the suggestion limit; `0` disables suggestions.
    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self { max_suggestions: 3 }
    }
}
