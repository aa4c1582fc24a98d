//! Run-time options.

use serde_derive::{Deserialize, Serialize};

/// Run-time options of a solver.
///
/// Options can be read from a TOML table, where missing keys keep their
/// defaults, or set one at a time by name with
/// [`Solver::set`](../solver/struct.Solver.html#method.set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Run the self-check of the root assignment when configuration ends,
    /// and check every model found by `solve`.
    pub check: bool,
    /// Verbosity level for logging, 0 disables logging.
    pub verbose: u32,
    /// Suppress all logging, overriding `verbose`.
    pub quiet: bool,
    /// The polarity of decisions made by `solve`.
    pub phase: bool,
    /// Compact the clause arena once this percentage of it is garbage.
    pub compact: u32,
    /// Do not compact arenas smaller than this many literals.
    pub compactmin: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            check: false,
            verbose: 0,
            quiet: false,
            phase: true,
            compact: 10,
            compactmin: 100,
        }
    }
}

/// Names of all options, in declaration order.
pub const NAMES: [&str; 6] = ["check", "verbose", "quiet", "phase", "compact", "compactmin"];

/// Largest accepted value of `verbose`.
const MAX_VERBOSE: i64 = 3;

impl Options {
    /// Parse options from a TOML document.
    pub fn from_toml(text: &str) -> Result<Options, toml::de::Error> {
        toml::from_str(text)
    }
    /// Render the options as a TOML document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
    /// Set an option by name.
    ///
    /// Returns false if there is no such option or the value is out of range,
    /// in which case nothing is changed.
    pub fn set(&mut self, name: &str, value: i64) -> bool {
        let flag = || match value {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        };
        match name {
            "check" => flag().map(|value| self.check = value).is_some(),
            "quiet" => flag().map(|value| self.quiet = value).is_some(),
            "phase" => flag().map(|value| self.phase = value).is_some(),
            "verbose" if (0..=MAX_VERBOSE).contains(&value) => {
                self.verbose = value as u32;
                true
            }
            "compact" if (0..=100).contains(&value) => {
                self.compact = value as u32;
                true
            }
            "compactmin" if value >= 0 => {
                self.compactmin = value as usize;
                true
            }
            _ => false,
        }
    }
    /// The value of an option by name.
    pub fn get(&self, name: &str) -> Option<i64> {
        Some(match name {
            "check" => self.check as i64,
            "verbose" => i64::from(self.verbose),
            "quiet" => self.quiet as i64,
            "phase" => self.phase as i64,
            "compact" => i64::from(self.compact),
            "compactmin" => self.compactmin as i64,
            _ => return None,
        })
    }
    /// Whether the option only affects output, so it may be changed at any time.
    pub fn can_set_after_configuring(name: &str) -> bool {
        name == "verbose" || name == "quiet"
    }
    /// The logging level in effect.
    pub fn verbosity(&self) -> u32 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_by_name() {
        let mut options = Options::default();
        assert!(options.set("verbose", 2));
        assert!(options.set("phase", 0));
        assert!(!options.set("phase", 2));
        assert!(!options.set("compact", 101));
        assert!(!options.set("restarts", 1));
        assert_eq!(options.get("verbose"), Some(2));
        assert_eq!(options.get("phase"), Some(0));
        assert_eq!(options.get("compact"), Some(10));
        assert_eq!(options.get("restarts"), None);
        assert_eq!(options.verbosity(), 2);
        options.set("quiet", 1);
        assert_eq!(options.verbosity(), 0);
        for name in &NAMES {
            assert!(options.get(name).is_some());
        }
    }

    #[test]
    fn toml_table() {
        let options = Options::from_toml("check = true\ncompactmin = 0\n").unwrap();
        assert!(options.check);
        assert_eq!(options.compactmin, 0);
        assert_eq!(options.compact, Options::default().compact);
        assert!(Options::from_toml("check = 1\n").is_err());
        assert!(Options::from_toml("unknown = true\n").is_err());
        let text = options.to_toml().unwrap();
        assert_eq!(Options::from_toml(&text).unwrap(), options);
    }
}
