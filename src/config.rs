//! Configuration constants and types for the XOR combiner.

/// Width of the combiner's unit of transfer, in bytes.
pub const OCTET_SIZE: usize = 1;

/// Path argument that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SECURE_XOR_LOG";

/// Log filter used when `LOG_ENV` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// When the combiner stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Stop as soon as any input reports end-of-data.
    #[default]
    StopAtShortest,

    /// Keep going until every input has reached end-of-data at least once.
    /// Seekable inputs wrap around to their restart offset; unbounded
    /// inputs are waited on, so the output may be infinite.
    RunToLongest,
}

impl Mode {
    /// Build a mode from the `--longest` flag.
    pub fn from_longest(longest: bool) -> Self {
        if longest {
            Mode::RunToLongest
        } else {
            Mode::StopAtShortest
        }
    }

    /// Whether exhausted inputs are rewound or waited on rather than ending the run.
    pub fn is_longest(self) -> bool {
        self == Mode::RunToLongest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_stops_at_shortest() {
        assert_eq!(Mode::default(), Mode::StopAtShortest);
        assert!(!Mode::default().is_longest());
    }

    #[test]
    fn test_from_longest() {
        assert_eq!(Mode::from_longest(true), Mode::RunToLongest);
        assert_eq!(Mode::from_longest(false), Mode::StopAtShortest);
    }
}
