//! The map views a tile can be rendered in.

use std::fmt;
use std::str::FromStr;

/// A rendering mode. Both views are derived from the same column data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    TopDown,
    Isometric,
}

impl View {
    /// Every supported view, in a fixed order.
    pub const ALL: [View; 2] = [View::TopDown, View::Isometric];

    /// The identifier used in URLs and on-disk paths.
    pub fn as_str(self) -> &'static str {
        match self {
            View::TopDown => "topdown",
            View::Isometric => "isometric",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string named no known view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view '{0}'")]
pub struct ParseViewError(pub String);

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseViewError(s.to_string()))
    }
}
