//! Rewrite configuration

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::RewriteError;

/// SQL Server compatibility level the tokenizer validates against.
///
/// Mirrors the `SqlXXX` target platform names used by SQL Server tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum CompatibilityLevel {
    /// SQL Server 2008
    Sql100,
    /// SQL Server 2012, first release with `IIF`
    #[default]
    Sql110,
    Sql120,
    Sql130,
    Sql140,
    Sql150,
    Sql160,
}

impl CompatibilityLevel {
    /// Whether the ternary conditional function `IIF(cond, a, b)` is available.
    pub fn supports_iif(self) -> bool {
        self >= CompatibilityLevel::Sql110
    }
}

impl FromStr for CompatibilityLevel {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "sql100" => CompatibilityLevel::Sql100,
            "sql110" => CompatibilityLevel::Sql110,
            "sql120" => CompatibilityLevel::Sql120,
            "sql130" => CompatibilityLevel::Sql130,
            "sql140" => CompatibilityLevel::Sql140,
            "sql150" => CompatibilityLevel::Sql150,
            "sql160" => CompatibilityLevel::Sql160,
            _ => {
                return Err(RewriteError::InvalidCompatibilityLevel {
                    value: s.to_string(),
                })
            }
        };
        Ok(level)
    }
}

impl TryFrom<String> for CompatibilityLevel {
    type Error = RewriteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompatibilityLevel::Sql100 => "Sql100",
            CompatibilityLevel::Sql110 => "Sql110",
            CompatibilityLevel::Sql120 => "Sql120",
            CompatibilityLevel::Sql130 => "Sql130",
            CompatibilityLevel::Sql140 => "Sql140",
            CompatibilityLevel::Sql150 => "Sql150",
            CompatibilityLevel::Sql160 => "Sql160",
        };
        f.write_str(name)
    }
}

/// Line terminator used in synthesized SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Options shared by the rewrite engine and the actions that re-tokenize SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Compatibility level used when tokenizing and validating scripts
    pub compatibility: CompatibilityLevel,
    /// Line terminator for generated guard blocks
    pub line_ending: LineEnding,
}
