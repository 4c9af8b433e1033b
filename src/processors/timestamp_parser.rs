use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};

/// Result of running text through the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// `rank` is the position of the winning strategy in the chain.
    Parsed {
        value: NaiveDateTime,
        pattern: &'static str,
        rank: usize,
    },
    NoMatch,
}

impl ParseOutcome {
    pub fn value(&self) -> Option<NaiveDateTime> {
        match self {
            ParseOutcome::Parsed { value, .. } => Some(*value),
            ParseOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ParseOutcome::Parsed { .. })
    }
}

/// One way of turning timestamp text into a value.
pub trait ParseStrategy: Send + Sync {
    fn label(&self) -> &'static str;
    fn parse(&self, text: &str) -> Option<NaiveDateTime>;
}

/// A fixed layout: `shape` enforces the digit widths the pattern letters
/// imply, `format` does the conversion.
pub struct LayoutStrategy {
    label: &'static str,
    shape: Regex,
    format: &'static str,
}

impl LayoutStrategy {
    pub fn new(label: &'static str, shape: &str, format: &'static str) -> Result<Self> {
        Ok(Self {
            label,
            shape: Regex::new(shape)?,
            format,
        })
    }
}

impl ParseStrategy for LayoutStrategy {
    fn label(&self) -> &'static str {
        self.label
    }

    fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        if !self.shape.is_match(text) {
            return None;
        }
        NaiveDateTime::parse_from_str(text, self.format).ok()
    }
}

/// Last-resort parse of ISO-8601 style text: `yyyy`, `yyyy-M`, `yyyy-M-d`,
/// optionally followed by ` ` or `T`, `H:m[:s[.fraction]]` and a zone
/// suffix. The zone is accepted but ignored; the wall-clock value is kept.
pub struct DefaultStrategy {
    shape: Regex,
}

impl DefaultStrategy {
    pub const LABEL: &'static str = "default";

    pub fn new() -> Result<Self> {
        let shape = Regex::new(
            r"^([0-9]{4})(?:-([0-9]{1,2})(?:-([0-9]{1,2})(?:[ T]([0-9]{1,2}):([0-9]{1,2})(?::([0-9]{1,2})(?:\.([0-9]{1,9}))?)?(?:Z|[+-][0-9]{2}(?::?[0-9]{2})?)?)?)?)?$",
        )?;
        Ok(Self { shape })
    }

    fn field(caps: &Captures<'_>, index: usize, default: u32) -> Option<u32> {
        match caps.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    }

    fn nanos(caps: &Captures<'_>) -> Option<u32> {
        match caps.get(7) {
            Some(m) => {
                let digits = m.as_str();
                let scale = 10u32.pow(9u32.checked_sub(digits.len() as u32)?);
                digits.parse::<u32>().ok().map(|n| n * scale)
            }
            None => Some(0),
        }
    }
}

impl ParseStrategy for DefaultStrategy {
    fn label(&self) -> &'static str {
        Self::LABEL
    }

    fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let caps = self.shape.captures(text)?;

        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let date = NaiveDate::from_ymd_opt(
            year,
            Self::field(&caps, 2, 1)?,
            Self::field(&caps, 3, 1)?,
        )?;

        date.and_hms_nano_opt(
            Self::field(&caps, 4, 0)?,
            Self::field(&caps, 5, 0)?,
            Self::field(&caps, 6, 0)?,
            Self::nanos(&caps)?,
        )
    }
}

/// Ordered fallback chain; the first strategy that accepts the text wins.
pub struct TimestampParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl TimestampParser {
    /// The trip-log chain: `M/d/yyyy H:mm:ss`, `M/d/yyyy HH:mm:ss`,
    /// `MM/dd/yyyy HH:mm:ss`, then the default parse.
    pub fn new() -> Result<Self> {
        let strategies: Vec<Box<dyn ParseStrategy>> = vec![
            Box::new(LayoutStrategy::new(
                "M/d/yyyy H:mm:ss",
                r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4} [0-9]{1,2}:[0-9]{2}:[0-9]{2}$",
                "%m/%d/%Y %H:%M:%S",
            )?),
            Box::new(LayoutStrategy::new(
                "M/d/yyyy HH:mm:ss",
                r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4} [0-9]{2}:[0-9]{2}:[0-9]{2}$",
                "%m/%d/%Y %H:%M:%S",
            )?),
            Box::new(LayoutStrategy::new(
                "MM/dd/yyyy HH:mm:ss",
                r"^[0-9]{2}/[0-9]{2}/[0-9]{4} [0-9]{2}:[0-9]{2}:[0-9]{2}$",
                "%m/%d/%Y %H:%M:%S",
            )?),
            Box::new(DefaultStrategy::new()?),
        ];

        Ok(Self::with_strategies(strategies))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn parse(&self, text: &str) -> ParseOutcome {
        self.strategies
            .iter()
            .enumerate()
            .find_map(|(rank, strategy)| {
                strategy.parse(text).map(|value| ParseOutcome::Parsed {
                    value,
                    pattern: strategy.label(),
                    rank,
                })
            })
            .unwrap_or(ParseOutcome::NoMatch)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.label()).collect()
    }
}
