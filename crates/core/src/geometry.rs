//! Page geometry: fixed paper sizes and validated custom dimensions.
//!
//! All measurements are millimeters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
   Fixed paper sizes
   -------------------------------------------------------------------------- */

/// ISO A4, portrait.
pub const A4_MM: (f64, f64) = (210.0, 297.0);

/// ISO A5, portrait.
pub const A5_MM: (f64, f64) = (148.0, 210.0);

/// US Letter, portrait.
pub const LETTER_MM: (f64, f64) = (215.9, 279.4);

/* --------------------------------------------------------------------------
   Selector
   -------------------------------------------------------------------------- */

/// The page-size choice offered by the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSizeKind {
    #[default]
    A4,
    A5,
    Letter,
    Custom,
}

impl PageSizeKind {
    pub const ALL: [PageSizeKind; 4] = [Self::A4, Self::A5, Self::Letter, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for PageSizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageSizeKind {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::violation("page_size", "unknown_page_size"))
    }
}

/* --------------------------------------------------------------------------
   Resolved page size
   -------------------------------------------------------------------------- */

/// A resolved page size. Only `Custom` carries client-supplied dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "PageSizeRecord", try_from = "PageSizeRecord")]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom { width: f64, height: f64 },
}

impl PageSize {
    pub fn kind(&self) -> PageSizeKind {
        match self {
            Self::A4 => PageSizeKind::A4,
            Self::A5 => PageSizeKind::A5,
            Self::Letter => PageSizeKind::Letter,
            Self::Custom { .. } => PageSizeKind::Custom,
        }
    }

    /// `(width, height)` in millimeters.
    pub fn dimensions(&self) -> (f64, f64) {
        match *self {
            Self::A4 => A4_MM,
            Self::A5 => A5_MM,
            Self::Letter => LETTER_MM,
            Self::Custom { width, height } => (width, height),
        }
    }

    pub fn width(&self) -> f64 {
        self.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.dimensions().1
    }

    /// Build a custom page size, rejecting non-finite or non-positive sides.
    pub fn custom(width: f64, height: f64) -> Result<Self, CoreError> {
        if !is_positive(width) {
            return Err(CoreError::InvalidDimension { field: "page_width" });
        }
        if !is_positive(height) {
            return Err(CoreError::InvalidDimension {
                field: "page_height",
            });
        }
        Ok(Self::Custom { width, height })
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "{} ({width}x{height}mm)", self.kind())
    }
}

/// Stored shape: `{ "type": "A4", "width": 210, "height": 297 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PageSizeRecord {
    #[serde(rename = "type")]
    kind: PageSizeKind,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl From<PageSize> for PageSizeRecord {
    fn from(page: PageSize) -> Self {
        let (width, height) = page.dimensions();
        Self {
            kind: page.kind(),
            width,
            height,
        }
    }
}

impl TryFrom<PageSizeRecord> for PageSize {
    type Error = CoreError;

    /// Fixed sizes ignore whatever numbers were stored alongside them.
    fn try_from(record: PageSizeRecord) -> Result<Self, Self::Error> {
        match record.kind {
            PageSizeKind::A4 => Ok(Self::A4),
            PageSizeKind::A5 => Ok(Self::A5),
            PageSizeKind::Letter => Ok(Self::Letter),
            PageSizeKind::Custom => Self::custom(record.width, record.height),
        }
    }
}

/* --------------------------------------------------------------------------
   Resolution from raw form input
   -------------------------------------------------------------------------- */

/// Parse a millimeter value typed into the form.
///
/// Returns `None` for empty, non-numeric or non-finite input.
pub fn parse_mm(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Resolve the page size for `kind`. The raw width/height strings are only
/// consulted for [`PageSizeKind::Custom`].
pub fn resolve_page_size(
    kind: PageSizeKind,
    raw_width: &str,
    raw_height: &str,
) -> Result<PageSize, CoreError> {
    match kind {
        PageSizeKind::A4 => Ok(PageSize::A4),
        PageSizeKind::A5 => Ok(PageSize::A5),
        PageSizeKind::Letter => Ok(PageSize::Letter),
        PageSizeKind::Custom => {
            let width = parse_mm(raw_width)
                .ok_or(CoreError::InvalidDimension { field: "page_width" })?;
            let height = parse_mm(raw_height).ok_or(CoreError::InvalidDimension {
                field: "page_height",
            })?;
            PageSize::custom(width, height)
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
