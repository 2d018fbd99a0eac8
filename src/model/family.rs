//! Filter family catalogue
//!
//! Pure lookup tables: which concrete section kind a family uses, how many
//! cascaded second-order sections it needs, and which parameters matter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Concrete second-order section shape understood by the host engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
    /// Pass a band around frequency
    BandPass,
    /// Boost/cut below frequency
    LowShelf,
    /// Boost/cut above frequency
    HighShelf,
    /// Bell curve boost/cut
    Peaking,
    /// Reject a band around frequency
    Notch,
}

impl SectionKind {
    /// Host-facing name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::LowPass => "lowpass",
            SectionKind::HighPass => "highpass",
            SectionKind::BandPass => "bandpass",
            SectionKind::LowShelf => "lowshelf",
            SectionKind::HighShelf => "highshelf",
            SectionKind::Peaking => "peaking",
            SectionKind::Notch => "notch",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract filter type of a slot.
///
/// The `12` variants run a single biquad section (12 dB/oct), the `24`
/// variants cascade two identical sections (24 dB/oct). `Inactive` marks an
/// empty slot that contributes nothing to the signal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterFamily {
    #[default]
    #[serde(rename = "noop")]
    Inactive,
    LowPass12,
    LowPass24,
    HighPass12,
    HighPass24,
    BandPass12,
    BandPass24,
    LowShelf12,
    LowShelf24,
    HighShelf12,
    HighShelf24,
    Peaking12,
    Peaking24,
    Notch12,
    Notch24,
}

impl FilterFamily {
    /// Every selectable family, in display order
    pub const ALL: [FilterFamily; 14] = [
        FilterFamily::LowPass12,
        FilterFamily::LowPass24,
        FilterFamily::HighPass12,
        FilterFamily::HighPass24,
        FilterFamily::BandPass12,
        FilterFamily::BandPass24,
        FilterFamily::LowShelf12,
        FilterFamily::LowShelf24,
        FilterFamily::HighShelf12,
        FilterFamily::HighShelf24,
        FilterFamily::Peaking12,
        FilterFamily::Peaking24,
        FilterFamily::Notch12,
        FilterFamily::Notch24,
    ];

    pub fn is_active(&self) -> bool {
        !matches!(self, FilterFamily::Inactive)
    }

    /// Number of cascaded second-order sections (0 for `Inactive`)
    pub fn section_count(&self) -> usize {
        match self {
            FilterFamily::Inactive => 0,
            FilterFamily::LowPass12
            | FilterFamily::HighPass12
            | FilterFamily::BandPass12
            | FilterFamily::LowShelf12
            | FilterFamily::HighShelf12
            | FilterFamily::Peaking12
            | FilterFamily::Notch12 => 1,
            FilterFamily::LowPass24
            | FilterFamily::HighPass24
            | FilterFamily::BandPass24
            | FilterFamily::LowShelf24
            | FilterFamily::HighShelf24
            | FilterFamily::Peaking24
            | FilterFamily::Notch24 => 2,
        }
    }

    /// Concrete section kind, `None` for `Inactive`
    pub fn concrete_kind(&self) -> Option<SectionKind> {
        match self {
            FilterFamily::Inactive => None,
            FilterFamily::LowPass12 | FilterFamily::LowPass24 => Some(SectionKind::LowPass),
            FilterFamily::HighPass12 | FilterFamily::HighPass24 => Some(SectionKind::HighPass),
            FilterFamily::BandPass12 | FilterFamily::BandPass24 => Some(SectionKind::BandPass),
            FilterFamily::LowShelf12 | FilterFamily::LowShelf24 => Some(SectionKind::LowShelf),
            FilterFamily::HighShelf12 | FilterFamily::HighShelf24 => Some(SectionKind::HighShelf),
            FilterFamily::Peaking12 | FilterFamily::Peaking24 => Some(SectionKind::Peaking),
            FilterFamily::Notch12 | FilterFamily::Notch24 => Some(SectionKind::Notch),
        }
    }

    pub fn has_gain(&self) -> bool {
        matches!(
            self.concrete_kind(),
            Some(SectionKind::LowShelf | SectionKind::HighShelf | SectionKind::Peaking)
        )
    }

    pub fn has_q(&self) -> bool {
        matches!(
            self.concrete_kind(),
            Some(
                SectionKind::LowPass
                    | SectionKind::HighPass
                    | SectionKind::BandPass
                    | SectionKind::Peaking
                    | SectionKind::Notch
            )
        )
    }

    pub fn has_frequency(&self) -> bool {
        self.is_active()
    }

    /// Lower-case identifier used in preset files and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            FilterFamily::Inactive => "noop",
            FilterFamily::LowPass12 => "lowpass12",
            FilterFamily::LowPass24 => "lowpass24",
            FilterFamily::HighPass12 => "highpass12",
            FilterFamily::HighPass24 => "highpass24",
            FilterFamily::BandPass12 => "bandpass12",
            FilterFamily::BandPass24 => "bandpass24",
            FilterFamily::LowShelf12 => "lowshelf12",
            FilterFamily::LowShelf24 => "lowshelf24",
            FilterFamily::HighShelf12 => "highshelf12",
            FilterFamily::HighShelf24 => "highshelf24",
            FilterFamily::Peaking12 => "peaking12",
            FilterFamily::Peaking24 => "peaking24",
            FilterFamily::Notch12 => "notch12",
            FilterFamily::Notch24 => "notch24",
        }
    }

    /// Short label for compact displays
    pub fn label(&self) -> &'static str {
        match self {
            FilterFamily::Inactive => "Add +",
            FilterFamily::LowPass12 => "LP12",
            FilterFamily::LowPass24 => "LP24",
            FilterFamily::HighPass12 => "HP12",
            FilterFamily::HighPass24 => "HP24",
            FilterFamily::BandPass12 => "BP12",
            FilterFamily::BandPass24 => "BP24",
            FilterFamily::LowShelf12 => "LS12",
            FilterFamily::LowShelf24 => "LS24",
            FilterFamily::HighShelf12 => "HS12",
            FilterFamily::HighShelf24 => "HS24",
            FilterFamily::Peaking12 => "PK12",
            FilterFamily::Peaking24 => "PK24",
            FilterFamily::Notch12 => "NT12",
            FilterFamily::Notch24 => "NT24",
        }
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterFamily {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        if name == "noop" || name == "inactive" {
            return Ok(FilterFamily::Inactive);
        }
        FilterFamily::ALL
            .iter()
            .copied()
            .find(|family| family.name() == name)
            .ok_or(ChainError::UnknownFamily {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(FilterFamily::Inactive, 0)]
    #[test_case(FilterFamily::LowPass12, 1)]
    #[test_case(FilterFamily::LowPass24, 2)]
    #[test_case(FilterFamily::BandPass24, 2)]
    #[test_case(FilterFamily::Notch12, 1)]
    #[test_case(FilterFamily::Peaking24, 2)]
    fn test_section_count(family: FilterFamily, expected: usize) {
        assert_eq!(family.section_count(), expected);
    }

    #[test_case(FilterFamily::LowShelf12, true, false ; "low shelf")]
    #[test_case(FilterFamily::HighShelf24, true, false ; "high shelf")]
    #[test_case(FilterFamily::Peaking12, true, true ; "peaking")]
    #[test_case(FilterFamily::LowPass24, false, true ; "lowpass")]
    #[test_case(FilterFamily::Notch12, false, true ; "notch")]
    #[test_case(FilterFamily::Inactive, false, false ; "inactive")]
    fn test_parameter_relevance(family: FilterFamily, gain: bool, q: bool) {
        assert_eq!(family.has_gain(), gain);
        assert_eq!(family.has_q(), q);
    }

    #[test]
    fn test_frequency_only_missing_when_inactive() {
        assert!(!FilterFamily::Inactive.has_frequency());
        assert!(FilterFamily::ALL.iter().all(|f| f.has_frequency()));
    }

    #[test]
    fn test_twelve_and_twentyfour_share_kind() {
        for pair in FilterFamily::ALL.chunks(2) {
            assert_eq!(pair[0].concrete_kind(), pair[1].concrete_kind());
            assert_eq!(pair[0].section_count(), 1);
            assert_eq!(pair[1].section_count(), 2);
        }
        assert_eq!(FilterFamily::Inactive.concrete_kind(), None);
    }

    #[test]
    fn test_parse_names() {
        for family in FilterFamily::ALL {
            assert_eq!(family.name().parse::<FilterFamily>().unwrap(), family);
        }
        assert_eq!("noop".parse::<FilterFamily>().unwrap(), FilterFamily::Inactive);
        assert_eq!(" Peaking24 ".parse::<FilterFamily>().unwrap(), FilterFamily::Peaking24);
        assert!("lowpass48".parse::<FilterFamily>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&FilterFamily::HighShelf24).unwrap();
        assert_eq!(json, "\"highshelf24\"");
        let json = serde_json::to_string(&FilterFamily::Inactive).unwrap();
        assert_eq!(json, "\"noop\"");
        let parsed: FilterFamily = serde_json::from_str("\"bandpass12\"").unwrap();
        assert_eq!(parsed, FilterFamily::BandPass12);
    }
}
