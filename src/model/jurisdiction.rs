// Location-dependent calendar variants (Israel vs. the diaspora).
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Jurisdiction {
    Israel,
    #[default]
    Diaspora,
}

impl Jurisdiction {
    /// Approximate bounding box for Israel.
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        if (29.5..=33.5).contains(&latitude) && (34.0..=36.0).contains(&longitude) {
            Jurisdiction::Israel
        } else {
            Jurisdiction::Diaspora
        }
    }
}

/// A day count with optional per-jurisdiction overrides.
///
/// In the catalog this can be written either as a plain number
/// (`total_days = 8`) or as a table (`total_days = { default = 8, israel = 7 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PerJurisdictionRepr")]
pub struct PerJurisdiction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub israel: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diaspora: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PerJurisdictionRepr {
    Uniform(u32),
    Split(SplitRepr),
}

/// A misspelled key must fail the load, not read as an empty override.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SplitRepr {
    #[serde(default)]
    default: Option<u32>,
    #[serde(default)]
    israel: Option<u32>,
    #[serde(default)]
    diaspora: Option<u32>,
}

impl From<PerJurisdictionRepr> for PerJurisdiction {
    fn from(repr: PerJurisdictionRepr) -> Self {
        match repr {
            PerJurisdictionRepr::Uniform(n) => Self::uniform(n),
            PerJurisdictionRepr::Split(SplitRepr {
                default,
                israel,
                diaspora,
            }) => Self {
                default,
                israel,
                diaspora,
            },
        }
    }
}

impl PerJurisdiction {
    pub fn uniform(n: u32) -> Self {
        Self {
            default: Some(n),
            israel: None,
            diaspora: None,
        }
    }

    pub fn split(israel: u32, diaspora: u32) -> Self {
        Self {
            default: None,
            israel: Some(israel),
            diaspora: Some(diaspora),
        }
    }

    /// The override for `jurisdiction` when configured, otherwise the default.
    pub fn get(&self, jurisdiction: Jurisdiction) -> Option<u32> {
        let specific = match jurisdiction {
            Jurisdiction::Israel => self.israel,
            Jurisdiction::Diaspora => self.diaspora,
        };
        specific.or(self.default)
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.israel.is_none() && self.diaspora.is_none()
    }

    /// Every configured value, for validation.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        [self.default, self.israel, self.diaspora].into_iter().flatten()
    }
}

/// Geographic location of a zmanim query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: String,
    /// Explicit jurisdiction; derived from the coordinates when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<Jurisdiction>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timezone: &str) -> Self {
        Self {
            latitude,
            longitude,
            timezone: timezone.to_string(),
            jurisdiction: None,
        }
    }

    pub fn in_jurisdiction(jurisdiction: Jurisdiction) -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            timezone: "UTC".to_string(),
            jurisdiction: Some(jurisdiction),
        }
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
            .unwrap_or_else(|| Jurisdiction::from_coordinates(self.latitude, self.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jurisdiction_from_coordinates() {
        // Jerusalem
        assert_eq!(Jurisdiction::from_coordinates(31.7683, 35.2137), Jurisdiction::Israel);
        // Salford
        assert_eq!(Jurisdiction::from_coordinates(53.4875, -2.2901), Jurisdiction::Diaspora);
        // New York
        let nyc = Location::new(40.7128, -74.0060, "America/New_York");
        assert_eq!(nyc.jurisdiction(), Jurisdiction::Diaspora);
    }

    #[test]
    fn explicit_jurisdiction_wins_over_coordinates() {
        let mut loc = Location::new(31.7683, 35.2137, "Asia/Jerusalem");
        loc.jurisdiction = Some(Jurisdiction::Diaspora);
        assert_eq!(loc.jurisdiction(), Jurisdiction::Diaspora);
    }

    #[test]
    fn override_falls_back_to_default() {
        let days = PerJurisdiction {
            default: Some(8),
            israel: Some(7),
            diaspora: None,
        };
        assert_eq!(days.get(Jurisdiction::Israel), Some(7));
        assert_eq!(days.get(Jurisdiction::Diaspora), Some(8));
        assert_eq!(PerJurisdiction::default().get(Jurisdiction::Israel), None);
    }

    #[test]
    fn deserializes_plain_number_or_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            a: PerJurisdiction,
            b: PerJurisdiction,
        }
        let w: Wrapper = toml::from_str("a = 2\nb = { israel = 1, diaspora = 2 }").unwrap();
        assert_eq!(w.a, PerJurisdiction::uniform(2));
        assert_eq!(w.b, PerJurisdiction::split(1, 2));
    }

    #[test]
    fn misspelled_override_key_is_rejected() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            #[allow(dead_code)]
            t: PerJurisdiction,
        }
        assert!(toml::from_str::<Wrapper>("t = { israell = 7 }").is_err());
        assert!(toml::from_str::<Wrapper>("t = { israel = 7, diaspora = 8 }").is_ok());
    }
}
