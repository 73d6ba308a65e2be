use std::fmt;
use std::str::FromStr;

use super::error::CaptureError;

/// Physical mounting location reported by a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraLocation {
    Front,
    Back,
    External,
}

impl fmt::Display for CameraLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraLocation::Front => write!(f, "front"),
            CameraLocation::Back => write!(f, "back"),
            CameraLocation::External => write!(f, "external"),
        }
    }
}

/// Static properties reported by a camera device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraProperties {
    pub location: Option<CameraLocation>,
    pub model: Option<String>,
}

/// A control exposed by a camera, with its valid range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    pub name: String,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

/// How the user identifies the camera to operate on.
///
/// A purely numeric argument selects by 1-based enumeration index;
/// anything else must match a camera id exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSelector {
    Index(usize),
    Id(String),
}

impl FromStr for CameraSelector {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CaptureError::InvalidArgument(
                "camera selector is empty".into(),
            ));
        }
        match s.parse::<usize>() {
            Ok(0) => Err(CaptureError::InvalidArgument(
                "camera index is 1-based".into(),
            )),
            Ok(index) => Ok(CameraSelector::Index(index)),
            Err(_) => Ok(CameraSelector::Id(s.to_string())),
        }
    }
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSelector::Index(index) => write!(f, "{index}"),
            CameraSelector::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Human-readable camera name built from its properties.
///
/// Front and back cameras are named by their location; everything else is
/// named by model when one is reported. The camera id is always appended
/// so the name stays unambiguous.
pub fn display_name(id: &str, props: &CameraProperties) -> String {
    match (props.location, props.model.as_deref()) {
        (Some(CameraLocation::Front), _) => format!("Internal front camera ({id})"),
        (Some(CameraLocation::Back), _) => format!("Internal back camera ({id})"),
        (_, Some(model)) => format!("'{model}' ({id})"),
        (Some(CameraLocation::External), None) => format!("External camera ({id})"),
        (None, None) => format!("({id})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_location_wins_over_model() {
        let props = CameraProperties {
            location: Some(CameraLocation::Front),
            model: Some("ACME Sensor".into()),
        };
        assert_eq!(display_name("cam0", &props), "Internal front camera (cam0)");
    }

    #[test]
    fn back_location_wins_over_model() {
        let props = CameraProperties {
            location: Some(CameraLocation::Back),
            model: Some("ACME Sensor".into()),
        };
        assert_eq!(display_name("cam0", &props), "Internal back camera (cam0)");
    }

    #[test]
    fn external_with_model_uses_model() {
        let props = CameraProperties {
            location: Some(CameraLocation::External),
            model: Some("USB 2.0 Camera".into()),
        };
        assert_eq!(display_name("usb1", &props), "'USB 2.0 Camera' (usb1)");
    }

    #[test]
    fn external_without_model_is_generic() {
        let props = CameraProperties {
            location: Some(CameraLocation::External),
            model: None,
        };
        assert_eq!(display_name("usb1", &props), "External camera (usb1)");
    }

    #[test]
    fn no_properties_falls_back_to_id() {
        assert_eq!(display_name("cam0", &CameraProperties::default()), "(cam0)");
    }

    #[test]
    fn model_without_location_uses_model() {
        let props = CameraProperties {
            location: None,
            model: Some("ACME Sensor".into()),
        };
        assert_eq!(display_name("cam0", &props), "'ACME Sensor' (cam0)");
    }

    #[test]
    fn numeric_selector_parses_as_index() {
        assert_eq!("3".parse::<CameraSelector>().unwrap(), CameraSelector::Index(3));
    }

    #[test]
    fn non_numeric_selector_parses_as_id() {
        assert_eq!(
            "usb-cam1".parse::<CameraSelector>().unwrap(),
            CameraSelector::Id("usb-cam1".into())
        );
    }

    #[test]
    fn index_zero_is_rejected() {
        assert!(matches!(
            "0".parse::<CameraSelector>(),
            Err(CaptureError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_selector_is_rejected() {
        assert!(matches!(
            "".parse::<CameraSelector>(),
            Err(CaptureError::InvalidArgument(_))
        ));
    }
}
