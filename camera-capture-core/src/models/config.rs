use std::fmt;

use super::error::CaptureError;

/// Requested configuration for one camera stream.
///
/// Parsed from the CLI `key=value[,key=value...]` grammar. Unset keys fall
/// back to the defaults below; the provider may adjust the rest to fit the
/// device unless strict mode is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    /// FourCC-style format name, e.g. "YUYV" or "MJPG".
    pub pixel_format: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            pixel_format: "YUYV".into(),
        }
    }
}

impl StreamConfig {
    /// Parse a `key=value[,key=value...]` stream specification.
    ///
    /// Recognized keys: `width`, `height`, `pixelformat`.
    pub fn parse_spec(spec: &str) -> Result<Self, CaptureError> {
        let mut config = StreamConfig::default();
        for pair in spec.split(',').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CaptureError::InvalidArgument(format!("stream option '{pair}' is not key=value"))
            })?;
            match key {
                "width" => config.width = parse_dimension(key, value)?,
                "height" => config.height = parse_dimension(key, value)?,
                "pixelformat" => config.pixel_format = value.to_string(),
                _ => {
                    return Err(CaptureError::InvalidArgument(format!(
                        "unknown stream option '{key}'"
                    )))
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InvalidArgument(
                "stream dimensions must be non-zero".into(),
            ));
        }
        if self.pixel_format.is_empty() {
            return Err(CaptureError::InvalidArgument(
                "pixel format must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration actually applied by the provider, one entry per stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub stride: u32,
    /// Bytes per frame at the applied geometry.
    pub frame_size: u32,
}

/// How long a capture keeps running once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureLimit {
    /// Stop after exactly this many completed frames.
    Bounded(u64),
    /// Run until externally interrupted.
    Unbounded,
}

impl fmt::Display for CaptureLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureLimit::Bounded(frames) => write!(f, "{frames} frame(s)"),
            CaptureLimit::Unbounded => write!(f, "until interrupted"),
        }
    }
}

fn parse_dimension(key: &str, value: &str) -> Result<u32, CaptureError> {
    value
        .parse()
        .map_err(|_| CaptureError::InvalidArgument(format!("invalid {key} '{value}'")))
}
