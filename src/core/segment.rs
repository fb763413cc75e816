use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of one frame: satellite, region and capture time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId {
    pub satellite: String,
    pub region: String,
    pub frame_time: DateTime<Utc>,
}

impl FrameId {
    pub fn new(
        satellite: impl Into<String>,
        region: impl Into<String>,
        frame_time: DateTime<Utc>,
    ) -> Self {
        Self {
            satellite: satellite.into(),
            region: region.into(),
            frame_time,
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.satellite,
            self.region,
            self.frame_time.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}

/// One fragment of a channel's image data, as delivered by the demodulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub satellite: String,
    pub region: String,
    pub frame_time: DateTime<Utc>,

    /// Raw channel name, parsed with `ChannelKey::from_str`
    pub channel_key: String,

    /// Zero-based fragment index within the channel
    pub index: u32,

    /// Declared number of fragments for the channel
    pub total: u32,

    pub payload: Bytes,
}

impl Segment {
    pub fn new(
        id: &FrameId,
        channel_key: impl Into<String>,
        index: u32,
        total: u32,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            satellite: id.satellite.clone(),
            region: id.region.clone(),
            frame_time: id.frame_time,
            channel_key: channel_key.into(),
            index,
            total,
            payload: payload.into(),
        }
    }

    pub fn frame_id(&self) -> FrameId {
        FrameId::new(&self.satellite, &self.region, self.frame_time)
    }
}

/// Spectral channel slot inside a frame
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKey {
    Visible,
    Infrared,
    WaterVapour,
    /// Auxiliary band, keyed by its name as received
    Other(String),
}

impl ChannelKey {
    pub fn name(&self) -> &str {
        match self {
            Self::Visible => "Visible",
            Self::Infrared => "Infrared",
            Self::WaterVapour => "WaterVapour",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for ChannelKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let key = match s.to_ascii_uppercase().as_str() {
            "VIS" | "VISIBLE" => Self::Visible,
            "IR" | "INFRARED" => Self::Infrared,
            "WV" | "WATERVAPOUR" | "WATER_VAPOUR" | "WATERVAPOR" => Self::WaterVapour,
            _ => Self::Other(s.to_string()),
        };
        Ok(key)
    }
}

impl From<&str> for ChannelKey {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_channel_key_aliases() {
        assert_eq!(ChannelKey::from("vis"), ChannelKey::Visible);
        assert_eq!(ChannelKey::from("Infrared"), ChannelKey::Infrared);
        assert_eq!(ChannelKey::from("water_vapour"), ChannelKey::WaterVapour);
        assert_eq!(ChannelKey::from("WV"), ChannelKey::WaterVapour);
        assert_eq!(ChannelKey::from("CH07"), ChannelKey::Other("CH07".to_string()));
    }

    #[test]
    fn test_channel_key_trims_auxiliary_names() {
        assert_eq!(ChannelKey::from(" CH07\n"), ChannelKey::Other("CH07".to_string()));
        assert_eq!(ChannelKey::from(" vis "), ChannelKey::Visible);
    }

    #[test]
    fn test_segment_frame_id() {
        let time = Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap();
        let id = FrameId::new("GOES-13", "Full Disk", time);
        let segment = Segment::new(&id, "VIS", 0, 4, vec![1u8, 2, 3]);

        assert_eq!(segment.frame_id(), id);
        assert_eq!(id.to_string(), "GOES-13/Full Disk@2017-03-01T12:00:00Z");
    }
}
