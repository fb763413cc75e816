use super::GeoReference;
use crate::core::FrameId;
use std::collections::HashMap;
use std::sync::Arc;

/// Scan geometries keyed by satellite, optionally narrowed to one region
#[derive(Debug, Clone, Default)]
pub struct GeoCatalog {
    by_satellite: HashMap<String, Arc<GeoReference>>,
    by_region: HashMap<(String, String), Arc<GeoReference>>,
}

impl GeoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        satellite: impl Into<String>,
        region: Option<&str>,
        geo: GeoReference,
    ) -> Arc<GeoReference> {
        let geo = Arc::new(geo);
        let satellite = satellite.into();
        match region {
            Some(region) => {
                self.by_region
                    .insert((satellite, region.to_string()), geo.clone());
            }
            None => {
                self.by_satellite.insert(satellite, geo.clone());
            }
        }
        geo
    }

    /// Region-specific geometry first, then the satellite-wide one
    pub fn lookup(&self, id: &FrameId) -> Option<Arc<GeoReference>> {
        self.by_region
            .get(&(id.satellite.clone(), id.region.clone()))
            .or_else(|| self.by_satellite.get(&id.satellite))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.by_satellite.len() + self.by_region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn geo(longitude: f64) -> GeoReference {
        GeoReference::new(longitude, 1402, 1402, 10216334.0, 10216334.0, false, 2804)
    }

    #[test]
    fn test_region_entry_wins_over_satellite_entry() {
        let mut catalog = GeoCatalog::new();
        catalog.register("GOES-13", None, geo(-75.0));
        catalog.register("GOES-13", Some("Northern Hemisphere"), geo(-74.5));

        let now = Utc::now();
        let nh = catalog
            .lookup(&FrameId::new("GOES-13", "Northern Hemisphere", now))
            .unwrap();
        let fd = catalog
            .lookup(&FrameId::new("GOES-13", "Full Disk", now))
            .unwrap();

        assert_eq!(nh.satellite_longitude(), -74.5);
        assert_eq!(fd.satellite_longitude(), -75.0);
        assert!(catalog.lookup(&FrameId::new("GOES-16", "Full Disk", now)).is_none());
    }
}
