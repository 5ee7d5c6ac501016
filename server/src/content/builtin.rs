use geoguess::{Location, PoolEntry};

use super::{ContentError, LocationPool};

const SAMPLE_IMAGE_BASE: &str = "https://platform.cyvl.ai/3DViewer.html?image_url=https://dcygqrjfsypox.cloudfront.net/d445b396018a64ef96e17914809b32c7609dbccacdfb42b41a2d2e8f25235dd3/images360";

/// (image file, latitude, longitude)
const SAMPLES: [(&str, f64, f64); 5] = [
    ("GS010072_360_1747066090756859_360_3000.jpg", 40.7128, -74.0060), // New York
    ("GS010072_360_1747069308979679_360_3000.jpg", 35.6762, 139.6503), // Tokyo
    ("GS020072_360_1747075090553070_360_3000.jpg", 48.8566, 2.3522),   // Paris
    ("GS020072_360_1747078539817462_360_3000.jpg", -33.8688, 151.2093), // Sydney
    ("GS030072_360_1747083214998723_360_3000.jpg", 51.5074, -0.1278),  // London
];

/// Five well-known cities with sample panoramas. Used when no catalog
/// directory is configured.
pub struct BuiltinPool {
    entries: Vec<PoolEntry>,
}

impl BuiltinPool {
    pub fn new() -> Result<Self, ContentError> {
        let entries = SAMPLES
            .iter()
            .map(|&(image, lat, lon)| {
                let location = Location::new(lat, lon).map_err(|_| ContentError::Empty)?;
                Ok(PoolEntry::new(format!("{}/{}", SAMPLE_IMAGE_BASE, image), location))
            })
            .collect::<Result<Vec<_>, ContentError>>()?;
        Ok(Self { entries })
    }
}

impl LocationPool for BuiltinPool {
    fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }
}
