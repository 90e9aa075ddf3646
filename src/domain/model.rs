/// Resolved geographic position for a client, as reported by the
/// geolocation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Outcome of a hazard check.
///
/// `location == None` means the client could not be geolocated at all;
/// `hazard == None` means the location fell outside every hazard polygon
/// in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardReport {
    pub location: Option<GeoLocation>,
    pub hazard: Option<String>,
    pub map_available: bool,
}

impl HazardReport {
    pub fn unlocated() -> Self {
        Self {
            location: None,
            hazard: None,
            map_available: false,
        }
    }

    pub fn located(&self) -> bool {
        self.location.is_some()
    }
}
