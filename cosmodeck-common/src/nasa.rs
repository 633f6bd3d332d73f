///! NASA APOD, EPIC, EONET and Mars rover schemas
use serde::{Deserialize, Serialize};

/// Astronomy Picture of the Day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apod {
    /// Calendar date, e.g. "2024-05-01"
    pub date: String,
    pub title: String,
    pub explanation: String,
    pub url: String,
    /// "image" or "video"
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdurl: Option<String>,
}

impl Apod {
    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One EPIC (DSCOVR) natural-color image record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicImage {
    /// Image name without extension, e.g. "epic_1b_20240501003633"
    pub image: String,
    #[serde(default)]
    pub caption: String,
    /// Acquisition time, e.g. "2024-05-01 00:31:45"
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid_coordinates: Option<CentroidCoordinates>,
}

impl EpicImage {
    /// Calendar part of `date` ("yyyy-mm-dd")
    pub fn day(&self) -> &str {
        self.date.split(' ').next().unwrap_or(&self.date)
    }
}

/// Entry of the EPIC "available dates" listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicDate {
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EonetCategory {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EonetSource {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EonetGeometry {
    #[serde(default)]
    pub magnitude_value: Option<f64>,
    #[serde(default)]
    pub magnitude_unit: Option<String>,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Point or polygon coordinates, shape depends on `kind`
    pub coordinates: serde_json::Value,
}

/// Natural event tracked by EONET (wildfire, storm, volcano ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EonetEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub closed: Option<String>,
    #[serde(default)]
    pub categories: Vec<EonetCategory>,
    #[serde(default)]
    pub sources: Vec<EonetSource>,
    #[serde(default)]
    pub geometry: Vec<EonetGeometry>,
}

impl EonetEvent {
    /// Date of the most recent geometry sample
    pub fn latest_date(&self) -> Option<&str> {
        self.geometry.iter().map(|g| g.date.as_str()).max()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EonetFeed {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub events: Vec<EonetEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarsCamera {
    pub name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarsRover {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarsPhoto {
    pub id: u64,
    pub sol: u32,
    pub img_src: String,
    pub earth_date: String,
    pub camera: MarsCamera,
    pub rover: MarsRover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarsLatestPhotos {
    #[serde(default)]
    pub latest_photos: Vec<MarsPhoto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apod_optional_fields() {
        let apod: Apod = serde_json::from_str(
            r#"{"date":"2024-05-01","title":"M31","explanation":"...","url":"https://x/y.jpg","media_type":"image"}"#,
        )
        .unwrap();
        assert!(apod.copyright.is_none());
        assert!(!apod.is_video());
    }

    #[test]
    fn test_epic_day() {
        let img = EpicImage {
            image: "epic_1b_20240501003633".to_string(),
            caption: String::new(),
            date: "2024-05-01 00:31:45".to_string(),
            centroid_coordinates: None,
        };
        assert_eq!(img.day(), "2024-05-01");
    }

    #[test]
    fn test_eonet_event_decodes_camel_case_geometry() {
        let raw = r#"{
            "id": "EONET_1",
            "title": "Wildfire",
            "categories": [{"id": "wildfires", "title": "Wildfires"}],
            "geometry": [
                {"magnitudeValue": null, "magnitudeUnit": null, "date": "2024-05-01T00:00:00Z", "type": "Point", "coordinates": [1.0, 2.0]},
                {"date": "2024-05-03T00:00:00Z", "type": "Point", "coordinates": [1.5, 2.5]}
            ]
        }"#;
        let event: EonetEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.geometry[0].kind, "Point");
        assert_eq!(event.latest_date(), Some("2024-05-03T00:00:00Z"));
    }
}
