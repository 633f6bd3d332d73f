///! Picture of the day and the latest Mars rover photos
use cosmodeck_common::{Apod, MarsLatestPhotos, MarsPhoto};
use serde::{Deserialize, Serialize};

use super::{NoSelection, distinct, matches_filter};
use crate::module::binder::{Snapshot, ViewModel};
use crate::module::sources::nasa::latest_mars_photo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApodCard {
    pub title: String,
    pub date: String,
    pub explanation: String,
    /// Embed URL for videos, best available image otherwise
    pub media_url: String,
    pub is_video: bool,
    pub copyright: Option<String>,
}

pub struct ApodView;

impl ViewModel for ApodView {
    type Data = Apod;
    type Selection = NoSelection;
    type Output = Option<ApodCard>;

    fn derive(snapshot: &Snapshot<Apod>, _: &NoSelection) -> Option<ApodCard> {
        let apod = snapshot.first_value()?;
        let media_url = if apod.is_video() {
            apod.url.clone()
        } else {
            apod.hdurl.clone().unwrap_or_else(|| apod.url.clone())
        };
        Some(ApodCard {
            title: apod.title.clone(),
            date: apod.date.clone(),
            explanation: apod.explanation.clone(),
            media_url,
            is_video: apod.is_video(),
            copyright: apod.copyright.as_ref().map(|c| c.trim().to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarsSelection {
    /// Camera short name, e.g. "NAVCAM"
    #[serde(default)]
    pub camera: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarsGallery {
    /// Headline photo, ignoring the camera filter
    pub latest: Option<MarsPhoto>,
    pub photos: Vec<MarsPhoto>,
    pub cameras: Vec<String>,
}

pub struct MarsPhotoView;

impl ViewModel for MarsPhotoView {
    type Data = MarsLatestPhotos;
    type Selection = MarsSelection;
    type Output = MarsGallery;

    fn derive(snapshot: &Snapshot<MarsLatestPhotos>, selection: &MarsSelection) -> MarsGallery {
        let all: Vec<&MarsPhoto> = snapshot.values().flat_map(|p| p.latest_photos.iter()).collect();
        MarsGallery {
            latest: snapshot.first_value().and_then(latest_mars_photo).cloned(),
            cameras: distinct(all.iter().map(|p| p.camera.name.as_str())),
            photos: all
                .into_iter()
                .filter(|p| matches_filter(selection.camera.as_deref(), &p.camera.name))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::views::loaded_snapshot;
    use serde_json::json;

    #[test]
    fn test_apod_prefers_hd_image() {
        let apod: Apod = serde_json::from_value(json!({
            "date": "2024-05-01", "title": "M31", "explanation": "...",
            "url": "https://x/small.jpg", "hdurl": "https://x/big.jpg",
            "media_type": "image", "copyright": "\nJane Doe\n"
        }))
        .unwrap();
        let card = ApodView::derive(&loaded_snapshot("apod", apod), &NoSelection {}).unwrap();
        assert_eq!(card.media_url, "https://x/big.jpg");
        assert_eq!(card.copyright.as_deref(), Some("Jane Doe"));
        assert!(!card.is_video);
    }

    #[test]
    fn test_apod_video_uses_embed_url() {
        let apod: Apod = serde_json::from_value(json!({
            "date": "2024-05-02", "title": "Launch", "explanation": "...",
            "url": "https://www.youtube.com/embed/abc", "media_type": "video"
        }))
        .unwrap();
        let card = ApodView::derive(&loaded_snapshot("apod", apod), &NoSelection {}).unwrap();
        assert!(card.is_video);
        assert_eq!(card.media_url, "https://www.youtube.com/embed/abc");
    }

    #[test]
    fn test_mars_camera_filter() {
        let photo = |id: u64, camera: &str| {
            json!({
                "id": id, "sol": 4100, "img_src": format!("https://mars/{}.jpg", id),
                "earth_date": "2024-05-01",
                "camera": {"name": camera, "full_name": camera},
                "rover": {"name": "Curiosity", "status": "active"}
            })
        };
        let photos: MarsLatestPhotos = serde_json::from_value(json!({
            "latest_photos": [photo(1, "MAST"), photo(2, "NAVCAM"), photo(3, "NAVCAM")]
        }))
        .unwrap();
        let snap = loaded_snapshot("mars-latest-photos", photos);

        let gallery = MarsPhotoView::derive(&snap, &MarsSelection { camera: Some("navcam".to_string()) });
        assert_eq!(gallery.photos.len(), 2);
        assert_eq!(gallery.cameras, vec!["MAST", "NAVCAM"]);
        assert_eq!(gallery.latest.map(|p| p.id), Some(1));
    }
}
