///! EPIC Earth imagery gallery
use cosmodeck_common::{EpicDate, EpicImage};
use cosmodeck_common::nasa::CentroidCoordinates;
use serde::{Deserialize, Serialize};

use super::{NoSelection, SortOrder};
use crate::module::binder::{Snapshot, ViewModel};
use crate::module::sources::nasa::{epic_image_url, epic_key_date, latest_epic_image};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicSelection {
    /// Newest first unless asked otherwise
    #[serde(default = "newest_first")]
    pub order: SortOrder,
}

fn newest_first() -> SortOrder {
    SortOrder::Desc
}

impl Default for EpicSelection {
    fn default() -> Self {
        Self { order: newest_first() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicCard {
    pub image: String,
    pub caption: String,
    pub date: String,
    /// `None` when the acquisition date can't be parsed
    pub url: Option<String>,
    pub centroid: Option<CentroidCoordinates>,
}

impl From<&EpicImage> for EpicCard {
    fn from(image: &EpicImage) -> Self {
        Self {
            image: image.image.clone(),
            caption: image.caption.clone(),
            date: image.date.clone(),
            url: epic_image_url(image),
            centroid: image.centroid_coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpicGallery {
    /// Requested day, `None` for the latest set
    pub day: Option<String>,
    pub images: Vec<EpicCard>,
    pub latest: Option<EpicCard>,
}

pub struct EpicGalleryView;

impl ViewModel for EpicGalleryView {
    type Data = Vec<EpicImage>;
    type Selection = EpicSelection;
    type Output = EpicGallery;

    fn derive(snapshot: &Snapshot<Vec<EpicImage>>, selection: &EpicSelection) -> EpicGallery {
        let mut images: Vec<EpicImage> = snapshot.values().flatten().cloned().collect();
        images.sort_by(|a, b| selection.order.apply(a.date.cmp(&b.date)));

        EpicGallery {
            day: snapshot
                .states
                .iter()
                .find_map(|(key, _)| epic_key_date(key))
                .map(|d| d.format("%Y-%m-%d").to_string()),
            latest: latest_epic_image(&images).map(EpicCard::from),
            images: images.iter().map(EpicCard::from).collect(),
        }
    }
}

/// Available imagery days, newest first
pub struct EpicDatesView;

impl ViewModel for EpicDatesView {
    type Data = Vec<EpicDate>;
    type Selection = NoSelection;
    type Output = Vec<String>;

    fn derive(snapshot: &Snapshot<Vec<EpicDate>>, _: &NoSelection) -> Vec<String> {
        let mut dates: Vec<String> = snapshot.values().flatten().map(|d| d.date.clone()).collect();
        dates.sort_by(|a, b| b.cmp(a));
        dates.dedup();
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::views::loaded_snapshot;

    fn image(name: &str, date: &str) -> EpicImage {
        EpicImage {
            image: name.to_string(),
            caption: "Earth".to_string(),
            date: date.to_string(),
            centroid_coordinates: None,
        }
    }

    #[test]
    fn test_gallery_sorted_with_urls() {
        let snap = loaded_snapshot(
            "epic-date:2024-05-01",
            vec![
                image("epic_1b_20240501003633", "2024-05-01 00:31:45"),
                image("epic_1b_20240501131002", "2024-05-01 13:10:02"),
            ],
        );

        let gallery = EpicGalleryView::derive(&snap, &EpicSelection::default());
        assert_eq!(gallery.day.as_deref(), Some("2024-05-01"));
        assert_eq!(gallery.images[0].image, "epic_1b_20240501131002");
        assert_eq!(
            gallery.images[1].url.as_deref(),
            Some("https://epic.gsfc.nasa.gov/archive/natural/2024/05/01/jpg/epic_1b_20240501003633.jpg")
        );
        assert_eq!(gallery.latest.unwrap().image, "epic_1b_20240501131002");

        let oldest_first = EpicGalleryView::derive(&snap, &EpicSelection { order: SortOrder::Asc });
        assert_eq!(oldest_first.images[0].image, "epic_1b_20240501003633");
    }

    #[test]
    fn test_latest_set_has_no_day() {
        let snap = loaded_snapshot("epic-latest", vec![image("a", "2024-05-01 00:31:45")]);
        assert_eq!(EpicGalleryView::derive(&snap, &EpicSelection::default()).day, None);
    }

    #[test]
    fn test_dates_newest_first() {
        let dates = ["2024-04-30", "2024-05-01", "2024-04-29"]
            .iter()
            .map(|d| EpicDate { date: d.to_string() })
            .collect();
        let snap = loaded_snapshot("epic-dates", dates);
        assert_eq!(
            EpicDatesView::derive(&snap, &NoSelection {}),
            vec!["2024-05-01", "2024-04-30", "2024-04-29"]
        );
    }
}
