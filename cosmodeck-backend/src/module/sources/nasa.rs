///! NASA endpoints: APOD, EPIC, EONET, Mars rover photos
use chrono::NaiveDate;
use cosmodeck_common::{EpicImage, MarsLatestPhotos, MarsPhoto};

use super::{Sources, keys};
use crate::module::loader::ResourceRequest;

const NASA_API: &str = "https://api.nasa.gov";
const EPIC_API: &str = "https://epic.gsfc.nasa.gov/api/natural";
const EPIC_ARCHIVE: &str = "https://epic.gsfc.nasa.gov/archive/natural";
const EONET_API: &str = "https://eonet.gsfc.nasa.gov/api/v3/events";
pub const EONET_DEFAULT_LIMIT: u32 = 5;

impl Sources {
    pub fn apod(&self) -> ResourceRequest {
        self.request(
            keys::APOD,
            format!("{}/planetary/apod?api_key={}", NASA_API, self.nasa_api_key),
        )
    }

    pub fn epic_latest(&self) -> ResourceRequest {
        self.request(
            keys::EPIC_LATEST,
            format!("{}/EPIC/api/natural/images?api_key={}", NASA_API, self.nasa_api_key),
        )
    }

    /// Every day with available imagery
    pub fn epic_dates(&self) -> ResourceRequest {
        self.request(keys::EPIC_DATES, format!("{}/all", EPIC_API))
    }

    pub fn epic_by_date(&self, date: NaiveDate) -> ResourceRequest {
        let day = date.format("%Y-%m-%d");
        self.request(
            format!("{}{}", keys::EPIC_DATE_PREFIX, day),
            format!("{}/date/{}", EPIC_API, day),
        )
    }

    /// Open natural events
    pub fn eonet_events(&self, limit: u32) -> ResourceRequest {
        self.request(
            keys::EONET_EVENTS,
            format!("{}?limit={}&status=open", EONET_API, limit),
        )
    }

    pub fn mars_latest_photos(&self) -> ResourceRequest {
        self.request(
            keys::MARS_LATEST_PHOTOS,
            format!(
                "{}/mars-photos/api/v1/rovers/curiosity/latest_photos?api_key={}",
                NASA_API, self.nasa_api_key
            ),
        )
    }
}

/// Archive URL of an EPIC image, derived from its acquisition date.
/// `None` when the date is not `yyyy-mm-dd ...`.
pub fn epic_image_url(image: &EpicImage) -> Option<String> {
    let day = NaiveDate::parse_from_str(image.day(), "%Y-%m-%d").ok()?;
    Some(format!(
        "{}/{}/jpg/{}.jpg",
        EPIC_ARCHIVE,
        day.format("%Y/%m/%d"),
        image.image
    ))
}

/// Most recent image of an EPIC listing
pub fn latest_epic_image(images: &[EpicImage]) -> Option<&EpicImage> {
    // "yyyy-mm-dd hh:mm:ss" sorts chronologically as text
    images.iter().max_by(|a, b| a.date.cmp(&b.date))
}

pub fn latest_mars_photo(photos: &MarsLatestPhotos) -> Option<&MarsPhoto> {
    photos.latest_photos.first()
}

/// Key of a dated EPIC request back to its date
pub fn epic_key_date(key: &str) -> Option<NaiveDate> {
    let day = key.strip_prefix(keys::EPIC_DATE_PREFIX)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
