///! Built-in fallback data
///!
///! Plausible substitutes for each resource, registered once at startup.
///! Entries that depend on "now" are generators fed by the table's clock.
use anyhow::Context;
use chrono::Duration;
use cosmodeck_common::{
    Apod, Astronauts, Capsule, Company, CrewMember, EonetFeed, EpicDate, EpicImage, HistoryEvent, IssNow, Landpad,
    Launch, LaunchLibraryPage, Launchpad, MarsLatestPhotos, NoaaAlert, Payload, ProductTable, Rocket,
    StarlinkSatellite,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

use crate::module::loader::{FallbackProvider, FallbackTable, FallbackTableBuilder};
use crate::module::sim::{Clock, RandomSource};
use crate::module::sources::{SpacexResource, keys};

pub const ISS_FALLBACK_LATITUDE: &str = "25.4876";
pub const ISS_FALLBACK_LONGITUDE: &str = "-157.8924";

const ISS_CREW: [&str; 7] = [
    "Oleg Kononenko",
    "Nikolai Chub",
    "Tracy Caldwell Dyson",
    "Matthew Dominick",
    "Michael Barratt",
    "Jeanette Epps",
    "Alexander Grebenkin",
];

/// Builder pre-filled with every built-in entry
pub fn builtin(clock: Arc<dyn Clock>, random: Arc<dyn RandomSource>) -> FallbackTableBuilder {
    let people: Vec<Value> = ISS_CREW
        .iter()
        .map(|name| json!({"name": name, "craft": "ISS"}))
        .collect();

    FallbackTable::builder()
        .clock(clock)
        .random(random)
        .insert_with(keys::ISS_POSITION, |ctx| {
            json!({
                "message": "success",
                "timestamp": ctx.clock.now().timestamp(),
                "iss_position": {
                    "latitude": ISS_FALLBACK_LATITUDE,
                    "longitude": ISS_FALLBACK_LONGITUDE,
                },
            })
        })
        .insert_value(
            keys::ASTRONAUTS,
            json!({"message": "success", "number": people.len(), "people": people}),
        )
        .insert_with(keys::LAUNCHES_UPCOMING_LL2, |ctx| {
            let net = ctx.clock.now() + Duration::days(2);
            json!({
                "count": 1,
                "next": null,
                "results": [{
                    "id": "fallback-1",
                    "name": "Falcon 9 Block 5 | Starlink Group 6-65",
                    "net": net.to_rfc3339(),
                    "status": {"name": "Go for Launch", "abbrev": "Go"},
                    "launch_service_provider": {"name": "SpaceX"},
                    "rocket": {"configuration": {"name": "Falcon 9", "full_name": "Falcon 9 Block 5"}},
                    "mission": {
                        "name": "Starlink Group 6-65",
                        "description": "A batch of 23 Starlink satellites for the Starlink mega-constellation",
                    },
                    "pad": {
                        "name": "Space Launch Complex 40",
                        "location": {"name": "Cape Canaveral SFS, FL, USA"},
                    },
                    "image": null,
                }],
            })
        })
        .insert_with(keys::NOAA_ALERTS, |ctx| {
            json!([{
                "product_id": "fallback-1",
                "issue_datetime": ctx.clock.now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                "message": "Space Weather Monitoring Active\n\nNOAA Space Weather Prediction Center monitoring solar activity and geomagnetic conditions.",
            }])
        })
        .insert_value(
            keys::APOD,
            json!({
                "date": "2025-07-02",
                "title": "Milky Way Through Otago Spires",
                "explanation": "Does the Milky Way always rise between these two rocks? No. Capturing this stunning alignment took careful planning: being in the right place at the right time.",
                "url": "https://apod.nasa.gov/apod/image/2507/MwSpires_Chay_960.jpg",
                "hdurl": "https://apod.nasa.gov/apod/image/2507/MwSpires_Chay_1874.jpg",
                "media_type": "image",
            }),
        )
        .insert_value(
            keys::EPIC_LATEST,
            json!([{
                "image": "epic_1b_20250701003634",
                "caption": "This image was taken by the NASA EPIC camera onboard the NOAA DSCOVR spacecraft",
                "date": "2025-07-01 00:31:45",
                "centroid_coordinates": {"lat": 16.61, "lon": 171.39},
            }]),
        )
        .insert_value(keys::EPIC_DATES, json!([]))
        .insert_value(keys::EONET_EVENTS, json!({"title": "EONET Events", "events": []}))
        .insert_with(SpacexResource::LaunchesUpcoming.key(), |ctx| {
            let date = ctx.clock.now() + Duration::days(7);
            json!([{
                "id": "fallback-upcoming-1",
                "name": "Upcoming SpaceX Mission",
                "date_utc": date.to_rfc3339(),
                "date_unix": date.timestamp(),
                "upcoming": true,
                "details": "Launch schedule temporarily unavailable.",
            }])
        })
}

/// Operator overrides: a JSON object mapping resource keys to values
pub fn read_overrides(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fallback overrides {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in fallback overrides {}", path.display()))?;
    if !value.is_object() {
        anyhow::bail!("Fallback overrides {} must be a JSON object", path.display());
    }
    Ok(value)
}

/// Built-in entries plus optional overrides from `overrides_path`
pub fn build_table(
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    overrides_path: Option<&Path>,
) -> anyhow::Result<FallbackTable> {
    let mut builder = builtin(clock, random);
    if let Some(path) = overrides_path {
        let overrides = read_overrides(path)?;
        tracing::info!("Loaded fallback overrides from {}", path.display());
        builder = builder.extend_from_json(&overrides);
    }
    let table = builder.build();
    validate(&table)?;
    tracing::info!("Fallback table ready with {} entries", table.len());
    Ok(table)
}

/// Every entry must decode into the schema its resource is read with, so a
/// registered fallback is always servable
pub fn validate(table: &FallbackTable) -> anyhow::Result<()> {
    let mut keys: Vec<&str> = table.keys().collect();
    keys.sort_unstable();
    for key in keys {
        let Some(value) = table.fallback(key) else {
            continue;
        };
        check_schema(key, value).with_context(|| format!("Fallback for '{}' does not match its resource", key))?;
    }
    Ok(())
}

fn fits<T: DeserializeOwned>(value: Value) -> anyhow::Result<()> {
    serde_json::from_value::<T>(value)?;
    Ok(())
}

/// Decode `value` with the schema of resource `key`
pub fn check_schema(key: &str, value: Value) -> anyhow::Result<()> {
    if let Some(resource) = SpacexResource::ALL.iter().find(|r| r.key() == key) {
        return match resource {
            SpacexResource::Launches | SpacexResource::LaunchesUpcoming | SpacexResource::LaunchesPast => {
                fits::<Vec<Launch>>(value)
            }
            SpacexResource::Rockets => fits::<Vec<Rocket>>(value),
            SpacexResource::Company => fits::<Company>(value),
            SpacexResource::Payloads => fits::<Vec<Payload>>(value),
            SpacexResource::Launchpads => fits::<Vec<Launchpad>>(value),
            SpacexResource::Crew => fits::<Vec<CrewMember>>(value),
            SpacexResource::Starlink => fits::<Vec<StarlinkSatellite>>(value),
            SpacexResource::History => fits::<Vec<HistoryEvent>>(value),
            SpacexResource::Landpads => fits::<Vec<Landpad>>(value),
            SpacexResource::Capsules => fits::<Vec<Capsule>>(value),
        };
    }

    match key {
        keys::APOD => fits::<Apod>(value),
        keys::EPIC_LATEST => fits::<Vec<EpicImage>>(value),
        keys::EPIC_DATES => fits::<Vec<EpicDate>>(value),
        k if k.starts_with(keys::EPIC_DATE_PREFIX) => fits::<Vec<EpicImage>>(value),
        keys::EONET_EVENTS => fits::<EonetFeed>(value),
        keys::MARS_LATEST_PHOTOS => fits::<MarsLatestPhotos>(value),
        keys::ISS_POSITION => fits::<IssNow>(value),
        keys::ASTRONAUTS => fits::<Astronauts>(value),
        keys::NOAA_ALERTS => fits::<Vec<NoaaAlert>>(value),
        keys::NOAA_KP_INDEX | keys::NOAA_SOLAR_WIND => fits::<ProductTable>(value),
        keys::LAUNCHES_UPCOMING_LL2 => fits::<LaunchLibraryPage>(value),
        _ => anyhow::bail!("unknown resource key '{}'", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::sim::{ManualClock, SequenceRandom};
    use chrono::{TimeZone, Utc};
    use std::io::Write;

    fn table() -> FallbackTable {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        builtin(Arc::new(ManualClock::new(now)), Arc::new(SequenceRandom::constant(0.5))).build()
    }

    fn decode<T: serde::de::DeserializeOwned>(table: &FallbackTable, key: &str) -> T {
        serde_json::from_value(table.fallback(key).unwrap()).unwrap()
    }

    #[test]
    fn test_entries_match_schemas() {
        let table = table();
        let iss: IssNow = decode(&table, keys::ISS_POSITION);
        assert_eq!(iss.coordinates(), Some((25.4876, -157.8924)));
        assert_eq!(iss.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap().timestamp());

        let crew: Astronauts = decode(&table, keys::ASTRONAUTS);
        assert_eq!(crew.number, 7);
        assert_eq!(crew.aboard("ISS").len(), 7);

        let launches: LaunchLibraryPage = decode(&table, keys::LAUNCHES_UPCOMING_LL2);
        assert_eq!(launches.results[0].provider_name(), "SpaceX");
        assert!(launches.results[0].net.starts_with("2024-05-03T12:00:00"));

        let alerts: Vec<NoaaAlert> = decode(&table, keys::NOAA_ALERTS);
        assert!(alerts[0].message.starts_with("Space Weather Monitoring Active"));

        let apod: Apod = decode(&table, keys::APOD);
        assert!(!apod.is_video());

        let epic: Vec<EpicImage> = decode(&table, keys::EPIC_LATEST);
        assert_eq!(epic.len(), 1);

        let eonet: EonetFeed = decode(&table, keys::EONET_EVENTS);
        assert!(eonet.events.is_empty());

        let upcoming: Vec<Launch> = decode(&table, &SpacexResource::LaunchesUpcoming.key());
        assert!(upcoming[0].upcoming);
    }

    #[test]
    fn test_no_entry_for_unregistered_keys() {
        let table = table();
        assert!(table.fallback(keys::MARS_LATEST_PHOTOS).is_none());
        assert!(table.fallback(&SpacexResource::Rockets.key()).is_none());
    }

    #[test]
    fn test_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"astronauts": {{"message": "success", "number": 0, "people": []}}}}"#).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let table = build_table(
            Arc::new(ManualClock::new(now)),
            Arc::new(SequenceRandom::constant(0.5)),
            Some(file.path()),
        )
        .unwrap();
        let crew: Astronauts = decode(&table, keys::ASTRONAUTS);
        assert_eq!(crew.number, 0);
    }

    fn table_with_overrides(content: &str) -> anyhow::Result<FallbackTable> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        build_table(
            Arc::new(ManualClock::new(now)),
            Arc::new(SequenceRandom::constant(0.5)),
            Some(file.path()),
        )
    }

    #[test]
    fn test_builtin_entries_pass_validation() {
        assert!(validate(&table()).is_ok());
    }

    #[test]
    fn test_wrong_shaped_override_rejected() {
        // "people" must be a list of {name, craft}
        let err = table_with_overrides(r#"{"astronauts": {"message": "success", "number": 1, "people": "Jeanette Epps"}}"#)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("astronauts"));

        assert!(table_with_overrides(r#"{"spacex-rockets": {"id": "falcon9"}}"#).is_err());
    }

    #[test]
    fn test_override_for_unknown_key_rejected() {
        let err = table_with_overrides(r#"{"astronots": {"people": []}}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown resource key"));
    }

    #[test]
    fn test_override_for_resource_without_builtin_entry() {
        let table = table_with_overrides(r#"{"spacex-rockets": [], "epic-date:2024-05-01": []}"#).unwrap();
        assert_eq!(table.fallback(&SpacexResource::Rockets.key()), Some(json!([])));
        assert!(table.contains("epic-date:2024-05-01"));
    }

    #[test]
    fn test_overrides_must_be_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        assert!(read_overrides(file.path()).is_err());
    }
}
