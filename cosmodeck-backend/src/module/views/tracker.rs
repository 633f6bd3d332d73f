///! ISS position and people in space
use chrono::{DateTime, Utc};
use cosmodeck_common::{Astronaut, Astronauts, IssNow};
use serde::{Deserialize, Serialize};

use super::{NoSelection, distinct, matches_filter};
use crate::module::binder::{Snapshot, ViewModel};
use crate::module::sim::projection::{MapPoint, project};

pub const MAP_WIDTH: f64 = 1000.0;
pub const MAP_HEIGHT: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
    /// Position on a 1000x500 world map
    pub map: MapPoint,
}

pub struct IssView;

impl ViewModel for IssView {
    type Data = IssNow;
    type Selection = NoSelection;
    type Output = Option<IssFix>;

    fn derive(snapshot: &Snapshot<IssNow>, _: &NoSelection) -> Option<IssFix> {
        let now = snapshot.first_value()?;
        let (latitude, longitude) = now.coordinates()?;
        Some(IssFix {
            latitude,
            longitude,
            timestamp: DateTime::from_timestamp(now.timestamp, 0),
            map: project(latitude, longitude, MAP_WIDTH, MAP_HEIGHT),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewSelection {
    /// Spacecraft, e.g. "ISS" or "Tiangong"
    #[serde(default)]
    pub craft: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewRoster {
    pub people: Vec<Astronaut>,
    pub crafts: Vec<String>,
    /// Everyone in space, regardless of the filter
    pub total: usize,
}

pub struct CrewView;

impl ViewModel for CrewView {
    type Data = Astronauts;
    type Selection = CrewSelection;
    type Output = CrewRoster;

    fn derive(snapshot: &Snapshot<Astronauts>, selection: &CrewSelection) -> CrewRoster {
        let everyone: Vec<&Astronaut> = snapshot.values().flat_map(|a| a.people.iter()).collect();
        CrewRoster {
            crafts: distinct(everyone.iter().map(|p| p.craft.as_str())),
            total: everyone.len(),
            people: everyone
                .into_iter()
                .filter(|p| matches_filter(selection.craft.as_deref(), &p.craft))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::views::loaded_snapshot;
    use cosmodeck_common::IssPosition;

    #[test]
    fn test_iss_fix_projection() {
        let snap = loaded_snapshot(
            "iss-position",
            IssNow {
                message: "success".to_string(),
                timestamp: 1_714_550_400,
                iss_position: IssPosition {
                    latitude: "0".to_string(),
                    longitude: "90".to_string(),
                },
            },
        );
        let fix = IssView::derive(&snap, &NoSelection {}).unwrap();
        assert_eq!(fix.map, MapPoint { x: 750.0, y: 250.0 });
        assert_eq!(fix.timestamp.unwrap().timestamp(), 1_714_550_400);
    }

    #[test]
    fn test_iss_without_data() {
        assert!(IssView::derive(&Snapshot::default(), &NoSelection {}).is_none());
    }

    #[test]
    fn test_crew_by_craft() {
        let snap = loaded_snapshot(
            "astronauts",
            Astronauts {
                message: "success".to_string(),
                number: 3,
                people: vec![
                    Astronaut { name: "A".to_string(), craft: "ISS".to_string() },
                    Astronaut { name: "B".to_string(), craft: "Tiangong".to_string() },
                    Astronaut { name: "C".to_string(), craft: "ISS".to_string() },
                ],
            },
        );
        let roster = CrewView::derive(&snap, &CrewSelection { craft: Some("iss".to_string()) });
        assert_eq!(roster.people.len(), 2);
        assert_eq!(roster.total, 3);
        assert_eq!(roster.crafts, vec!["ISS", "Tiangong"]);
    }
}
