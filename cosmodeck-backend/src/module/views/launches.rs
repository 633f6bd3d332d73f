///! Upcoming launch listings (Launch Library 2 and SpaceX)
use chrono::{DateTime, Utc};
use cosmodeck_common::{LaunchLibraryPage, Launch};
use serde::{Deserialize, Serialize};

use super::{SortOrder, distinct, matches_filter};
use crate::module::binder::{Snapshot, ViewModel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchSelection {
    /// Launch service provider, e.g. "SpaceX"
    #[serde(default)]
    pub provider: Option<String>,
    /// Status name, e.g. "Go for Launch"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchCard {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub rocket: String,
    pub status: String,
    pub net: String,
    pub mission: String,
    pub mission_description: String,
    pub pad: String,
    pub location: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchBoard {
    pub launches: Vec<LaunchCard>,
    /// Filter choices over the unfiltered data
    pub providers: Vec<String>,
    pub statuses: Vec<String>,
}

pub struct UpcomingLaunchesView;

impl ViewModel for UpcomingLaunchesView {
    type Data = LaunchLibraryPage;
    type Selection = LaunchSelection;
    type Output = LaunchBoard;

    fn derive(snapshot: &Snapshot<LaunchLibraryPage>, selection: &LaunchSelection) -> LaunchBoard {
        let all: Vec<LaunchCard> = snapshot
            .values()
            .flat_map(|page| page.results.iter())
            .map(card)
            .collect();

        let providers = distinct(all.iter().map(|c| c.provider.as_str()));
        let statuses = distinct(all.iter().map(|c| c.status.as_str()));

        let mut launches: Vec<LaunchCard> = all
            .into_iter()
            .filter(|c| matches_filter(selection.provider.as_deref(), &c.provider))
            .filter(|c| matches_filter(selection.status.as_deref(), &c.status))
            .collect();
        launches.sort_by(|a, b| selection.order.apply(net_key(&a.net).cmp(&net_key(&b.net))));

        LaunchBoard {
            launches,
            providers,
            statuses,
        }
    }
}

fn card(launch: &cosmodeck_common::LlLaunch) -> LaunchCard {
    let rocket_config = launch.rocket.as_ref().map(|r| &r.configuration);
    let mission_name = launch
        .mission
        .as_ref()
        .map(|m| m.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| launch.name.clone());
    let mission_description = launch
        .mission
        .as_ref()
        .and_then(|m| m.description.clone())
        .unwrap_or_else(|| {
            let rocket = rocket_config
                .map(|c| c.name.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or("rocket");
            format!("Launch mission for {}", rocket)
        });
    let pad = launch.pad.as_ref();

    LaunchCard {
        id: launch.id.clone(),
        name: launch.name.clone(),
        provider: launch.provider_name().to_string(),
        rocket: launch.rocket_name().to_string(),
        status: launch.status_name().to_string(),
        net: launch.net.clone(),
        mission: mission_name,
        mission_description,
        pad: pad.map(|p| p.name.clone()).filter(|n| !n.is_empty()).unwrap_or_else(|| "TBD".to_string()),
        location: pad
            .map(|p| p.location.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "TBD".to_string()),
        image: launch.image.clone(),
    }
}

/// Unparseable timestamps sort last in ascending order
fn net_key(net: &str) -> (bool, Option<DateTime<Utc>>) {
    let parsed = DateTime::parse_from_rfc3339(net).ok().map(|d| d.with_timezone(&Utc));
    (parsed.is_none(), parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcomeFilter {
    Success,
    Failure,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacexLaunchSelection {
    #[serde(default)]
    pub outcome: Option<LaunchOutcomeFilter>,
    /// Newest first unless asked otherwise
    #[serde(default = "default_desc")]
    pub order: SortOrder,
}

fn default_desc() -> SortOrder {
    SortOrder::Desc
}

impl Default for SpacexLaunchSelection {
    fn default() -> Self {
        Self {
            outcome: None,
            order: default_desc(),
        }
    }
}

pub struct SpacexLaunchesView;

impl ViewModel for SpacexLaunchesView {
    type Data = Vec<Launch>;
    type Selection = SpacexLaunchSelection;
    type Output = Vec<Launch>;

    fn derive(snapshot: &Snapshot<Vec<Launch>>, selection: &SpacexLaunchSelection) -> Vec<Launch> {
        let mut launches: Vec<Launch> = snapshot
            .values()
            .flatten()
            .filter(|l| match selection.outcome {
                None => true,
                Some(LaunchOutcomeFilter::Upcoming) => l.upcoming,
                Some(LaunchOutcomeFilter::Success) => l.success == Some(true),
                Some(LaunchOutcomeFilter::Failure) => l.success == Some(false),
            })
            .cloned()
            .collect();
        launches.sort_by(|a, b| selection.order.apply(a.date_unix.cmp(&b.date_unix)));
        launches.dedup_by(|a, b| a.id == b.id);
        launches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::views::loaded_snapshot as snapshot;
    use chrono::TimeZone;
    use serde_json::json;

    fn page() -> LaunchLibraryPage {
        serde_json::from_value(json!({
            "count": 3,
            "results": [
                {
                    "id": "1", "name": "Electron | Mission A", "net": "2024-06-03T10:00:00Z",
                    "status": {"name": "TBD"},
                    "launch_service_provider": {"name": "Rocket Lab"},
                    "rocket": {"configuration": {"name": "Electron", "full_name": "Electron"}}
                },
                {
                    "id": "2", "name": "Falcon 9 | Starlink", "net": "2024-06-01T10:00:00Z",
                    "status": {"name": "Go for Launch"},
                    "launch_service_provider": {"name": "SpaceX"},
                    "mission": {"name": "Starlink 10-1", "description": "Starlink batch"},
                    "pad": {"name": "SLC-40", "location": {"name": "Cape Canaveral"}}
                },
                {
                    "id": "3", "name": "Falcon Heavy | USSF", "net": "2024-06-02T10:00:00Z",
                    "status": {"name": "Go for Launch"},
                    "launch_service_provider": {"name": "SpaceX"}
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_by_provider_and_sort() {
        let snap = snapshot("launches-upcoming-ll2", page());
        let board = UpcomingLaunchesView::derive(
            &snap,
            &LaunchSelection { provider: Some("spacex".to_string()), ..Default::default() },
        );
        let ids: Vec<_> = board.launches.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert_eq!(board.providers, vec!["Rocket Lab", "SpaceX"]);

        let board = UpcomingLaunchesView::derive(
            &snap,
            &LaunchSelection { order: SortOrder::Desc, ..Default::default() },
        );
        let ids: Vec<_> = board.launches.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_filter_by_status() {
        let snap = snapshot("launches-upcoming-ll2", page());
        let board = UpcomingLaunchesView::derive(
            &snap,
            &LaunchSelection { status: Some("TBD".to_string()), ..Default::default() },
        );
        assert_eq!(board.launches.len(), 1);
        assert_eq!(board.launches[0].provider, "Rocket Lab");
    }

    #[test]
    fn test_card_defaults() {
        let snap = snapshot("launches-upcoming-ll2", page());
        let board = UpcomingLaunchesView::derive(&snap, &LaunchSelection::default());
        let heavy = board.launches.iter().find(|c| c.id == "3").unwrap();
        assert_eq!(heavy.rocket, "Unknown Rocket");
        assert_eq!(heavy.mission, "Falcon Heavy | USSF");
        assert_eq!(heavy.mission_description, "Launch mission for rocket");
        assert_eq!(heavy.pad, "TBD");

        let electron = board.launches.iter().find(|c| c.id == "1").unwrap();
        assert_eq!(electron.mission_description, "Launch mission for Electron");
    }

    #[test]
    fn test_derive_is_pure() {
        let snap = snapshot("launches-upcoming-ll2", page());
        let selection = LaunchSelection { provider: Some("SpaceX".to_string()), ..Default::default() };
        assert_eq!(
            UpcomingLaunchesView::derive(&snap, &selection),
            UpcomingLaunchesView::derive(&snap, &selection)
        );
    }

    #[test]
    fn test_spacex_launches_outcome_filter() {
        let at = |d: u32| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap().timestamp();
        let launches: Vec<Launch> = serde_json::from_value(json!([
            {"id": "a", "name": "A", "date_utc": "", "date_unix": at(1), "success": true},
            {"id": "b", "name": "B", "date_utc": "", "date_unix": at(3), "success": false},
            {"id": "c", "name": "C", "date_utc": "", "date_unix": at(2), "upcoming": true}
        ]))
        .unwrap();
        let snap = snapshot("spacex-launches", launches);

        let all = SpacexLaunchesView::derive(&snap, &SpacexLaunchSelection::default());
        let ids: Vec<_> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let ok = SpacexLaunchesView::derive(
            &snap,
            &SpacexLaunchSelection { outcome: Some(LaunchOutcomeFilter::Success), order: SortOrder::Asc },
        );
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].id, "a");
    }
}
