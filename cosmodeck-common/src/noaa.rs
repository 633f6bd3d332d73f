///! NOAA Space Weather Prediction Center product schemas
use serde::{Deserialize, Serialize};

/// One entry of `products/alerts.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoaaAlert {
    #[serde(default)]
    pub product_id: String,
    /// e.g. "2024-05-10 12:00:00.000"
    pub issue_datetime: String,
    #[serde(default)]
    pub message: String,
}

/// Tabular SWPC product: the first row is the header, every other row a
/// sample. Cells are strings, numbers or null depending on the product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductTable(pub Vec<Vec<serde_json::Value>>);

impl ProductTable {
    pub fn header(&self) -> Vec<String> {
        self.0
            .first()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default()
    }

    /// Index of a header column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header().iter().position(|h| h == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Vec<serde_json::Value>> {
        self.0.iter().skip(1)
    }

    /// Planetary K-index samples (`noaa-planetary-k-index.json`)
    pub fn kp_readings(&self) -> Vec<KpReading> {
        let (Some(time_col), Some(kp_col)) = (self.column("time_tag"), self.column("Kp")) else {
            return Vec::new();
        };

        self.rows()
            .filter_map(|row| {
                Some(KpReading {
                    time_tag: row.get(time_col).map(cell_text)?,
                    kp: row.get(kp_col).and_then(cell_number)?,
                })
            })
            .collect()
    }

    /// Solar wind plasma samples (`solar-wind/plasma-*.json`)
    pub fn solar_wind(&self) -> Vec<SolarWindReading> {
        let Some(time_col) = self.column("time_tag") else {
            return Vec::new();
        };
        let density_col = self.column("density");
        let speed_col = self.column("speed");
        let temperature_col = self.column("temperature");

        self.rows()
            .filter_map(|row| {
                let pick = |col: Option<usize>| col.and_then(|c| row.get(c)).and_then(cell_number);
                Some(SolarWindReading {
                    time_tag: row.get(time_col).map(cell_text)?,
                    density: pick(density_col),
                    speed: pick(speed_col),
                    temperature: pick(temperature_col),
                })
            })
            .collect()
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpReading {
    pub time_tag: String,
    pub kp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarWindReading {
    pub time_tag: String,
    pub density: Option<f64>,
    pub speed: Option<f64>,
    pub temperature: Option<f64>,
}
