//! View model for the air-quality dashboard: a classified report for one
//! location and the AQI ticker for the world's largest cities.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    aqi::{classify_aqi, AqiStatus, Pollutant, PollutantBand, TickerTier},
    open_meteo::{AirQualityClient, AirQualityReading},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

pub const TOP_CITIES: [City; 10] = [
    City { name: "Tokyo", country: "Japan", latitude: 35.6762, longitude: 139.6503 },
    City { name: "Delhi", country: "India", latitude: 28.6139, longitude: 77.2090 },
    City { name: "Shanghai", country: "China", latitude: 31.2304, longitude: 121.4737 },
    City { name: "São Paulo", country: "Brazil", latitude: -23.5505, longitude: -46.6333 },
    City { name: "Mexico City", country: "Mexico", latitude: 19.4326, longitude: -99.1332 },
    City { name: "Cairo", country: "Egypt", latitude: 30.0444, longitude: 31.2357 },
    City { name: "Mumbai", country: "India", latitude: 19.0760, longitude: 72.8777 },
    City { name: "Beijing", country: "China", latitude: 39.9042, longitude: 116.4074 },
    City { name: "Dhaka", country: "Bangladesh", latitude: 23.8103, longitude: 90.4125 },
    City { name: "Osaka", country: "Japan", latitude: 34.6937, longitude: 135.5022 },
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickerEntry {
    pub name: &'static str,
    pub country: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: Option<i64>,
    pub tier: Option<TickerTier>,
}

impl TickerEntry {
    pub fn new(city: City, aqi: Option<i64>) -> Self {
        Self {
            name: city.name,
            country: city.country,
            latitude: city.latitude,
            longitude: city.longitude,
            aqi,
            tier: aqi.map(TickerTier::from_aqi),
        }
    }
}

/// Fetches every city concurrently. A city whose lookup fails keeps its
/// slot with `aqi: None`; output order follows `cities`.
pub async fn fetch_ticker(client: &AirQualityClient, cities: &[City]) -> Vec<TickerEntry> {
    let handles: Vec<_> = cities
        .iter()
        .copied()
        .map(|city| {
            let client = client.clone();
            tokio::spawn(async move {
                let aqi = match client.current_aqi(city.latitude, city.longitude).await {
                    Ok(value) => value.map(|aqi| aqi.round() as i64),
                    Err(error) => {
                        tracing::warn!(city = city.name, error = %error, "ticker lookup failed");
                        None
                    }
                };
                TickerEntry::new(city, aqi)
            })
        })
        .collect();

    let mut entries = Vec::with_capacity(handles.len());
    for (city, handle) in cities.iter().copied().zip(handles) {
        match handle.await {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                tracing::warn!(city = city.name, error = %error, "ticker task failed");
                entries.push(TickerEntry::new(city, None));
            }
        }
    }
    entries
}

pub fn render_ticker(entries: &[TickerEntry]) -> String {
    entries
        .iter()
        .filter_map(|entry| {
            let aqi = entry.aqi?;
            let tier = entry.tier.map(TickerTier::as_str).unwrap_or_default();
            Some(format!("{} AQI {} [{}]", entry.name, aqi, tier))
        })
        .collect::<Vec<_>>()
        .join("  •  ")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PollutantStatus {
    pub pollutant: Pollutant,
    pub label: &'static str,
    pub value: f64,
    pub rounded: i64,
    pub band: PollutantBand,
    pub status_text: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardReport {
    pub location: String,
    pub generated_at: DateTime<Local>,
    pub aqi: i64,
    pub status: AqiStatus,
    pub pollutants: Vec<PollutantStatus>,
}

impl DashboardReport {
    pub fn build(
        location: impl Into<String>,
        reading: &AirQualityReading,
        generated_at: DateTime<Local>,
    ) -> anyhow::Result<Self> {
        let aqi = reading
            .us_aqi
            .map(|value| value.round() as i64)
            .ok_or_else(|| anyhow::anyhow!("Air quality data unavailable for this location."))?;

        let pollutants = Pollutant::ALL
            .into_iter()
            .filter_map(|pollutant| {
                let value = pollutant_value(reading, pollutant)?;
                let classification = pollutant.classify(value);
                Some(PollutantStatus {
                    pollutant,
                    label: pollutant.label(),
                    value,
                    rounded: classification.rounded,
                    band: classification.band,
                    status_text: classification.band.status_text(),
                })
            })
            .collect();

        Ok(Self {
            location: location.into(),
            generated_at,
            aqi,
            status: classify_aqi(aqi),
            pollutants,
        })
    }

    pub fn share_text(&self, url: &str) -> String {
        format!(
            "Air Quality Index for {}:\n\nAQI: {} ({})\n\nView full report: {}",
            self.location, self.aqi, self.status.label, url
        )
    }
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.location)?;
        writeln!(f, "{}", self.generated_at.format("%a, %b %-d, %I:%M %p"))?;
        writeln!(f)?;
        writeln!(f, "AQI {}  {}", self.aqi, self.status.label)?;
        writeln!(f, "{}", self.status.description)?;
        writeln!(f)?;
        for row in &self.pollutants {
            writeln!(
                f,
                "{:<6} {:>6} µg/m³  {}",
                row.label, row.rounded, row.status_text
            )?;
        }
        writeln!(f)?;
        for tip in self.status.tips {
            writeln!(f, "- {tip}")?;
        }
        Ok(())
    }
}

fn pollutant_value(reading: &AirQualityReading, pollutant: Pollutant) -> Option<f64> {
    match pollutant {
        Pollutant::Pm25 => reading.pm2_5,
        Pollutant::Pm10 => reading.pm10,
        Pollutant::NitrogenDioxide => reading.nitrogen_dioxide,
        Pollutant::SulphurDioxide => reading.sulphur_dioxide,
        Pollutant::Ozone => reading.ozone,
        Pollutant::CarbonMonoxide => reading.carbon_monoxide,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::aqi::AqiBand;

    fn generated_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
    }

    fn reading() -> AirQualityReading {
        AirQualityReading {
            us_aqi: Some(57.0),
            pm10: Some(20.2),
            pm2_5: Some(12.0),
            carbon_monoxide: Some(9400.4),
            nitrogen_dioxide: Some(60.0),
            sulphur_dioxide: None,
            ozone: Some(71.0),
        }
    }

    #[test]
    fn report_classifies_aqi_and_pollutants() {
        let report = DashboardReport::build("Tokyo, Japan", &reading(), generated_at()).unwrap();
        assert_eq!(report.aqi, 57);
        assert_eq!(report.status.band, AqiBand::Moderate);

        let bands: Vec<_> = report
            .pollutants
            .iter()
            .map(|row| (row.pollutant, row.band))
            .collect();
        assert_eq!(
            bands,
            vec![
                (Pollutant::Pm25, PollutantBand::Good),
                (Pollutant::Pm10, PollutantBand::Good),
                (Pollutant::NitrogenDioxide, PollutantBand::Moderate),
                (Pollutant::Ozone, PollutantBand::Poor),
                (Pollutant::CarbonMonoxide, PollutantBand::Poor),
            ]
        );
        assert_eq!(report.pollutants[4].rounded, 9400);
        assert_eq!(report.pollutants[4].status_text, "Unhealthy");
    }

    #[test]
    fn report_requires_an_aqi() {
        let reading = AirQualityReading {
            us_aqi: None,
            ..reading()
        };
        assert!(DashboardReport::build("Nowhere", &reading, generated_at()).is_err());
    }

    #[test]
    fn share_text_matches_dashboard_format() {
        let report = DashboardReport::build("Cairo, Egypt", &reading(), generated_at()).unwrap();
        assert_eq!(
            report.share_text("https://breeze.earth/"),
            "Air Quality Index for Cairo, Egypt:\n\nAQI: 57 (Moderate 😐)\n\nView full report: https://breeze.earth/"
        );
    }

    #[test]
    fn rendered_report_lists_tips() {
        let report = DashboardReport::build("Delhi, India", &reading(), generated_at()).unwrap();
        let text = report.to_string();
        assert!(text.starts_with("Delhi, India\nThu, Oct 15, 09:30 AM\n"));
        assert!(text.contains("AQI 57  Moderate 😐"));
        assert!(text.contains("- Maybe skip that marathon today 🏃‍♀️"));
        assert!(!text.contains("SO₂"));
    }

    #[test]
    fn ticker_skips_cities_without_data() {
        let entries = vec![
            TickerEntry::new(TOP_CITIES[0], Some(42)),
            TickerEntry::new(TOP_CITIES[1], None),
            TickerEntry::new(TOP_CITIES[2], Some(180)),
        ];
        assert_eq!(entries[2].tier, Some(TickerTier::Unhealthy));
        assert_eq!(
            render_ticker(&entries),
            "Tokyo AQI 42 [good]  •  Shanghai AQI 180 [unhealthy]"
        );
    }
}
