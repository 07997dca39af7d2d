//! US AQI and pollutant classification.
//!
//! All functions are pure and total: every input maps to exactly one band.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiBand {
    Excellent,
    Good,
    Moderate,
    ModerateHigh,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AqiStatus {
    pub band: AqiBand,
    pub label: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub tips: &'static [&'static str],
}

impl AqiBand {
    pub const ALL: [AqiBand; 8] = [
        AqiBand::Excellent,
        AqiBand::Good,
        AqiBand::Moderate,
        AqiBand::ModerateHigh,
        AqiBand::UnhealthySensitive,
        AqiBand::Unhealthy,
        AqiBand::VeryUnhealthy,
        AqiBand::Hazardous,
    ];

    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=25 => AqiBand::Excellent,
            26..=50 => AqiBand::Good,
            51..=75 => AqiBand::Moderate,
            76..=100 => AqiBand::ModerateHigh,
            101..=150 => AqiBand::UnhealthySensitive,
            151..=200 => AqiBand::Unhealthy,
            201..=300 => AqiBand::VeryUnhealthy,
            _ => AqiBand::Hazardous,
        }
    }

    /// Inclusive upper bound of the band, `None` for the open-ended top band.
    pub fn upper_bound(self) -> Option<i64> {
        match self {
            AqiBand::Excellent => Some(25),
            AqiBand::Good => Some(50),
            AqiBand::Moderate => Some(75),
            AqiBand::ModerateHigh => Some(100),
            AqiBand::UnhealthySensitive => Some(150),
            AqiBand::Unhealthy => Some(200),
            AqiBand::VeryUnhealthy => Some(300),
            AqiBand::Hazardous => None,
        }
    }

    pub fn status(self) -> AqiStatus {
        let (label, description, color, tips) = match self {
            AqiBand::Excellent => (
                "Excellent ✨",
                "Air quality is pristine! Perfect day for adventures.",
                "var(--aqi-good)",
                EXCELLENT_TIPS,
            ),
            AqiBand::Good => (
                "Good 😊",
                "Air quality is great. Breathe easy!",
                "var(--aqi-good)",
                GOOD_TIPS,
            ),
            AqiBand::Moderate => (
                "Moderate 😐",
                "Air quality is acceptable for most people.",
                "var(--aqi-moderate)",
                MODERATE_TIPS,
            ),
            AqiBand::ModerateHigh => (
                "Moderate High 😕",
                "Getting a bit iffy for sensitive groups.",
                "var(--aqi-moderate)",
                MODERATE_HIGH_TIPS,
            ),
            AqiBand::UnhealthySensitive => (
                "Unhealthy for Sensitive Groups 😷",
                "Sensitive groups should be cautious.",
                "var(--aqi-unhealthy-sensitive)",
                UNHEALTHY_SENSITIVE_TIPS,
            ),
            AqiBand::Unhealthy => (
                "Unhealthy 😨",
                "Everyone may feel the effects now.",
                "var(--aqi-unhealthy)",
                UNHEALTHY_TIPS,
            ),
            AqiBand::VeryUnhealthy => (
                "Very Unhealthy 🚨",
                "Serious health concerns for everyone.",
                "var(--aqi-very-unhealthy)",
                VERY_UNHEALTHY_TIPS,
            ),
            AqiBand::Hazardous => (
                "Hazardous ☠️",
                "Emergency conditions. Seriously bad air.",
                "var(--aqi-hazardous)",
                HAZARDOUS_TIPS,
            ),
        };

        AqiStatus {
            band: self,
            label,
            description,
            color,
            tips,
        }
    }
}

const EXCELLENT_TIPS: &[&str] = &[
    "Go outside and soak it all in! 🌟",
    "Perfect time for that morning jog! 🏃",
    "Windows open, fresh air flowing! 🪟",
];
const GOOD_TIPS: &[&str] = &[
    "Open those windows! 🪟",
    "Great day for outdoor activities! ⚽",
    "Take a deep breath and enjoy! 🌬️",
];
const MODERATE_TIPS: &[&str] = &[
    "Sensitive folks, take it easy! 🤔",
    "Maybe skip that marathon today 🏃‍♀️",
    "Still pretty good for most activities!",
];
const MODERATE_HIGH_TIPS: &[&str] = &[
    "If you have asthma, keep that inhaler handy! 💨",
    "Light outdoor activities are okay 👍",
    "Stay hydrated! 💧",
];
const UNHEALTHY_SENSITIVE_TIPS: &[&str] = &[
    "Kids and elderly, maybe stay inside 🏠",
    "Asthma? Keep medicine close! 💊",
    "Cut that outdoor workout short ⏱️",
];
const UNHEALTHY_TIPS: &[&str] = &[
    "Indoor day, folks! 🏠",
    "Mask up if you must go out 😷",
    "Windows closed, please! 🚪",
];
const VERY_UNHEALTHY_TIPS: &[&str] = &[
    "Stay inside! Not a suggestion! 🛑",
    "Air purifier time! 💨",
    "Seal those windows ASAP! 🔒",
];
const HAZARDOUS_TIPS: &[&str] = &[
    "STAY INSIDE. Really. 🏠",
    "N95 mask minimum if you go out 😷",
    "Air purifier on full blast! 💨",
    "Check on your neighbors! 👥",
];

pub fn classify_aqi(aqi: i64) -> AqiStatus {
    AqiBand::from_aqi(aqi).status()
}

/// Coarse four-step class used by the city ticker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerTier {
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
}

impl TickerTier {
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=50 => TickerTier::Good,
            51..=100 => TickerTier::Moderate,
            101..=200 => TickerTier::Unhealthy,
            _ => TickerTier::Hazardous,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TickerTier::Good => "good",
            TickerTier::Moderate => "moderate",
            TickerTier::Unhealthy => "unhealthy",
            TickerTier::Hazardous => "hazardous",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantBand {
    Good,
    Moderate,
    Poor,
}

impl PollutantBand {
    pub fn status_text(self) -> &'static str {
        match self {
            PollutantBand::Good => "Good",
            PollutantBand::Moderate => "Moderate",
            PollutantBand::Poor => "Unhealthy",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PollutantClassification {
    pub band: PollutantBand,
    pub rounded: i64,
}

/// Both limits are inclusive: a reading equal to `good_limit` is good.
pub fn classify_pollutant(value: f64, good_limit: f64, moderate_limit: f64) -> PollutantClassification {
    let band = if value <= good_limit {
        PollutantBand::Good
    } else if value <= moderate_limit {
        PollutantBand::Moderate
    } else {
        PollutantBand::Poor
    };

    PollutantClassification {
        band,
        rounded: value.round() as i64,
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    Pm25,
    Pm10,
    NitrogenDioxide,
    SulphurDioxide,
    Ozone,
    CarbonMonoxide,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::NitrogenDioxide,
        Pollutant::SulphurDioxide,
        Pollutant::Ozone,
        Pollutant::CarbonMonoxide,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::NitrogenDioxide => "NO₂",
            Pollutant::SulphurDioxide => "SO₂",
            Pollutant::Ozone => "O₃",
            Pollutant::CarbonMonoxide => "CO",
        }
    }

    /// `(good, moderate)` limits in µg/m³.
    pub fn limits(self) -> (f64, f64) {
        match self {
            Pollutant::Pm25 => (12.0, 35.4),
            Pollutant::Pm10 => (54.0, 154.0),
            Pollutant::NitrogenDioxide => (53.0, 100.0),
            Pollutant::SulphurDioxide => (35.0, 75.0),
            Pollutant::Ozone => (54.0, 70.0),
            Pollutant::CarbonMonoxide => (4400.0, 9400.0),
        }
    }

    pub fn classify(self, value: f64) -> PollutantClassification {
        let (good, moderate) = self.limits();
        classify_pollutant(value, good, moderate)
    }
}
