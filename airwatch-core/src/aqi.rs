/// Six fixed severity bands of the air-quality index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AqiCategory {
    Healthy,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    /// Inclusive upper bound of each band, lowest first. Anything above the
    /// last bound is `Hazardous`.
    const BANDS: [(f64, AqiCategory); 5] = [
        (50.0, AqiCategory::Healthy),
        (100.0, AqiCategory::Moderate),
        (150.0, AqiCategory::UnhealthyForSensitiveGroups),
        (200.0, AqiCategory::Unhealthy),
        (300.0, AqiCategory::VeryUnhealthy),
    ];

    /// Total over every `f64`: negatives land in `Healthy`, NaN fails every
    /// bound and lands in `Hazardous`.
    pub fn classify(aqi: f64) -> Self {
        Self::BANDS
            .iter()
            .find(|(upper, _)| aqi <= *upper)
            .map(|(_, category)| *category)
            .unwrap_or(AqiCategory::Hazardous)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Healthy => "Healthy",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

/// Status text for an optional reading; `"--"` when the backend sent none.
pub fn describe(aqi: Option<i64>) -> String {
    match aqi {
        Some(value) => AqiCategory::classify(value as f64).label().to_string(),
        None => crate::view::PLACEHOLDER.to_string(),
    }
}
