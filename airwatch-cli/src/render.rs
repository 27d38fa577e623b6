use std::fmt::Write;

use airwatch_core::view::{InsightView, Screen, SelectorView, StatsView, WeatherView};

const GAUGE_CELLS: usize = 20;

pub fn screen(screen: &Screen) -> String {
    let mut out = String::new();

    let heading = match screen.selector.selected {
        Some(id) => match screen.selector.choices().find(|opt| opt.value == Some(id)) {
            Some(opt) => format!("{} (#{id})", opt.label),
            None => format!("Location #{id}"),
        },
        None => "No location selected".to_string(),
    };

    let _ = writeln!(out, "== {heading} ==");
    out.push_str(&stats(&screen.stats));
    out.push_str(&weather(&screen.weather));
    out.push_str(&insights(&screen.insights));
    out
}

pub fn stats(stats: &StatsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {}  {}", "AQI", stats.aqi, stats.status);
    let _ = writeln!(out, "{:<10} {:<14} {}", "PM2.5", stats.pm25, gauge(stats.pm25_bar));
    let _ = writeln!(out, "{:<10} {:<14} {}", "PM10", stats.pm10, gauge(stats.pm10_bar));
    if let Some(at) = stats.updated_at {
        let _ = writeln!(out, "{:<10} {}", "Updated", at.format("%Y-%m-%d %H:%M UTC"));
    }
    out
}

pub fn weather(weather: &WeatherView) -> String {
    format!("{:<10} {}  {}\n", "Forecast", weather.temperature, weather.condition)
}

pub fn insights(insights: &InsightView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {}", "Analysis", insights.analysis);
    let _ = writeln!(out, "Advice");
    for line in insights.advice.iter().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn selector(selector: &SelectorView) -> String {
    let mut out = String::new();

    for opt in selector.choices() {
        let Some(id) = opt.value else { continue };
        let marker = if selector.selected == Some(id) { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {:>4}  {}", id.0, opt.label);
    }

    if out.is_empty() {
        out.push_str("No locations available.\n");
    }
    out
}

/// Fixed-width bar for a `0..=100` percentage.
pub fn gauge(percent: f64) -> String {
    let filled = if percent.is_finite() {
        ((percent.clamp(0.0, 100.0) / 100.0) * GAUGE_CELLS as f64).round() as usize
    } else {
        0
    };

    format!("[{}{}]", "#".repeat(filled), ".".repeat(GAUGE_CELLS - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwatch_core::{Location, LocationId};

    fn selector_with(selected: Option<i64>) -> SelectorView {
        let mut view = SelectorView::from_locations(&[Location {
            id: LocationId(3),
            name: "Station".into(),
            city: "Delhi".into(),
            country: "India".into(),
            latitude: None,
            longitude: None,
        }]);
        view.selected = selected.map(LocationId);
        view
    }

    #[test]
    fn gauge_scales_and_clamps() {
        assert_eq!(gauge(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(gauge(50.0), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
        assert_eq!(gauge(250.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(gauge(f64::NAN), format!("[{}]", ".".repeat(20)));
    }

    #[test]
    fn advice_lines_are_printed_separately() {
        let view = InsightView::from_texts("short", "line1\nline2");
        let text = insights(&view);
        assert!(text.contains("\n  line1\n  line2\n"));
    }

    #[test]
    fn selector_marks_current_location() {
        assert_eq!(selector(&selector_with(Some(3))), "*    3  Station, Delhi\n");
        assert_eq!(selector(&selector_with(None)), "     3  Station, Delhi\n");
        assert_eq!(selector(&SelectorView::empty()), "No locations available.\n");
    }

    #[test]
    fn placeholder_screen_renders() {
        let text = screen(&Screen::placeholder());
        assert!(text.starts_with("== No location selected =="));
        assert!(text.contains("--°C"));
        assert!(text.contains("No data found. Add pollution record."));
    }

    #[test]
    fn heading_uses_selector_label() {
        let mut s = Screen::placeholder();
        s.selector = selector_with(Some(3));
        assert!(screen(&s).starts_with("== Station, Delhi (#3) =="));
    }
}
