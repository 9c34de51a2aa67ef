//! Plain-text rendering of dashboard views for the terminal.

use skycast_weather::{DashboardView, FavoriteCity, TemperatureUnit};

pub fn view(view: &DashboardView, is_favorite: bool) -> String {
    let unit = view.unit;
    let current = &view.current;
    let mut out = String::new();

    let star = if is_favorite { " ★" } else { "" };
    out.push_str(&format!(
        "{} {}, {}{}\n",
        current.condition.icon(),
        current.name,
        current.country,
        star
    ));
    out.push_str(&format!(
        "  {}  (feels like {})  {}\n",
        unit.format(current.temperature),
        unit.format(current.feels_like),
        current.description
    ));
    out.push_str(&format!(
        "  Humidity {}%  Wind {:.1} m/s  Pressure {} hPa",
        current.humidity, current.wind_speed, current.pressure
    ));
    if let Some(visibility) = current.visibility {
        out.push_str(&format!("  Visibility {:.1} km", f64::from(visibility) / 1000.0));
    }
    out.push('\n');

    if !view.daily.is_empty() {
        out.push_str("\n5-Day Forecast\n");
        for (index, day) in view.daily.iter().enumerate() {
            let label = match (index, day.time()) {
                (0, _) => "Today".to_string(),
                (_, Some(time)) => time.format("%a, %b %-d").to_string(),
                (_, None) => "-".to_string(),
            };
            out.push_str(&format!(
                "  {:<12} {} {:>6}  {}  💧 {}%\n",
                label,
                day.condition.icon(),
                unit.format(day.temperature),
                day.description,
                day.humidity
            ));
        }
    }

    out
}

pub fn favorites(favorites: &[FavoriteCity]) -> String {
    if favorites.is_empty() {
        return "No favorite cities yet.\n".to_string();
    }

    favorites
        .iter()
        .map(|f| match &f.state {
            Some(state) => format!("{}  {}, {} ({})\n", f.id, f.name, state, f.country),
            None => format!("{}  {}, {}\n", f.id, f.name, f.country),
        })
        .collect()
}

pub fn unit_name(unit: TemperatureUnit) -> &'static str {
    match unit {
        TemperatureUnit::Celsius => "celsius",
        TemperatureUnit::Fahrenheit => "fahrenheit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use skycast_weather::{CurrentWeather, ForecastEntry, WeatherCondition};

    fn sample(unit: TemperatureUnit) -> DashboardView {
        DashboardView {
            current: CurrentWeather {
                name: "Damofalls Park Estate".to_string(),
                country: "ZW".to_string(),
                temperature: 25.0,
                feels_like: 24.0,
                humidity: 30,
                pressure: 1020,
                wind_speed: 2.5,
                visibility: Some(10000),
                condition: WeatherCondition::Clear,
                description: "clear sky".to_string(),
                fetched_at: Utc::now(),
            },
            daily: vec![
                ForecastEntry {
                    timestamp: 1_700_000_000,
                    temperature: 25.0,
                    humidity: 30,
                    condition: WeatherCondition::Clear,
                    description: "clear sky".to_string(),
                },
                ForecastEntry {
                    timestamp: 1_700_086_400,
                    temperature: 20.0,
                    humidity: 80,
                    condition: WeatherCondition::Rain,
                    description: "light rain".to_string(),
                },
            ],
            unit,
        }
    }

    #[test]
    fn test_view_in_celsius() {
        let text = view(&sample(TemperatureUnit::Celsius), true);
        assert!(text.contains("Damofalls Park Estate, ZW ★"));
        assert!(text.contains("25°C"));
        assert!(text.contains("Visibility 10.0 km"));
        assert!(text.contains("Today"));
        assert!(text.contains("Wed, Nov 15"));
    }

    #[test]
    fn test_view_in_fahrenheit() {
        let text = view(&sample(TemperatureUnit::Fahrenheit), false);
        assert!(text.contains("77°F"));
        assert!(text.contains("68°F"));
        assert!(!text.contains('★'));
    }

    #[test]
    fn test_empty_favorites_message() {
        assert_eq!(favorites(&[]), "No favorite cities yet.\n");
    }
}
