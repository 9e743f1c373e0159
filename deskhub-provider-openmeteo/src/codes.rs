//! WMO weather interpretation codes as reported by Open-Meteo.

/// Inclusive code ranges, checked in order.
const RANGES: &[(i64, i64, &str)] = &[
    (0, 0, "Clear sky"),
    (1, 2, "Partly cloudy"),
    (3, 3, "Overcast"),
    (51, 57, "Drizzle"),
    (61, 67, "Rain"),
    (71, 77, "Snow"),
    (80, 82, "Rain showers"),
    (95, 99, "Thunderstorm"),
];

/// Human-readable text for a weather code. Defined for every input.
pub fn describe(code: Option<i64>) -> String {
    let Some(code) = code else {
        return "Unknown".to_string();
    };

    RANGES
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&code))
        .map(|(_, _, text)| text.to_string())
        .unwrap_or_else(|| format!("Code {}", code))
}
