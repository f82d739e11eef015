//! OpenWeatherMap icon code to Nerd Font glyph mapping

/// Map an OpenWeatherMap icon code (e.g. "01d", "10n") to a prompt glyph
///
/// Only the two-digit condition prefix matters; day and night variants share a
/// glyph. Unknown codes map to an empty string.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon.get(..2) {
        Some("01") => "\u{fa98}", // clear sky
        Some("02") => "\u{fa94}", // few clouds
        Some("03") => "\u{e33d}", // scattered clouds
        Some("04") => "\u{e312}", // broken clouds
        Some("09") => "\u{fa95}", // shower rain
        Some("10") => "\u{e308}", // rain
        Some("11") => "\u{e31d}", // thunderstorm
        Some("13") => "\u{e31a}", // snow
        Some("50") => "\u{e313}", // mist
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_glyph_mapping() {
        assert_eq!(icon_glyph("01d"), "\u{fa98}");
        assert_eq!(icon_glyph("02d"), "\u{fa94}");
        assert_eq!(icon_glyph("03d"), "\u{e33d}");
        assert_eq!(icon_glyph("04d"), "\u{e312}");
        assert_eq!(icon_glyph("09d"), "\u{fa95}");
        assert_eq!(icon_glyph("10d"), "\u{e308}");
        assert_eq!(icon_glyph("11d"), "\u{e31d}");
        assert_eq!(icon_glyph("13d"), "\u{e31a}");
        assert_eq!(icon_glyph("50d"), "\u{e313}");
    }

    #[test]
    fn test_night_icons_match_day_icons() {
        for code in ["01", "02", "03", "04", "09", "10", "11", "13", "50"] {
            assert_eq!(
                icon_glyph(&format!("{code}d")),
                icon_glyph(&format!("{code}n")),
                "Day and night glyphs should match for {code}"
            );
        }
    }

    #[test]
    fn test_unknown_icon_is_empty() {
        assert_eq!(icon_glyph("99d"), "");
        assert_eq!(icon_glyph("1"), "");
        assert_eq!(icon_glyph(""), "");
    }
}
