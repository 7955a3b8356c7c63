use crate::metadata::MetadataDisplay;

/// Everything the controller tells the transport surface.
pub trait TransportView {
    fn show_playing(&self, playing: bool);
    fn show_progress(&self, position: f64, duration: Option<f64>);
    fn show_duration(&self, duration: f64);
    fn render_playlist(&self, names: &[&str], current: Option<usize>);
    fn show_metadata(&self, metadata: &MetadataDisplay);
    fn show_preset(&self, name: &str);
    fn show_error(&self, message: &str);
}

/// Button glyph: the action a press would take.
pub fn play_glyph(playing: bool) -> &'static str {
    if playing { "❚❚" } else { "▶" }
}

/// `m:ss`. Unknown or negative times render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Played fraction in `0.0..=1.0`.
pub fn progress_ratio(position: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => (position / d).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(7.9), "0:07");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn progress_ratio_is_clamped() {
        assert_eq!(progress_ratio(30.0, Some(120.0)), 0.25);
        assert_eq!(progress_ratio(130.0, Some(120.0)), 1.0);
        assert_eq!(progress_ratio(30.0, None), 0.0);
        assert_eq!(progress_ratio(30.0, Some(0.0)), 0.0);
    }

    #[test]
    fn glyph_shows_the_next_action() {
        assert_eq!(play_glyph(true), "❚❚");
        assert_eq!(play_glyph(false), "▶");
    }
}
