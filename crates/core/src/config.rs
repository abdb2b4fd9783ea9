//! Tunable constants for the wave field.
//!
//! A [`WaveConfig`] is built once (from defaults or a JSON params object) and
//! handed to the engine, which never mutates it. Reading from JSON never
//! fails: missing, mistyped or non-finite values fall back to the default.

use crate::color::Srgb;
use crate::surface::StrokeStyle;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_LINE_OPACITY: f64 = 1.0;
const DEFAULT_LINE_WIDTH: f64 = 1.0;
/// Time scale applied to the noise x coordinate.
const DEFAULT_WAVE_SPEED_X: f64 = 0.0125;
/// Time scale applied to the noise y coordinate.
const DEFAULT_WAVE_SPEED_Y: f64 = 0.005;
const DEFAULT_WAVE_AMP_X: f64 = 32.0;
const DEFAULT_WAVE_AMP_Y: f64 = 16.0;
const DEFAULT_NOISE_FREQ_X: f64 = 0.002;
const DEFAULT_NOISE_FREQ_Y: f64 = 0.0015;
const DEFAULT_FRICTION: f64 = 0.925;
const DEFAULT_TENSION: f64 = 0.005;
const DEFAULT_MAX_CURSOR_MOVE: f64 = 100.0;
const DEFAULT_X_GAP: f64 = 10.0;
const DEFAULT_Y_GAP: f64 = 32.0;
const DEFAULT_AMBIENT_INTENSITY: f64 = 2.0;
/// Radians per millisecond.
const DEFAULT_AMBIENT_SPEED: f64 = 0.0008;
/// Roughly a 60 fps cap. Kept just under 1000/60 so a 60 Hz display is not
/// throttled by timestamp jitter.
const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;

/// Immutable set of tunable constants for one wave field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Stroke color of the lines.
    pub line_color: Srgb,
    /// Stroke alpha in [0, 1].
    pub line_opacity: f64,
    /// Stroke width in surface units.
    pub line_width: f64,
    /// Fill painted by surfaces that own their background. `None` leaves the
    /// surface transparent.
    pub background_color: Option<Srgb>,
    pub wave_speed_x: f64,
    pub wave_speed_y: f64,
    pub wave_amp_x: f64,
    pub wave_amp_y: f64,
    pub noise_freq_x: f64,
    pub noise_freq_y: f64,
    /// Velocity damping factor applied every step.
    pub friction: f64,
    /// Spring constant pulling cursor offsets back to zero.
    pub tension: f64,
    /// Clamp bound for both axes of every cursor offset.
    pub max_cursor_move: f64,
    /// Column spacing.
    pub x_gap: f64,
    /// Row spacing.
    pub y_gap: f64,
    pub ambient_intensity: f64,
    pub ambient_speed: f64,
    /// Minimum time between accepted frames, in milliseconds.
    pub frame_interval_ms: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            line_color: Srgb::BLACK,
            line_opacity: DEFAULT_LINE_OPACITY,
            line_width: DEFAULT_LINE_WIDTH,
            background_color: None,
            wave_speed_x: DEFAULT_WAVE_SPEED_X,
            wave_speed_y: DEFAULT_WAVE_SPEED_Y,
            wave_amp_x: DEFAULT_WAVE_AMP_X,
            wave_amp_y: DEFAULT_WAVE_AMP_Y,
            noise_freq_x: DEFAULT_NOISE_FREQ_X,
            noise_freq_y: DEFAULT_NOISE_FREQ_Y,
            friction: DEFAULT_FRICTION,
            tension: DEFAULT_TENSION,
            max_cursor_move: DEFAULT_MAX_CURSOR_MOVE,
            x_gap: DEFAULT_X_GAP,
            y_gap: DEFAULT_Y_GAP,
            ambient_intensity: DEFAULT_AMBIENT_INTENSITY,
            ambient_speed: DEFAULT_AMBIENT_SPEED,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl WaveConfig {
    /// Extracts a config from a JSON params object, falling back to defaults
    /// key by key.
    ///
    /// Unparsable colors are logged and replaced by the default rather than
    /// rejected.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            line_color: param_color(params, "line_color").unwrap_or(d.line_color),
            line_opacity: param_f64(params, "line_opacity", d.line_opacity).clamp(0.0, 1.0),
            line_width: param_f64(params, "line_width", d.line_width),
            background_color: param_color(params, "background_color"),
            wave_speed_x: param_f64(params, "wave_speed_x", d.wave_speed_x),
            wave_speed_y: param_f64(params, "wave_speed_y", d.wave_speed_y),
            wave_amp_x: param_f64(params, "wave_amp_x", d.wave_amp_x),
            wave_amp_y: param_f64(params, "wave_amp_y", d.wave_amp_y),
            noise_freq_x: param_f64(params, "noise_freq_x", d.noise_freq_x),
            noise_freq_y: param_f64(params, "noise_freq_y", d.noise_freq_y),
            friction: param_f64(params, "friction", d.friction),
            tension: param_f64(params, "tension", d.tension),
            max_cursor_move: param_f64(params, "max_cursor_move", d.max_cursor_move).abs(),
            x_gap: param_f64(params, "x_gap", d.x_gap),
            y_gap: param_f64(params, "y_gap", d.y_gap),
            ambient_intensity: param_f64(params, "ambient_intensity", d.ambient_intensity),
            ambient_speed: param_f64(params, "ambient_speed", d.ambient_speed),
            frame_interval_ms: param_f64(params, "frame_interval_ms", d.frame_interval_ms)
                .max(0.0),
        }
    }

    /// Current values as a JSON object, keyed like [`WaveConfig::from_json`].
    pub fn to_json(&self) -> Value {
        json!({
            "line_color": self.line_color.to_hex(),
            "line_opacity": self.line_opacity,
            "line_width": self.line_width,
            "background_color": self.background_color.map(Srgb::to_hex),
            "wave_speed_x": self.wave_speed_x,
            "wave_speed_y": self.wave_speed_y,
            "wave_amp_x": self.wave_amp_x,
            "wave_amp_y": self.wave_amp_y,
            "noise_freq_x": self.noise_freq_x,
            "noise_freq_y": self.noise_freq_y,
            "friction": self.friction,
            "tension": self.tension,
            "max_cursor_move": self.max_cursor_move,
            "x_gap": self.x_gap,
            "y_gap": self.y_gap,
            "ambient_intensity": self.ambient_intensity,
            "ambient_speed": self.ambient_speed,
            "frame_interval_ms": self.frame_interval_ms,
        })
    }

    /// Schema describing every parameter: type, default, suggested range and purpose.
    pub fn schema() -> Value {
        json!({
            "line_color": {
                "type": "color",
                "default": Srgb::BLACK.to_hex(),
                "description": "Stroke color as #rrggbb or #rgb"
            },
            "line_opacity": number(DEFAULT_LINE_OPACITY, 0.0, 1.0, "Stroke alpha"),
            "line_width": number(DEFAULT_LINE_WIDTH, 0.1, 8.0, "Stroke width in surface units"),
            "background_color": {
                "type": "color",
                "default": Value::Null,
                "description": "Optional background fill; omitted means transparent"
            },
            "wave_speed_x": number(DEFAULT_WAVE_SPEED_X, 0.0, 0.1, "Time scale of the noise x coordinate"),
            "wave_speed_y": number(DEFAULT_WAVE_SPEED_Y, 0.0, 0.1, "Time scale of the noise y coordinate"),
            "wave_amp_x": number(DEFAULT_WAVE_AMP_X, 0.0, 200.0, "Horizontal noise drift amplitude"),
            "wave_amp_y": number(DEFAULT_WAVE_AMP_Y, 0.0, 200.0, "Vertical noise drift amplitude"),
            "noise_freq_x": number(DEFAULT_NOISE_FREQ_X, 0.0, 0.05, "Spatial noise frequency along x"),
            "noise_freq_y": number(DEFAULT_NOISE_FREQ_Y, 0.0, 0.05, "Spatial noise frequency along y"),
            "friction": number(DEFAULT_FRICTION, 0.0, 1.0, "Velocity damping per step"),
            "tension": number(DEFAULT_TENSION, 0.0, 0.5, "Spring constant toward zero offset"),
            "max_cursor_move": number(DEFAULT_MAX_CURSOR_MOVE, 0.0, 500.0, "Clamp bound for pointer displacement"),
            "x_gap": number(DEFAULT_X_GAP, 1.0, 200.0, "Column spacing"),
            "y_gap": number(DEFAULT_Y_GAP, 1.0, 200.0, "Row spacing"),
            "ambient_intensity": number(DEFAULT_AMBIENT_INTENSITY, 0.0, 20.0, "Amplitude of the ambient sinusoid"),
            "ambient_speed": number(DEFAULT_AMBIENT_SPEED, 0.0, 0.01, "Angular rate of the ambient sinusoid per ms"),
            "frame_interval_ms": number(DEFAULT_FRAME_INTERVAL_MS, 0.0, 1000.0, "Minimum time between accepted frames"),
        })
    }

    /// Stroke parameters handed to the surface each frame.
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.line_color,
            opacity: self.line_opacity,
            width: self.line_width,
        }
    }
}

fn number(default: f64, min: f64, max: f64, description: &str) -> Value {
    json!({
        "type": "number",
        "default": default,
        "min": min,
        "max": max,
        "description": description,
    })
}

/// Extracts a finite `f64` from `params[name]`, returning `default` if missing,
/// mistyped or non-finite.
fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Extracts a hex color from `params[name]`. Missing or null is `None`;
/// anything unparsable is logged and also `None`.
fn param_color(params: &Value, name: &str) -> Option<Srgb> {
    let raw = params.get(name)?;
    if raw.is_null() {
        return None;
    }
    match raw.as_str().map(Srgb::from_hex) {
        Some(Ok(color)) => Some(color),
        Some(Err(e)) => {
            tracing::warn!(param = name, error = %e, "ignoring color parameter");
            None
        }
        None => {
            tracing::warn!(param = name, "ignoring non-string color parameter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        assert_eq!(WaveConfig::from_json(&json!({})), WaveConfig::default());
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let cfg = WaveConfig::from_json(&json!({
            "line_color": "#ff0000",
            "line_opacity": 0.5,
            "x_gap": 16,
            "y_gap": 40.0,
            "friction": 0.8,
            "background_color": "#101010",
        }));
        assert_eq!(cfg.line_color.to_rgb8(), [255, 0, 0]);
        assert!((cfg.line_opacity - 0.5).abs() < f64::EPSILON);
        assert!((cfg.x_gap - 16.0).abs() < f64::EPSILON);
        assert!((cfg.y_gap - 40.0).abs() < f64::EPSILON);
        assert!((cfg.friction - 0.8).abs() < f64::EPSILON);
        assert_eq!(cfg.background_color.map(Srgb::to_rgb8), Some([16, 16, 16]));
    }

    #[test]
    fn from_json_falls_back_on_wrong_types() {
        let cfg = WaveConfig::from_json(&json!({
            "tension": "stiff",
            "line_color": 7,
            "wave_amp_x": null,
        }));
        let d = WaveConfig::default();
        assert!((cfg.tension - d.tension).abs() < f64::EPSILON);
        assert_eq!(cfg.line_color, d.line_color);
        assert!((cfg.wave_amp_x - d.wave_amp_x).abs() < f64::EPSILON);
    }

    #[test]
    fn from_json_keeps_default_color_when_hex_is_bad() {
        let cfg = WaveConfig::from_json(&json!({"line_color": "#zzzzzz"}));
        assert_eq!(cfg.line_color, Srgb::BLACK);
    }

    #[test]
    fn from_json_keeps_non_positive_gaps_for_grid_to_degrade() {
        let cfg = WaveConfig::from_json(&json!({"x_gap": -4.0, "y_gap": 0}));
        assert!(cfg.x_gap < 0.0);
        assert_eq!(cfg.y_gap, 0.0);
    }

    #[test]
    fn from_json_clamps_opacity_and_normalizes_cursor_bound() {
        let cfg = WaveConfig::from_json(&json!({"line_opacity": 3.0, "max_cursor_move": -50.0}));
        assert!((cfg.line_opacity - 1.0).abs() < f64::EPSILON);
        assert!((cfg.max_cursor_move - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn to_json_round_trips_through_from_json() {
        let mut cfg = WaveConfig::default();
        cfg.line_color = Srgb::from_rgb8(10, 20, 30);
        cfg.background_color = Some(Srgb::WHITE);
        cfg.wave_amp_y = 7.5;
        assert_eq!(WaveConfig::from_json(&cfg.to_json()), cfg);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let cfg: WaveConfig = serde_json::from_str(r##"{"x_gap": 20.0, "line_color": "#fff"}"##).unwrap();
        assert!((cfg.x_gap - 20.0).abs() < f64::EPSILON);
        assert_eq!(cfg.line_color, Srgb::WHITE);
        assert!((cfg.y_gap - DEFAULT_Y_GAP).abs() < f64::EPSILON);
    }

    #[test]
    fn schema_covers_every_json_key() {
        let schema = WaveConfig::schema();
        let values = WaveConfig::default().to_json();
        for key in values.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
        assert_eq!(schema["friction"]["type"], "number");
    }

    #[test]
    fn stroke_style_mirrors_line_settings() {
        let cfg = WaveConfig::from_json(&json!({"line_width": 2.5, "line_opacity": 0.3}));
        let style = cfg.stroke_style();
        assert!((style.width - 2.5).abs() < f64::EPSILON);
        assert!((style.opacity - 0.3).abs() < f64::EPSILON);
        assert_eq!(style.color, cfg.line_color);
    }
}
