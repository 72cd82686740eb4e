// src/color.rs

use palette::Srgba;

/// Fixed translucency for heatmap tinting; not part of the gradient.
pub const HEAT_ALPHA: f32 = 0.5;

/// Fraction at which the gradient passes through pure green.
const GREEN_POINT: f32 = 0.2;

/// Map a normalized churn fraction to a heat color.
///
/// The fraction is the churn value divided by the maximum churn in the
/// ranking the value came from, so it lives in `[0, 1]`. The gradient runs
/// blue → green → red with pure green exactly at 0.2, continuous and
/// monotonic on both sides:
///
/// - `0.0` → pure blue, ramping toward green as the fraction rises
/// - `0.2` → pure green `(0, 1, 0)`
/// - `1.0` → pure red, approached from green
///
/// Anything outside `[0, 1]` (including NaN) panics: an out-of-band
/// fraction means a caller normalized against the wrong maximum, and a
/// silently wrong color would hide that defect.
pub fn color_for(fraction: f32) -> Srgba<f32> {
    let (red, green, blue) = if fraction >= 0.0 && fraction < GREEN_POINT {
        let t = fraction / GREEN_POINT;
        (0.0, t, 1.0 - t)
    } else if fraction == GREEN_POINT {
        (0.0, 1.0, 0.0)
    } else if fraction > GREEN_POINT && fraction <= 1.0 {
        let t = (fraction - GREEN_POINT) / (1.0 - GREEN_POINT);
        (t, 1.0 - t, 0.0)
    } else {
        panic!("churn fraction {fraction} outside [0, 1]");
    };
    Srgba::new(red, green, blue, HEAT_ALPHA)
}

/// 24-bit ANSI background escape for terminal presentation.
pub fn ansi_bg(color: Srgba<f32>) -> String {
    let r = (color.red * 255.0) as u8;
    let g = (color.green * 255.0) as u8;
    let b = (color.blue * 255.0) as u8;
    format!("\x1b[48;2;{};{};{}m", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_pure_blue() {
        let c = color_for(0.0);
        assert_eq!((c.red, c.green, c.blue), (0.0, 0.0, 1.0));
        assert_eq!(c.alpha, HEAT_ALPHA);
    }

    #[test]
    fn green_point_is_pure_green() {
        let c = color_for(0.2);
        assert_eq!((c.red, c.green, c.blue), (0.0, 1.0, 0.0));
    }

    #[test]
    fn one_is_pure_red() {
        let c = color_for(1.0);
        assert_eq!((c.red, c.green, c.blue), (1.0, 0.0, 0.0));
    }

    #[test]
    fn cool_band_ramps_blue_to_green() {
        let c = color_for(0.1);
        assert_eq!(c.red, 0.0);
        assert!((c.green - 0.5).abs() < 1e-6);
        assert!((c.blue - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hot_band_ramps_green_to_red() {
        let c = color_for(0.6);
        assert_eq!(c.blue, 0.0);
        assert!((c.red - 0.5).abs() < 1e-6);
        assert!((c.green - 0.5).abs() < 1e-6);
    }

    #[test]
    fn gradient_is_continuous_at_green_point() {
        let below = color_for(0.2 - 1e-4);
        let above = color_for(0.2 + 1e-4);
        assert!(below.green > 0.999 && below.blue < 0.001);
        assert!(above.green > 0.999 && above.red < 0.001);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn negative_fraction_panics() {
        color_for(-0.01);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn overshoot_fraction_panics() {
        color_for(1.01);
    }

    #[test]
    #[should_panic]
    fn nan_fraction_panics() {
        color_for(f32::NAN);
    }
}
