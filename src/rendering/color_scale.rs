//! Scalar-to-color mappings for the network view
//!
//! - Activations run through a red → green scale over `[-1, 1]`.
//! - Weights map to a diverging red (negative) / blue (positive) stroke whose
//!   intensity and width grow with `|w|`.
//!
//! Both mappings are monotonic in their input and clamp outside the domain.
//! Non-finite inputs map to the midpoint.

use crate::rendering::theme::{Rgb, UiColors};

/// Thinnest connection stroke
pub const MIN_STROKE_WIDTH: f32 = 0.5;

/// Thickest connection stroke, reached at `|w| >= 1`
pub const MAX_STROKE_WIDTH: f32 = 3.0;

const WEIGHT_NEGATIVE: Rgb = Rgb::new(200, 40, 40);
const WEIGHT_POSITIVE: Rgb = Rgb::new(40, 40, 200);
const WEIGHT_NEUTRAL: Rgb = Rgb::new(221, 221, 221);

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Neuron fill for an activation value
pub fn activation_color(activation: f32) -> Rgb {
    let t = (sanitize(activation) + 1.0) / 2.0;
    UiColors::DANGER.lerp(UiColors::SUCCESS, t)
}

/// Stroke color and width for a connection leaving a neuron with this weight
pub fn weight_stroke(weight: f32) -> (Rgb, f32) {
    let w = sanitize(weight);
    let magnitude = w.abs();
    let target = if w < 0.0 {
        WEIGHT_NEGATIVE
    } else {
        WEIGHT_POSITIVE
    };
    let color = WEIGHT_NEUTRAL.lerp(target, magnitude);
    let width = MIN_STROKE_WIDTH + (MAX_STROKE_WIDTH - MIN_STROKE_WIDTH) * magnitude;
    (color, width)
}
