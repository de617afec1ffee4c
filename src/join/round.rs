//! Fixed-precision rounding for scores and coordinates.
//!
//! Values are scaled by 10^places and passed to `f64::round`, which sends
//! exact binary ties away from zero. Decimal ties such as `1.005` are usually
//! not exact in binary and round to whichever side the stored value lies on.

use crate::models::Coordinates;

/// Round `value` to `places` decimal places via `f64::round` on the scaled value.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round every number in a coordinate structure of any depth.
pub fn round_coordinates(coords: Coordinates, places: u32) -> Coordinates {
    match coords {
        Coordinates::Position(position) => {
            Coordinates::Position(position.into_iter().map(|v| round_to(v, places)).collect())
        }
        Coordinates::Nested(children) => Coordinates::Nested(
            children
                .into_iter()
                .map(|c| round_coordinates(c, places))
                .collect(),
        ),
    }
}
