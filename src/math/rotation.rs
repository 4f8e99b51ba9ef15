use std::f64::consts::PI;

use nalgebra::Unit;

use super::{Rotation3, Vector3, TOLERANCE};
use crate::error::{FlatSurfError, Result};

/// Finds a rotation that maps the direction of `from` onto the direction of `to`.
///
/// Any rotation achieving this is valid; the result is the minimal one about
/// `from × to`. Antiparallel inputs get a half turn about an axis
/// perpendicular to `from`.
///
/// # Errors
///
/// Returns `DegenerateGeometry` if either vector is zero-length or not finite.
pub fn align_vectors(from: &Vector3, to: &Vector3) -> Result<Rotation3> {
    let from_len = from.norm();
    let to_len = to.norm();
    if !(from_len.is_finite() && to_len.is_finite()) || from_len < TOLERANCE || to_len < TOLERANCE
    {
        return Err(FlatSurfError::DegenerateGeometry(
            "cannot align a zero-length or undefined vector".into(),
        ));
    }
    let a = from / from_len;
    let b = to / to_len;

    if let Some(rot) = Rotation3::rotation_between(&a, &b) {
        return Ok(rot);
    }

    // Antiparallel: pick a reference not parallel to `a`
    let reference = if a.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let axis = Unit::new_normalize(a.cross(&reference));
    Ok(Rotation3::from_axis_angle(&axis, PI))
}
