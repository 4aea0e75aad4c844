//! Effective filter sizes, padding resolution and output sizes for
//! sliding-window operations.
//!
//! Signed intermediate values are computed in `i128`, which holds any
//! combination of a few `usize` terms exactly. Rounding uses exact integer
//! division, and results that do not fit back into `usize` are reported as
//! [`GeometryError::SizeOverflow`].

use crate::error::GeometryError;
use crate::geometry::{PadInfo, PadInfo3d, PadSpec, PadType, RoundingMode};

const AXES_2D: [&str; 2] = ["height", "width"];
const AXES_3D: [&str; 3] = ["depth", "height", "width"];

/// Filter footprint once `dilation - 1` gaps are inserted between taps.
///
/// A dilation of 0 or 1 leaves the filter unchanged. Returns `None` when the
/// footprint does not fit in `usize`.
pub fn effective_size(filter_size: usize, dilation: usize) -> Option<usize> {
    if dilation <= 1 {
        return Some(filter_size);
    }
    filter_size
        .saturating_sub(1)
        .checked_mul(dilation - 1)?
        .checked_add(filter_size)
}

/// Returns true when every value is strictly positive.
pub fn strides_or_dilations_are_positive(values: &[usize]) -> bool {
    values.iter().all(|&value| value > 0)
}

/// Zero padding that keeps the output size equal to the input size for
/// stride 1.
pub fn compute_default_pad(
    input_size: usize,
    field_size: usize,
    stride: usize,
    dilation: usize,
) -> Result<usize, GeometryError> {
    const OPERATION: &str = "computeDefaultPad";
    ensure_positive_strides(OPERATION, &[stride])?;
    let effective = effective_size(field_size, dilation)
        .ok_or_else(|| GeometryError::size_overflow(OPERATION, "effective field size"))?;
    // (input * (stride - 1) - stride + effective) / 2, floored at zero
    let numerator = wide(input_size) * (wide(stride) - 1) - wide(stride) + wide(effective);
    narrow(OPERATION, "default pad", numerator.div_euclid(2).max(0))
}

/// Output `[rows, cols]` for explicit zero padding.
///
/// `zero_pad` defaults to [`compute_default_pad`] along the row axis.
pub fn compute_output_shape_2d(
    in_shape: [usize; 2],
    field_size: [usize; 2],
    stride: [usize; 2],
    zero_pad: Option<usize>,
    rounding_mode: Option<RoundingMode>,
) -> Result<[usize; 2], GeometryError> {
    ensure_positive_strides("computeOutputShape2D", &stride)?;
    let zero_pad = match zero_pad {
        Some(pad) => pad,
        None => compute_default_pad(in_shape[0], field_size[0], stride[0], 1)?,
    };
    let mut out = [0; 2];
    for axis in 0..2 {
        out[axis] = explicit_output_size(
            AXES_2D[axis],
            in_shape[axis],
            field_size[axis],
            stride[axis],
            zero_pad,
            rounding_mode,
        )?;
    }
    Ok(out)
}

/// Resolve 2D padding and the output `[height, width]`.
///
/// `filter` must already be the effective (dilated) filter size.
pub fn get_pad_and_out_info(
    pad: PadSpec,
    in_size: [usize; 2],
    strides: [usize; 2],
    filter: [usize; 2],
    rounding_mode: Option<RoundingMode>,
) -> Result<(PadInfo, [usize; 2]), GeometryError> {
    ensure_positive_strides("pad2d", &strides)?;
    match pad {
        PadSpec::Number(pad) => {
            let pad_type = if pad == 0 {
                PadType::Valid
            } else {
                PadType::Number
            };
            let out = compute_output_shape_2d(in_size, filter, strides, Some(pad), rounding_mode)?;
            Ok((PadInfo::uniform(pad, pad_type), out))
        }
        PadSpec::Same => {
            let mut out = [0; 2];
            let mut lower = [0; 2];
            let mut upper = [0; 2];
            for axis in 0..2 {
                let (size, before, after) =
                    same_padding(AXES_2D[axis], in_size[axis], strides[axis], filter[axis])?;
                out[axis] = size;
                lower[axis] = before;
                upper[axis] = after;
            }
            let pad_info = PadInfo {
                top: lower[0],
                left: lower[1],
                right: upper[1],
                bottom: upper[0],
                pad_type: PadType::Same,
            };
            Ok((pad_info, out))
        }
        PadSpec::Valid => {
            let mut out = [0; 2];
            for axis in 0..2 {
                out[axis] = valid_output_size(AXES_2D[axis], in_size[axis], strides[axis], filter[axis])?;
            }
            Ok((PadInfo::uniform(0, PadType::Valid), out))
        }
    }
}

/// Resolve 3D padding and the output `[depth, height, width]`.
///
/// Only `same` and `valid` are accepted; explicit zero padding is rejected.
pub fn get_pad_and_out_info_3d(
    pad: PadSpec,
    in_size: [usize; 3],
    strides: [usize; 3],
    filter: [usize; 3],
) -> Result<(PadInfo3d, [usize; 3]), GeometryError> {
    ensure_positive_strides("pad3d", &strides)?;
    match pad {
        PadSpec::Same => {
            let mut out = [0; 3];
            let mut lower = [0; 3];
            let mut upper = [0; 3];
            for axis in 0..3 {
                let (size, before, after) =
                    same_padding(AXES_3D[axis], in_size[axis], strides[axis], filter[axis])?;
                out[axis] = size;
                lower[axis] = before;
                upper[axis] = after;
            }
            let pad_info = PadInfo3d {
                top: lower[1],
                left: lower[2],
                right: upper[2],
                bottom: upper[1],
                front: lower[0],
                back: upper[0],
                pad_type: PadType::Same,
            };
            Ok((pad_info, out))
        }
        PadSpec::Valid => {
            let mut out = [0; 3];
            for axis in 0..3 {
                out[axis] = valid_output_size(AXES_3D[axis], in_size[axis], strides[axis], filter[axis])?;
            }
            let pad_info = PadInfo3d {
                top: 0,
                left: 0,
                right: 0,
                bottom: 0,
                front: 0,
                back: 0,
                pad_type: PadType::Valid,
            };
            Ok((pad_info, out))
        }
        PadSpec::Number(_) => Err(GeometryError::UnsupportedPad3D {
            pad: pad.to_string(),
        }),
    }
}

fn ensure_positive_strides(operation: &'static str, strides: &[usize]) -> Result<(), GeometryError> {
    if strides_or_dilations_are_positive(strides) {
        Ok(())
    } else {
        Err(GeometryError::NonPositiveParameter {
            operation,
            argument: "strides",
            values: strides.to_vec(),
        })
    }
}

/// Lossless: `usize` is at most 64 bits wide.
#[inline]
fn wide(value: usize) -> i128 {
    value as i128
}

fn narrow(operation: &'static str, argument: &'static str, value: i128) -> Result<usize, GeometryError> {
    usize::try_from(value).map_err(|_| GeometryError::size_overflow(operation, argument))
}

/// Output size plus (lower, upper) padding; the odd pixel goes to the upper edge.
fn same_padding(
    dimension: &'static str,
    input_size: usize,
    stride: usize,
    filter_size: usize,
) -> Result<(usize, usize, usize), GeometryError> {
    let out = input_size.div_ceil(stride);
    let needed = (wide(out) - 1) * wide(stride) + wide(filter_size) - wide(input_size);
    let total = narrow("same padding", dimension, needed.max(0))?;
    let before = total / 2;
    Ok((out, before, total - before))
}

fn valid_output_size(
    dimension: &'static str,
    input_size: usize,
    stride: usize,
    filter_size: usize,
) -> Result<usize, GeometryError> {
    let numerator = wide(input_size) - wide(filter_size) + 1;
    output_size(dimension, round_quotient(numerator, wide(stride), RoundingMode::Ceil))
}

/// `(input - filter + 2 * pad) / stride + 1`, which must be an exact integer
/// unless a rounding mode is given.
fn explicit_output_size(
    dimension: &'static str,
    input_size: usize,
    filter_size: usize,
    stride: usize,
    pad: usize,
    rounding_mode: Option<RoundingMode>,
) -> Result<usize, GeometryError> {
    let stride = wide(stride);
    let numerator = wide(input_size) - wide(filter_size) + 2 * wide(pad) + stride;
    let size = match rounding_mode {
        Some(mode) => round_quotient(numerator, stride, mode),
        None if numerator.rem_euclid(stride) == 0 => numerator / stride,
        None => {
            return Err(GeometryError::NonIntegerOutputSize {
                dimension,
                value: numerator as f64 / stride as f64,
            });
        }
    };
    output_size(dimension, size)
}

/// `numerator / denominator` rounded with `mode`; `denominator` must be positive.
fn round_quotient(numerator: i128, denominator: i128, mode: RoundingMode) -> i128 {
    match mode {
        RoundingMode::Floor => numerator.div_euclid(denominator),
        RoundingMode::Ceil => -(-numerator).div_euclid(denominator),
        RoundingMode::Round => (2 * numerator + denominator).div_euclid(2 * denominator),
    }
}

fn output_size(dimension: &'static str, size: i128) -> Result<usize, GeometryError> {
    if size < 0 {
        return Err(GeometryError::NegativeOutputSize {
            dimension,
            value: size,
        });
    }
    narrow("output size", dimension, size)
}
