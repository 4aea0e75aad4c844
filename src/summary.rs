use std::fmt::Write;

use crate::geometry::{PadInfo, PadInfo3d, PadType};
use crate::loader::ComputedInfo;

/// One-line human readable description of a computed record, e.g.
/// `conv2d 1x5x5x3 -> 1x5x5x3 pad SAME t1 b1 l1 r1`.
pub fn summarize(op_name: &str, info: &ComputedInfo) -> String {
    let mut line = format!(
        "{} {} -> {} pad ",
        op_name,
        format_shape(info.in_shape()),
        format_shape(info.out_shape())
    );
    match info {
        ComputedInfo::Conv2d(info) => line.push_str(&format_pad(&info.pad_info)),
        ComputedInfo::Conv3d(info) => line.push_str(&format_pad_3d(&info.pad_info)),
    }
    line
}

pub fn format_shape(shape: &[usize]) -> String {
    if shape.is_empty() {
        "scalar".to_string()
    } else {
        shape
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("x")
    }
}

fn pad_type_name(pad_type: PadType) -> &'static str {
    match pad_type {
        PadType::Same => "SAME",
        PadType::Valid => "VALID",
        PadType::Number => "NUMBER",
    }
}

fn format_pad(pad: &PadInfo) -> String {
    let mut text = String::from(pad_type_name(pad.pad_type));
    let _ = write!(
        text,
        " t{} b{} l{} r{}",
        pad.top, pad.bottom, pad.left, pad.right
    );
    text
}

fn format_pad_3d(pad: &PadInfo3d) -> String {
    let mut text = String::from(pad_type_name(pad.pad_type));
    let _ = write!(
        text,
        " f{} k{} t{} b{} l{} r{}",
        pad.front, pad.back, pad.top, pad.bottom, pad.left, pad.right
    );
    text
}
