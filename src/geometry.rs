use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Position of the channel axis in 4D/5D shape tuples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DataFormat {
    /// [batch, ...spatial, channels]
    #[default]
    ChannelsLast,
    /// [batch, channels, ...spatial]
    ChannelsFirst,
}

impl DataFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DataFormat::ChannelsLast => "channelsLast",
            DataFormat::ChannelsFirst => "channelsFirst",
        }
    }

    /// Convert a layout string such as `NHWC` or `NCDHW` into a data format.
    pub fn from_conv_data_format(value: &str) -> Result<Self, GeometryError> {
        match value {
            "NHWC" | "NDHWC" => Ok(DataFormat::ChannelsLast),
            "NCHW" | "NCDHW" => Ok(DataFormat::ChannelsFirst),
            _ => Err(GeometryError::InvalidDataFormat {
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for DataFormat {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "channelsLast" => Ok(DataFormat::ChannelsLast),
            "channelsFirst" => Ok(DataFormat::ChannelsFirst),
            _ => Err(GeometryError::InvalidDataFormat {
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DataFormat {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .or_else(|_| DataFormat::from_conv_data_format(&value))
    }
}

impl From<DataFormat> for &'static str {
    fn from(format: DataFormat) -> Self {
        format.as_str()
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reorder a shape into `[batch, ...spatial, channels]`.
pub fn to_canonical_order<const N: usize>(shape: [usize; N], format: DataFormat) -> [usize; N] {
    let mut canonical = shape;
    if format == DataFormat::ChannelsFirst && N > 2 {
        canonical[1..].rotate_left(1);
    }
    canonical
}

/// Inverse of [`to_canonical_order`].
pub fn from_canonical_order<const N: usize>(canonical: [usize; N], format: DataFormat) -> [usize; N] {
    let mut shape = canonical;
    if format == DataFormat::ChannelsFirst && N > 2 {
        shape[1..].rotate_right(1);
    }
    shape
}

/// Padding requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPad", into = "RawPad")]
pub enum PadSpec {
    Same,
    Valid,
    /// The same zero padding on every spatial edge
    Number(usize),
}

impl FromStr for PadSpec {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "same" => Ok(PadSpec::Same),
            "valid" => Ok(PadSpec::Valid),
            other => other
                .parse::<usize>()
                .map(PadSpec::Number)
                .map_err(|_| GeometryError::InvalidPad {
                    value: other.to_string(),
                }),
        }
    }
}

impl fmt::Display for PadSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadSpec::Same => f.write_str("same"),
            PadSpec::Valid => f.write_str("valid"),
            PadSpec::Number(pad) => write!(f, "{}", pad),
        }
    }
}

impl From<usize> for PadSpec {
    fn from(pad: usize) -> Self {
        PadSpec::Number(pad)
    }
}

/// Wire form of [`PadSpec`]: a keyword or a JSON number.
///
/// Non-negative integers land in `Unsigned`; only negative ones reach `Integer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPad {
    Unsigned(u64),
    Integer(i64),
    Float(f64),
    Keyword(String),
}

impl TryFrom<RawPad> for PadSpec {
    type Error = GeometryError;

    fn try_from(raw: RawPad) -> Result<Self, Self::Error> {
        match raw {
            RawPad::Unsigned(pad) => usize::try_from(pad)
                .map(PadSpec::Number)
                .map_err(|_| GeometryError::InvalidPad {
                    value: pad.to_string(),
                }),
            RawPad::Integer(pad) => usize::try_from(pad)
                .map(PadSpec::Number)
                .map_err(|_| GeometryError::InvalidPad {
                    value: pad.to_string(),
                }),
            RawPad::Float(pad) => Err(GeometryError::InvalidPad {
                value: pad.to_string(),
            }),
            RawPad::Keyword(keyword) => keyword.parse(),
        }
    }
}

impl From<PadSpec> for RawPad {
    fn from(pad: PadSpec) -> Self {
        match pad {
            // usize is at most 64 bits wide
            PadSpec::Number(pad) => RawPad::Unsigned(pad as u64),
            keyword => RawPad::Keyword(keyword.to_string()),
        }
    }
}

/// How a fractional output size is turned into an integer when padding is explicit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum RoundingMode {
    Floor,
    /// Halves round up
    Round,
    Ceil,
}

impl RoundingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RoundingMode::Floor => "floor",
            RoundingMode::Round => "round",
            RoundingMode::Ceil => "ceil",
        }
    }
}

impl FromStr for RoundingMode {
    type Err = GeometryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "floor" => Ok(RoundingMode::Floor),
            "round" => Ok(RoundingMode::Round),
            "ceil" => Ok(RoundingMode::Ceil),
            _ => Err(GeometryError::InvalidRoundingMode {
                value: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RoundingMode {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoundingMode> for &'static str {
    fn from(mode: RoundingMode) -> Self {
        mode.as_str()
    }
}

/// How a [`PadInfo`] was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PadType {
    Same,
    Valid,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadInfo {
    pub top: usize,
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
    #[serde(rename = "type")]
    pub pad_type: PadType,
}

impl PadInfo {
    pub fn uniform(pad: usize, pad_type: PadType) -> Self {
        Self {
            top: pad,
            left: pad,
            right: pad,
            bottom: pad,
            pad_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadInfo3d {
    pub top: usize,
    pub left: usize,
    pub right: usize,
    pub bottom: usize,
    pub front: usize,
    pub back: usize,
    #[serde(rename = "type")]
    pub pad_type: PadType,
}

/// Stride, dilation or window size given once for both spatial axes or per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param2d {
    Scalar(usize),
    /// [height, width]
    PerAxis([usize; 2]),
}

impl Param2d {
    pub fn normalize(self) -> [usize; 2] {
        match self {
            Param2d::Scalar(value) => [value; 2],
            Param2d::PerAxis(values) => values,
        }
    }
}

impl Default for Param2d {
    fn default() -> Self {
        Param2d::Scalar(1)
    }
}

impl From<usize> for Param2d {
    fn from(value: usize) -> Self {
        Param2d::Scalar(value)
    }
}

impl From<[usize; 2]> for Param2d {
    fn from(values: [usize; 2]) -> Self {
        Param2d::PerAxis(values)
    }
}

impl From<(usize, usize)> for Param2d {
    fn from((height, width): (usize, usize)) -> Self {
        Param2d::PerAxis([height, width])
    }
}

/// Three-axis counterpart of [`Param2d`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param3d {
    Scalar(usize),
    /// [depth, height, width]
    PerAxis([usize; 3]),
}

impl Param3d {
    pub fn normalize(self) -> [usize; 3] {
        match self {
            Param3d::Scalar(value) => [value; 3],
            Param3d::PerAxis(values) => values,
        }
    }
}

impl Default for Param3d {
    fn default() -> Self {
        Param3d::Scalar(1)
    }
}

impl From<usize> for Param3d {
    fn from(value: usize) -> Self {
        Param3d::Scalar(value)
    }
}

impl From<[usize; 3]> for Param3d {
    fn from(values: [usize; 3]) -> Self {
        Param3d::PerAxis(values)
    }
}

impl From<(usize, usize, usize)> for Param3d {
    fn from((depth, height, width): (usize, usize, usize)) -> Self {
        Param3d::PerAxis([depth, height, width])
    }
}

/// Geometry of a 2D convolution or pooling forward pass.
///
/// `in_shape` and `out_shape` follow `data_format`; `filter_shape` is always
/// `[filter_height, filter_width, in_channels, filter_channels]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conv2dInfo {
    pub batch_size: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub in_channels: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub out_channels: usize,
    pub data_format: DataFormat,
    pub stride_height: usize,
    pub stride_width: usize,
    pub dilation_height: usize,
    pub dilation_width: usize,
    pub filter_height: usize,
    pub filter_width: usize,
    pub effective_filter_height: usize,
    pub effective_filter_width: usize,
    pub pad_info: PadInfo,
    pub in_shape: [usize; 4],
    pub out_shape: [usize; 4],
    pub filter_shape: [usize; 4],
}

/// Geometry of a 3D convolution or pooling forward pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conv3dInfo {
    pub batch_size: usize,
    pub in_depth: usize,
    pub in_height: usize,
    pub in_width: usize,
    pub in_channels: usize,
    pub out_depth: usize,
    pub out_height: usize,
    pub out_width: usize,
    pub out_channels: usize,
    pub data_format: DataFormat,
    pub stride_depth: usize,
    pub stride_height: usize,
    pub stride_width: usize,
    pub dilation_depth: usize,
    pub dilation_height: usize,
    pub dilation_width: usize,
    pub filter_depth: usize,
    pub filter_height: usize,
    pub filter_width: usize,
    pub effective_filter_depth: usize,
    pub effective_filter_height: usize,
    pub effective_filter_width: usize,
    pub pad_info: PadInfo3d,
    pub in_shape: [usize; 5],
    pub out_shape: [usize; 5],
    pub filter_shape: [usize; 5],
}
