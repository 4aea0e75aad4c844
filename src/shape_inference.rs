use crate::debug_print;
use crate::error::GeometryError;
use crate::geometry::{
    Conv2dInfo, Conv3dInfo, DataFormat, PadSpec, Param2d, Param3d, RoundingMode,
    from_canonical_order, to_canonical_order,
};
use crate::padding::{effective_size, get_pad_and_out_info, get_pad_and_out_info_3d};
use crate::summary::format_shape;

/// Parameters for conv2d geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dOptions {
    pub strides: Param2d,
    pub dilations: Param2d,
    pub pad: PadSpec,
    /// Only consulted for explicit numeric padding
    pub rounding_mode: Option<RoundingMode>,
    pub depthwise: bool,
    pub data_format: DataFormat,
}

impl Default for Conv2dOptions {
    fn default() -> Self {
        Self {
            strides: Param2d::default(),
            dilations: Param2d::default(),
            pad: PadSpec::Valid,
            rounding_mode: None,
            depthwise: false,
            data_format: DataFormat::ChannelsLast,
        }
    }
}

/// Parameters for pool2d geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool2dOptions {
    pub strides: Param2d,
    pub dilations: Param2d,
    pub pad: PadSpec,
    pub rounding_mode: Option<RoundingMode>,
    pub data_format: DataFormat,
}

impl Default for Pool2dOptions {
    fn default() -> Self {
        Self {
            strides: Param2d::default(),
            dilations: Param2d::default(),
            pad: PadSpec::Valid,
            rounding_mode: None,
            data_format: DataFormat::ChannelsLast,
        }
    }
}

/// Parameters for conv3d geometry. 3D padding is `same` or `valid` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv3dOptions {
    pub strides: Param3d,
    pub dilations: Param3d,
    pub pad: PadSpec,
    pub depthwise: bool,
    pub data_format: DataFormat,
}

impl Default for Conv3dOptions {
    fn default() -> Self {
        Self {
            strides: Param3d::default(),
            dilations: Param3d::default(),
            pad: PadSpec::Valid,
            depthwise: false,
            data_format: DataFormat::ChannelsLast,
        }
    }
}

/// Parameters for pool3d geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool3dOptions {
    pub strides: Param3d,
    pub dilations: Param3d,
    pub pad: PadSpec,
    pub data_format: DataFormat,
}

impl Default for Pool3dOptions {
    fn default() -> Self {
        Self {
            strides: Param3d::default(),
            dilations: Param3d::default(),
            pad: PadSpec::Valid,
            data_format: DataFormat::ChannelsLast,
        }
    }
}

/// Compute the full forward-pass geometry of a 2D convolution.
///
/// `in_shape` is laid out according to `options.data_format`. `filter_shape`
/// is `[filter_height, filter_width, in_channels, filter_channels]`; its
/// input-channel entry is carried through but not checked against the input.
pub fn compute_conv2d_info(
    in_shape: &[usize],
    filter_shape: &[usize],
    options: &Conv2dOptions,
) -> Result<Conv2dInfo, GeometryError> {
    const OPERATION: &str = "conv2d";
    let in_shape = rank::<4>(OPERATION, "input shape", in_shape)?;
    let filter_shape = rank::<4>(OPERATION, "filter shape", filter_shape)?;

    // Extract dimensions based on layout
    let [batch_size, in_height, in_width, in_channels] =
        to_canonical_order(in_shape, options.data_format);
    let [filter_height, filter_width, _, filter_channels] = filter_shape;
    let [stride_height, stride_width] = options.strides.normalize();
    let [dilation_height, dilation_width] = options.dilations.normalize();

    // Compute effective filter size with dilation
    let effective_filter_height = dilated(OPERATION, "filter height", filter_height, dilation_height)?;
    let effective_filter_width = dilated(OPERATION, "filter width", filter_width, dilation_width)?;

    // Resolve padding and output spatial dimensions
    let (pad_info, [out_height, out_width]) = get_pad_and_out_info(
        options.pad,
        [in_height, in_width],
        [stride_height, stride_width],
        [effective_filter_height, effective_filter_width],
        options.rounding_mode,
    )?;

    let out_channels = output_channels(OPERATION, filter_channels, in_channels, options.depthwise)?;

    // Build output shape in the input layout
    let out_shape = from_canonical_order(
        [batch_size, out_height, out_width, out_channels],
        options.data_format,
    );

    debug_print!(
        "[conv2d] in {} filter {} pad {} -> out {} {:?}",
        format_shape(&in_shape),
        format_shape(&filter_shape),
        options.pad,
        format_shape(&out_shape),
        pad_info
    );

    Ok(Conv2dInfo {
        batch_size,
        in_height,
        in_width,
        in_channels,
        out_height,
        out_width,
        out_channels,
        data_format: options.data_format,
        stride_height,
        stride_width,
        dilation_height,
        dilation_width,
        filter_height,
        filter_width,
        effective_filter_height,
        effective_filter_width,
        pad_info,
        in_shape,
        out_shape,
        filter_shape,
    })
}

/// Compute the geometry of a 2D pooling window.
///
/// Pooling keeps the channel count, so the window is expressed as a filter
/// whose input and output channels both equal the input channel count.
pub fn compute_pool2d_info(
    in_shape: &[usize],
    filter_size: Param2d,
    options: &Pool2dOptions,
) -> Result<Conv2dInfo, GeometryError> {
    let shape = rank::<4>("pool2d", "input shape", in_shape)?;
    let [.., channels] = to_canonical_order(shape, options.data_format);
    let [filter_height, filter_width] = filter_size.normalize();

    let conv_options = Conv2dOptions {
        strides: options.strides,
        dilations: options.dilations,
        pad: options.pad,
        rounding_mode: options.rounding_mode,
        depthwise: false,
        data_format: options.data_format,
    };
    compute_conv2d_info(
        &shape,
        &[filter_height, filter_width, channels, channels],
        &conv_options,
    )
}

/// Compute the geometry of a 2D morphological dilation.
///
/// Input is `[batch, height, width, depth]` and the filter `[height, width, depth]`.
pub fn compute_dilation2d_info(
    in_shape: &[usize],
    filter_shape: &[usize],
    strides: Param2d,
    pad: PadSpec,
    dilations: Param2d,
) -> Result<Conv2dInfo, GeometryError> {
    let shape = rank::<4>("dilation2d", "input shape", in_shape)?;
    let [filter_height, filter_width, depth] = rank::<3>("dilation2d", "filter shape", filter_shape)?;
    let in_channels = shape[3];

    let options = Conv2dOptions {
        strides,
        dilations,
        pad,
        rounding_mode: None,
        depthwise: false,
        data_format: DataFormat::ChannelsLast,
    };
    compute_conv2d_info(
        &shape,
        &[filter_height, filter_width, depth, in_channels],
        &options,
    )
}

/// Compute the full forward-pass geometry of a 3D convolution.
///
/// `filter_shape` is `[filter_depth, filter_height, filter_width, in_channels, filter_channels]`.
pub fn compute_conv3d_info(
    in_shape: &[usize],
    filter_shape: &[usize],
    options: &Conv3dOptions,
) -> Result<Conv3dInfo, GeometryError> {
    const OPERATION: &str = "conv3d";
    let in_shape = rank::<5>(OPERATION, "input shape", in_shape)?;
    let filter_shape = rank::<5>(OPERATION, "filter shape", filter_shape)?;

    // Extract dimensions based on layout
    let [batch_size, in_depth, in_height, in_width, in_channels] =
        to_canonical_order(in_shape, options.data_format);
    let [filter_depth, filter_height, filter_width, _, filter_channels] = filter_shape;
    let [stride_depth, stride_height, stride_width] = options.strides.normalize();
    let [dilation_depth, dilation_height, dilation_width] = options.dilations.normalize();

    // Compute effective filter size with dilation
    let effective_filter_depth = dilated(OPERATION, "filter depth", filter_depth, dilation_depth)?;
    let effective_filter_height = dilated(OPERATION, "filter height", filter_height, dilation_height)?;
    let effective_filter_width = dilated(OPERATION, "filter width", filter_width, dilation_width)?;

    // Resolve padding and output spatial dimensions
    let (pad_info, [out_depth, out_height, out_width]) = get_pad_and_out_info_3d(
        options.pad,
        [in_depth, in_height, in_width],
        [stride_depth, stride_height, stride_width],
        [
            effective_filter_depth,
            effective_filter_height,
            effective_filter_width,
        ],
    )?;

    let out_channels = output_channels(OPERATION, filter_channels, in_channels, options.depthwise)?;

    // Build output shape in the input layout
    let out_shape = from_canonical_order(
        [batch_size, out_depth, out_height, out_width, out_channels],
        options.data_format,
    );

    debug_print!(
        "[conv3d] in {} filter {} pad {} -> out {} {:?}",
        format_shape(&in_shape),
        format_shape(&filter_shape),
        options.pad,
        format_shape(&out_shape),
        pad_info
    );

    Ok(Conv3dInfo {
        batch_size,
        in_depth,
        in_height,
        in_width,
        in_channels,
        out_depth,
        out_height,
        out_width,
        out_channels,
        data_format: options.data_format,
        stride_depth,
        stride_height,
        stride_width,
        dilation_depth,
        dilation_height,
        dilation_width,
        filter_depth,
        filter_height,
        filter_width,
        effective_filter_depth,
        effective_filter_height,
        effective_filter_width,
        pad_info,
        in_shape,
        out_shape,
        filter_shape,
    })
}

/// Compute the geometry of a 3D pooling window
pub fn compute_pool3d_info(
    in_shape: &[usize],
    filter_size: Param3d,
    options: &Pool3dOptions,
) -> Result<Conv3dInfo, GeometryError> {
    let shape = rank::<5>("pool3d", "input shape", in_shape)?;
    let [.., channels] = to_canonical_order(shape, options.data_format);
    let [filter_depth, filter_height, filter_width] = filter_size.normalize();

    let conv_options = Conv3dOptions {
        strides: options.strides,
        dilations: options.dilations,
        pad: options.pad,
        depthwise: false,
        data_format: options.data_format,
    };
    compute_conv3d_info(
        &shape,
        &[filter_depth, filter_height, filter_width, channels, channels],
        &conv_options,
    )
}

/// True when both axes of `param` are 1.
///
/// Bare integers need a `usize` suffix to pick the conversion:
///
/// ```
/// use rust_conv_geometry::{Param2d, tuple_values_are_one};
///
/// assert!(tuple_values_are_one(1usize));
/// assert!(tuple_values_are_one(Param2d::PerAxis([1, 1])));
/// assert!(!tuple_values_are_one([1usize, 2]));
/// ```
pub fn tuple_values_are_one(param: impl Into<Param2d>) -> bool {
    let [height, width] = param.into().normalize();
    height == 1 && width == 1
}

/// True when striding or dilation has no effect along either axis, so a
/// simpler kernel can be used.
///
/// ```
/// use rust_conv_geometry::either_strides_or_dilations_are_one;
///
/// assert!(either_strides_or_dilations_are_one(2usize, 1usize));
/// assert!(!either_strides_or_dilations_are_one([1usize, 2], 3usize));
/// ```
pub fn either_strides_or_dilations_are_one(
    strides: impl Into<Param2d>,
    dilations: impl Into<Param2d>,
) -> bool {
    tuple_values_are_one(strides) || tuple_values_are_one(dilations)
}

fn dilated(
    operation: &'static str,
    argument: &'static str,
    filter_size: usize,
    dilation: usize,
) -> Result<usize, GeometryError> {
    effective_size(filter_size, dilation)
        .ok_or_else(|| GeometryError::size_overflow(operation, argument))
}

/// Depthwise convolution yields `filter_channels` outputs per input channel.
fn output_channels(
    operation: &'static str,
    filter_channels: usize,
    in_channels: usize,
    depthwise: bool,
) -> Result<usize, GeometryError> {
    if !depthwise {
        return Ok(filter_channels);
    }
    filter_channels
        .checked_mul(in_channels)
        .ok_or_else(|| GeometryError::size_overflow(operation, "output channels"))
}

fn rank<const N: usize>(
    operation: &'static str,
    argument: &'static str,
    shape: &[usize],
) -> Result<[usize; N], GeometryError> {
    shape
        .try_into()
        .map_err(|_| GeometryError::shape_rank(operation, argument, N, shape))
}
