pub mod debug;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod padding;
pub mod shape_inference;
pub mod summary;

pub use error::GeometryError;
pub use geometry::{
    Conv2dInfo, Conv3dInfo, DataFormat, PadInfo, PadInfo3d, PadSpec, PadType, Param2d, Param3d,
    RoundingMode, from_canonical_order, to_canonical_order,
};
pub use loader::{ComputedInfo, ShapeRequest, load_requests_from_path, parse_requests};
pub use padding::{
    compute_default_pad, compute_output_shape_2d, effective_size, get_pad_and_out_info,
    get_pad_and_out_info_3d, strides_or_dilations_are_positive,
};
pub use shape_inference::{
    Conv2dOptions, Conv3dOptions, Pool2dOptions, Pool3dOptions, compute_conv2d_info,
    compute_conv3d_info, compute_dilation2d_info, compute_pool2d_info, compute_pool3d_info,
    either_strides_or_dilations_are_one, tuple_values_are_one,
};
pub use summary::{format_shape, summarize};
