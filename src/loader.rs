use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::{Conv2dInfo, Conv3dInfo, DataFormat, PadSpec, Param2d, Param3d, RoundingMode};
use crate::shape_inference::{
    Conv2dOptions, Conv3dOptions, Pool2dOptions, Pool3dOptions, compute_conv2d_info,
    compute_conv3d_info, compute_dilation2d_info, compute_pool2d_info, compute_pool3d_info,
};

/// One geometry computation read from a request file, tagged by `"op"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ShapeRequest {
    Conv2d(Conv2dRequest),
    Pool2d(Pool2dRequest),
    Dilation2d(Dilation2dRequest),
    Conv3d(Conv3dRequest),
    Pool3d(Pool3dRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conv2dRequest {
    pub in_shape: Vec<usize>,
    pub filter_shape: Vec<usize>,
    #[serde(default)]
    pub strides: Param2d,
    #[serde(default)]
    pub dilations: Param2d,
    pub pad: PadSpec,
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
    #[serde(default)]
    pub depthwise: bool,
    #[serde(default)]
    pub data_format: DataFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool2dRequest {
    pub in_shape: Vec<usize>,
    pub filter_size: Param2d,
    #[serde(default)]
    pub strides: Param2d,
    #[serde(default)]
    pub dilations: Param2d,
    pub pad: PadSpec,
    #[serde(default)]
    pub rounding_mode: Option<RoundingMode>,
    #[serde(default)]
    pub data_format: DataFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dilation2dRequest {
    pub in_shape: Vec<usize>,
    pub filter_shape: Vec<usize>,
    #[serde(default)]
    pub strides: Param2d,
    #[serde(default)]
    pub dilations: Param2d,
    pub pad: PadSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conv3dRequest {
    pub in_shape: Vec<usize>,
    pub filter_shape: Vec<usize>,
    #[serde(default)]
    pub strides: Param3d,
    #[serde(default)]
    pub dilations: Param3d,
    pub pad: PadSpec,
    #[serde(default)]
    pub depthwise: bool,
    #[serde(default)]
    pub data_format: DataFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool3dRequest {
    pub in_shape: Vec<usize>,
    pub filter_size: Param3d,
    #[serde(default)]
    pub strides: Param3d,
    #[serde(default)]
    pub dilations: Param3d,
    pub pad: PadSpec,
    #[serde(default)]
    pub data_format: DataFormat,
}

/// Result of a [`ShapeRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ComputedInfo {
    Conv2d(Conv2dInfo),
    Conv3d(Conv3dInfo),
}

impl ComputedInfo {
    pub fn in_shape(&self) -> &[usize] {
        match self {
            ComputedInfo::Conv2d(info) => &info.in_shape,
            ComputedInfo::Conv3d(info) => &info.in_shape,
        }
    }

    pub fn out_shape(&self) -> &[usize] {
        match self {
            ComputedInfo::Conv2d(info) => &info.out_shape,
            ComputedInfo::Conv3d(info) => &info.out_shape,
        }
    }
}

impl ShapeRequest {
    pub fn op_name(&self) -> &'static str {
        match self {
            ShapeRequest::Conv2d(_) => "conv2d",
            ShapeRequest::Pool2d(_) => "pool2d",
            ShapeRequest::Dilation2d(_) => "dilation2d",
            ShapeRequest::Conv3d(_) => "conv3d",
            ShapeRequest::Pool3d(_) => "pool3d",
        }
    }

    pub fn compute(&self) -> Result<ComputedInfo, GeometryError> {
        match self {
            ShapeRequest::Conv2d(request) => {
                let options = Conv2dOptions {
                    strides: request.strides,
                    dilations: request.dilations,
                    pad: request.pad,
                    rounding_mode: request.rounding_mode,
                    depthwise: request.depthwise,
                    data_format: request.data_format,
                };
                compute_conv2d_info(&request.in_shape, &request.filter_shape, &options)
                    .map(ComputedInfo::Conv2d)
            }
            ShapeRequest::Pool2d(request) => {
                let options = Pool2dOptions {
                    strides: request.strides,
                    dilations: request.dilations,
                    pad: request.pad,
                    rounding_mode: request.rounding_mode,
                    data_format: request.data_format,
                };
                compute_pool2d_info(&request.in_shape, request.filter_size, &options)
                    .map(ComputedInfo::Conv2d)
            }
            ShapeRequest::Dilation2d(request) => compute_dilation2d_info(
                &request.in_shape,
                &request.filter_shape,
                request.strides,
                request.pad,
                request.dilations,
            )
            .map(ComputedInfo::Conv2d),
            ShapeRequest::Conv3d(request) => {
                let options = Conv3dOptions {
                    strides: request.strides,
                    dilations: request.dilations,
                    pad: request.pad,
                    depthwise: request.depthwise,
                    data_format: request.data_format,
                };
                compute_conv3d_info(&request.in_shape, &request.filter_shape, &options)
                    .map(ComputedInfo::Conv3d)
            }
            ShapeRequest::Pool3d(request) => {
                let options = Pool3dOptions {
                    strides: request.strides,
                    dilations: request.dilations,
                    pad: request.pad,
                    data_format: request.data_format,
                };
                compute_pool3d_info(&request.in_shape, request.filter_size, &options)
                    .map(ComputedInfo::Conv3d)
            }
        }
    }
}

/// Parse requests from JSON holding either one request object or an array of them
pub fn parse_requests(json: &str) -> Result<Vec<ShapeRequest>, GeometryError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let requests = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(requests)
}

/// Load requests from a `.json` file
pub fn load_requests_from_path(path: impl AsRef<Path>) -> Result<Vec<ShapeRequest>, GeometryError> {
    let path_ref = path.as_ref();
    if path_ref.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(GeometryError::UnsupportedExtension {
            path: path_ref.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path_ref).map_err(|err| GeometryError::io(path_ref, err))?;
    parse_requests(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PadType;

    #[test]
    fn test_parse_single_request_with_defaults() {
        let requests = parse_requests(
            r#"{"op": "conv2d", "inShape": [1, 5, 5, 3], "filterShape": [3, 3, 3, 3], "pad": "same"}"#,
        )
        .unwrap();
        assert_eq!(requests.len(), 1);
        let ShapeRequest::Conv2d(request) = &requests[0] else {
            panic!("expected conv2d request, got {:?}", requests[0]);
        };
        assert_eq!(request.strides, Param2d::Scalar(1));
        assert_eq!(request.data_format, DataFormat::ChannelsLast);
        assert!(!request.depthwise);
        assert_eq!(request.rounding_mode, None);

        let ComputedInfo::Conv2d(info) = requests[0].compute().unwrap() else {
            panic!("expected 2D info");
        };
        assert_eq!((info.out_height, info.out_width), (5, 5));
        assert_eq!(info.pad_info.pad_type, PadType::Same);
    }

    #[test]
    fn test_parse_request_array() {
        let json = r#"[
            {"op": "pool2d", "inShape": [1, 64, 8, 8], "filterSize": [2, 2], "strides": 2,
             "pad": 0, "dataFormat": "channelsFirst"},
            {"op": "conv3d", "inShape": [1, 4, 4, 4, 2], "filterShape": [3, 3, 3, 2, 3],
             "pad": "same", "depthwise": true},
            {"op": "pool3d", "inShape": [1, 8, 8, 8, 5], "filterSize": 2, "strides": 2, "pad": "valid"},
            {"op": "dilation2d", "inShape": [1, 8, 8, 3], "filterShape": [3, 3, 3],
             "dilations": 2, "pad": "valid"},
            {"op": "conv2d", "inShape": [1, 10, 10, 1], "filterShape": [3, 3, 1, 1],
             "strides": 2, "pad": 1, "roundingMode": "ceil", "dataFormat": "NHWC"}
        ]"#;
        let requests = parse_requests(json).unwrap();
        let names: Vec<_> = requests.iter().map(ShapeRequest::op_name).collect();
        assert_eq!(names, ["pool2d", "conv3d", "pool3d", "dilation2d", "conv2d"]);

        let outputs: Vec<Vec<usize>> = requests
            .iter()
            .map(|request| request.compute().unwrap().out_shape().to_vec())
            .collect();
        assert_eq!(outputs[0], vec![1, 64, 4, 4]);
        assert_eq!(outputs[1], vec![1, 4, 4, 4, 6]);
        assert_eq!(outputs[2], vec![1, 4, 4, 4, 5]);
        assert_eq!(outputs[3], vec![1, 4, 4, 3]);
        assert_eq!(outputs[4], vec![1, 6, 6, 1]);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let bad_pad = r#"{"op": "conv2d", "inShape": [1, 5, 5, 3], "filterShape": [3, 3, 3, 3], "pad": "full"}"#;
        let err = parse_requests(bad_pad).unwrap_err();
        assert!(err.to_string().contains("full"));

        let bad_format = r#"{"op": "conv2d", "inShape": [1, 5, 5, 3], "filterShape": [3, 3, 3, 3],
            "pad": "same", "dataFormat": "channelsMiddle"}"#;
        let err = parse_requests(bad_format).unwrap_err();
        assert!(err.to_string().contains("channelsMiddle"));

        let bad_rounding = r#"{"op": "conv2d", "inShape": [1, 5, 5, 3], "filterShape": [3, 3, 3, 3],
            "pad": 1, "roundingMode": "truncate"}"#;
        let err = parse_requests(bad_rounding).unwrap_err();
        assert!(err.to_string().contains("truncate"));

        assert!(parse_requests(r#"{"op": "conv1d", "pad": "same"}"#).is_err());
    }

    #[test]
    fn test_compute_surfaces_geometry_errors() {
        let requests = parse_requests(
            r#"{"op": "conv3d", "inShape": [1, 4, 4, 4, 2], "filterShape": [3, 3, 3, 2, 3], "pad": 1}"#,
        )
        .unwrap();
        assert!(matches!(
            requests[0].compute(),
            Err(GeometryError::UnsupportedPad3D { .. })
        ));
    }

    #[test]
    fn test_huge_pad_reports_overflow() {
        let requests = parse_requests(
            r#"{"op": "conv2d", "inShape": [1, 10, 10, 1], "filterShape": [3, 3, 1, 1], "pad": 9223372036854775807}"#,
        )
        .unwrap();
        assert!(matches!(
            requests[0].compute(),
            Err(GeometryError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn test_computed_info_serializes_camel_case() {
        let requests = parse_requests(
            r#"{"op": "conv2d", "inShape": [1, 5, 5, 3], "filterShape": [3, 3, 3, 3], "pad": "valid"}"#,
        )
        .unwrap();
        let info = requests[0].compute().unwrap();
        assert_eq!(info.in_shape(), &[1, 5, 5, 3]);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["outHeight"], 3);
        assert_eq!(json["dataFormat"], "channelsLast");
        assert_eq!(json["padInfo"]["type"], "VALID");
        assert_eq!(json["effectiveFilterWidth"], 3);
    }

    #[test]
    fn test_load_requests_from_path() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("conv_geometry_requests_{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"op": "pool2d", "inShape": [1, 4, 4, 1], "filterSize": 2, "strides": 2, "pad": "valid"}"#,
        )
        .unwrap();
        let requests = load_requests_from_path(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].compute().unwrap().out_shape(), &[1, 2, 2, 1]);

        assert!(matches!(
            load_requests_from_path(dir.join("requests.txt")),
            Err(GeometryError::UnsupportedExtension { .. })
        ));
        assert!(matches!(
            load_requests_from_path(dir.join("conv_geometry_missing_requests.json")),
            Err(GeometryError::Io { .. })
        ));
    }
}
