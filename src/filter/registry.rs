// SPDX-License-Identifier: GPL-3.0-only

//! The static filter-type metadata table (spec.md §4.6), grounded on
//! `KNOWN_FILTER_TYPES` (`filter.cpp`): for each filter kind, its permanent
//! UUID, display name, category, and parameter schema.

/// The category a filter type is grouped under, for GUI ordering purposes
/// (`filter_category_e`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCategory {
    Reduce,
    Enhance,
    Distort,
    Meta,
}

/// The set of filter types this crate implements (`filter_type_enum_e`,
/// minus the GUI-only `input_gate`/`output_gate` pseudo-types, which are
/// modeled directly on [`super::chain::FilterChain`] instead). `delta_tiles`
/// from the original enum is intentionally not carried over — see
/// DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Blur,
    Sharpen,
    UnsharpMask,
    Median,
    DenoiseTemporal,
    DenoiseNonlocalMeans,
    Decimate,
    Crop,
    Flip,
    Rotate,
    Kernel3x3,
    DeltaHistogram,
    UniqueCount,
}

/// All filter kinds, in the original's declaration order.
pub const ALL_KINDS: [FilterKind; 13] = [
    FilterKind::Blur,
    FilterKind::DeltaHistogram,
    FilterKind::UniqueCount,
    FilterKind::UnsharpMask,
    FilterKind::Decimate,
    FilterKind::DenoiseTemporal,
    FilterKind::DenoiseNonlocalMeans,
    FilterKind::Sharpen,
    FilterKind::Median,
    FilterKind::Crop,
    FilterKind::Flip,
    FilterKind::Rotate,
    FilterKind::Kernel3x3,
];

/// A single parameter's id, default, and valid range. Values are carried as
/// `f64` in the public API (spec.md §3, "Parameter storage: ... types are
/// doubles"); the filter function that reads a parameter narrows it to
/// whatever representation it actually needs (pixel counts, signed
/// coefficients, mode selectors).
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    pub id: u32,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

const fn p(id: u32, default: f64, min: f64, max: f64) -> ParameterSpec {
    ParameterSpec { id, default, min, max }
}

/// Parameter id constants, grouped by the filter kind they belong to.
/// Ids are only unique within a single filter kind's schema.
pub mod param {
    pub const BLUR_RADIUS_TENTHS: u32 = 0;
    pub const BLUR_KIND: u32 = 1; // 0 = box, 1 = gaussian

    pub const UNSHARP_RADIUS_TENTHS: u32 = 0;
    pub const UNSHARP_STRENGTH_PERCENT: u32 = 1;

    pub const MEDIAN_RADIUS: u32 = 0;

    pub const DENOISE_TEMPORAL_THRESHOLD: u32 = 0;

    pub const NLM_LUMINANCE_STRENGTH: u32 = 0;
    pub const NLM_COLOR_STRENGTH: u32 = 1;
    pub const NLM_TEMPLATE_RADIUS: u32 = 2;
    pub const NLM_SEARCH_RADIUS: u32 = 3;

    pub const DECIMATE_FACTOR: u32 = 0;
    pub const DECIMATE_MODE: u32 = 1; // 0 = nearest, 1 = averaged

    pub const CROP_X: u32 = 0;
    pub const CROP_Y: u32 = 1;
    pub const CROP_W: u32 = 2;
    pub const CROP_H: u32 = 3;
    pub const CROP_SCALE_MODE: u32 = 4; // 0 = Linear, 1 = Nearest, 2 = NoScale

    pub const FLIP_AXIS: u32 = 0; // 0 = Vertical, 1 = Horizontal, 2 = Both

    pub const ROTATE_ANGLE_TENTHS_DEGREE: u32 = 0;
    pub const ROTATE_SCALE_HUNDREDTHS: u32 = 1;

    /// Nine signed kernel coefficients, row-major: ids 0..9 map to
    /// `[c0 c1 c2; c3 c4 c5; c6 c7 c8]`.
    pub const KERNEL_COEFF_BASE: u32 = 0;

    pub const DELTA_HISTOGRAM_BAND_HEIGHT: u32 = 0;

    pub const UNIQUE_COUNT_THRESHOLD: u32 = 0;
    pub const UNIQUE_COUNT_CORNER: u32 = 1; // 0=TopLeft,1=TopRight,2=BottomLeft,3=BottomRight
}

static BLUR_PARAMS: &[ParameterSpec] = &[p(param::BLUR_RADIUS_TENTHS, 10.0, 0.0, 500.0), p(param::BLUR_KIND, 0.0, 0.0, 1.0)];
static SHARPEN_PARAMS: &[ParameterSpec] = &[];
static UNSHARP_PARAMS: &[ParameterSpec] =
    &[p(param::UNSHARP_RADIUS_TENTHS, 10.0, 0.0, 500.0), p(param::UNSHARP_STRENGTH_PERCENT, 50.0, 0.0, 400.0)];
static MEDIAN_PARAMS: &[ParameterSpec] = &[p(param::MEDIAN_RADIUS, 1.0, 0.0, 8.0)];
static DENOISE_TEMPORAL_PARAMS: &[ParameterSpec] = &[p(param::DENOISE_TEMPORAL_THRESHOLD, 10.0, 0.0, 255.0)];
static NLM_PARAMS: &[ParameterSpec] = &[
    p(param::NLM_LUMINANCE_STRENGTH, 10.0, 0.0, 100.0),
    p(param::NLM_COLOR_STRENGTH, 10.0, 0.0, 100.0),
    p(param::NLM_TEMPLATE_RADIUS, 1.0, 0.0, 4.0),
    p(param::NLM_SEARCH_RADIUS, 3.0, 0.0, 10.0),
];
static DECIMATE_PARAMS: &[ParameterSpec] = &[p(param::DECIMATE_FACTOR, 2.0, 2.0, 16.0), p(param::DECIMATE_MODE, 0.0, 0.0, 1.0)];
static CROP_PARAMS: &[ParameterSpec] = &[
    p(param::CROP_X, 0.0, 0.0, 7680.0),
    p(param::CROP_Y, 0.0, 0.0, 4320.0),
    p(param::CROP_W, 1.0, 1.0, 7680.0),
    p(param::CROP_H, 1.0, 1.0, 4320.0),
    p(param::CROP_SCALE_MODE, 0.0, 0.0, 2.0),
];
static FLIP_PARAMS: &[ParameterSpec] = &[p(param::FLIP_AXIS, 0.0, 0.0, 2.0)];
static ROTATE_PARAMS: &[ParameterSpec] =
    &[p(param::ROTATE_ANGLE_TENTHS_DEGREE, 0.0, -3600.0, 3600.0), p(param::ROTATE_SCALE_HUNDREDTHS, 100.0, 10.0, 1000.0)];
static KERNEL_3X3_PARAMS: &[ParameterSpec] = &[
    p(param::KERNEL_COEFF_BASE, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 1, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 2, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 3, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 4, 1.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 5, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 6, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 7, 0.0, -10.0, 10.0),
    p(param::KERNEL_COEFF_BASE + 8, 0.0, -10.0, 10.0),
];
static DELTA_HISTOGRAM_PARAMS: &[ParameterSpec] = &[p(param::DELTA_HISTOGRAM_BAND_HEIGHT, 12.0, 4.0, 64.0)];
static UNIQUE_COUNT_PARAMS: &[ParameterSpec] =
    &[p(param::UNIQUE_COUNT_THRESHOLD, 10.0, 0.0, 255.0), p(param::UNIQUE_COUNT_CORNER, 0.0, 0.0, 3.0)];

/// Static metadata for one filter type.
pub struct FilterMetadata {
    pub kind: FilterKind,
    pub uuid: &'static str,
    pub display_name: &'static str,
    pub category: FilterCategory,
    pub parameters: &'static [ParameterSpec],
}

/// Returns the metadata entry for `kind`. Every [`FilterKind`] variant has
/// exactly one entry; this never returns a mismatched kind.
pub fn metadata_for(kind: FilterKind) -> &'static FilterMetadata {
    ALL_METADATA.iter().find(|m| m.kind == kind).expect("every FilterKind has a metadata entry")
}

static ALL_METADATA: &[FilterMetadata] = &[
    FilterMetadata {
        kind: FilterKind::Blur,
        uuid: "a5426f2e-b060-48a9-adf8-1646a2d3bd41",
        display_name: "Blur",
        category: FilterCategory::Reduce,
        parameters: BLUR_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::DeltaHistogram,
        uuid: "fc85a109-c57a-4317-994f-786652231773",
        display_name: "Delta histogram",
        category: FilterCategory::Meta,
        parameters: DELTA_HISTOGRAM_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::UniqueCount,
        uuid: "badb0129-f48c-4253-a66f-b0ec94e225a0",
        display_name: "Unique count",
        category: FilterCategory::Meta,
        parameters: UNIQUE_COUNT_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::UnsharpMask,
        uuid: "03847778-bb9c-4e8c-96d5-0c10335c4f34",
        display_name: "Unsharp mask",
        category: FilterCategory::Enhance,
        parameters: UNSHARP_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Decimate,
        uuid: "eb586eb4-2d9d-41b4-9e32-5cbcf0bbbf03",
        display_name: "Decimate",
        category: FilterCategory::Reduce,
        parameters: DECIMATE_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::DenoiseTemporal,
        uuid: "94adffac-be42-43ac-9839-9cc53a6d615c",
        display_name: "Denoise (temporal)",
        category: FilterCategory::Enhance,
        parameters: DENOISE_TEMPORAL_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::DenoiseNonlocalMeans,
        uuid: "e31d5ee3-f5df-4e7c-81b8-227fc39cbe76",
        display_name: "Denoise (non-local means)",
        category: FilterCategory::Enhance,
        parameters: NLM_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Sharpen,
        uuid: "1c25bbb1-dbf4-4a03-93a1-adf24b311070",
        display_name: "Sharpen",
        category: FilterCategory::Enhance,
        parameters: SHARPEN_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Median,
        uuid: "de60017c-afe5-4e5e-99ca-aca5756da0e8",
        display_name: "Median",
        category: FilterCategory::Reduce,
        parameters: MEDIAN_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Crop,
        uuid: "2448cf4a-112d-4d70-9fc1-b3e9176b6684",
        display_name: "Crop",
        category: FilterCategory::Distort,
        parameters: CROP_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Flip,
        uuid: "80a3ac29-fcec-4ae0-ad9e-bbd8667cc680",
        display_name: "Flip",
        category: FilterCategory::Distort,
        parameters: FLIP_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Rotate,
        uuid: "140c514d-a4b0-4882-abc6-b4e9e1ff4451",
        display_name: "Rotate",
        category: FilterCategory::Distort,
        parameters: ROTATE_PARAMS,
    },
    FilterMetadata {
        kind: FilterKind::Kernel3x3,
        uuid: "95027807-978b-4371-9a14-f6166efc64d9",
        display_name: "3x3 kernel",
        category: FilterCategory::Enhance,
        parameters: KERNEL_3X3_PARAMS,
    },
];
