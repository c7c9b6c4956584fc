// SPDX-License-Identifier: GPL-3.0-only

//! Per-filter pixel manipulation functions (spec.md §4.6), grounded on the
//! original's `filter_func_*` family (`filter_funcs.h`) and on the
//! teacher's in-place, per-pixel CPU filter pipeline
//! (`backends/virtual_camera/filters.rs`). Every function here operates on
//! a 32-bit BGRA buffer in place and never changes its length.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::capture::types::Resolution;
use crate::errors::{FilterError, VcsResult};
use crate::filter::node::FilterState;
use crate::filter::registry::{param, FilterKind};

const CHANNELS: usize = 4;

fn param_value(params: &HashMap<u32, f64>, id: u32, default: f64) -> f64 {
    params.get(&id).copied().unwrap_or(default)
}

/// Dispatches to the concrete filter function for `kind`. Called by
/// [`crate::filter::node::FilterNode::apply`].
pub(crate) fn apply(
    kind: FilterKind,
    state: &mut FilterState,
    params: &HashMap<u32, f64>,
    pixels: &mut [u8],
    resolution: Resolution,
) -> VcsResult<()> {
    match kind {
        FilterKind::Blur => {
            let radius = (param_value(params, param::BLUR_RADIUS_TENTHS, 10.0) / 10.0).round().max(0.0) as usize;
            let gaussian = param_value(params, param::BLUR_KIND, 0.0) >= 0.5;
            blur(pixels, resolution, radius, gaussian);
        }
        FilterKind::Sharpen => {
            sharpen(pixels, resolution);
        }
        FilterKind::UnsharpMask => {
            let radius = (param_value(params, param::UNSHARP_RADIUS_TENTHS, 10.0) / 10.0).round().max(0.0) as usize;
            let strength = param_value(params, param::UNSHARP_STRENGTH_PERCENT, 50.0) / 100.0;
            unsharp_mask(pixels, resolution, radius, strength);
        }
        FilterKind::Median => {
            let radius = param_value(params, param::MEDIAN_RADIUS, 1.0).round().max(0.0) as usize;
            median(pixels, resolution, radius);
        }
        FilterKind::DenoiseTemporal => {
            let threshold = param_value(params, param::DENOISE_TEMPORAL_THRESHOLD, 10.0) as i32;
            let prev = previous_frame_slot(state);
            denoise_temporal(pixels, resolution, threshold, prev);
        }
        FilterKind::DenoiseNonlocalMeans => {
            let luminance_strength = param_value(params, param::NLM_LUMINANCE_STRENGTH, 10.0);
            let color_strength = param_value(params, param::NLM_COLOR_STRENGTH, 10.0);
            let template_radius = param_value(params, param::NLM_TEMPLATE_RADIUS, 1.0).round().max(0.0) as usize;
            let search_radius = param_value(params, param::NLM_SEARCH_RADIUS, 3.0).round().max(0.0) as usize;
            denoise_nonlocal_means(pixels, resolution, luminance_strength, color_strength, template_radius, search_radius);
        }
        FilterKind::Decimate => {
            let factor = nearest_valid_decimate_factor(param_value(params, param::DECIMATE_FACTOR, 2.0));
            let averaged = param_value(params, param::DECIMATE_MODE, 0.0) >= 0.5;
            decimate(pixels, resolution, factor, averaged);
        }
        FilterKind::Crop => {
            let x = param_value(params, param::CROP_X, 0.0).max(0.0) as u32;
            let y = param_value(params, param::CROP_Y, 0.0).max(0.0) as u32;
            let w = param_value(params, param::CROP_W, 1.0).max(1.0) as u32;
            let h = param_value(params, param::CROP_H, 1.0).max(1.0) as u32;
            let scale_mode = CropScaleMode::from_param(param_value(params, param::CROP_SCALE_MODE, 0.0));
            crop(pixels, resolution, x, y, w, h, scale_mode)?;
        }
        FilterKind::Flip => {
            let axis = FlipAxis::from_param(param_value(params, param::FLIP_AXIS, 0.0));
            flip(pixels, resolution, axis);
        }
        FilterKind::Rotate => {
            let angle_tenths = param_value(params, param::ROTATE_ANGLE_TENTHS_DEGREE, 0.0);
            let scale_hundredths = param_value(params, param::ROTATE_SCALE_HUNDREDTHS, 100.0);
            rotate(pixels, resolution, angle_tenths / 10.0, scale_hundredths / 100.0);
        }
        FilterKind::Kernel3x3 => {
            let mut coeffs = [0.0f64; 9];
            for (i, coeff) in coeffs.iter_mut().enumerate() {
                *coeff = param_value(params, param::KERNEL_COEFF_BASE + i as u32, if i == 4 { 1.0 } else { 0.0 });
            }
            kernel_3x3(pixels, resolution, &coeffs);
        }
        FilterKind::DeltaHistogram => {
            let band_height = param_value(params, param::DELTA_HISTOGRAM_BAND_HEIGHT, 12.0).round().max(1.0) as u32;
            let prev = previous_frame_slot(state);
            delta_histogram(pixels, resolution, band_height, prev);
        }
        FilterKind::UniqueCount => {
            let threshold = param_value(params, param::UNIQUE_COUNT_THRESHOLD, 10.0) as i32;
            let corner = Corner::from_param(param_value(params, param::UNIQUE_COUNT_CORNER, 0.0));
            let (prev, changes) = match state {
                FilterState::UniqueCount { previous_frame, changes } => (previous_frame, changes),
                _ => unreachable!("FilterNode::new always pairs UniqueCount with FilterState::UniqueCount"),
            };
            unique_count(pixels, resolution, threshold, corner, prev, changes);
        }
    }

    Ok(())
}

fn previous_frame_slot(state: &mut FilterState) -> &mut Option<Vec<u8>> {
    match state {
        FilterState::PreviousFrame(slot) => slot,
        _ => unreachable!("FilterNode::new always pairs a previous-frame filter with FilterState::PreviousFrame"),
    }
}

fn nearest_valid_decimate_factor(requested: f64) -> u32 {
    [2u32, 4, 8, 16].into_iter().min_by_key(|f| (*f as f64 - requested).abs() as u32).unwrap_or(2)
}

fn clamp_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

fn sample_clamped(pixels: &[u8], w: usize, h: usize, x: isize, y: isize, channel: usize) -> u8 {
    let cx = x.clamp(0, w as isize - 1) as usize;
    let cy = y.clamp(0, h as isize - 1) as usize;
    pixels[(cy * w + cx) * CHANNELS + channel]
}

/// A box or 3x3-weighted-approximation-of-Gaussian blur with integer pixel
/// radius, grounded on `filter_func_blur`.
fn blur(pixels: &mut [u8], resolution: Resolution, radius: usize, gaussian: bool) {
    if radius == 0 {
        return;
    }
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let original = pixels.to_vec();
    let side = (2 * radius + 1) as f64;

    for y in 0..h {
        for x in 0..w {
            let mut sums = [0f64; 3];
            let mut weight_sum = 0f64;

            for dy in -(radius as isize)..=(radius as isize) {
                for dx in -(radius as isize)..=(radius as isize) {
                    let weight = if gaussian {
                        let d2 = (dx * dx + dy * dy) as f64;
                        (-d2 / (2.0 * (side / 3.0).max(1.0).powi(2))).exp()
                    } else {
                        1.0
                    };
                    for c in 0..3 {
                        sums[c] += weight * sample_clamped(&original, w, h, x as isize + dx, y as isize + dy, c) as f64;
                    }
                    weight_sum += weight;
                }
            }

            let idx = (y * w + x) * CHANNELS;
            for c in 0..3 {
                pixels[idx + c] = clamp_u8(sums[c] / weight_sum);
            }
        }
    }
}

/// A fixed 3x3 Laplacian-like sharpening kernel, grounded on
/// `filter_func_sharpen`.
fn sharpen(pixels: &mut [u8], resolution: Resolution) {
    const SHARPEN_KERNEL: [f64; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
    kernel_3x3(pixels, resolution, &SHARPEN_KERNEL);
}

/// A generic signed 3x3 convolution, normalized by the sum of its
/// coefficients (falling back to an unnormalized divisor of 1 when that sum
/// is zero, e.g. edge-detection kernels), grounded on `filter_func_sharpen`
/// generalized to arbitrary coefficients per spec.md's `kernel_3x3` filter.
fn kernel_3x3(pixels: &mut [u8], resolution: Resolution, coeffs: &[f64; 9]) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let original = pixels.to_vec();

    let divisor = {
        let sum: f64 = coeffs.iter().sum();
        if sum.abs() < f64::EPSILON {
            1.0
        } else {
            sum
        }
    };

    for y in 0..h {
        for x in 0..w {
            let mut sums = [0f64; 3];
            let mut k = 0;
            for dy in -1..=1isize {
                for dx in -1..=1isize {
                    let coeff = coeffs[k];
                    k += 1;
                    for c in 0..3 {
                        sums[c] += coeff * sample_clamped(&original, w, h, x as isize + dx, y as isize + dy, c) as f64;
                    }
                }
            }

            let idx = (y * w + x) * CHANNELS;
            for c in 0..3 {
                pixels[idx + c] = clamp_u8(sums[c] / divisor);
            }
        }
    }
}

/// Blurs a copy of the frame and adds back the scaled difference between
/// the original and the blur, grounded on `filter_func_unsharp_mask`.
fn unsharp_mask(pixels: &mut [u8], resolution: Resolution, radius: usize, strength: f64) {
    let original = pixels.to_vec();
    blur(pixels, resolution, radius, true);

    for (idx, px) in pixels.chunks_mut(CHANNELS).enumerate() {
        let base = idx * CHANNELS;
        for c in 0..3 {
            let orig = original[base + c] as f64;
            let blurred = px[c] as f64;
            px[c] = clamp_u8(orig + (orig - blurred) * strength);
        }
    }
}

/// A per-channel median filter over a square `(2r+1)`-side window, grounded
/// on `filter_func_median`.
fn median(pixels: &mut [u8], resolution: Resolution, radius: usize) {
    if radius == 0 {
        return;
    }
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let original = pixels.to_vec();

    let mut window = Vec::with_capacity((2 * radius + 1) * (2 * radius + 1));

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) * CHANNELS;
            for c in 0..3 {
                window.clear();
                for dy in -(radius as isize)..=(radius as isize) {
                    for dx in -(radius as isize)..=(radius as isize) {
                        window.push(sample_clamped(&original, w, h, x as isize + dx, y as isize + dy, c));
                    }
                }
                window.sort_unstable();
                pixels[idx + c] = window[window.len() / 2];
            }
        }
    }
}

/// Holds the previous-frame value for any pixel whose channels haven't
/// changed by more than `threshold`, grounded on `filter_func_denoise_temporal`.
fn denoise_temporal(pixels: &mut [u8], resolution: Resolution, threshold: i32, prev: &mut Option<Vec<u8>>) {
    let byte_size = resolution.byte_size();
    let previous = prev.get_or_insert_with(|| pixels.to_vec());
    if previous.len() != byte_size {
        *previous = pixels.to_vec();
    }

    for px in 0..(byte_size / CHANNELS) {
        let idx = px * CHANNELS;
        let changed = (0..3).any(|c| (pixels[idx + c] as i32 - previous[idx + c] as i32).abs() > threshold);
        if !changed {
            pixels[idx..idx + 3].copy_from_slice(&previous[idx..idx + 3]);
        }
    }

    previous.copy_from_slice(&pixels[..byte_size]);
}

/// A windowed, patch-similarity-weighted average: for every pixel, compares
/// a small template patch against every candidate within the search
/// window, weighting each candidate's contribution by how closely its own
/// template patch matches, grounded on `filter_func_denoise_nonlocal_means`.
fn denoise_nonlocal_means(
    pixels: &mut [u8],
    resolution: Resolution,
    luminance_strength: f64,
    color_strength: f64,
    template_radius: usize,
    search_radius: usize,
) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let original = pixels.to_vec();
    let h_eff = ((luminance_strength + color_strength) / 2.0).max(0.01);

    for y in 0..h {
        for x in 0..w {
            let mut sums = [0f64; 3];
            let mut weight_sum = 0f64;

            for dy in -(search_radius as isize)..=(search_radius as isize) {
                for dx in -(search_radius as isize)..=(search_radius as isize) {
                    let qx = x as isize + dx;
                    let qy = y as isize + dy;

                    let mut distance = 0f64;
                    for ty in -(template_radius as isize)..=(template_radius as isize) {
                        for tx in -(template_radius as isize)..=(template_radius as isize) {
                            for c in 0..3 {
                                let a = sample_clamped(&original, w, h, x as isize + tx, y as isize + ty, c) as f64;
                                let b = sample_clamped(&original, w, h, qx + tx, qy + ty, c) as f64;
                                distance += (a - b) * (a - b);
                            }
                        }
                    }

                    let weight = (-distance / (h_eff * h_eff)).exp();
                    for c in 0..3 {
                        sums[c] += weight * sample_clamped(&original, w, h, qx, qy, c) as f64;
                    }
                    weight_sum += weight;
                }
            }

            let idx = (y * w + x) * CHANNELS;
            for c in 0..3 {
                let value = if weight_sum > 0.0 { sums[c] / weight_sum } else { original[idx + c] as f64 };
                pixels[idx + c] = clamp_u8(value);
            }
        }
    }
}

/// Replaces each `factor x factor` block with either its top-left source
/// pixel (nearest) or the block's average, grounded on `filter_func_decimate`.
fn decimate(pixels: &mut [u8], resolution: Resolution, factor: u32, averaged: bool) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let factor = factor as usize;
    let original = pixels.to_vec();

    let mut block_y = 0;
    while block_y < h {
        let mut block_x = 0;
        while block_x < w {
            let block_h = factor.min(h - block_y);
            let block_w = factor.min(w - block_x);

            for c in 0..3 {
                let value = if averaged {
                    let mut sum = 0u32;
                    for dy in 0..block_h {
                        for dx in 0..block_w {
                            let idx = ((block_y + dy) * w + (block_x + dx)) * CHANNELS + c;
                            sum += original[idx] as u32;
                        }
                    }
                    (sum / (block_w * block_h) as u32) as u8
                } else {
                    original[(block_y * w + block_x) * CHANNELS + c]
                };

                for dy in 0..block_h {
                    for dx in 0..block_w {
                        let idx = ((block_y + dy) * w + (block_x + dx)) * CHANNELS + c;
                        pixels[idx] = value;
                    }
                }
            }

            block_x += factor;
        }
        block_y += factor;
    }
}

/// How a crop filter fits its cropped sub-rectangle back into the frame's
/// original dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropScaleMode {
    Linear,
    Nearest,
    /// Pads with black rather than scaling.
    NoScale,
}

impl CropScaleMode {
    fn from_param(value: f64) -> Self {
        match value.round() as i64 {
            1 => CropScaleMode::Nearest,
            2 => CropScaleMode::NoScale,
            _ => CropScaleMode::Linear,
        }
    }
}

/// Extracts the `(x, y, w, h)` sub-rectangle and fits it back into the
/// frame's original dimensions per `scale_mode`, grounded on
/// `filter_func_crop`. Out-of-bounds rectangles are rejected without
/// touching `pixels`, matching spec.md §4.5.5 / §7's "reject without
/// mutating pixels" contract.
fn crop(pixels: &mut [u8], resolution: Resolution, x: u32, y: u32, w: u32, h: u32, scale_mode: CropScaleMode) -> VcsResult<()> {
    if x.saturating_add(w) > resolution.w || y.saturating_add(h) > resolution.h {
        return Err(FilterError::CropOutOfBounds { x, y, w, h, frame_w: resolution.w, frame_h: resolution.h }.into());
    }

    let full_w = resolution.w as usize;
    let full_h = resolution.h as usize;
    let (cx, cy, cw, ch) = (x as usize, y as usize, w as usize, h as usize);

    let mut cropped = vec![0u8; cw * ch * CHANNELS];
    for row in 0..ch {
        let src_start = ((cy + row) * full_w + cx) * CHANNELS;
        let dst_start = row * cw * CHANNELS;
        cropped[dst_start..dst_start + cw * CHANNELS].copy_from_slice(&pixels[src_start..src_start + cw * CHANNELS]);
    }

    let mut output = vec![0u8; full_w * full_h * CHANNELS];

    match scale_mode {
        CropScaleMode::NoScale => {
            for row in 0..ch.min(full_h) {
                let dst_start = row * full_w * CHANNELS;
                let src_start = row * cw * CHANNELS;
                let copy_w = cw.min(full_w);
                output[dst_start..dst_start + copy_w * CHANNELS].copy_from_slice(&cropped[src_start..src_start + copy_w * CHANNELS]);
            }
        }
        CropScaleMode::Nearest => {
            for out_y in 0..full_h {
                let src_y = (out_y * ch / full_h).min(ch.saturating_sub(1));
                for out_x in 0..full_w {
                    let src_x = (out_x * cw / full_w).min(cw.saturating_sub(1));
                    let src_idx = (src_y * cw + src_x) * CHANNELS;
                    let dst_idx = (out_y * full_w + out_x) * CHANNELS;
                    output[dst_idx..dst_idx + CHANNELS].copy_from_slice(&cropped[src_idx..src_idx + CHANNELS]);
                }
            }
        }
        CropScaleMode::Linear => {
            for out_y in 0..full_h {
                let fy = if full_h > 1 { out_y as f64 * (ch.saturating_sub(1)) as f64 / (full_h - 1) as f64 } else { 0.0 };
                for out_x in 0..full_w {
                    let fx = if full_w > 1 { out_x as f64 * (cw.saturating_sub(1)) as f64 / (full_w - 1) as f64 } else { 0.0 };
                    let dst_idx = (out_y * full_w + out_x) * CHANNELS;
                    for c in 0..CHANNELS {
                        output[dst_idx + c] = bilinear_sample(&cropped, cw, ch, fx, fy, c);
                    }
                }
            }
        }
    }

    pixels.copy_from_slice(&output);
    Ok(())
}

fn bilinear_sample(buf: &[u8], w: usize, h: usize, fx: f64, fy: f64, channel: usize) -> u8 {
    let x0 = fx.floor() as usize;
    let y0 = fy.floor() as usize;
    let x1 = (x0 + 1).min(w.saturating_sub(1));
    let y1 = (y0 + 1).min(h.saturating_sub(1));
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let get = |x: usize, y: usize| buf[(y * w + x) * CHANNELS + channel] as f64;

    let top = get(x0, y0) * (1.0 - tx) + get(x1, y0) * tx;
    let bottom = get(x0, y1) * (1.0 - tx) + get(x1, y1) * tx;
    clamp_u8(top * (1.0 - ty) + bottom * ty)
}

/// Which axis (or axes) a flip filter mirrors the frame across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Vertical,
    Horizontal,
    Both,
}

impl FlipAxis {
    fn from_param(value: f64) -> Self {
        match value.round() as i64 {
            1 => FlipAxis::Horizontal,
            2 => FlipAxis::Both,
            _ => FlipAxis::Vertical,
        }
    }
}

/// Mirrors the frame across the configured axis, grounded on
/// `filter_func_flip`.
fn flip(pixels: &mut [u8], resolution: Resolution, axis: FlipAxis) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let row_bytes = w * CHANNELS;

    if matches!(axis, FlipAxis::Vertical | FlipAxis::Both) {
        let mut scratch = vec![0u8; row_bytes];
        for y in 0..(h / 2) {
            let top = y * row_bytes;
            let bottom = (h - 1 - y) * row_bytes;
            scratch.copy_from_slice(&pixels[top..top + row_bytes]);
            pixels.copy_within(bottom..bottom + row_bytes, top);
            pixels[bottom..bottom + row_bytes].copy_from_slice(&scratch);
        }
    }

    if matches!(axis, FlipAxis::Horizontal | FlipAxis::Both) {
        for y in 0..h {
            let row_start = y * row_bytes;
            for x in 0..(w / 2) {
                let left = row_start + x * CHANNELS;
                let right = row_start + (w - 1 - x) * CHANNELS;
                for c in 0..CHANNELS {
                    pixels.swap(left + c, right + c);
                }
            }
        }
    }
}

/// Rotates the frame about its center by `angle_degrees`, scaling by
/// `scale`, via inverse-mapped bilinear sampling; pixels mapped outside the
/// source frame are left black, grounded on `filter_func_rotate`.
fn rotate(pixels: &mut [u8], resolution: Resolution, angle_degrees: f64, scale: f64) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let original = pixels.to_vec();

    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let theta = angle_degrees.to_radians();
    let (sin_t, cos_t) = theta.sin_cos();
    let inv_scale = if scale.abs() < f64::EPSILON { 1.0 } else { 1.0 / scale };

    for out_y in 0..h {
        for out_x in 0..w {
            let dx = out_x as f64 - cx;
            let dy = out_y as f64 - cy;

            // Inverse rotation maps the output pixel back to its source
            // location in the (unrotated, unscaled) original.
            let src_x = (dx * cos_t + dy * sin_t) * inv_scale + cx;
            let src_y = (-dx * sin_t + dy * cos_t) * inv_scale + cy;

            let dst_idx = (out_y * w + out_x) * CHANNELS;
            if src_x < 0.0 || src_y < 0.0 || src_x >= (w - 1) as f64 || src_y >= (h - 1) as f64 {
                pixels[dst_idx..dst_idx + CHANNELS].fill(0);
                continue;
            }

            for c in 0..CHANNELS {
                pixels[dst_idx + c] = bilinear_sample(&original, w, h, src_x, src_y, c);
            }
        }
    }
}

/// Draws a per-channel bar proportional to the mean inter-frame delta along
/// the left edge of the frame, grounded on `filter_func_delta_histogram`.
fn delta_histogram(pixels: &mut [u8], resolution: Resolution, band_height: u32, prev: &mut Option<Vec<u8>>) {
    let byte_size = resolution.byte_size();
    let previous = prev.get_or_insert_with(|| pixels.to_vec());
    if previous.len() != byte_size {
        *previous = pixels.to_vec();
        return;
    }

    let w = resolution.w as usize;
    let h = resolution.h as usize;
    let pixel_count = (byte_size / CHANNELS).max(1) as f64;

    let mut channel_sums = [0f64; 3];
    for px in 0..(byte_size / CHANNELS) {
        let idx = px * CHANNELS;
        for c in 0..3 {
            channel_sums[c] += (pixels[idx + c] as i32 - previous[idx + c] as i32).unsigned_abs() as f64;
        }
    }

    previous.copy_from_slice(pixels);

    let band_height = (band_height as usize).min(h);
    for (c, &sum) in channel_sums.iter().enumerate() {
        let mean_delta = sum / pixel_count;
        let bar_height = ((mean_delta / 255.0) * band_height as f64).round() as usize;
        let column = c * 4;
        if column >= w {
            continue;
        }
        for y in (h - bar_height)..h {
            for dx in 0..4.min(w - column) {
                let idx = (y * w + column + dx) * CHANNELS;
                pixels[idx] = if c == 0 { 255 } else { 0 };
                pixels[idx + 1] = if c == 1 { 255 } else { 0 };
                pixels[idx + 2] = if c == 2 { 255 } else { 0 };
            }
        }
    }
}

/// Which corner a [`unique_count`] overlay is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn from_param(value: f64) -> Self {
        match value.round() as i64 {
            1 => Corner::TopRight,
            2 => Corner::BottomLeft,
            3 => Corner::BottomRight,
            _ => Corner::TopLeft,
        }
    }
}

/// A 3-wide, 5-tall bitmap font for the digits 0-9, each row's bits read
/// high-to-low as left-to-right columns.
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b001, 0b001, 0b001], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

const GLYPH_W: usize = 3;
const GLYPH_H: usize = 5;
const GLYPH_SPACING: usize = 1;
const OVERLAY_MARGIN: usize = 4;

fn draw_digit(pixels: &mut [u8], w: usize, h: usize, digit: u32, origin_x: usize, origin_y: usize) {
    let glyph = DIGIT_GLYPHS[(digit % 10) as usize];
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_W {
            let lit = (bits >> (GLYPH_W - 1 - col)) & 1 == 1;
            if !lit {
                continue;
            }
            let x = origin_x + col;
            let y = origin_y + row;
            if x >= w || y >= h {
                continue;
            }
            let idx = (y * w + x) * CHANNELS;
            pixels[idx..idx + 3].fill(255);
        }
    }
}

/// Renders `count` as a decimal number in the configured corner.
fn draw_count(pixels: &mut [u8], resolution: Resolution, count: u32, corner: Corner) {
    let w = resolution.w as usize;
    let h = resolution.h as usize;

    let digits: Vec<u32> = {
        let mut n = count;
        let mut d = vec![n % 10];
        n /= 10;
        while n > 0 {
            d.push(n % 10);
            n /= 10;
        }
        d.reverse();
        d
    };

    let total_width = digits.len() * GLYPH_W + digits.len().saturating_sub(1) * GLYPH_SPACING;

    let (start_x, start_y) = match corner {
        Corner::TopLeft => (OVERLAY_MARGIN, OVERLAY_MARGIN),
        Corner::TopRight => (w.saturating_sub(OVERLAY_MARGIN + total_width), OVERLAY_MARGIN),
        Corner::BottomLeft => (OVERLAY_MARGIN, h.saturating_sub(OVERLAY_MARGIN + GLYPH_H)),
        Corner::BottomRight => (w.saturating_sub(OVERLAY_MARGIN + total_width), h.saturating_sub(OVERLAY_MARGIN + GLYPH_H)),
    };

    let mut x = start_x;
    for &digit in &digits {
        draw_digit(pixels, w, h, digit, x, start_y);
        x += GLYPH_W + GLYPH_SPACING;
    }
}

/// Counts frames (including this one) differing from the previous frame by
/// more than `threshold` in any channel, over a trailing 1-second sliding
/// window, and renders the count in `corner`, grounded on
/// `filter_func_unique_count`.
fn unique_count(pixels: &mut [u8], resolution: Resolution, threshold: i32, corner: Corner, prev: &mut Option<Vec<u8>>, changes: &mut std::collections::VecDeque<Instant>) {
    let byte_size = resolution.byte_size();
    let now = Instant::now();

    let is_new_content = match prev {
        Some(previous) if previous.len() == byte_size => {
            (0..(byte_size / CHANNELS)).any(|px| {
                let idx = px * CHANNELS;
                (0..3).any(|c| (pixels[idx + c] as i32 - previous[idx + c] as i32).abs() > threshold)
            })
        }
        _ => true,
    };

    if is_new_content {
        changes.push_back(now);
    }

    while let Some(&front) = changes.front() {
        if now.duration_since(front) > Duration::from_secs(1) {
            changes.pop_front();
        } else {
            break;
        }
    }

    *prev = Some(pixels.to_vec());

    draw_count(pixels, resolution, changes.len() as u32, corner);
}
