// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Endpoint selection for the lossy encode paths.
//!
//! The block encoders reduce up to 16 samples per channel to two endpoint
//! values by fitting a least-squares line over the sorted distinct samples.
//! This is the reference heuristic the original tooling shipped with; it is
//! fast and visually lossless at tile scale but makes no claim of minimal
//! quantization error, and its exact arithmetic (including the clamping
//! order) is part of the compatibility contract. Do not "improve" it.

use arrayvec::ArrayVec;
use itertools::Itertools;

/// Snap a normalized value onto an `steps`-level grid, rounding half up.
pub fn quantize(value: f32, steps: f32) -> f32 {
    (value * steps + 0.5).floor() / steps
}

/// Fit `lo`/`hi` endpoints to a tile's worth of channel samples.
///
/// Samples are deduplicated and sorted before fitting. Zero samples yield
/// `None` (callers supply their format's default pair); one or two distinct
/// values are returned directly. Otherwise the endpoints come from the line
/// of best fit `value = m * index + b` over the sorted values: `lo` is the
/// clamped intercept and `hi` the clamped far end of the line.
pub fn fit_endpoints(samples: impl IntoIterator<Item = f32>) -> Option<(f32, f32)> {
    let values: ArrayVec<f32, 16> = samples
        .into_iter()
        .sorted_by(f32::total_cmp)
        .dedup()
        .collect();

    match values.as_slice() {
        [] => None,
        [v] => Some((*v, *v)),
        [lo, hi] => Some((*lo, *hi)),
        values => {
            let n = values.len() as f32;

            let (mut sum_x, mut sum_y) = (0.0f32, 0.0f32);
            let (mut sum_xy, mut sum_xsq) = (0.0f32, 0.0f32);
            for (j, &y) in values.iter().enumerate() {
                let x = j as f32;
                sum_x += x;
                sum_y += y;
                sum_xy += x * y;
                sum_xsq += x * x;
            }

            let m = (n * sum_xy - sum_x * sum_y) / (n * sum_xsq - sum_x * sum_x);
            let b = sum_y / n - m * sum_x / n;

            let lo = b.clamp(0.0, 1.0);
            let hi = ((n - 1.0) * m + lo).clamp(0.0, 1.0);
            Some((lo, hi))
        }
    }
}
