use crate::context::SplashContext;
use crate::error::{SplashError, SplashResult};
use crate::frame::FrameRgbx;

/// Source of exact pixel samples at cross points.
///
/// The encoder reads the target frame and appends each triple to the packet
/// under construction; the decoder pulls the same triples back out of the
/// incoming packet. Everything else runs the identical code path on both
/// sides, which is what keeps the two canvases byte-for-byte equal.
pub(crate) trait SampleTap {
    fn sample(&mut self, x: usize, y: usize) -> SplashResult<[u8; 3]>;
}

pub(crate) struct EncodeTap<'a> {
    pub target: &'a FrameRgbx,
    pub out: &'a mut Vec<u8>,
    pub emitted: usize,
}

impl SampleTap for EncodeTap<'_> {
    fn sample(&mut self, x: usize, y: usize) -> SplashResult<[u8; 3]> {
        let rgb = self.target.rgb(x, y);
        self.out.extend_from_slice(&rgb);
        self.emitted += 1;
        Ok(rgb)
    }
}

pub(crate) struct DecodeTap<'a> {
    pub data: &'a [u8],
    pub pos: usize,
}

impl SampleTap for DecodeTap<'_> {
    fn sample(&mut self, _x: usize, _y: usize) -> SplashResult<[u8; 3]> {
        let Some(rgb) = self.data.get(self.pos..self.pos + 3) else {
            return Err(SplashError::exhausted(format!(
                "need 3 sample bytes at offset {} of {}",
                self.pos,
                self.data.len()
            )));
        };
        self.pos += 3;
        Ok([rgb[0], rgb[1], rgb[2]])
    }
}

impl SplashContext {
    /// One iteration of progressive refinement.
    ///
    /// Picks the worst-error column or row, rebalances its ruler, and splats
    /// a sample at every cross point with an already-exact perpendicular
    /// line. Returns `Ok(false)` once both rulers are fully zero; an
    /// iteration that finds no cross point still rebalances and counts as
    /// work done.
    pub(crate) fn update_lines(
        &mut self,
        radius: u32,
        tap: &mut dyn SampleTap,
    ) -> SplashResult<bool> {
        let (wx, worst_x) = worst_tab(&self.x_error);
        let (wy, worst_y) = worst_tab(&self.y_error);

        if worst_x + worst_y == 0 {
            return Ok(false);
        }

        if worst_x > worst_y {
            let i = wx;
            tracing::trace!(worst_x, worst_y, pivot = i, "column splash");

            let (min_i, max_i) = splash_range(&self.x_error, i, radius);
            let max_error = self.x_error[i];
            rebalance(&mut self.x_error, i, min_i, max_i, radius);

            for j in 0..self.height {
                // cross points only happen on exact perpendicular lines
                if self.y_error[j] != 0 {
                    continue;
                }
                let src = tap.sample(i, j)?;
                let (min_j, max_j) = splash_range(&self.y_error, j, radius);
                self.splat(i, j, min_i, max_i, min_j, max_j, radius, max_error, src);
            }
        } else {
            // ties fall here on purpose; both sides must agree on the axis
            let j = wy;
            tracing::trace!(worst_x, worst_y, pivot = j, "row splash");

            let (min_j, max_j) = splash_range(&self.y_error, j, radius);
            let max_error = self.y_error[j];
            rebalance(&mut self.y_error, j, min_j, max_j, radius);

            for i in 0..self.width {
                if self.x_error[i] != 0 {
                    continue;
                }
                let src = tap.sample(i, j)?;
                let (min_i, max_i) = splash_range(&self.x_error, i, radius);
                self.splat(i, j, min_i, max_i, min_j, max_j, radius, max_error, src);
            }
        }

        Ok(true)
    }

    /// Weighted flood-fill of one sample around the cross point `(i, j)`.
    ///
    /// The fill weight falls off linearly with Euclidean distance from the
    /// center and is further attenuated by the local error confidence, so
    /// delicate detail (lines, letters) on nearly-exact neighbors survives.
    #[allow(clippy::too_many_arguments)]
    fn splat(
        &mut self,
        i: usize,
        j: usize,
        min_i: usize,
        max_i: usize,
        min_j: usize,
        max_j: usize,
        radius: u32,
        max_error: u32,
        src: [u8; 3],
    ) {
        let rf = radius as f32;
        let me = max_error as f32;

        for jj in min_j..=max_j {
            let dy = jj.abs_diff(j);
            for ii in min_i..=max_i {
                let dx = ii.abs_diff(i);

                let fill_alpha = 1.0 - ((dx * dx + dy * dy) as f32).sqrt() / rf;
                if fill_alpha <= 0.0 {
                    continue;
                }

                let xerr = self.x_error[ii] as f32 / me;
                let yerr = self.y_error[jj] as f32 / me;
                let xyerr = (xerr + yerr) / 2.0;
                let alpha = 256 - (256.0 * xyerr).round() as i32;

                let k = (jj * self.width + ii) * 4;
                for c in 0..3 {
                    let old = i32::from(self.canvas[k + c]);
                    let new = (i32::from(src[c]) * alpha + old * (256 - alpha)) >> 8;
                    self.canvas[k + c] = new as u8;
                }
            }
        }
    }
}

/// Index and value of the ruler's maximum, first occurrence on ties.
fn worst_tab(ruler: &[u32]) -> (usize, u32) {
    let mut at = 0;
    let mut worst = ruler[0];
    for (idx, &err) in ruler.iter().enumerate().skip(1) {
        if err > worst {
            at = idx;
            worst = err;
        }
    }
    (at, worst)
}

/// Bounded expansion around a pivot: stop at the brush radius, the frame
/// edge, or the nearest exact line.
fn splash_range(ruler: &[u32], pivot: usize, radius: u32) -> (usize, usize) {
    let mut lo = pivot;
    for _ in 1..radius {
        if lo == 0 || ruler[lo - 1] == 0 {
            break;
        }
        lo -= 1;
    }

    let mut hi = pivot;
    for _ in 1..radius {
        if hi + 1 >= ruler.len() || ruler[hi + 1] == 0 {
            break;
        }
        hi += 1;
    }

    (lo, hi)
}

/// Scale the in-range entries down by distance so the two rulers stay
/// balanced, then mark the pivot exact.
fn rebalance(ruler: &mut [u32], pivot: usize, lo: usize, hi: usize, radius: u32) {
    for ii in lo..=hi {
        let before = ruler[ii];
        let scale = ii.abs_diff(pivot) as f32 / radius as f32;
        let scaled = (before as f32 * scale).round() as u32;
        // a non-pivot line must not become exact by scaling alone
        ruler[ii] = if ii != pivot && scaled == 0 && before != 0 {
            1
        } else {
            scaled
        };
    }
    ruler[pivot] = 0;
}
