use crate::context::SplashContext;
use crate::engine::EncodeTap;
use crate::error::{SplashError, SplashResult};
use crate::frame::FrameRgbx;
use crate::packet::{self, ERROR_LIMIT, HEADER_LENGTH};

/// One encoded frame.
///
/// Packets are self-contained: each carries the header, both initial rulers,
/// and every sample of the frame, so the key-frame flag is always set.
#[derive(Clone, Debug)]
pub struct EncodedPacket {
    pub data: Vec<u8>,
    pub key_frame: bool,
}

impl SplashContext {
    /// Encode `target` against the standing canvas into one packet.
    #[tracing::instrument(skip(self, target), fields(frame = self.frames_encoded))]
    pub fn encode(&mut self, target: &FrameRgbx) -> SplashResult<EncodedPacket> {
        if target.width as usize != self.width || target.height as usize != self.height {
            return Err(SplashError::config(format!(
                "target frame is {}x{}, context is {}x{}",
                target.width, target.height, self.width, self.height
            )));
        }

        let (w, h) = (self.width, self.height);

        // worst case: header, both rulers, one sample per pixel
        let mut data = Vec::with_capacity(HEADER_LENGTH + 3 * (w + h + w * h));
        packet::write_header(&mut data, self.params.radius as u8);

        // initial rulers, measured between the standing canvas and the target
        for i in 0..w {
            let err = self.column_error(target, i);
            self.x_error[i] = err;
            packet::push_u24_le(&mut data, err);
        }
        for j in 0..h {
            let err = self.row_error(target, j);
            self.y_error[j] = err;
            packet::push_u24_le(&mut data, err);
        }

        let max_pixels = self.frame_budget();
        let radius = self.params.radius;

        let mut tap = EncodeTap {
            target,
            out: &mut data,
            emitted: 0,
        };
        loop {
            if !self.update_lines(radius, &mut tap)? {
                break; // short frame
            }
            if tap.emitted >= max_pixels {
                break;
            }
        }
        let emitted = tap.emitted;

        if self.params.ppf == 1.0 {
            self.verify_lossless(target);
        }

        self.frames_encoded += 1;
        tracing::debug!(bytes = data.len(), samples = emitted, "encoded frame");

        Ok(EncodedPacket {
            data,
            key_frame: true,
        })
    }

    /// Sample budget for the upcoming frame.
    fn frame_budget(&self) -> usize {
        let area = (self.width * self.height) as f32;
        let divisor = if self.frames_encoded == 0 {
            self.params.ppk
        } else {
            self.params.ppf
        };
        (area / divisor).round() as usize
    }

    fn column_error(&self, target: &FrameRgbx, i: usize) -> u32 {
        let mut err: u64 = 0;
        for j in 0..self.height {
            let k = (j * self.width + i) * 4;
            for c in 0..3 {
                err += u64::from(self.canvas[k + c].abs_diff(target.data[k + c]));
            }
        }
        err.min(u64::from(ERROR_LIMIT)) as u32
    }

    fn row_error(&self, target: &FrameRgbx, j: usize) -> u32 {
        let mut err: u64 = 0;
        for i in 0..self.width {
            let k = (j * self.width + i) * 4;
            for c in 0..3 {
                err += u64::from(self.canvas[k + c].abs_diff(target.data[k + c]));
            }
        }
        err.min(u64::from(ERROR_LIMIT)) as u32
    }

    fn verify_lossless(&self, target: &FrameRgbx) {
        let mut misses = 0usize;
        for (canvas_px, target_px) in self
            .canvas
            .chunks_exact(4)
            .zip(target.data.chunks_exact(4))
        {
            for c in 0..3 {
                if canvas_px[c] != target_px[c] {
                    misses += 1;
                }
            }
        }
        if misses > 0 {
            tracing::warn!(channels = misses, "inaccurate final pixels");
        }
    }
}
