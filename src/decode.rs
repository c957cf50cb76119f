use crate::context::SplashContext;
use crate::engine::DecodeTap;
use crate::error::{SplashError, SplashResult};
use crate::frame::FrameRgbx;
use crate::packet::{parse_header, read_u24_le, HEADER_LENGTH};

impl SplashContext {
    /// Decode one packet, replaying the encoder's refinement on the standing
    /// canvas, and export the reconstruction.
    ///
    /// A malformed packet is rejected before any context state changes. A
    /// truncated sample stream is not fatal: the partially refined canvas is
    /// still exported. Every decoded frame is a key frame.
    #[tracing::instrument(skip(self, packet))]
    pub fn decode(&mut self, packet: &[u8]) -> SplashResult<FrameRgbx> {
        let header = parse_header(packet, self.width, self.height)?;

        let mut ofs = HEADER_LENGTH;
        for i in 0..self.width {
            self.x_error[i] = read_u24_le(&packet[ofs..]);
            ofs += 3;
        }
        for j in 0..self.height {
            self.y_error[j] = read_u24_le(&packet[ofs..]);
            ofs += 3;
        }

        let mut tap = DecodeTap {
            data: &packet[ofs..],
            pos: 0,
        };
        let mut incomplete = false;
        loop {
            match self.update_lines(header.radius, &mut tap) {
                Ok(true) => {
                    if tap.pos >= tap.data.len() {
                        break;
                    }
                }
                Ok(false) => {
                    // rulers ran dry with sample bytes left over
                    incomplete = tap.pos < tap.data.len();
                    break;
                }
                Err(SplashError::StreamExhausted(_)) => {
                    incomplete = true;
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        if incomplete {
            tracing::warn!("incomplete scan line");
        }

        Ok(self.canvas_frame())
    }
}
