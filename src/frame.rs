use crate::error::{SplashError, SplashResult};

/// A frame as RGBX pixels.
///
/// Four bytes per pixel (R, G, B, padding), tightly packed, row-major. The
/// codec only reads and writes the three color channels; frames exported by
/// the decoder carry 255 in the padding byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgbx {
    pub width: u32,
    pub height: u32,
    /// RGBX bytes, `width * height * 4` of them.
    pub data: Vec<u8>,
}

impl FrameRgbx {
    /// Wrap an existing RGBX (or RGBA) buffer.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> SplashResult<Self> {
        let expected_len = expected_len(width, height)?;
        if data.len() != expected_len {
            return Err(SplashError::config(format!(
                "frame buffer is {} bytes, {}x{} rgbx needs {}",
                data.len(),
                width,
                height,
                expected_len
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color, padding byte 255.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> SplashResult<Self> {
        let expected_len = expected_len(width, height)?;
        let mut data = vec![255u8; expected_len];
        for px in data.chunks_exact_mut(4) {
            px[..3].copy_from_slice(&rgb);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let k = (y * self.width as usize + x) * 4;
        [self.data[k], self.data[k + 1], self.data[k + 2]]
    }
}

fn expected_len(width: u32, height: u32) -> SplashResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SplashError::config("frame buffer size overflow"))
}
