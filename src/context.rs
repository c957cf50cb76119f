use crate::error::{SplashError, SplashResult};
use crate::frame::FrameRgbx;

/// Encoder-side codec parameters.
///
/// The sample budget of a frame is `width * height / ppf` (`ppk` for the
/// first frame), so `ppf == 1` asks for full refinement of every frame.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SplashParams {
    /// Brush radius in pixels.
    pub radius: u32,
    /// Pixels-per-frame divisor.
    pub ppf: f32,
    /// Pixels-per-key-frame divisor, applied to the first frame only.
    pub ppk: f32,
}

impl Default for SplashParams {
    fn default() -> Self {
        Self {
            radius: 5,
            ppf: 1.0,
            ppk: 2.0,
        }
    }
}

impl SplashParams {
    pub fn validate(&self) -> SplashResult<()> {
        if self.radius == 0 {
            return Err(SplashError::config("radius must be >= 1"));
        }
        if self.radius > 255 {
            // one byte on the wire; never truncate silently
            return Err(SplashError::config(format!(
                "radius {} does not fit the wire format (max 255)",
                self.radius
            )));
        }
        if !self.ppf.is_finite() || self.ppf < 1.0 {
            return Err(SplashError::config("ppf must be a finite value >= 1"));
        }
        if !self.ppk.is_finite() || self.ppk < 1.0 {
            return Err(SplashError::config("ppk must be a finite value >= 1"));
        }
        Ok(())
    }
}

/// Per-stream codec state shared by encoder and decoder.
///
/// Owns the running canvas and both error rulers. The canvas starts mid-gray
/// and evolves in place across every frame encoded or decoded through this
/// context; rulers are rebuilt at each frame boundary. Contexts are
/// independent of each other and hold no global state.
pub struct SplashContext {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) params: SplashParams,
    /// RGBX reconstruction, mutated only by the splash engine.
    pub(crate) canvas: Vec<u8>,
    /// Residual error per column; zero marks an exact column.
    pub(crate) x_error: Vec<u32>,
    /// Residual error per row; zero marks an exact row.
    pub(crate) y_error: Vec<u32>,
    pub(crate) frames_encoded: u64,
}

impl SplashContext {
    /// Open a codec context for `width * height` frames.
    pub fn open(width: u32, height: u32, params: SplashParams) -> SplashResult<Self> {
        if width == 0 || height == 0 {
            return Err(SplashError::config(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }
        params.validate()?;

        let pixels = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| SplashError::config("canvas size overflow"))?;

        Ok(Self {
            width: width as usize,
            height: height as usize,
            params,
            canvas: vec![0x7f; pixels],
            x_error: vec![0; width as usize],
            y_error: vec![0; height as usize],
            frames_encoded: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn params(&self) -> SplashParams {
        self.params
    }

    /// Export the current reconstruction, padding byte forced to 255.
    pub fn canvas_frame(&self) -> FrameRgbx {
        let mut data = self.canvas.clone();
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        FrameRgbx {
            width: self.width as u32,
            height: self.height as u32,
            data,
        }
    }
}
