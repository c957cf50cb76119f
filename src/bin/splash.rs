use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use splash_codec::{FrameRgbx, SplashContext, SplashParams};

#[derive(Parser, Debug)]
#[command(name = "splash", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one or more PNG frames into a splash stream.
    Encode(EncodeArgs),
    /// Decode a splash stream back into PNG frames.
    Decode(DecodeArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Output stream path.
    #[arg(long)]
    out: PathBuf,

    /// Brush radius in pixels (1..=255).
    #[arg(long, default_value_t = 5)]
    radius: u32,

    /// Pixels-per-frame divisor; 1 refines every frame fully.
    #[arg(long, default_value_t = 1.0)]
    ppf: f32,

    /// Pixels-per-key-frame divisor, applied to the first frame.
    #[arg(long, default_value_t = 2.0)]
    ppk: f32,

    /// JSON file with codec parameters; overrides the flags above.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Input PNG frames, encoded in order. All must share dimensions.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input stream path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory for the decoded frame_NNNN.png files.
    #[arg(long)]
    out_dir: PathBuf,
}

/// Stream container: magic, width, height, frame count, then one
/// length-prefixed packet per frame. Packets alone carry neither their own
/// length nor the frame dimensions.
const STREAM_MAGIC: [u8; 4] = *b"SPLV";
const STREAM_HEADER_LEN: usize = 16;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
    }
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read params '{}'", path.display()))?;
            serde_json::from_str::<SplashParams>(&text).with_context(|| "parse params JSON")?
        }
        None => SplashParams {
            radius: args.radius,
            ppf: args.ppf,
            ppk: args.ppk,
        },
    };

    let mut frames = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        frames.push(load_png(path)?);
    }
    let (width, height) = (frames[0].width, frames[0].height);
    for (path, frame) in args.inputs.iter().zip(&frames) {
        if frame.width != width || frame.height != height {
            anyhow::bail!(
                "'{}' is {}x{}, expected {}x{}",
                path.display(),
                frame.width,
                frame.height,
                width,
                height
            );
        }
    }

    let mut ctx = SplashContext::open(width, height, params)?;

    let mut stream = Vec::new();
    stream.extend_from_slice(&STREAM_MAGIC);
    stream.extend_from_slice(&width.to_le_bytes());
    stream.extend_from_slice(&height.to_le_bytes());
    stream.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    for frame in &frames {
        let packet = ctx.encode(frame)?;
        stream.extend_from_slice(&(packet.data.len() as u32).to_le_bytes());
        stream.extend_from_slice(&packet.data);
    }

    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    fs::write(&args.out, &stream).with_context(|| format!("write '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} frames)", args.out.display(), frames.len());
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let stream =
        fs::read(&args.in_path).with_context(|| format!("read '{}'", args.in_path.display()))?;
    anyhow::ensure!(
        stream.len() >= STREAM_HEADER_LEN && stream[..4] == STREAM_MAGIC,
        "'{}' is not a splash stream",
        args.in_path.display()
    );

    let width = read_u32_le(&stream, 4)?;
    let height = read_u32_le(&stream, 8)?;
    let count = read_u32_le(&stream, 12)?;

    let mut ctx = SplashContext::open(width, height, SplashParams::default())?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut ofs = STREAM_HEADER_LEN;
    for idx in 0..count {
        let len = read_u32_le(&stream, ofs)? as usize;
        ofs += 4;
        let packet = stream
            .get(ofs..ofs + len)
            .ok_or_else(|| anyhow::anyhow!("stream ends inside packet {idx}"))?;
        ofs += len;

        let frame = ctx.decode(packet)?;
        let out = args.out_dir.join(format!("frame_{idx:04}.png"));
        image::save_buffer_with_format(
            &out,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out.display()))?;
    }

    eprintln!("wrote {} frames to {}", count, args.out_dir.display());
    Ok(())
}

fn load_png(path: &Path) -> anyhow::Result<FrameRgbx> {
    let img = image::open(path)
        .with_context(|| format!("open image '{}'", path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    Ok(FrameRgbx::from_bytes(w, h, img.into_raw())?)
}

fn read_u32_le(bytes: &[u8], ofs: usize) -> anyhow::Result<u32> {
    let b = bytes
        .get(ofs..ofs + 4)
        .ok_or_else(|| anyhow::anyhow!("truncated stream header at offset {ofs}"))?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
