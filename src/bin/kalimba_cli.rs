// kalimba_cli - recognize a kalimba tone in a WAV clip
//
// Reads a WAV file, runs the recognition pipeline once, and prints the JSON
// outcome to stdout. Exit code is nonzero only for startup or input errors;
// negative recognition outcomes are still exit code 0.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use kalimba_tone::{ModelContext, ModelPaths, Pipeline, PipelineConfig, Waveform};

#[derive(Parser)]
#[command(name = "kalimba_cli", about = "Kalimba tone recognition")]
struct Args {
    /// WAV clip to analyze (mono or downmixed, 22050 Hz)
    wav: PathBuf,

    /// ONNX tone classifier model
    #[arg(long)]
    tone_model: PathBuf,

    /// Feature scaler JSON (pre-filter; requires --one-class)
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// One-class boundary model JSON (pre-filter; requires --scaler)
    #[arg(long)]
    one_class: Option<PathBuf>,

    /// Pipeline configuration JSON (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path),
        None => PipelineConfig::default(),
    };

    let context = ModelContext::load(&ModelPaths {
        tone_model: args.tone_model.clone(),
        scaler: args.scaler.clone(),
        one_class: args.one_class.clone(),
    })
    .context("failed to load models")?;

    let pipeline = Pipeline::new(config.clone(), context);
    let waveform = read_wav(&args.wav, config.sample_rate)?;

    let outcome = pipeline.recognize(&waveform);
    println!("{}", serde_json::to_string(&outcome)?);

    Ok(())
}

/// Decode a WAV file into a mono f32 waveform at the expected sample rate
///
/// Multi-channel files are downmixed by averaging; resampling is out of scope,
/// so a clip at any other rate is refused.
fn read_wav(path: &PathBuf, expected_rate: u32) -> anyhow::Result<Waveform> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let spec = reader.spec();

    if spec.sample_rate != expected_rate {
        bail!(
            "{:?} is {} Hz; resample to {} Hz before running recognition",
            path,
            spec.sample_rate,
            expected_rate
        );
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels <= 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    log::info!(
        "[CLI] Read {:?}: {} samples, {} channel(s), {} Hz",
        path,
        samples.len(),
        spec.channels,
        spec.sample_rate
    );

    Ok(Waveform::new(samples, spec.sample_rate))
}
