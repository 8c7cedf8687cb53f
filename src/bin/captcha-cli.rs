use core::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use clap::Parser;

use captcha::{Config, RandomSource, Settings};

#[derive(Parser)]
struct Opts {
    /// Directory to write images into.
    #[clap(short, long, default_value = ".")]
    output: PathBuf,
    /// Number of images to generate.
    #[clap(short = 'n', long, default_value = "1")]
    count: usize,
    /// Hex seed for reproducible output; defaults to the clock.
    #[clap(long)]
    seed: Option<Seed>,
    /// JSON file of settings; flags given on the command line take precedence.
    #[clap(long)]
    settings: Option<PathBuf>,
    /// Font file to use instead of the bundled fonts. May be repeated.
    #[clap(long = "font")]
    fonts: Vec<PathBuf>,
    #[clap(flatten)]
    overrides: Settings,
}

#[derive(Copy, Clone)]
struct Seed(pub u64);
impl FromStr for Seed {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = if s.len() % 2 == 1 {
            hex::decode(format!("0{}", s))?
        } else {
            hex::decode(s)?
        };
        anyhow::ensure!(bytes.len() <= 8, "seed must be at most 8 bytes");
        // Left-pad so that "ff" and "00ff" mean the same seed.
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Seed(u64::from_be_bytes(buf)))
    }
}
impl Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.to_be_bytes()))
    }
}
impl Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

/// The challenge text with everything but letters and digits replaced, so that a custom
/// character list cannot steer the output path.
fn file_stem(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn load_settings(opts: &Opts) -> anyhow::Result<Settings> {
    let from_file = match &opts.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings at {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse settings at {}", path.display()))?
        }
        None => Settings::default(),
    };
    Ok(from_file.merge(opts.overrides.clone()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let mut config = Config::new().context("Failed to load bundled fonts")?;
    config.apply(&load_settings(&opts)?)?;
    if !opts.fonts.is_empty() {
        config.set_fonts_from_paths(&opts.fonts)?;
    }
    if let Some(seed) = opts.seed {
        log::info!("using seed {}", seed);
        config.set_random_source(Arc::new(RandomSource::from_seed(seed.0)));
    }

    std::fs::create_dir_all(&opts.output)
        .with_context(|| format!("Failed to create {}", opts.output.display()))?;
    for _ in 0..opts.count {
        let challenge = config.create_image()?;
        let filename = opts.output.join(format!("{}.png", file_stem(&challenge.text)));
        challenge
            .image
            .write_png(&filename)
            .with_context(|| format!("Failed to write {}", filename.display()))?;
        log::info!("wrote png: {}", filename.display());
        println!("{}", challenge.text);
    }
    Ok(())
}
