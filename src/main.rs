use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;

use staffscan::{BinarizationMethod, RecognitionPipeline};

/// Thin demo wrapper around the recognition core: runs preprocessing and
/// staff analysis and reports what it found. Full recognition needs a
/// caller-supplied symbol classifier and is library-only.
#[derive(Parser)]
#[command(name = "staffscan")]
#[command(about = "Analyze a scanned staff image: staff systems and symbol candidates")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Binarization method: adaptive, otsu, or a fixed threshold 0-255
    #[arg(long, default_value = "adaptive")]
    binarize: String,

    /// Skip deskew correction
    #[arg(long)]
    no_deskew: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_binarization(arg: &str) -> anyhow::Result<BinarizationMethod> {
    match arg {
        "adaptive" => Ok(BinarizationMethod::Adaptive),
        "otsu" => Ok(BinarizationMethod::Otsu),
        other => {
            let level: u8 = other
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid binarization method: {}", other))?;
            Ok(BinarizationMethod::Fixed(level))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let pipeline = RecognitionPipeline::new()
        .with_binarization(parse_binarization(&args.binarize)?)
        .with_deskew(!args.no_deskew);

    let (_, staves, regions) = pipeline.analyze_staves(&img);

    println!("=== Staff Analysis Results ===");
    println!("Staff systems detected: {}", staves.len());
    for (i, staff) in staves.iter().enumerate() {
        println!(
            "  Staff {}: lines at {:?} (spacing {:.1}px)",
            i + 1,
            staff.lines,
            staff.spacing()
        );
    }

    println!("Symbol candidates: {}", regions.len());
    if args.verbose {
        for (i, region) in regions.iter().enumerate() {
            let bbox = region.bbox();
            println!(
                "  Candidate {} at ({}, {}) {}x{} - {} px",
                i + 1,
                bbox.x,
                bbox.y,
                bbox.width,
                bbox.height,
                region.pixel_count
            );
        }
    }

    Ok(())
}
