use clap::{Parser, Subcommand};
use rust_pdf417::decoder::bitstream::BitstreamParser;
use rust_pdf417::decoder::tables::{
    NUMBER_OF_CODEWORDS, codeword_pattern, pattern_bit_counts, pattern_count,
};
use rust_pdf417::tools::{binary_stats, load_bitmatrix, parse_codewords, parse_corners};
use rust_pdf417::{Decoder, MacroMetadata};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdf417tool", version, about = "RustPDF417 CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the symbol inside the given corners of an image
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// Inner corners "x,y;x,y;x,y;x,y" (TL;BL;TR;BR), "-" for a missing corner
        #[arg(long, allow_hyphen_values = true)]
        corners: String,
        /// Smallest codeword width in pixels (measured from the image if omitted)
        #[arg(long, requires = "max_width")]
        min_width: Option<usize>,
        /// Largest codeword width in pixels
        #[arg(long, requires = "min_width")]
        max_width: Option<usize>,
        /// Fixed binarization threshold instead of Otsu's method
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Print codeword pattern table statistics
    TableInfo,
    /// Run the bitstream parser on corrected codewords
    DecodeCodewords {
        /// Comma separated codewords, symbol length descriptor first
        #[arg(long)]
        codewords: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Decode {
            image,
            corners,
            min_width,
            max_width,
            threshold,
        } => decode_cmd(&image, &corners, min_width.zip(max_width), threshold),
        Command::TableInfo => {
            table_info_cmd();
            Ok(())
        }
        Command::DecodeCodewords { codewords } => decode_codewords_cmd(&codewords),
    }
}

fn decode_cmd(
    image: &Path,
    corners: &str,
    width: Option<(usize, usize)>,
    threshold: Option<u8>,
) -> Result<(), Box<dyn Error>> {
    let corners = parse_corners(corners)?;
    let binary = load_bitmatrix(image, threshold)?;
    let stats = binary_stats(&binary);
    info!(
        path = %image.display(),
        width = binary.width(),
        height = binary.height(),
        dark_ratio = stats.dark_ratio,
        "loaded image"
    );

    let decoder = match width {
        Some((min, max)) => Decoder::new().with_codeword_width(min, max),
        None => Decoder::new(),
    };
    let start = Instant::now();
    let result = decoder.decode(&binary, &corners);
    let elapsed = start.elapsed();

    match result {
        Ok(result) => {
            println!("{}", result.text);
            println!(
                "ec_level={} errors_corrected={} erasures={} codewords={} time={:.2?}",
                result.ec_level,
                result.errors_corrected,
                result.erasures,
                result.codewords.len(),
                elapsed
            );
            if let Some(metadata) = &result.macro_metadata {
                print_macro(metadata);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Decode failed ({:?}): {}", err.kind(), err);
            Err(err.into())
        }
    }
}

fn table_info_cmd() {
    println!("Patterns: {}", pattern_count());
    for cluster in [0u32, 3, 6] {
        let first = codeword_pattern(cluster, 0).unwrap_or(0);
        let last = codeword_pattern(cluster, NUMBER_OF_CODEWORDS as u32 - 1).unwrap_or(0);
        println!(
            "  Cluster {}: value 0 = {:017b} {:?}, value {} = {:017b} {:?}",
            cluster,
            first,
            pattern_bit_counts(first),
            NUMBER_OF_CODEWORDS - 1,
            last,
            pattern_bit_counts(last)
        );
    }
}

fn decode_codewords_cmd(list: &str) -> Result<(), Box<dyn Error>> {
    let codewords = parse_codewords(list)?;
    let stream = BitstreamParser::decode(&codewords)?;
    println!("{}", stream.text);
    if let Some(metadata) = &stream.macro_metadata {
        print_macro(metadata);
    }
    Ok(())
}

fn print_macro(metadata: &MacroMetadata) {
    println!(
        "Macro segment {} of {} file_id={:?} last={}",
        metadata.segment_index,
        metadata
            .segment_count
            .map_or_else(|| "?".to_string(), |count| count.to_string()),
        metadata.file_id,
        metadata.is_last_segment
    );
    if let Some(name) = &metadata.file_name {
        println!("  file_name={name:?}");
    }
    if let Some(timestamp) = metadata.timestamp {
        println!("  timestamp={timestamp}");
    }
    if let Some(sender) = &metadata.sender {
        println!("  sender={sender:?}");
    }
    if let Some(addressee) = &metadata.addressee {
        println!("  addressee={addressee:?}");
    }
    if let Some(size) = metadata.file_size {
        println!("  file_size={size}");
    }
    if let Some(checksum) = metadata.checksum {
        println!("  checksum={checksum}");
    }
}
