//! Command line front end: resolve a layout guess against a raw file and
//! write its NRRD header.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use rawguess::{
    hex_dump, peek_bytes, resolve_file, write_layout, DecoderConfig, Endianness, LayoutRequest,
    NrrdHeader, PixelFormat, ResolvedLayout, Result, WriterOptions,
};

/// Guess the layout of raw voxel data files.
#[derive(Parser)]
#[command(name = "rawguess")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a layout guess fits the file
    Inspect {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Number of leading bytes to dump
        #[arg(long, default_value = "100")]
        peek: usize,
    },

    /// Write a NRRD detached header for the file
    Header {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Output header path (default: next to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not replace an existing header
        #[arg(long)]
        no_clobber: bool,
    },
}

/// Layout guess of a raw file.
#[derive(Args)]
struct LayoutArgs {
    /// Raw data file
    input: PathBuf,

    /// Pixel type: "8 bit unsigned", "8 bit signed", "16 bit unsigned",
    /// "16 bit signed", "float", "double" or "24 bit RGB"
    #[arg(short, long, default_value = "8 bit unsigned")]
    pixel_type: PixelFormat,

    /// Multi-byte values are big endian
    #[arg(long)]
    big_endian: bool,

    /// Voxels along X
    #[arg(short = 'x', long, default_value = "200")]
    size_x: u32,

    /// Voxels along Y
    #[arg(short = 'y', long, default_value = "200")]
    size_y: u32,

    /// Voxels along Z
    #[arg(short = 'z', long, default_value = "1")]
    size_z: u32,

    /// Bytes before the first voxel
    #[arg(long, default_value = "0")]
    header_size: u64,

    /// Whole slices to skip after the header
    #[arg(long, default_value = "0")]
    skip_slices: u64,

    /// Voxel spacing along X, Y and Z
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [1.0, 1.0, 1.0])]
    spacing: Vec<f64>,

    /// Number of volumes stored one after the other
    #[arg(long, default_value = "1")]
    volumes: u32,
}

impl LayoutArgs {
    fn to_request(&self) -> Result<LayoutRequest> {
        let endianness = if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        };
        LayoutRequest::builder(&self.input)
            .pixel_format(self.pixel_type)
            .endianness(endianness)
            .size(self.size_x, self.size_y, self.size_z)
            .header_size(self.header_size)
            .skip_slices(self.skip_slices)
            .spacing(self.spacing[0], self.spacing[1], self.spacing[2])
            .number_of_volumes(self.volumes)
            .build()
    }
}

fn print_layout(layout: &ResolvedLayout) {
    let request = layout.request();
    let [x, y, z] = request.size();
    println!("File:              {}", request.path().display());
    println!("Pixel type:        {}", request.pixel_format());
    println!("Slice size:        {} bytes", layout.slice_size_bytes);
    println!("Header + skip:     {} bytes", layout.total_header_bytes);
    println!("Voxel data:        {} bytes", layout.voxel_data_bytes);
    println!("Size:              {} x {} x {} (requested z: {})", x, y, layout.effective_size_z, z);
    println!(
        "Volumes:           {} (requested: {})",
        layout.effective_number_of_volumes,
        request.number_of_volumes()
    );
    println!("Unused bytes:      {}", layout.voxel_data_bytes - layout.used_bytes());
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inspect { layout, peek } => {
            let request = layout.to_request()?;
            let resolved = resolve_file(&request)?;
            print_layout(&resolved);
            let config = DecoderConfig::from_layout(&resolved);
            println!("Decoder extent:    {:?}", config.extent);
            if !resolved.is_empty() {
                print!("\n{}", NrrdHeader::from_layout(&resolved)?);
            }
            if peek > 0 {
                println!("\nFirst {} bytes:", peek);
                print!("{}", hex_dump(&peek_bytes(request.path(), peek)?));
            }
        }
        Commands::Header {
            layout,
            output,
            no_clobber,
        } => {
            let request = layout.to_request()?;
            let resolved = resolve_file(&request)?;
            let options = match output {
                Some(path) => WriterOptions::new(path),
                None => WriterOptions::sidecar_of(&resolved),
            }
            .overwrite(!no_clobber);
            write_layout(&resolved, &options)?;
            println!("{}", options.path().display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("rawguess: {}", e);
        process::exit(1);
    }
}
