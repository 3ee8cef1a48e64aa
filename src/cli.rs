//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::decode::{self, StaxError};
use crate::models::{Stack, Stax};
use crate::output::{frame_output_path, save_png, scale_image};
use crate::sheet::composite_frame;

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;
/// The input is a valid PNG with no Stax data. Distinct from a parse
/// failure: plain images report this and callers may treat it as benign.
const EXIT_NO_STAX: u8 = 3;

/// stx - inspect and export Stax sprite sheets embedded in PNG files
#[derive(Parser)]
#[command(name = "stx")]
#[command(about = "Inspect and export Stax sprite sheets embedded in PNG files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the stack/animation/frame structure of a sheet
    Info {
        /// Input PNG file carrying a stAx chunk
        input: PathBuf,

        /// Print the structure as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Composite animation frames and save them as individual PNGs
    Export {
        /// Input PNG file carrying a stAx chunk
        input: PathBuf,

        /// Output directory.
        /// If omitted: {input}_{stack}_{animation}_{index}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only export this stack (default: all stacks)
        #[arg(long)]
        stack: Option<String>,

        /// Only export this animation (default: all animations)
        #[arg(long)]
        animation: Option<String>,

        /// Scale output by integer factor (1-16, default: 1)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: u8,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, json } => run_info(&input, json),
        Commands::Export {
            input,
            output,
            stack,
            animation,
            scale,
        } => run_export(
            &input,
            output.as_deref(),
            stack.as_deref(),
            animation.as_deref(),
            scale,
        ),
    }
}

/// Read the input file and decode its Stax structure, mapping failures to
/// exit codes.
fn load_stax(input: &Path) -> Result<(Vec<u8>, Stax), ExitCode> {
    let bytes = match std::fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };
    match decode::from_png(&bytes) {
        Ok(stax) => Ok((bytes, stax)),
        Err(StaxError::ChunkNotFound) => {
            eprintln!("No Stax data in '{}'", input.display());
            Err(ExitCode::from(EXIT_NO_STAX))
        }
        Err(e) => {
            eprintln!("Error: '{}': {}", input.display(), e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Execute the info command
fn run_info(input: &Path, json: bool) -> ExitCode {
    let (_, stax) = match load_stax(input) {
        Ok(v) => v,
        Err(code) => return code,
    };

    if json {
        match serde_json::to_string_pretty(&stax) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", info_text(&stax));
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Text rendering of a decoded sheet, one line per stack and animation.
pub fn info_text(stax: &Stax) -> String {
    let mut out = format!(
        "slice size: {}x{}\nstacks: {}\n",
        stax.slice_width,
        stax.slice_height,
        stax.stacks.len()
    );
    for stack in &stax.stacks {
        out.push_str(&format!(
            "stack \"{}\" ({} slices)\n",
            stack.name, stack.slice_count
        ));
        for animation in &stack.animations {
            out.push_str(&format!(
                "  animation \"{}\" ({} frames, frame time {})\n",
                animation.name,
                animation.frames.len(),
                animation.frame_time
            ));
        }
    }
    out
}

/// Execute the export command
fn run_export(
    input: &Path,
    output: Option<&Path>,
    stack_filter: Option<&str>,
    animation_filter: Option<&str>,
    scale: u8,
) -> ExitCode {
    let (bytes, stax) = match load_stax(input) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let sheet = match image::load_from_memory(&bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error: Cannot decode pixel data of '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let stacks: Vec<&Stack> = match stack_filter {
        Some(name) => match stax.stack(name) {
            Some(stack) => vec![stack],
            None => {
                eprintln!("Error: No stack named '{}' in '{}'", name, input.display());
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => stax.stacks.iter().collect(),
    };

    let mut exported = 0usize;
    for stack in stacks {
        let animations: Vec<_> = match animation_filter {
            Some(name) => match stack.animation(name) {
                Some(animation) => vec![animation],
                None => {
                    eprintln!(
                        "Error: No animation named '{}' in stack '{}'",
                        name, stack.name
                    );
                    return ExitCode::from(EXIT_ERROR);
                }
            },
            None => stack.animations.iter().collect(),
        };

        for animation in animations {
            for (index, frame) in animation.frames.iter().enumerate() {
                let still = match composite_frame(&sheet, &stax, frame) {
                    Ok(img) => img,
                    Err(e) => {
                        eprintln!(
                            "Error: stack '{}' animation '{}' frame {}: {}",
                            stack.name, animation.name, index, e
                        );
                        return ExitCode::from(EXIT_ERROR);
                    }
                };
                let still = scale_image(still, scale);
                let path = frame_output_path(input, output, &stack.name, &animation.name, index);
                if let Err(e) = save_png(&still, &path) {
                    eprintln!("Error: Failed to save '{}': {}", path.display(), e);
                    return ExitCode::from(EXIT_ERROR);
                }
                println!("Saved '{}'", path.display());
                exported += 1;
            }
        }
    }

    if exported == 0 {
        eprintln!("Error: Nothing to export in '{}'", input.display());
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}
