//! Compile a gate list and its input values to R1CS and report the result.
//!
//! ```text
//! cargo run --example gen_r1cs -- circuit.arith circuit.in LIBSNARK --varmap circuit.in.varmap
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use field::{BabyBear, Bls381Fr, Bn254Fr, FieldName, KoalaBear};
use p3_field::PrimeField;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use r1cs_compiler::{CircuitReader, CompilerConfig};

#[derive(Parser)]
#[command(name = "gen_r1cs")]
#[command(about = "Compile an arithmetic circuit to a rank-1 constraint system", long_about = None)]
struct Cli {
    /// Gate list (`.arith`)
    arith: PathBuf,

    /// Input values (`wireId hexValue` per line)
    inputs: PathBuf,

    /// Field: LIBSNARK, AURORA, Bls381, BabyBear or KoalaBear
    field: FieldName,

    /// Write the wire to variable map here
    #[arg(long)]
    varmap: Option<PathBuf>,

    /// Report an unsatisfied system instead of failing
    #[arg(long)]
    allow_unsatisfied: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = if cli.allow_unsatisfied {
        CompilerConfig::lenient()
    } else {
        CompilerConfig::strict()
    };
    let reader = CircuitReader::new(config);
    info!("Compiling {:?} over {}", cli.arith, cli.field);

    match cli.field {
        FieldName::Libsnark | FieldName::Aurora => run::<Bn254Fr>(&reader, &cli),
        FieldName::Bls381 => run::<Bls381Fr>(&reader, &cli),
        FieldName::BabyBear => run::<BabyBear>(&reader, &cli),
        FieldName::KoalaBear => run::<KoalaBear>(&reader, &cli),
    }
}

fn run<F: PrimeField>(reader: &CircuitReader, cli: &Cli) -> Result<()> {
    let compiled = reader
        .compile_files::<F, _, _>(cli.arith.as_path(), cli.inputs.as_path())
        .with_context(|| format!("compiling {}", cli.arith.display()))?;

    println!("constraints:          {}", compiled.num_constraints());
    println!("variables:            {}", compiled.num_variables());
    println!("primary_input_size:   {}", compiled.layout.primary_input_size);
    println!("aux_input_size:       {}", compiled.layout.auxiliary_input_size);
    if !compiled.layout.segment_sizes.is_empty() {
        println!("segment_sizes:        {:?}", compiled.layout.segment_sizes);
    }
    match compiled.satisfied {
        Some(true) => println!("satisfied:            yes"),
        Some(false) => println!("satisfied:            NO"),
        None => {}
    }

    if let Some(path) = &cli.varmap {
        write_varmap(path, |out| compiled.write_varmap(out))?;
        info!("Wrote varmap to {:?}", path);
    }
    Ok(())
}

fn write_varmap(
    path: &Path,
    write: impl FnOnce(BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("writing {}", path.display()))
}
