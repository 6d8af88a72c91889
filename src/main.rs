mod archive;
mod error;
mod export;
mod model;
mod parser;
mod select;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use model::FormGroup;

#[derive(Parser)]
#[command(
    name = "kmz2csv",
    about = "Extract field-survey placemarks from KMZ archives to CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the forms found in an archive
    Forms {
        /// Path to the .kmz archive
        input: PathBuf,
    },
    /// Export one form group (or all of them) as CSV
    Convert {
        /// Path to the .kmz archive
        input: PathBuf,
        /// Directory the .csv file is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// 1-based index into the sorted form list (prompts when omitted)
        #[arg(short, long)]
        form: Option<usize>,
        /// Export every form, one file per group
        #[arg(long, conflicts_with = "form")]
        all: bool,
    },
}

/// Where the archive comes from and where CSV goes.
struct Config {
    input: PathBuf,
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Forms { input } => run_forms(&input),
        Commands::Convert {
            input,
            out_dir,
            form,
            all,
        } => {
            let config = Config { input, out_dir };
            run_convert(&config, form, all)
        }
    }
}

fn load_groups(input: &Path) -> anyhow::Result<Vec<FormGroup>> {
    let kml = archive::read_kml_bytes(input)?;
    let groups = parser::parse_groups(&kml)?;
    let total: usize = groups.iter().map(|g| g.records.len()).sum();
    info!("{} placemarks in {} forms", total, groups.len());
    Ok(groups)
}

/// Groups sorted by label, the order selection indexes refer to.
fn sorted_groups(groups: &[FormGroup]) -> Vec<&FormGroup> {
    let mut sorted: Vec<&FormGroup> = groups.iter().collect();
    sorted.sort_by(|a, b| a.label.cmp(&b.label));
    sorted
}

fn run_forms(input: &Path) -> anyhow::Result<()> {
    let groups = load_groups(input)?;
    if groups.is_empty() {
        println!("No placemarks found.");
        return Ok(());
    }
    for (i, group) in sorted_groups(&groups).iter().enumerate() {
        println!("{}: {} ({} records)", i + 1, group.label, group.records.len());
    }
    Ok(())
}

fn run_convert(config: &Config, form: Option<usize>, all: bool) -> anyhow::Result<()> {
    let groups = load_groups(&config.input)?;
    if groups.is_empty() {
        println!("No forms found.");
        return Ok(());
    }
    let sorted = sorted_groups(&groups);

    if all {
        for group in &sorted {
            let path = export::export_group(group, &config.out_dir)?;
            println!(
                "{} records from form {:?} written to {}",
                group.records.len(),
                group.label,
                path.display()
            );
        }
        return Ok(());
    }

    let index = match form {
        Some(i) => i,
        None => prompt_for_form(&sorted)?,
    };
    let group = *select::select(&sorted, index)?;
    let path = export::export_group(group, &config.out_dir)?;
    println!(
        "Conversion successful. {} placemarks from form {:?} written to {}",
        group.records.len(),
        group.label,
        path.display()
    );
    Ok(())
}

fn prompt_for_form(sorted: &[&FormGroup]) -> anyhow::Result<usize> {
    println!("\nPlease choose a form to process:");
    for (i, group) in sorted.iter().enumerate() {
        println!("{}: {} ({} records)", i + 1, group.label, group.records.len());
    }
    print!("\nEnter the number of the form: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(select::parse_index(&line)?)
}
