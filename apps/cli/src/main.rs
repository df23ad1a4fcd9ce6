use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use spherediff::{
    io::{self, StoredField},
    FieldKind, OptionKey, OptionOverrides, Options, OptionsRegistry,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Finite differences on the sphere", long_about = None)]
struct Cli {
    /// Options file (TOML, or YAML when the extension is .yaml/.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override an option, e.g. `--set lon_dim=longitude`
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    set: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Io {
    /// Input field as JSON
    #[arg(short, long)]
    input: PathBuf,
    /// Output path; printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Derivative along longitude
    Dlon {
        #[command(flatten)]
        io: Io,
    },

    /// Derivative along latitude
    Dlat {
        #[command(flatten)]
        io: Io,
        /// Treat the field as the meridional component of a vector
        #[arg(long)]
        vector_component: bool,
    },

    /// Zonal and meridional derivatives of a scalar field
    Grad {
        #[command(flatten)]
        io: Io,
    },

    /// Horizontal divergence of a vector field
    Div {
        #[arg(long)]
        u: PathBuf,
        #[arg(long)]
        v: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective options
    Options,
}

fn load_options(path: &Path) -> Result<Options> {
    let yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let opts = if yaml {
        Options::from_yaml_path(path)
    } else {
        Options::from_toml_path(path)
    };
    opts.with_context(|| format!("loading options from {}", path.display()))
}

fn emit<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => io::write_json(path, value)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", io::to_json_string(value)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let base = match &cli.config {
        Some(path) => load_options(path)?,
        None => Options::default(),
    };
    let mut registry = OptionsRegistry::new(base);
    let overrides = OptionOverrides::from_pairs(cli.set.iter().map(String::as_str))?;
    registry.set_options(&overrides)?;
    let call = OptionOverrides::new();

    match cli.command {
        Command::Dlon { io: paths } => {
            let field = io::load_field(&paths.input)?;
            let out = registry.d_dlon(&field, &call)?;
            emit(paths.output.as_deref(), &StoredField::from(&out))?;
        }
        Command::Dlat {
            io: paths,
            vector_component,
        } => {
            let field = io::load_field(&paths.input)?;
            let out = registry.d_dlat(&field, FieldKind::from(vector_component), &call)?;
            emit(paths.output.as_deref(), &StoredField::from(&out))?;
        }
        Command::Grad { io: paths } => {
            let field = io::load_field(&paths.input)?;
            let (dx, dy) = registry.gradient(&field, &call)?;
            let pair = [StoredField::from(&dx), StoredField::from(&dy)];
            emit(paths.output.as_deref(), &pair)?;
        }
        Command::Div { u, v, output } => {
            let u = io::load_field(&u)?;
            let v = io::load_field(&v)?;
            let out = registry.divergence(&u, &v, &call)?;
            emit(output.as_deref(), &StoredField::from(&out))?;
        }
        Command::Options => {
            for key in OptionKey::ALL {
                println!("{} = {}", key.as_str(), registry.get_option(key));
            }
        }
    }
    tracing::info!(target: "spherediff", "done");
    Ok(())
}
