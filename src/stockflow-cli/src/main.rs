// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, debug};

use stockflow_engine::provider::{self, ImageInput, ProviderConfig, ProviderKind};
use stockflow_engine::{
    LayoutConfig, ModelSummary, XmileOptions, datamodel, json, write_xmile_file,
};

const EXIT_FAILURE: i32 = 1;
const DEFAULT_OUTPUT: &str = "Exported_SD_Model.xmile";

macro_rules! die(
    ($($arg:tt)*) => { {
        eprintln!($($arg)*);
        std::process::exit(EXIT_FAILURE)
    } }
);

#[derive(Parser)]
#[command(name = "stockflow", version)]
#[command(about = "Convert stock and flow diagrams into XMILE models")]
struct Cli {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the extraction provider (defaults to OPENAI_API_KEY or GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a JSON model graph into an XMILE file
    Convert {
        /// JSON model with stocks, flows, auxiliaries and connectors
        input: PathBuf,

        /// Path to write the XMILE model to
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        #[command(flatten)]
        document: DocumentArgs,
    },
    /// Write the extraction request for a diagram image
    Request {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Image of a stock and flow diagram
        image: PathBuf,

        /// Path to write the JSON request body to (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a saved provider response into an XMILE file
    Ingest {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Raw response body returned by the provider
        response: PathBuf,

        /// Path to write the XMILE model to (default: SD_Model_<PROVIDER>_<mm-dd>.xmile)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the extracted JSON model
        #[arg(long, value_name = "FILE")]
        save_json: Option<PathBuf>,

        #[command(flatten)]
        document: DocumentArgs,
    },
    /// Print the JSON Schema for input models
    Schema,
}

#[derive(Args)]
struct ProviderArgs {
    /// Extraction service: openai or gemini
    #[arg(short, long)]
    provider: ProviderKind,

    /// Override the provider's default model
    #[arg(long)]
    model: Option<String>,
}

#[derive(Args)]
struct DocumentArgs {
    /// Name written to the XMILE header
    #[arg(long)]
    name: Option<String>,
}

impl DocumentArgs {
    fn options(&self) -> XmileOptions {
        let mut options = XmileOptions::default();
        if let Some(ref name) = self.name {
            options.model_name = name.clone();
        }
        options
    }
}

fn provider_config(args: &ProviderArgs, api_key: Option<&str>) -> ProviderConfig {
    let api_key = match api_key {
        Some(key) => key.to_owned(),
        None => std::env::var(args.provider.api_key_env()).unwrap_or_default(),
    };
    let mut config = ProviderConfig::new(args.provider, api_key);
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    config
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn export(model: &datamodel::Model, output: &Path, options: &XmileOptions) -> Result<()> {
    println!();
    println!("{}", ModelSummary::from(model));

    write_xmile_file(output, model, options, &LayoutConfig::default())
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    println!("XMILE file '{}' generated successfully!", output.display());
    Ok(())
}

fn convert(input: &Path, output: &Path, document: &DocumentArgs) -> Result<()> {
    let file = File::open(input).with_context(|| format!("failed to open '{}'", input.display()))?;
    let model = json::Model::from_reader(BufReader::new(file))
        .with_context(|| format!("model '{}'", input.display()))?;

    export(&datamodel::Model::from(model), output, &document.options())
}

fn request(
    args: &ProviderArgs,
    api_key: Option<&str>,
    image: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let image = ImageInput::from_path(image)?;
    let provider = provider::provider_for(provider_config(args, api_key));
    let request = provider.build_request(&image)?;

    let body = serde_json::to_string_pretty(&request.body)?;
    match output {
        Some(path) => {
            fs::write(path, body)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            eprintln!("request body written to '{}'", path.display());
        }
        None => println!("{body}"),
    }

    eprintln!("POST {}", request.url);
    for (name, _) in request.headers.iter() {
        eprintln!("header: {name}");
    }
    for (name, _) in request.query.iter() {
        eprintln!("query parameter: {name}");
    }
    Ok(())
}

fn ingest(
    args: &ProviderArgs,
    api_key: Option<&str>,
    response: &Path,
    output: Option<PathBuf>,
    save_json: Option<&Path>,
    document: &DocumentArgs,
) -> Result<()> {
    let body = fs::read_to_string(response)
        .with_context(|| format!("failed to read '{}'", response.display()))?;

    let provider = provider::provider_for(provider_config(args, api_key));
    let model = provider
        .parse_response(&body)
        .with_context(|| format!("response '{}'", response.display()))?;

    let model_json = model.to_json_pretty()?;
    debug!("extracted model data:\n{model_json}");
    if let Some(path) = save_json {
        fs::write(path, &model_json)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        println!("Extracted model saved to '{}'", path.display());
    }

    let output = output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%m-%d");
        PathBuf::from(format!("SD_Model_{}_{}.xmile", args.provider, timestamp))
    });

    export(&datamodel::Model::from(model), &output, &document.options())
}

fn schema() -> Result<()> {
    println!("{}", json::generate_schema_json()?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let api_key = cli.api_key.as_deref();
    match cli.command {
        Command::Convert {
            input,
            output,
            document,
        } => convert(&input, &output, &document),
        Command::Request {
            provider,
            image,
            output,
        } => request(&provider, api_key, &image, output.as_deref()),
        Command::Ingest {
            provider,
            response,
            output,
            save_json,
            document,
        } => ingest(
            &provider,
            api_key,
            &response,
            output,
            save_json.as_deref(),
            &document,
        ),
        Command::Schema => schema(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        die!("error: {:#}", err);
    }
}
