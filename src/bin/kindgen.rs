//! kindgen CLI
//!
//! Command-line interface for building resource field manifests from OpenAPI
//! documents.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use kindgen::{
    extract_operation, generate, load_document_auto, manifest_json, write_manifest,
    GenerateError, GeneratorConfig, Operation, OperationPaths,
};
use log::info;

#[derive(Parser)]
#[command(name = "kindgen")]
#[command(about = "Reconcile OpenAPI operations into a typed resource field catalog")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the field manifest for one resource kind
    Generate {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Resource kind (e.g. ProjectAccessToken)
        #[arg(long)]
        kind: String,

        /// Resource API version (e.g. v1alpha1)
        #[arg(long = "api-version")]
        api_version: String,

        /// Path of the create (POST) operation
        #[arg(long)]
        create: String,

        /// Path of the partial update (PATCH) operation
        #[arg(long)]
        update: Option<String>,

        /// Path of the full replace (PUT) operation, used when --update is absent
        #[arg(long)]
        replace: Option<String>,

        /// Path of the delete (DELETE) operation
        #[arg(long)]
        delete: Option<String>,

        /// Directory for <kind>_fields.json (stdout if not specified)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Fail when a field's schema type is unsupported
        #[arg(long)]
        strict: bool,
    },

    /// Print the fields one operation contributes
    Extract {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Operation path (e.g. /projects/{id}/access_tokens)
        #[arg(long)]
        path: String,

        /// Operation to extract
        #[arg(long, short, value_enum)]
        op: OpArg,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OpArg {
    Create,
    Replace,
    Update,
    Delete,
}

impl From<OpArg> for Operation {
    fn from(value: OpArg) -> Self {
        match value {
            OpArg::Create => Operation::Create,
            OpArg::Replace => Operation::Replace,
            OpArg::Update => Operation::PartialUpdate,
            OpArg::Delete => Operation::Delete,
        }
    }
}

struct GenerateArgs {
    schema: String,
    kind: String,
    api_version: String,
    operations: OperationPaths,
    output_dir: Option<PathBuf>,
    pretty: bool,
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            schema,
            kind,
            api_version,
            create,
            update,
            replace,
            delete,
            output_dir,
            pretty,
            strict,
        } => run_generate(GenerateArgs {
            schema,
            kind,
            api_version,
            operations: OperationPaths {
                create,
                update,
                replace,
                delete,
            },
            output_dir,
            pretty,
            strict,
        }),

        Commands::Extract {
            schema,
            path,
            op,
            pretty,
        } => run_extract(&schema, &path, op.into(), pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), u8> {
    let GenerateArgs {
        schema,
        kind,
        api_version,
        operations,
        output_dir,
        pretty,
        strict,
    } = args;

    let (config, manifest) =
        GeneratorConfig::validated(schema, kind, api_version, operations, output_dir)
            .map_err(GenerateError::from)
            .and_then(|config| generate(&config, strict).map(|manifest| (config, manifest)))
            .map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;

    let json_output = manifest_json(&manifest, pretty).map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match &config.output_dir {
        Some(dir) => {
            let path =
                write_manifest(dir, &config.manifest_file_name(), &json_output).map_err(|e| {
                    eprintln!("Error: {}", e);
                    e.exit_code() as u8
                })?;
            info!("wrote {}", path.display());
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_extract(
    schema_source: &str,
    path: &str,
    operation: Operation,
    pretty: bool,
) -> Result<(), u8> {
    let doc = load_document_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let view = extract_operation(&doc, path, operation).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&view)
    } else {
        serde_json::to_string(&view)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", json_output);
    Ok(())
}
