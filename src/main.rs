//! Command-line interface for datastore-codec
//!
//! # Usage Examples
//!
//! ```bash
//! # Encode a key (`Kind:123` → id, `Kind:name` or `Kind:'123'` → name, `Kind` → incomplete)
//! datastore-codec encode-key --namespace Test Company:acme Person
//!
//! # Decode a wire key read from stdin
//! echo '{"path_element":[{"kind":"Kind","id":1}]}' | datastore-codec decode-key -
//!
//! # Encode a native JSON entity with index hints from a registry file
//! DATASTORE_KINDS=kinds.yaml datastore-codec encode-entity --kind Person person.json
//!
//! # Decode a wire entity or a batch of lookup results
//! datastore-codec decode-entity entity.json
//! datastore-codec decode-results results.json
//!
//! # Encode a query descriptor
//! datastore-codec encode-query --pretty query.yaml
//!
//! # Validate a registry file
//! datastore-codec check-kinds kinds.yaml
//! ```

use clap::{Parser, Subcommand};
use datastore_codec::{
    check_kinds, decode_entity, decode_key, decode_results, encode_entity, encode_key,
    encode_query, read_input, OutputOpts, RegistryOpts,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datastore-codec")]
#[command(about = "Convert keys, entities and queries to and from the datastore wire format")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    output: OutputOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a wire key from path elements
    EncodeKey {
        /// Namespace (empty for the default namespace)
        #[arg(long, default_value = "")]
        namespace: String,

        /// Path elements: `Kind:123`, `Kind:name`, `Kind:'123'` (numeric name) or a trailing bare `Kind`
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Decode a wire key
    DecodeKey {
        /// Input file, `-` for stdin
        input: PathBuf,
    },

    /// Encode a native JSON entity into a wire entity
    EncodeEntity {
        /// Kind whose registered index hints should be applied
        #[arg(long)]
        kind: Option<String>,

        /// Namespace the kind is registered under
        #[arg(long)]
        namespace: Option<String>,

        #[command(flatten)]
        registry: RegistryOpts,

        /// Input file, `-` for stdin
        input: PathBuf,
    },

    /// Decode a wire entity into native JSON
    DecodeEntity {
        /// Input file, `-` for stdin
        input: PathBuf,
    },

    /// Decode a batch of wire entity results into key/data pairs
    DecodeResults {
        /// Input file, `-` for stdin
        input: PathBuf,
    },

    /// Encode a YAML/JSON query descriptor into a wire query
    EncodeQuery {
        /// Input file, `-` for stdin
        input: PathBuf,
    },

    /// Validate a kind registry file and list its kinds
    CheckKinds {
        /// Registry YAML file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = cli.output;

    let rendered = match cli.command {
        Commands::EncodeKey { namespace, path } => output.render(&encode_key(&namespace, &path)?)?,
        Commands::DecodeKey { input } => output.render(&decode_key(&read_input(&input)?)?)?,
        Commands::EncodeEntity {
            kind,
            namespace,
            registry,
            input,
        } => {
            let registry = registry.load()?;
            let proto = encode_entity(
                &read_input(&input)?,
                &registry,
                namespace.as_deref(),
                kind.as_deref(),
            )?;
            output.render(&proto)?
        }
        Commands::DecodeEntity { input } => {
            output.render(&decode_entity(&read_input(&input)?)?)?
        }
        Commands::DecodeResults { input } => {
            output.render(&decode_results(&read_input(&input)?)?)?
        }
        Commands::EncodeQuery { input } => output.render(&encode_query(&read_input(&input)?)?)?,
        Commands::CheckKinds { file } => output.render(&check_kinds(&file)?)?,
    };

    println!("{rendered}");
    Ok(())
}
