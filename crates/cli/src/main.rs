//! CLI binary to provision a Fabric stack and print its service topology.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use fabnet_container_docker::DockerRunner;
use fabnet_layout::{DEFAULT_STACKS_ROOT, StackLayout};
use fabnet_provisioner::{
    DEFAULT_TOOLS_IMAGE, Provisioner, ProvisionerOptions, write_cryptogen_template,
};
use fabnet_topology::{
    FabconnectConnector, Stack, TopologyOptions, build_topology, build_topology_with,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stack description is not usable
    #[error("invalid stack: {0}")]
    InvalidStack(String),

    /// IO error
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// Provisioning error
    #[error(transparent)]
    Provisioner(#[from] fabnet_provisioner::Error),

    /// Topology could not be rendered
    #[error("failed to render topology: {0}")]
    Render(#[from] serde_yaml::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding one working directory per stack
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_STACKS_ROOT,
        env = "FABNET_STACKS_DIR"
    )]
    stacks_dir: PathBuf,

    /// Image providing cryptogen and configtxgen
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_TOOLS_IMAGE,
        env = "FABNET_TOOLS_IMAGE"
    )]
    tools_image: String,

    /// Container runtime executable
    #[arg(long, global = true, default_value = "docker", env = "FABNET_RUNTIME")]
    runtime: String,

    /// Surface tool output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Generate MSP and TLS material for a stack
    Crypto {
        /// Stack name
        #[arg(long)]
        stack: String,

        /// Cryptogen template; a template matching the stack layout is written if omitted
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Generate the genesis block for a stack
    Genesis {
        /// Stack name
        #[arg(long)]
        stack: String,
    },

    /// Generate crypto material, then the genesis block
    Init {
        /// Stack name
        #[arg(long)]
        stack: String,

        /// Cryptogen template; a template matching the stack layout is written if omitted
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Print the service definitions of a stack as YAML
    Topology {
        /// Stack name
        #[arg(long)]
        stack: String,

        /// Member identifier, in join order
        #[arg(long = "member")]
        members: Vec<String>,

        /// Configure a fabconnect gateway per member
        #[arg(long)]
        fabconnect: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn stack_from_args(name: &str, members: Vec<String>) -> Result<Stack, Error> {
    if name.is_empty() {
        return Err(Error::InvalidStack("stack name is empty".to_string()));
    }
    if name.contains(std::path::is_separator) || name == "." || name == ".." {
        return Err(Error::InvalidStack(format!("`{name}` is not a directory name")));
    }
    // the name ends up in `host:container` volume specs
    if name.contains(':') {
        return Err(Error::InvalidStack(format!("`{name}` contains `:`")));
    }

    let mut seen = HashSet::new();
    let mut stack = Stack::new(name);
    for id in members {
        if id.is_empty() {
            return Err(Error::InvalidStack("member identifier is empty".to_string()));
        }
        if !seen.insert(id.clone()) {
            return Err(Error::InvalidStack(format!("duplicate member `{id}`")));
        }
        stack = stack.with_member(id);
    }

    Ok(stack)
}

fn resolve_stacks_dir(path: &Path) -> Result<PathBuf, Error> {
    std::path::absolute(path).map_err(|e| Error::Io("failed to resolve stacks directory", e))
}

fn layout_for(stacks_dir: &Path, name: &str) -> Result<StackLayout, Error> {
    let stack = stack_from_args(name, Vec::new())?;
    Ok(StackLayout::new(stacks_dir, &stack.name))
}

async fn create_dir(path: &Path) -> Result<(), Error> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::Io("failed to create stack directory", e))
}

async fn generate_crypto(
    provisioner: &Provisioner<DockerRunner>,
    layout: &StackLayout,
    template: Option<PathBuf>,
) -> Result<(), Error> {
    let output = layout.cryptogen_dir();
    create_dir(&output).await?;

    let template = match template {
        Some(template) => template,
        None => {
            let template = layout.cryptogen_template_path();
            write_cryptogen_template(&template).await?;
            template
        }
    };

    provisioner
        .generate_crypto_material(&template, &output)
        .await?;

    Ok(())
}

async fn generate_genesis(
    provisioner: &Provisioner<DockerRunner>,
    layout: &StackLayout,
) -> Result<(), Error> {
    let output = layout.blockchain_dir();
    create_dir(&output).await?;

    provisioner.generate_genesis_block(&output).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let provisioner = Provisioner::new(
        DockerRunner::with_program(args.runtime.clone()),
        ProvisionerOptions {
            tools_image: args.tools_image.clone(),
            verbose: args.verbose,
        },
    );

    let stacks_dir = resolve_stacks_dir(&args.stacks_dir)?;

    match args.command {
        Command::Crypto { stack, template } => {
            let layout = layout_for(&stacks_dir, &stack)?;
            generate_crypto(&provisioner, &layout, template).await?;
        }
        Command::Genesis { stack } => {
            let layout = layout_for(&stacks_dir, &stack)?;
            generate_genesis(&provisioner, &layout).await?;
        }
        Command::Init { stack, template } => {
            let layout = layout_for(&stacks_dir, &stack)?;

            // both tools write under the same directory, so run them one after the other
            generate_crypto(&provisioner, &layout, template).await?;
            generate_genesis(&provisioner, &layout).await?;

            info!("stack {stack} provisioned in {}", layout.stack_dir().display());
        }
        Command::Topology {
            stack,
            members,
            fabconnect,
        } => {
            let stack = stack_from_args(&stack, members)?;
            let options = TopologyOptions::new(&stacks_dir);

            let definitions = if fabconnect {
                build_topology_with(&stack, &options, &FabconnectConnector::default())
            } else {
                build_topology(&stack, &options)
            };

            print!("{}", serde_yaml::to_string(&definitions)?);
        }
    }

    Ok(())
}
