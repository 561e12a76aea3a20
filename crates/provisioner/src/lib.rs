//! Generates the credential material and genesis block a stack's services mount.
//!
//! Both steps run a Fabric tool inside a throwaway container through an injected
//! [`ContainerRunner`]. Each step is a single attempt: there are no retries and a
//! failed run leaves whatever the tool already wrote in place.
//!
//! Both tools write under the stack's `blockchain` directory, so the two steps of
//! one stack must not run concurrently.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use fabnet_container::{ContainerRunner, RunOptions};
use fabnet_layout::{CryptogenTemplate, GENESIS_BLOCK_FILE};
use tracing::{error, info};

/// Image bundling `cryptogen` and `configtxgen`.
pub const DEFAULT_TOOLS_IMAGE: &str = "hyperledger/fabric-tools";

/// Profile the genesis block is generated from.
pub const GENESIS_PROFILE: &str = "SampleDevModeSolo";

/// The single channel the network is bootstrapped with.
pub const CHANNEL_ID: &str = "firefly";

static CRYPTOGEN: &str = "cryptogen";
static CONFIGTXGEN: &str = "configtxgen";

static TEMPLATE_MOUNT: &str = "/etc/template.yml";
static CRYPTO_OUTPUT_MOUNT: &str = "/output";
static GENESIS_MOUNT: &str = "/genesis";

/// Options for configuring a [`Provisioner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionerOptions {
    /// Image the tools are run from.
    pub tools_image: String,

    /// Whether tool output is surfaced.
    pub verbose: bool,
}

impl Default for ProvisionerOptions {
    fn default() -> Self {
        Self {
            tools_image: DEFAULT_TOOLS_IMAGE.to_string(),
            verbose: false,
        }
    }
}

/// Runs the credential and genesis tools against a container runner.
#[derive(Clone, Debug)]
pub struct Provisioner<R>
where
    R: ContainerRunner,
{
    runner: R,
    options: ProvisionerOptions,
}

impl<R> Provisioner<R>
where
    R: ContainerRunner,
{
    /// Creates a provisioner using `runner`.
    pub const fn new(runner: R, options: ProvisionerOptions) -> Self {
        Self { runner, options }
    }

    /// The injected runner.
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Argument vector generating identities from `config_path` into `output_path`.
    pub fn crypto_material_args(&self, config_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{TEMPLATE_MOUNT}", config_path.display()),
            "-v".to_string(),
            format!("{}:{CRYPTO_OUTPUT_MOUNT}", output_path.display()),
            self.options.tools_image.clone(),
            CRYPTOGEN.to_string(),
            "generate".to_string(),
            "--config".to_string(),
            TEMPLATE_MOUNT.to_string(),
            "--output".to_string(),
            CRYPTO_OUTPUT_MOUNT.to_string(),
        ]
    }

    /// Argument vector writing the genesis block into `output_path`.
    pub fn genesis_block_args(&self, output_path: &Path) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{GENESIS_MOUNT}", output_path.display()),
            self.options.tools_image.clone(),
            CONFIGTXGEN.to_string(),
            "-outputBlock".to_string(),
            format!("{GENESIS_MOUNT}/{GENESIS_BLOCK_FILE}"),
            "-profile".to_string(),
            GENESIS_PROFILE.to_string(),
            "-channelID".to_string(),
            CHANNEL_ID.to_string(),
        ]
    }

    /// Generates per-organization, per-node MSP and TLS material.
    ///
    /// `output_path` must already exist and be writable. Relative paths are
    /// resolved against the current directory before being mounted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provisioning`] if the tool cannot be started or exits non-zero.
    pub async fn generate_crypto_material(
        &self,
        config_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        let working_dir = config_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let args = self.crypto_material_args(
            &mount_source(config_path)?,
            &mount_source(output_path)?,
        );

        self.run(CRYPTOGEN, working_dir, &args).await?;

        info!("generated crypto material in {}", output_path.display());

        Ok(())
    }

    /// Generates the genesis block at `output_path/genesis_block.pb`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provisioning`] if the tool cannot be started or exits non-zero.
    pub async fn generate_genesis_block(&self, output_path: &Path) -> Result<()> {
        let args = self.genesis_block_args(&mount_source(output_path)?);

        self.run(CONFIGTXGEN, output_path, &args).await?;

        info!(
            "generated genesis block {}",
            output_path.join(GENESIS_BLOCK_FILE).display()
        );

        Ok(())
    }

    async fn run(&self, tool: &'static str, working_dir: &Path, args: &[String]) -> Result<()> {
        let options = RunOptions::new(working_dir).with_verbose(self.options.verbose);

        let outcome = self
            .runner
            .run_command(&options, args)
            .await
            .map_err(|e| {
                error!("failed to launch {tool}: {e}");
                Error::Provisioning {
                    tool,
                    reason: e.to_string(),
                }
            })?;

        if !outcome.success() {
            let reason = outcome.exit_code.map_or_else(
                || "terminated by signal".to_string(),
                |code| format!("exited with status {code}"),
            );
            error!("{tool} {reason}");
            return Err(Error::Provisioning { tool, reason });
        }

        Ok(())
    }
}

// the runtime treats a relative `-v` source as a named volume
fn mount_source(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::Io("failed to resolve mount source", e))
}

/// Writes the cryptogen template matching the fixed network layout to `path`.
///
/// # Errors
///
/// Returns an error if the template cannot be rendered or written.
pub async fn write_cryptogen_template(path: &Path) -> Result<()> {
    let yaml = CryptogenTemplate::for_network().to_yaml()?;

    tokio::fs::write(path, yaml)
        .await
        .map_err(|e| Error::Io("failed to write cryptogen template", e))?;

    Ok(())
}
