use std::{fs, path::PathBuf};

use forum_store::{
    Config, Repository,
    storage::{config_path, repository::CONFIG_DIR},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Add the starter forums
    #[arg(long)]
    seed: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        if config_dir.exists() {
            anyhow::bail!("Forum store already initialised (found existing {CONFIG_DIR} directory)");
        }

        fs::create_dir_all(&config_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_DIR} directory: {e}"))?;

        Config::default()
            .save(&config_path(&root))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        let mut repository = Repository::open(root.clone())?;
        if repository.path().exists() {
            println!(
                "{}",
                format!(
                    "Keeping existing snapshot {}",
                    repository.config().storage_file()
                )
                .dim()
            );
        } else {
            if self.seed {
                repository.seed_defaults()?;
            }
            repository.write()?;
        }

        println!(
            "{}",
            format!("Initialised forum store in {}", root.display()).success()
        );
        println!("  Created: {CONFIG_DIR}/config.toml");
        println!("  Snapshot: {}", repository.config().storage_file());
        println!("  Forums: {}", repository.store().forums().len());

        Ok(())
    }
}
