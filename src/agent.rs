//! Voice agent worker launched alongside the API

use crate::config::AgentConfig;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Running voice agent process
pub struct AgentProcess {
    child: Child,
}

impl AgentProcess {
    /// Spawn the agent if enabled; failures are logged, never fatal
    pub fn launch(config: &AgentConfig) -> Option<Self> {
        if !config.enabled {
            info!("Voice agent launch disabled");
            return None;
        }

        let spawned = Command::new(&config.command)
            .args(&config.args)
            .current_dir(&config.working_dir)
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                info!(
                    "Voice agent started: {} {} (pid={:?})",
                    config.command,
                    config.args.join(" "),
                    child.id()
                );
                Some(Self { child })
            }
            Err(e) => {
                warn!("Failed to start voice agent {}: {}", config.command, e);
                None
            }
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kill the agent and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop voice agent: {}", e);
        } else {
            info!("Voice agent stopped");
        }
    }
}
