pub mod server;

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::state::AppState;

/// A long-running part of the process, restarted whenever it stops.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

const RESTART_DELAY: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct Plugins {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl Plugins {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Spawns one supervisor task per plugin.
  pub fn run(self, app: Arc<AppState>) {
    for plugin in self.plugins {
      tokio::spawn(supervise(plugin, app.clone()));
    }
  }
}

async fn supervise(plugin: Arc<dyn Plugin>, app: Arc<AppState>) {
  let name = plugin.name();
  info!("Plugin `{name}` initialized");

  loop {
    let task = tokio::spawn({
      let (plugin, app) = (plugin.clone(), app.clone());
      async move { plugin.start(app).await }
    });

    match task.await {
      Ok(Ok(())) => warn!("Plugin `{name}` stopped unexpectedly"),
      Ok(Err(err)) => error!("Plugin `{name}` failed: {err:#}"),
      Err(err) if err.is_cancelled() => {
        info!("Plugin `{name}` shut down");
        break;
      }
      Err(_) => error!("Plugin `{name}` panicked"),
    }

    sleep(RESTART_DELAY).await;
    info!("Restarting plugin `{name}`...");
  }
}
