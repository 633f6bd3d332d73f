///! Screen manager - activate screen sections at startup, stop them on shutdown
///!
///! Each activation runs in its own task so one slow upstream does not hold
///! back the others. Polling after activation is owned by the binders.
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::binder::Section;
use super::screens::Screens;

/// Longest wait for the first load of one section
const ACTIVATION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ScreenManager {
    screens: Arc<Screens>,
    active_screens: Vec<String>,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScreenManager {
    pub fn new(screens: Arc<Screens>, active_screens: Vec<String>) -> Self {
        Self {
            screens,
            active_screens,
            task_handles: Vec::new(),
        }
    }

    /// Start activating every section of the configured screens
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        tracing::info!("Starting screen manager...");

        if let Some(unknown) = self.active_screens.iter().find(|name| self.screens.get(name).is_none()) {
            anyhow::bail!("Unknown screen '{}' in active_screens", unknown);
        }

        for name in &self.active_screens {
            let Some(screen) = self.screens.get(name) else {
                continue;
            };

            for section in screen.sections() {
                let handle = Self::start_activation_task(screen.name, section.clone());
                self.task_handles.push(handle);
            }
        }

        tracing::info!(
            "Activating {} sections across {} screens",
            self.task_handles.len(),
            self.active_screens.len()
        );

        Ok(())
    }

    fn start_activation_task(screen: &'static str, section: Arc<dyn Section>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            match tokio::time::timeout(ACTIVATION_TIMEOUT, section.activate()).await {
                Ok(()) => tracing::debug!(
                    "Section {}/{} ready in {:.1}s",
                    screen,
                    section.name(),
                    started.elapsed().as_secs_f64()
                ),
                Err(_) => tracing::warn!(
                    "Section {}/{} still loading after {} seconds",
                    screen,
                    section.name(),
                    ACTIVATION_TIMEOUT.as_secs()
                ),
            }
        })
    }

    pub fn screens(&self) -> &Arc<Screens> {
        &self.screens
    }

    /// Stop pending activations and every section's polling
    pub async fn shutdown(self) {
        tracing::info!("Shutting down screen manager...");

        for handle in self.task_handles {
            handle.abort();
        }
        for section in self.screens.sections() {
            section.deactivate();
        }

        tracing::info!("All screen sections stopped");
    }
}
