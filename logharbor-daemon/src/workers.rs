//! Worker assembly and lifecycle.
//!
//! Three independent tasks share one [`LogBuffer`]:
//!
//! 1. Tailer (writes the buffer)
//! 2. Query server (reads the buffer)
//! 3. Rotation engine (signals the tailer through its handle)
//!
//! Each task owns a child of the root cancellation token so a reload can
//! replace one worker without touching the others. The buffer survives
//! reloads; only its capacity is adjusted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use logharbor_core::config::LogharborConfig;
use logharbor_core::control::RestartSignal;
use logharbor_log_pipeline::{LogBuffer, QueryServer, Tailer, TailerConfig, TailerHandle};
use logharbor_rotation::{RotationEngine, RotationSettings};

/// Upper bound on waiting for a worker to exit after cancellation.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// A running task and the token that stops it.
struct Worker {
    name: &'static str,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Worker {
    async fn stop(self) {
        self.cancel.cancel();
        let mut task = self.task;
        match tokio::time::timeout(STOP_TIMEOUT, &mut task).await {
            Ok(Ok(())) => tracing::debug!(worker = self.name, "worker stopped"),
            Ok(Err(e)) => tracing::error!(worker = self.name, error = %e, "worker task failed"),
            Err(_) => {
                tracing::warn!(worker = self.name, "worker did not stop in time, aborting");
                task.abort();
            }
        }
    }
}

/// All running workers of the daemon.
pub struct Workers {
    config: LogharborConfig,
    root: CancellationToken,
    buffer: Arc<LogBuffer>,
    tailer_handle: TailerHandle,
    tailer: Worker,
    server: Worker,
    rotation: Option<Worker>,
}

impl Workers {
    /// Spawn every worker for `config`.
    pub fn start(config: LogharborConfig) -> Self {
        let root = CancellationToken::new();
        let buffer = Arc::new(LogBuffer::new(
            config.buffer.max_size,
            config.buffer.trim_size,
        ));

        let (tailer, tailer_handle) = spawn_tailer(&config, &buffer, &root);
        let server = spawn_server(&config, &buffer, &root);
        let rotation = spawn_rotation(&config, &tailer_handle, &root);

        tracing::info!(
            log_file = %config.paths.log_file.display(),
            socket = %config.paths.socket_path.display(),
            rotation = rotation.is_some(),
            "workers started"
        );

        Self {
            config,
            root,
            buffer,
            tailer_handle,
            tailer,
            server,
            rotation,
        }
    }

    /// Shared live buffer.
    pub fn buffer(&self) -> &Arc<LogBuffer> {
        &self.buffer
    }

    /// Control handle of the current tailer.
    pub fn tailer(&self) -> &TailerHandle {
        &self.tailer_handle
    }

    /// Configuration the workers are currently running with.
    pub fn config(&self) -> &LogharborConfig {
        &self.config
    }

    /// Apply a new configuration.
    ///
    /// - buffer capacity is adjusted in place
    /// - the tailer is replaced only when the log path changes, otherwise it
    ///   re-establishes its watch (the external rotate command relies on this)
    /// - the query server is replaced only when the socket path changes
    /// - the rotation engine is always replaced
    pub async fn reload(&mut self, config: LogharborConfig) {
        let dropped = self
            .buffer
            .reconfigure(config.buffer.max_size, config.buffer.trim_size);
        if dropped > 0 {
            tracing::info!(dropped, "buffer shrunk on reload");
        }

        if config.paths.log_file != self.config.paths.log_file {
            let (tailer, handle) = spawn_tailer(&config, &self.buffer, &self.root);
            let old = std::mem::replace(&mut self.tailer, tailer);
            self.tailer_handle = handle;
            old.stop().await;
            tracing::info!(log_file = %config.paths.log_file.display(), "tailer replaced");
        } else {
            if config.tailer != self.config.tailer
                || config.buffer.initial_lines != self.config.buffer.initial_lines
            {
                tracing::warn!("tailer settings other than log_file take effect on next start");
            }
            if let Err(e) = self.tailer_handle.restart() {
                tracing::error!(error = %e, "failed to restart tailer");
            }
        }

        if config.paths.socket_path != self.config.paths.socket_path {
            let server = spawn_server(&config, &self.buffer, &self.root);
            let old = std::mem::replace(&mut self.server, server);
            old.stop().await;
            tracing::info!(socket = %config.paths.socket_path.display(), "query server replaced");
        }

        if let Some(old) = self.rotation.take() {
            old.stop().await;
        }
        self.rotation = spawn_rotation(&config, &self.tailer_handle, &self.root);

        self.config = config;
    }

    /// Stop all workers: tailer first so no append races the final snapshot.
    pub async fn shutdown(self) {
        tracing::info!("stopping workers");
        if let Some(rotation) = self.rotation {
            rotation.stop().await;
        }
        self.tailer.stop().await;
        self.server.stop().await;
        self.root.cancel();
    }
}

fn spawn_tailer(
    config: &LogharborConfig,
    buffer: &Arc<LogBuffer>,
    root: &CancellationToken,
) -> (Worker, TailerHandle) {
    let cancel = root.child_token();
    let (tailer, handle) = Tailer::new(
        TailerConfig::from_core(config),
        Arc::clone(buffer),
        cancel.clone(),
    );
    let task = tokio::spawn(tailer.run());
    (
        Worker {
            name: "tailer",
            cancel,
            task,
        },
        handle,
    )
}

fn spawn_server(
    config: &LogharborConfig,
    buffer: &Arc<LogBuffer>,
    root: &CancellationToken,
) -> Worker {
    let cancel = root.child_token();
    let server = QueryServer::new(
        config.paths.socket_path.clone(),
        Arc::clone(buffer),
        cancel.clone(),
    );
    let task = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "query server stopped with error");
        }
    });
    Worker {
        name: "query-server",
        cancel,
        task,
    }
}

fn spawn_rotation(
    config: &LogharborConfig,
    tailer: &TailerHandle,
    root: &CancellationToken,
) -> Option<Worker> {
    if !config.rotation.enabled {
        tracing::info!("rotation disabled");
        return None;
    }
    let cancel = root.child_token();
    let signal: Arc<dyn RestartSignal> = Arc::new(tailer.clone());
    let engine = RotationEngine::new(RotationSettings::from_config(config), signal);
    let task = tokio::spawn(engine.run(cancel.clone()));
    Some(Worker {
        name: "rotation",
        cancel,
        task,
    })
}
