use std::sync::{mpsc, Arc};
use std::thread;

use shortener_core::{Settlement, ShortenRequest};
use shortener_logging::{shortener_debug, shortener_info, shortener_warn};
use tokio::task::JoinHandle;

use crate::{EngineError, EngineEvent, ReqwestTransport, Transport, TransportSettings};

/// Receives engine events. Called from the engine's runtime threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

enum EngineCommand {
    Shorten(ShortenRequest),
}

/// Runs shortening requests on a background tokio runtime.
///
/// Every submitted request settles exactly once, reported to the sink as
/// [`EngineEvent::Settled`]. Requests are independent; the single-flight rule
/// is enforced by the core before anything reaches the engine. Dropping the
/// handle stops intake; requests already submitted still run to settlement.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        settings: TransportSettings,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let transport = Arc::new(ReqwestTransport::new(settings)?);
        Self::with_transport(transport, sink)
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            let mut pending: Vec<JoinHandle<()>> = Vec::new();
            while let Ok(command) = cmd_rx.recv() {
                pending.retain(|task| !task.is_finished());
                let transport = transport.clone();
                let sink = sink.clone();
                pending.push(runtime.spawn(async move {
                    handle_command(transport.as_ref(), command, sink.as_ref()).await;
                }));
            }
            shortener_info!(
                "engine command channel closed; settling {} pending request(s)",
                pending.len()
            );
            runtime.block_on(async {
                for task in pending {
                    if let Err(err) = task.await {
                        shortener_warn!("engine task failed: {}", err);
                    }
                }
            });
        });

        Ok(Self { cmd_tx })
    }

    pub fn submit(&self, request: ShortenRequest) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Shorten(request))
            .map_err(|_| EngineError::Closed)
    }
}

async fn handle_command(transport: &dyn Transport, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Shorten(request) => {
            let result = transport.post(&request).await;
            shortener_debug!(
                "request {:?} for field {} settled ok={}",
                request.ticket,
                request.field,
                result.is_ok()
            );
            sink.emit(EngineEvent::Settled(Settlement::new(&request, result)));
        }
    }
}
