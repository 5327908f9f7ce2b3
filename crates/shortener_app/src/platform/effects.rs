use std::sync::{mpsc, Arc};

use shortener_core::ShortenRequest;
use shortener_engine::{EngineError, EngineEvent, EngineHandle, EventSink, TransportSettings};
use shortener_logging::{shortener_info, shortener_warn};

use super::msg::AppMsg;

/// Forwards engine settlements into the app's message loop.
struct AppSink {
    msg_tx: mpsc::Sender<AppMsg>,
}

impl EventSink for AppSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Settled(settlement) => {
                if let Err(err) = &settlement.result {
                    shortener_warn!("Field {} request failed: {}", settlement.field, err);
                }
                let _ = self.msg_tx.send(AppMsg::Settled(settlement));
            }
        }
    }
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: TransportSettings,
        msg_tx: mpsc::Sender<AppMsg>,
    ) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(AppSink { msg_tx }))?;
        Ok(Self { engine })
    }

    pub fn submit(&self, request: ShortenRequest) -> Result<(), EngineError> {
        shortener_info!(
            "ShortenRequest field={} url_len={} url={}",
            request.field,
            request.url.len(),
            request.url
        );
        self.engine.submit(request)
    }
}
