#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use shortener_core::{FieldOptions, FieldStatus};

/// Collects hook invocations as readable strings.
#[derive(Clone, Default)]
pub struct HookLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn take(&self) -> Vec<String> {
        self.events.lock().unwrap().drain(..).collect()
    }

    /// Options with every hook recording into this log.
    pub fn options(&self, endpoint: &str) -> FieldOptions {
        let valid = self.clone();
        let invalid = self.clone();
        let before = self.clone();
        let success = self.clone();
        let error = self.clone();
        let complete = self.clone();
        FieldOptions::new()
            .with_endpoint(endpoint)
            .on_valid_url(move |url, _| valid.push(format!("valid {url}")))
            .on_invalid_url(move |url, _| invalid.push(format!("invalid {url}")))
            .on_before_send(move |status| before.push(format!("before_send {}", flags(status))))
            .on_success(move |body, status| {
                success.push(format!("success {body} {}", flags(status)))
            })
            .on_error(move |err, status| {
                error.push(format!("error {} {}", err.kind, flags(status)))
            })
            .on_complete(move |status| complete.push(format!("complete {}", flags(status))))
    }
}

fn flags(status: &FieldStatus) -> String {
    format!(
        "shortened={} in_flight={}",
        status.is_shortened, status.request_in_flight
    )
}

pub fn init_logging() {
    shortener_logging::initialize_for_tests();
}
