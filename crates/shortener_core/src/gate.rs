//! Single-flight request gate: at most one request per field instance.

use shortener_logging::{shortener_debug, shortener_warn};

use crate::{FieldInstance, Settlement, ShortenRequest, Ticket};

/// Starts a request for `url` unless one is already in flight.
///
/// Marks the instance in flight and fires `on_before_send` before handing the
/// request back for dispatch. Returns `None` when the request is dropped.
pub fn request(instance: &mut FieldInstance, ticket: Ticket, url: &str) -> Option<ShortenRequest> {
    if let Some(current) = instance.in_flight {
        shortener_debug!(
            "field {} already has request {:?} in flight; dropping {}",
            instance.field,
            current,
            url
        );
        return None;
    }
    let endpoint = match instance.options.require_endpoint() {
        Ok(endpoint) => endpoint.to_string(),
        Err(err) => {
            shortener_warn!("field {} cannot send: {}", instance.field, err);
            return None;
        }
    };

    instance.in_flight = Some(ticket);
    instance.options.hooks.before_send(&instance.status());

    Some(ShortenRequest {
        field: instance.field,
        ticket,
        endpoint,
        url: url.to_string(),
    })
}

/// Applies the outcome of the in-flight request.
///
/// Fires exactly one of `on_success`/`on_error`, then clears the in-flight
/// ticket and fires `on_complete`. Settlements that do not match the
/// in-flight ticket are ignored and `false` is returned.
pub fn settle(instance: &mut FieldInstance, settlement: Settlement) -> bool {
    if instance.in_flight != Some(settlement.ticket) {
        shortener_debug!(
            "field {} ignoring settlement {:?}; in flight: {:?}",
            instance.field,
            settlement.ticket,
            instance.in_flight
        );
        return false;
    }

    match settlement.result {
        Ok(body) => {
            instance.is_shortened = true;
            instance.options.hooks.success(&body, &instance.status());
        }
        Err(err) => {
            instance.is_shortened = false;
            shortener_debug!("field {} request failed: {}", instance.field, err);
            instance.options.hooks.error(&err, &instance.status());
        }
    }

    instance.in_flight = None;
    instance.options.hooks.complete(&instance.status());
    true
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::{FailureKind, FieldOptions, TransportError};

    const TICKET: Ticket = Ticket {
        attachment: 0,
        sequence: 1,
    };

    fn recording_instance(log: Arc<Mutex<Vec<String>>>) -> FieldInstance {
        let before = log.clone();
        let success = log.clone();
        let error = log.clone();
        let complete = log;
        let options = FieldOptions::new()
            .with_endpoint("/bitly/endpoint/")
            .on_before_send(move |status| {
                before
                    .lock()
                    .unwrap()
                    .push(format!("before in_flight={}", status.request_in_flight))
            })
            .on_success(move |body, status| {
                success
                    .lock()
                    .unwrap()
                    .push(format!("success {body} shortened={}", status.is_shortened))
            })
            .on_error(move |err, status| {
                error
                    .lock()
                    .unwrap()
                    .push(format!("error {} shortened={}", err.kind, status.is_shortened))
            })
            .on_complete(move |status| {
                complete
                    .lock()
                    .unwrap()
                    .push(format!("complete in_flight={}", status.request_in_flight))
            });
        FieldInstance::new(3, options).unwrap()
    }

    #[test]
    fn success_fires_hooks_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut instance = recording_instance(log.clone());

        let request = request(&mut instance, TICKET, "www.mobileroadie.com").unwrap();
        assert_eq!(request.endpoint, "/bitly/endpoint/");
        assert!(instance.request_in_flight());

        let settled = settle(
            &mut instance,
            Settlement::new(&request, Ok(json!({"short": "http://x/1"}))),
        );
        assert!(settled);
        assert!(instance.is_shortened());
        assert!(!instance.request_in_flight());
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "before in_flight=true".to_string(),
                r#"success {"short":"http://x/1"} shortened=true"#.to_string(),
                "complete in_flight=false".to_string(),
            ]
        );
    }

    #[test]
    fn error_clears_shortened_flag() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut instance = recording_instance(log.clone());
        instance.is_shortened = true;

        let request = request(&mut instance, TICKET, "www.mobileroadie.com").unwrap();
        settle(
            &mut instance,
            Settlement::new(
                &request,
                Err(TransportError::new(FailureKind::HttpStatus(500), "boom")),
            ),
        );

        assert!(!instance.is_shortened());
        assert_eq!(
            log.lock().unwrap()[1..],
            [
                "error http status 500 shortened=false".to_string(),
                "complete in_flight=false".to_string(),
            ]
        );
    }

    #[test]
    fn second_request_is_dropped_while_in_flight() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut instance = recording_instance(log.clone());

        assert!(request(&mut instance, TICKET, "a.com").is_some());
        let next = Ticket {
            sequence: 2,
            ..TICKET
        };
        assert!(request(&mut instance, next, "a.com").is_none());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn mismatched_settlement_is_ignored() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut instance = recording_instance(log.clone());
        let request = request(&mut instance, TICKET, "a.com").unwrap();

        let stale = Settlement {
            ticket: Ticket {
                attachment: 9,
                sequence: 1,
            },
            ..Settlement::new(&request, Ok(json!("x")))
        };
        assert!(!settle(&mut instance, stale));
        assert!(instance.request_in_flight());
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
