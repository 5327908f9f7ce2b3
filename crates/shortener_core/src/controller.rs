use shortener_logging::{shortener_debug, shortener_trace};

use crate::validate::{is_already_shortened, is_valid_url};
use crate::{
    gate, FieldError, FieldId, FieldInstance, FieldOptions, FieldState, FieldStatus, OptionName,
    OptionValue, Settlement, ShortenRequest, Ticket,
};

/// Drives one attached field: value commits, request settlement, enabling and
/// option updates.
#[derive(Debug, Clone)]
pub struct FieldController {
    instance: FieldInstance,
    attachment: u64,
    next_sequence: u64,
}

impl FieldController {
    /// Attaches a field. `attachment` distinguishes this attachment from
    /// earlier ones of the same field so stale settlements are not applied.
    pub fn attach(
        field: FieldId,
        attachment: u64,
        options: FieldOptions,
    ) -> Result<Self, FieldError> {
        let instance = FieldInstance::new(field, options)?;
        Ok(Self {
            instance,
            attachment,
            next_sequence: 1,
        })
    }

    pub fn field(&self) -> FieldId {
        self.instance.field()
    }

    pub fn instance(&self) -> &FieldInstance {
        &self.instance
    }

    pub fn status(&self) -> FieldStatus {
        self.instance.status()
    }

    pub fn state(&self) -> FieldState {
        if !self.instance.enabled {
            FieldState::Disabled
        } else if self.instance.request_in_flight() {
            FieldState::Requesting
        } else {
            FieldState::Idle
        }
    }

    /// Handles a committed field value (typically on focus loss).
    ///
    /// Returns the request to dispatch when the value is a new valid URL and
    /// nothing is in flight.
    pub fn value_changed(&mut self, value: &str) -> Option<ShortenRequest> {
        if !self.instance.enabled {
            shortener_trace!("field {} is disabled; ignoring value", self.field());
            return None;
        }

        self.instance.is_shortened = false;
        if is_already_shortened(value, &self.instance.options) {
            shortener_debug!("field {} value already shortened: {}", self.field(), value);
            return None;
        }

        let status = self.instance.status();
        if !is_valid_url(value, &self.instance) {
            self.instance.options.hooks.invalid_url(value, &status);
            return None;
        }

        self.instance.options.hooks.valid_url(value, &status);
        let ticket = self.next_ticket();
        gate::request(&mut self.instance, ticket, value)
    }

    /// Applies a request outcome. Runs while disabled too, so a request sent
    /// before `disable` still completes.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        gate::settle(&mut self.instance, settlement)
    }

    pub fn enable(&mut self) {
        self.instance.enabled = true;
    }

    pub fn disable(&mut self) {
        self.instance.enabled = false;
    }

    pub fn options(&self) -> &FieldOptions {
        &self.instance.options
    }

    pub fn option(&self, name: OptionName) -> OptionValue {
        self.instance.options.get(name)
    }

    pub fn set_option(&mut self, value: OptionValue) -> Result<(), FieldError> {
        self.set_options([value])
    }

    /// Applies all values or none. Fails when the result has no endpoint; the
    /// caller then detaches the field.
    pub fn set_options(
        &mut self,
        values: impl IntoIterator<Item = OptionValue>,
    ) -> Result<(), FieldError> {
        let mut next = self.instance.options.clone();
        for value in values {
            next.apply(value);
        }
        next.require_endpoint()?;
        self.instance.options = next;
        Ok(())
    }

    /// Consumes the controller, leaving nothing behind.
    pub fn destroy(self) -> FieldId {
        self.field()
    }

    fn next_ticket(&mut self) -> Ticket {
        let ticket = Ticket {
            attachment: self.attachment,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        ticket
    }
}
