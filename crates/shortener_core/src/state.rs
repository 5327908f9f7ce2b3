use crate::{FieldError, FieldOptions, Ticket};

pub type FieldId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    #[default]
    Detached,
    Idle,
    Requesting,
    Disabled,
}

/// Snapshot of a field handed to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldStatus {
    pub field: FieldId,
    pub enabled: bool,
    pub is_shortened: bool,
    pub request_in_flight: bool,
}

/// State of one attached field. Exists only while the field is attached.
#[derive(Debug, Clone)]
pub struct FieldInstance {
    pub(crate) field: FieldId,
    pub(crate) options: FieldOptions,
    pub(crate) enabled: bool,
    pub(crate) is_shortened: bool,
    pub(crate) in_flight: Option<Ticket>,
}

impl FieldInstance {
    pub fn new(field: FieldId, options: FieldOptions) -> Result<Self, FieldError> {
        options.require_endpoint()?;
        Ok(Self {
            field,
            options,
            enabled: true,
            is_shortened: false,
            in_flight: None,
        })
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn is_shortened(&self) -> bool {
        self.is_shortened
    }

    pub fn request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn status(&self) -> FieldStatus {
        FieldStatus {
            field: self.field,
            enabled: self.enabled,
            is_shortened: self.is_shortened,
            request_in_flight: self.request_in_flight(),
        }
    }
}
