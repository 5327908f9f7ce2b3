//! Shortener core: per-field state machine, URL validation and the
//! single-flight request gate. No IO happens here; requests leave the core as
//! [`ShortenRequest`] values and come back as [`Settlement`]s.
mod command;
mod controller;
mod effect;
mod error;
mod gate;
mod options;
mod pattern;
mod registry;
mod state;
mod validate;

pub use command::{Command, Operation, Reply};
pub use controller::FieldController;
pub use effect::{Settlement, ShortenRequest, Ticket};
pub use error::{FailureKind, FieldError, TransportError};
pub use gate::{request, settle};
pub use options::{
    ErrorHook, FieldOptions, Hooks, OptionName, OptionValue, StatusHook, SuccessHook, UrlHook,
    ValidatorFn, DEFAULT_SHORTENED_PATTERNS, DEFAULT_URL_PATTERN,
};
pub use pattern::Pattern;
pub use registry::FieldRegistry;
pub use state::{FieldId, FieldInstance, FieldState, FieldStatus};
pub use validate::{is_already_shortened, is_valid_url};
