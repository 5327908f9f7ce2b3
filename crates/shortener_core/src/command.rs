use std::fmt;
use std::str::FromStr;

use crate::{FieldError, FieldId, FieldOptions, OptionName, OptionValue, Settlement, ShortenRequest};

/// The operations a host can invoke on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Attach,
    ValueChanged,
    Enable,
    Disable,
    Destroy,
    Option,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Attach => "attach",
            Operation::ValueChanged => "value_changed",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::Destroy => "destroy",
            Operation::Option => "option",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = FieldError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim() {
            "attach" => Ok(Operation::Attach),
            "value_changed" | "valueChanged" => Ok(Operation::ValueChanged),
            "enable" => Ok(Operation::Enable),
            "disable" => Ok(Operation::Disable),
            "destroy" => Ok(Operation::Destroy),
            "option" => Ok(Operation::Option),
            other => Err(FieldError::InvalidInvocation(format!(
                "unknown operation {other:?}"
            ))),
        }
    }
}

/// A field operation with its arguments, run by
/// [`FieldRegistry::dispatch`](crate::FieldRegistry::dispatch).
#[derive(Debug, Clone)]
pub enum Command {
    Attach {
        field: FieldId,
        overrides: Vec<OptionValue>,
    },
    ValueChanged {
        field: FieldId,
        value: String,
    },
    Enable(FieldId),
    Disable(FieldId),
    Destroy(FieldId),
    /// Reads one option, or all options when `name` is `None`.
    GetOption {
        field: FieldId,
        name: Option<OptionName>,
    },
    SetOptions {
        field: FieldId,
        values: Vec<OptionValue>,
    },
    Settle(Settlement),
}

impl Command {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Command::Attach { .. } => Some(Operation::Attach),
            Command::ValueChanged { .. } => Some(Operation::ValueChanged),
            Command::Enable(_) => Some(Operation::Enable),
            Command::Disable(_) => Some(Operation::Disable),
            Command::Destroy(_) => Some(Operation::Destroy),
            Command::GetOption { .. } | Command::SetOptions { .. } => Some(Operation::Option),
            Command::Settle(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Done,
    /// A request the host must hand to the transport.
    Request(ShortenRequest),
    Option(OptionValue),
    Options(FieldOptions),
    Settled(bool),
}
