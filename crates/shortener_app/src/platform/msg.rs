use shortener_core::{FieldId, Settlement};

#[derive(Debug, Clone, PartialEq)]
pub enum AppMsg {
    /// A line typed into the terminal.
    Line(String),
    /// Stdin reached end of file.
    InputClosed,
    /// The engine settled a request.
    Settled(Settlement),
    /// A successful shortening produced a new field value.
    ReplaceValue { field: FieldId, value: String },
}
