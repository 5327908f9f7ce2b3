use std::collections::BTreeMap;

use shortener_logging::{shortener_debug, shortener_info, shortener_warn};

use crate::{
    Command, FieldController, FieldError, FieldId, FieldOptions, FieldState, FieldStatus,
    OptionName, OptionValue, Reply, Settlement, ShortenRequest,
};

/// Owns the controllers of every attached field, keyed by field identity.
///
/// A field has an entry exactly while it is attached. Operations on other
/// fields fail with [`FieldError::InvalidInvocation`], except `destroy`,
/// which is a no-op, and `settle`, which ignores unknown fields.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    defaults: FieldOptions,
    fields: BTreeMap<FieldId, FieldController>,
    next_attachment: u64,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose attachments start from `defaults`.
    pub fn with_defaults(defaults: FieldOptions) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> &FieldOptions {
        &self.defaults
    }

    pub fn is_attached(&self, field: FieldId) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn attached(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.keys().copied()
    }

    /// Attaches `field` with the registry defaults merged with `overrides`.
    ///
    /// Fails with [`FieldError::Configuration`] when the merged options have
    /// no endpoint; nothing is registered then. Attaching an attached field
    /// changes nothing.
    pub fn attach(
        &mut self,
        field: FieldId,
        overrides: impl IntoIterator<Item = OptionValue>,
    ) -> Result<(), FieldError> {
        if self.fields.contains_key(&field) {
            shortener_debug!("field {} is already attached", field);
            return Ok(());
        }

        let mut options = self.defaults.clone();
        for value in overrides {
            options.apply(value);
        }

        let attachment = self.next_attachment;
        let controller = FieldController::attach(field, attachment, options)?;
        self.next_attachment += 1;
        self.fields.insert(field, controller);
        shortener_info!("field {} attached", field);
        Ok(())
    }

    pub fn value_changed(
        &mut self,
        field: FieldId,
        value: &str,
    ) -> Result<Option<ShortenRequest>, FieldError> {
        Ok(self.controller_mut(field)?.value_changed(value))
    }

    /// Routes a settlement to its field. Settlements for detached fields or
    /// earlier attachments are dropped.
    pub fn settle(&mut self, settlement: Settlement) -> bool {
        match self.fields.get_mut(&settlement.field) {
            Some(controller) => controller.settle(settlement),
            None => {
                shortener_debug!(
                    "dropping settlement for detached field {}",
                    settlement.field
                );
                false
            }
        }
    }

    pub fn enable(&mut self, field: FieldId) -> Result<(), FieldError> {
        self.controller_mut(field)?.enable();
        Ok(())
    }

    pub fn disable(&mut self, field: FieldId) -> Result<(), FieldError> {
        self.controller_mut(field)?.disable();
        Ok(())
    }

    /// Detaches `field`. Never fails; a detached field is left as is.
    pub fn destroy(&mut self, field: FieldId) {
        if let Some(controller) = self.fields.remove(&field) {
            let field = controller.destroy();
            shortener_info!("field {} destroyed", field);
        }
    }

    pub fn options(&self, field: FieldId) -> Result<&FieldOptions, FieldError> {
        Ok(self.controller(field)?.options())
    }

    pub fn option(&self, field: FieldId, name: OptionName) -> Result<OptionValue, FieldError> {
        Ok(self.controller(field)?.option(name))
    }

    pub fn set_option(&mut self, field: FieldId, value: OptionValue) -> Result<(), FieldError> {
        self.set_options(field, [value])
    }

    /// Updates options. An update that leaves the field without an endpoint
    /// fails and detaches the field.
    pub fn set_options(
        &mut self,
        field: FieldId,
        values: impl IntoIterator<Item = OptionValue>,
    ) -> Result<(), FieldError> {
        let result = self.controller_mut(field)?.set_options(values);
        if let Err(err @ FieldError::Configuration(_)) = &result {
            shortener_warn!("field {} detached after option update: {}", field, err);
            self.destroy(field);
        }
        result
    }

    pub fn state(&self, field: FieldId) -> FieldState {
        self.fields
            .get(&field)
            .map_or(FieldState::Detached, FieldController::state)
    }

    pub fn status(&self, field: FieldId) -> Option<FieldStatus> {
        self.fields.get(&field).map(FieldController::status)
    }

    /// Runs one operation from the enumerated set.
    pub fn dispatch(&mut self, command: Command) -> Result<Reply, FieldError> {
        match command {
            Command::Attach { field, overrides } => {
                self.attach(field, overrides).map(|()| Reply::Done)
            }
            Command::ValueChanged { field, value } => self
                .value_changed(field, &value)
                .map(|request| request.map_or(Reply::Done, Reply::Request)),
            Command::Enable(field) => self.enable(field).map(|()| Reply::Done),
            Command::Disable(field) => self.disable(field).map(|()| Reply::Done),
            Command::Destroy(field) => {
                self.destroy(field);
                Ok(Reply::Done)
            }
            Command::GetOption { field, name: None } => {
                self.options(field).cloned().map(Reply::Options)
            }
            Command::GetOption {
                field,
                name: Some(name),
            } => self.option(field, name).map(Reply::Option),
            Command::SetOptions { field, values } => {
                self.set_options(field, values).map(|()| Reply::Done)
            }
            Command::Settle(settlement) => Ok(Reply::Settled(self.settle(settlement))),
        }
    }

    fn controller(&self, field: FieldId) -> Result<&FieldController, FieldError> {
        self.fields
            .get(&field)
            .ok_or_else(|| FieldError::not_attached(field))
    }

    fn controller_mut(&mut self, field: FieldId) -> Result<&mut FieldController, FieldError> {
        self.fields
            .get_mut(&field)
            .ok_or_else(|| FieldError::not_attached(field))
    }
}
