use std::fmt::{self, Debug, Formatter};

use crate::{BindError, FieldDescriptor};

/// The ordered field-descriptor table for one target record type.
///
/// Built once at startup and shared across requests. Declaration order is
/// kept: required-field diagnostics are reported in table order.
pub struct FieldSet<T> {
    pub(crate) fields: Vec<FieldDescriptor<T>>,
}

impl<T> FieldSet<T> {
    /// Validate and freeze a descriptor table.
    ///
    /// The table is caller configuration, not client input, so an
    /// inconsistent table is rejected here instead of surfacing as a
    /// per-request diagnostic.
    pub fn new(fields: Vec<FieldDescriptor<T>>) -> Result<FieldSet<T>, BindError> {
        for (i, field) in fields.iter().enumerate() {
            if field.field_name.is_empty() {
                return Err(BindError::EmptyFieldName);
            }

            if fields[..i].iter().any(|earlier| earlier.field_name == field.field_name) {
                return Err(BindError::DuplicateFieldName(field.field_name.clone()));
            }
        }

        Ok(FieldSet {
            fields,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The descriptors in declaration order.
    #[inline]
    pub fn descriptors(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    pub(crate) fn position(&self, field_name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.field_name == field_name)
    }
}

impl<T> Debug for FieldSet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet").field("fields", &self.fields).finish()
    }
}
