use std::{
    any,
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use convert_case::{Case, Casing};

use crate::{AttachmentSlot, FieldType};

const DEFAULT_TEXT_SIZE_LIMIT: u64 = 1024 * 1024;
const DEFAULT_FILE_SIZE_LIMIT: u64 = 8 * 1024 * 1024;

/// Derive the wire-name for a record field identifier.
///
/// Wire-names are the lower-camel form of the identifier, so a record field
/// named `HeaderImage` (or `header_image`) is submitted as `headerImage`.
#[inline]
pub fn wire_name(field_ident: &str) -> String {
    field_ident.to_case(Case::Camel)
}

type TextAssign<T> = Box<dyn Fn(&mut T, String) -> Result<(), String> + Send + Sync>;
type SlotAssign<T> = Box<dyn Fn(&mut T, AttachmentSlot) + Send + Sync>;

pub(crate) enum FieldBinding<T> {
    Text(TextAssign<T>),
    TextList(TextAssign<T>),
    File(SlotAssign<T>),
    FileList(SlotAssign<T>),
}

/// One entry of a [`FieldSet`](crate::FieldSet): which wire-name to match,
/// whether a value must arrive, and the slot of the target record the value
/// goes into.
///
/// Descriptors carry a slot-accessor closure instead of inspecting the
/// record's shape at runtime; the target type stays an ordinary struct.
pub struct FieldDescriptor<T> {
    pub(crate) field_name: String,
    pub(crate) required:   bool,
    pub(crate) size_limit: u64,
    pub(crate) binding:    FieldBinding<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    /// A scalar text field, assigned as-is. The default size limit is 1 MiB.
    pub fn text<F>(field_name: impl Into<String>, assign: F) -> FieldDescriptor<T>
    where
        F: Fn(&mut T, String) + Send + Sync + 'static, {
        FieldDescriptor {
            field_name: field_name.into(),
            required:   false,
            size_limit: DEFAULT_TEXT_SIZE_LIMIT,
            binding:    FieldBinding::Text(Box::new(move |record, value| {
                assign(record, value);

                Ok(())
            })),
        }
    }

    /// A scalar field parsed into any [`FromStr`] type. Content that fails to
    /// parse is reported as a type mismatch. The default size limit is 1 MiB.
    pub fn parsed<V, F>(field_name: impl Into<String>, assign: F) -> FieldDescriptor<T>
    where
        V: FromStr + 'static,
        V::Err: Display,
        F: Fn(&mut T, V) + Send + Sync + 'static, {
        FieldDescriptor {
            field_name: field_name.into(),
            required:   false,
            size_limit: DEFAULT_TEXT_SIZE_LIMIT,
            binding:    FieldBinding::Text(Box::new(move |record, value| {
                match value.parse::<V>() {
                    Ok(value) => {
                        assign(record, value);

                        Ok(())
                    },
                    Err(err) => Err(format!("not a valid {} ({})", scalar_name::<V>(), err)),
                }
            })),
        }
    }

    /// A repeatable scalar text field. `append` is invoked once per arriving
    /// value, in arrival order. The default size limit is 1 MiB.
    pub fn text_list<F>(field_name: impl Into<String>, append: F) -> FieldDescriptor<T>
    where
        F: Fn(&mut T, String) + Send + Sync + 'static, {
        FieldDescriptor {
            field_name: field_name.into(),
            required:   false,
            size_limit: DEFAULT_TEXT_SIZE_LIMIT,
            binding:    FieldBinding::TextList(Box::new(move |record, value| {
                append(record, value);

                Ok(())
            })),
        }
    }

    /// A single-attachment field. The default size limit is 8 MiB.
    pub fn file<F>(field_name: impl Into<String>, assign: F) -> FieldDescriptor<T>
    where
        F: Fn(&mut T, AttachmentSlot) + Send + Sync + 'static, {
        FieldDescriptor {
            field_name: field_name.into(),
            required:   false,
            size_limit: DEFAULT_FILE_SIZE_LIMIT,
            binding:    FieldBinding::File(Box::new(assign)),
        }
    }

    /// An attachment-collection field. `append` is invoked once per arriving
    /// part, in arrival order, including empty submissions. The default size
    /// limit is 8 MiB per attachment.
    pub fn file_list<F>(field_name: impl Into<String>, append: F) -> FieldDescriptor<T>
    where
        F: Fn(&mut T, AttachmentSlot) + Send + Sync + 'static, {
        FieldDescriptor {
            field_name: field_name.into(),
            required:   false,
            size_limit: DEFAULT_FILE_SIZE_LIMIT,
            binding:    FieldBinding::FileList(Box::new(append)),
        }
    }
}

impl<T> FieldDescriptor<T> {
    /// Require that at least one substantive part arrives for this field. An
    /// attachment field is only satisfied by an actual upload; an empty file
    /// submission does not count.
    pub fn required(mut self) -> FieldDescriptor<T> {
        self.required = true;
        self
    }

    /// Set the size limit in bytes for this field's content.
    pub fn size_limit(mut self, size_limit: u64) -> FieldDescriptor<T> {
        self.size_limit = size_limit;
        self
    }

    /// The wire-name this descriptor matches.
    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        match &self.binding {
            FieldBinding::Text(_) => FieldType::Text,
            FieldBinding::TextList(_) => FieldType::TextList,
            FieldBinding::File(_) => FieldType::File,
            FieldBinding::FileList(_) => FieldType::FileList,
        }
    }
}

impl<T> Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_name", &self.field_name)
            .field("field_type", &self.field_type())
            .field("required", &self.required)
            .field("size_limit", &self.size_limit)
            .finish()
    }
}

fn scalar_name<V>() -> &'static str {
    let name = any::type_name::<V>();

    name.rsplit("::").next().unwrap_or(name)
}
