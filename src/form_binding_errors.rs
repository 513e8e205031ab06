use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    slice,
    sync::Arc,
    vec,
};

use crate::multer;

/// Faults outside the binding contract.
///
/// Client-input problems are never reported this way; they end up in the
/// returned [`FieldErrors`](crate::FieldErrors). A `BindError` means either
/// that the request does not carry multipart content at all (the routing
/// layer should hand it to another binder) or that the caller's descriptor
/// table is misconfigured.
#[derive(Debug)]
pub enum BindError {
    /// The content type is not `multipart/form-data`.
    NotFormData,
    /// The content type carries no `boundary` parameter.
    BoundaryNotFound,
    /// A descriptor has an empty wire-name.
    EmptyFieldName,
    /// Two descriptors in one field set share a wire-name.
    DuplicateFieldName(String),
}

impl Display for BindError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            BindError::NotFormData => {
                f.write_str("The content type is not `multipart/form-data`.")
            },
            BindError::BoundaryNotFound => {
                f.write_str("The content type has no `boundary` parameter.")
            },
            BindError::EmptyFieldName => {
                f.write_str("A field descriptor has an empty wire-name.")
            },
            BindError::DuplicateFieldName(field) => f.write_fmt(format_args!(
                "The wire-name `{}` is declared by more than one field descriptor.",
                field
            )),
        }
    }
}

impl Error for BindError {}

/// Why a part's content could not be materialized.
#[derive(Debug)]
pub enum PartContentError {
    /// More content arrived than the field's size limit allows.
    TooLarge(u64),
    /// The underlying stream failed or ended before the part was complete.
    Stream(multer::Error),
}

impl From<multer::Error> for PartContentError {
    #[inline]
    fn from(err: multer::Error) -> PartContentError {
        PartContentError::Stream(err)
    }
}

impl Display for PartContentError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            PartContentError::TooLarge(limit) => f.write_fmt(format_args!(
                "the content exceeds the size limit of {} bytes",
                limit
            )),
            PartContentError::Stream(err) => Display::fmt(err, f),
        }
    }
}

impl Error for PartContentError {}

/// Classification of a field-level binding problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field never received a value.
    Required,
    /// Content could not be decoded into the declared scalar kind.
    TypeMismatch,
    /// The multipart stream, or one part of it, is not well-formed.
    Malformed,
}

impl Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            ErrorKind::Required => f.write_str("required"),
            ErrorKind::TypeMismatch => f.write_str("type mismatch"),
            ErrorKind::Malformed => f.write_str("malformed"),
        }
    }
}

/// One field-level problem detected while binding.
#[derive(Debug, Clone)]
pub struct FieldError {
    field_name: Arc<str>,
    kind:       ErrorKind,
    message:    String,
}

impl FieldError {
    pub fn new(
        field_name: impl Into<Arc<str>>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> FieldError {
        FieldError {
            field_name: field_name.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn required(field_name: impl Into<Arc<str>>) -> FieldError {
        let field_name = field_name.into();
        let message = format!("The field `{}` is required.", field_name);

        FieldError {
            field_name,
            kind: ErrorKind::Required,
            message,
        }
    }

    pub fn type_mismatch(field_name: impl Into<Arc<str>>, detail: impl Display) -> FieldError {
        let field_name = field_name.into();
        let message = format!("The value of field `{}` is invalid: {}.", field_name, detail);

        FieldError {
            field_name,
            kind: ErrorKind::TypeMismatch,
            message,
        }
    }

    pub fn malformed(field_name: impl Into<Arc<str>>, detail: impl Display) -> FieldError {
        let field_name = field_name.into();
        let message = format!("The content of field `{}` is malformed: {}.", field_name, detail);

        FieldError {
            field_name,
            kind: ErrorKind::Malformed,
            message,
        }
    }

    /// A malformation of the stream itself, before it can be attributed to a
    /// field. The record carries an empty field name.
    pub fn malformed_stream(detail: impl Display) -> FieldError {
        FieldError {
            field_name: Arc::from(""),
            kind:       ErrorKind::Malformed,
            message:    format!("The multipart stream is malformed: {}.", detail),
        }
    }

    /// The wire-name of the field this problem belongs to. Empty when the
    /// problem is not attributable to a single field.
    #[inline]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FieldError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.message)
    }
}

impl Error for FieldError {}

/// Ordered, append-only collection of field-level problems.
///
/// Insertion order is detection order and the only ordering contract;
/// records for one field are not grouped together.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors {
    records: Vec<FieldError>,
}

impl FieldErrors {
    #[inline]
    pub fn new() -> FieldErrors {
        FieldErrors {
            records: Vec::new()
        }
    }

    #[inline]
    pub fn push(&mut self, error: FieldError) {
        self.records.push(error);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&FieldError> {
        self.records.get(index)
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, FieldError> {
        self.records.iter()
    }

    /// The records for one field, in detection order.
    pub fn of_field<'a>(&'a self, field_name: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.records.iter().filter(move |error| error.field_name() == field_name)
    }
}

impl IntoIterator for FieldErrors {
    type IntoIter = vec::IntoIter<FieldError>;
    type Item = FieldError;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type IntoIter = slice::Iter<'a, FieldError>;
    type Item = &'a FieldError;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_keep_insertion_order() {
        let mut errors = FieldErrors::new();
        errors.push(FieldError::type_mismatch("views", "not a number"));
        errors.push(FieldError::required("title"));
        errors.push(FieldError::required("views"));

        let kinds: Vec<ErrorKind> = errors.iter().map(FieldError::kind).collect();

        assert_eq!(kinds, [ErrorKind::TypeMismatch, ErrorKind::Required, ErrorKind::Required]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn of_field_filters_without_reordering() {
        let mut errors = FieldErrors::new();
        errors.push(FieldError::type_mismatch("views", "first"));
        errors.push(FieldError::required("title"));
        errors.push(FieldError::malformed("views", "second"));

        let views: Vec<&FieldError> = errors.of_field("views").collect();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind(), ErrorKind::TypeMismatch);
        assert_eq!(views[1].kind(), ErrorKind::Malformed);
    }

    #[test]
    fn messages_name_the_field() {
        let error = FieldError::required("headerImage");

        assert_eq!(error.field_name(), "headerImage");
        assert_eq!(error.to_string(), "The field `headerImage` is required.");
    }

    #[test]
    fn custom_records_carry_what_they_are_given() {
        let error = FieldError::new("tags", ErrorKind::TypeMismatch, "too many tags");

        assert_eq!(error.field_name(), "tags");
        assert_eq!(error.kind(), ErrorKind::TypeMismatch);
        assert_eq!(error.message(), "too many tags");
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "type mismatch");
    }

    #[test]
    fn stream_malformation_has_no_field_name() {
        let error = FieldError::malformed_stream("unexpected end of stream");

        assert_eq!(error.field_name(), "");
        assert_eq!(error.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn bind_error_messages() {
        assert_eq!(
            BindError::NotFormData.to_string(),
            "The content type is not `multipart/form-data`."
        );
        assert_eq!(
            BindError::DuplicateFieldName(String::from("title")).to_string(),
            "The wire-name `title` is declared by more than one field descriptor."
        );
    }
}
