use std::{error::Error, sync::Arc};

use bytes::Bytes;
use futures_core::Stream;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::form_binding_field::FieldBinding;
use crate::mime::{self, Mime};
use crate::{
    Attachment, AttachmentSlot, BindError, FieldError, FieldErrors, FieldSet, PartContentError,
    PartReader,
};

/// What one binding call produced: the best-effort populated record plus
/// every field-level problem encountered along the way.
///
/// A non-empty error collection never prevents the record from being
/// returned; the request handler downstream decides what the errors mean.
#[derive(Debug)]
pub struct BindOutcome<T> {
    /// The caller's record, holding whatever bound successfully.
    pub record: T,
    /// Field-level problems in detection order.
    pub errors: FieldErrors,
}

impl<T> BindOutcome<T> {
    /// Whether binding completed without recording any problem.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn into_parts(self) -> (T, FieldErrors) {
        (self.record, self.errors)
    }
}

/// Bind a `multipart/form-data` request body into `record`.
///
/// `content_type` is the request's `Content-Type` header value and `body`
/// the raw body as a stream of chunks. Call it exactly once per request:
/// the body is consumed.
///
/// Client-input problems never fail the call; they are collected into the
/// returned [`BindOutcome`] alongside the best-effort populated record. An
/// `Err` means the request does not carry multipart content at all, which
/// is the routing layer's cue to hand it to another binder.
pub async fn bind<T, S, B, E>(
    content_type: &str,
    body: S,
    fields: &FieldSet<T>,
    record: T,
) -> Result<BindOutcome<T>, BindError>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: Into<Bytes> + 'static,
    E: Into<Box<dyn Error + Send + Sync>> + 'static, {
    let boundary = form_data_boundary(content_type)?;

    Ok(run(PartReader::new(body, boundary), fields, record).await)
}

/// Bind from a body that is already in memory.
pub async fn bind_bytes<T>(
    content_type: &str,
    body: Bytes,
    fields: &FieldSet<T>,
    record: T,
) -> Result<BindOutcome<T>, BindError> {
    let boundary = form_data_boundary(content_type)?;

    Ok(run(PartReader::from_bytes(body, boundary), fields, record).await)
}

/// Bind from an asynchronous byte reader.
pub async fn bind_reader<T, R>(
    content_type: &str,
    body: R,
    fields: &FieldSet<T>,
    record: T,
) -> Result<BindOutcome<T>, BindError>
where
    R: AsyncRead + Send + 'static, {
    let boundary = form_data_boundary(content_type)?;

    Ok(run(PartReader::from_reader(body, boundary), fields, record).await)
}

fn form_data_boundary(content_type: &str) -> Result<String, BindError> {
    let content_type = content_type.parse::<Mime>().map_err(|_| BindError::NotFormData)?;

    if content_type.type_() != mime::MULTIPART || content_type.subtype() != mime::FORM_DATA {
        return Err(BindError::NotFormData);
    }

    match content_type.get_param(mime::BOUNDARY) {
        Some(boundary) => Ok(boundary.as_str().to_string()),
        None => Err(BindError::BoundaryNotFound),
    }
}

async fn run<T>(mut reader: PartReader, fields: &FieldSet<T>, mut record: T) -> BindOutcome<T> {
    let mut errors = FieldErrors::new();
    let mut received = vec![false; fields.len()];

    debug!(fields = fields.len(), "binding multipart/form-data body");

    'mapping: loop {
        let part = match reader.next_part().await {
            Ok(Some(part)) => part,
            Ok(None) => break,
            Err(err) => {
                // No further parts can be located; keep what was bound.
                warn!(error = %err, "malformed multipart stream, stopping early");
                errors.push(FieldError::malformed_stream(err));
                break;
            },
        };

        let field_name: Arc<str> = match part.name() {
            Some(name) => Arc::from(name),
            None => continue,
        };

        let index = match fields.position(&field_name) {
            Some(index) => index,
            None => {
                // Unknown fields are not an error.
                debug!(field = %field_name, "ignoring part with no matching descriptor");
                continue;
            },
        };

        let field = &fields.fields[index];

        match &field.binding {
            FieldBinding::Text(assign) | FieldBinding::TextList(assign) => {
                let raw = match part.bytes(field.size_limit).await {
                    Ok(raw) => raw,
                    Err(err @ PartContentError::TooLarge(_)) => {
                        received[index] = true;
                        errors.push(FieldError::malformed(field_name, err));
                        continue;
                    },
                    Err(PartContentError::Stream(err)) => {
                        errors.push(FieldError::malformed(field_name, err));
                        break 'mapping;
                    },
                };

                received[index] = true;

                match String::from_utf8(raw) {
                    Ok(value) => {
                        if let Err(detail) = assign(&mut record, value) {
                            errors.push(FieldError::type_mismatch(field_name, detail));
                        }
                    },
                    Err(err) => errors.push(FieldError::type_mismatch(field_name, err)),
                }
            },
            FieldBinding::File(assign) | FieldBinding::FileList(assign) => {
                // An empty file name is how browsers submit an untouched
                // file input; the position is kept, the slot stays empty.
                let file_name =
                    part.file_name().filter(|name| !name.is_empty()).map(String::from);

                let file_name = match file_name {
                    Some(file_name) => file_name,
                    None => {
                        assign(&mut record, AttachmentSlot::EmptySubmission);
                        continue;
                    },
                };

                let content_type = part.content_type().cloned();

                match part.bytes(field.size_limit).await {
                    Ok(data) => {
                        received[index] = true;
                        assign(
                            &mut record,
                            AttachmentSlot::Present(Attachment {
                                file_name,
                                content_type,
                                data,
                            }),
                        );
                    },
                    Err(err @ PartContentError::TooLarge(_)) => {
                        received[index] = true;
                        errors.push(FieldError::malformed(field_name, err));
                    },
                    Err(PartContentError::Stream(err)) => {
                        errors.push(FieldError::malformed(field_name, err));
                        break 'mapping;
                    },
                }
            },
        }
    }

    for (field, received) in fields.fields.iter().zip(received) {
        if field.required && !received {
            errors.push(FieldError::required(field.field_name.as_str()));
        }
    }

    BindOutcome {
        record,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_taken_from_the_content_type() {
        let boundary =
            form_data_boundary("multipart/form-data; boundary=------abc123").unwrap();

        assert_eq!(boundary, "------abc123");
    }

    #[test]
    fn other_encodings_belong_to_other_binders() {
        assert!(matches!(
            form_data_boundary("application/x-www-form-urlencoded"),
            Err(BindError::NotFormData)
        ));
        assert!(matches!(form_data_boundary("not a content type"), Err(BindError::NotFormData)));
        assert!(matches!(
            form_data_boundary("multipart/form-data"),
            Err(BindError::BoundaryNotFound)
        ));
    }
}
