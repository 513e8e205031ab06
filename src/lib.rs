/*!
# Multipart Form Binding

This crate binds `multipart/form-data` request bodies into statically
described records. A [`FieldSet`] declares, once at startup, which
wire-names a target record accepts and which slot each value goes into;
[`bind`] (or [`bind_bytes`] / [`bind_reader`]) walks the parts of one
request body and populates the record in place.

Field-level problems never abort a call. A missing required field, a scalar
that fails to parse, or a malformed part each add a [`FieldError`] to the
returned collection, and the record keeps everything that did bind. The
request handler downstream decides whether a non-empty error collection
rejects the request, and how.

## Example

```rust
use bytes::Bytes;
use multipart_form_binding::{bind_bytes, AttachmentSlot, FieldDescriptor, FieldSet};

#[derive(Default)]
struct ProfileForm {
    display_name: String,
    age:          Option<u32>,
    avatar:       AttachmentSlot,
    gallery:      Vec<AttachmentSlot>,
}

# async fn handle(content_type: &str, body: Bytes) {
let fields = FieldSet::new(vec![
    FieldDescriptor::text("displayName", |form: &mut ProfileForm, value| {
        form.display_name = value
    })
    .required(),
    FieldDescriptor::parsed("age", |form: &mut ProfileForm, value| form.age = Some(value)),
    FieldDescriptor::file("avatar", |form: &mut ProfileForm, slot| form.avatar = slot),
    FieldDescriptor::file_list("gallery", |form: &mut ProfileForm, slot| {
        form.gallery.push(slot)
    }),
])
.unwrap();

let outcome = bind_bytes(content_type, body, &fields, ProfileForm::default()).await.unwrap();

for error in &outcome.errors {
    eprintln!("{}: {}", error.field_name(), error);
}

let _profile = outcome.record;
# }
```

Repeated parts under one wire-name overwrite scalar and single-attachment
fields (last write wins) and append to list fields in arrival order. A part
submitted with an empty file name, the browser encoding for an untouched
file input, occupies its position in a collection as
[`AttachmentSlot::EmptySubmission`], keeping indexes aligned with
submission order.
*/

pub extern crate mime;
pub extern crate multer;

mod fields;
mod form_binding;
mod form_binding_errors;
mod form_binding_field;
mod form_binding_field_set;
mod form_binding_type;
mod part_reader;

pub use fields::*;
pub use form_binding::*;
pub use form_binding_errors::*;
pub use form_binding_field::*;
pub use form_binding_field_set::*;
pub use form_binding_type::*;
pub use part_reader::*;
