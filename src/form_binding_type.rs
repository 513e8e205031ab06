#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A single scalar decoded from UTF-8 text. A repeated part overwrites
    /// the previous value.
    Text,
    /// A repeatable scalar. Values are appended in arrival order.
    TextList,
    /// At most one attachment. A repeated part overwrites the previous one.
    File,
    /// An ordered attachment collection, appended in arrival order.
    FileList,
}
