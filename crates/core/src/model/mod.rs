pub mod diagnostic;
pub mod record;
pub mod source;
pub mod vocabulary;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use record::{BreadcrumbRecord, Complexity, RecordId, Status};
pub use source::{CommentSyntax, SourceLocation, SourceUnit};
pub use vocabulary::{FieldKey, KnownField};
