pub use projex_models::{NoteDto, ProjectNote};
