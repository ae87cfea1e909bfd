pub use projex_models::{CreateSubTaskDto, SubTask, UpdateSubTaskDto};
