pub mod form;
pub mod manager;
pub mod models;
pub mod options;
pub mod size;
pub mod storage;
pub mod validation;

pub use form::{read_form_entries, DEFAULT_SPOOL_THRESHOLD};
pub use manager::FileManager;
pub use models::{FileBody, FormEntry, SubmittedFile};
pub use options::{resolve_options, EnsureOptions, Multiple, UploadConstraint, UploadOptions};
pub use size::{size_to_bytes, SizeUnit};
pub use storage::{natural_extension, FileStorage, SaveError, DEFAULT_MOUNT};
pub use validation::{ensure, FileValidator, UploadError};
