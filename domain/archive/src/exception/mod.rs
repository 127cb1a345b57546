use uuid::Uuid;

pub type ArchiveResult<T> = Result<T, ArchiveException>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveException {
    #[error(
        "Data object with checksum: {checksum} owns several locations without a storage id, cannot decide which one to store."
    )]
    AmbiguousStoreLocation { checksum: String },

    #[error("Data object with checksum: {checksum} does not declare any location to store or reference.")]
    NoLocation { checksum: String },

    #[error("Data object with checksum: {checksum} must declare a file size to be matched against storage: {storage}.")]
    MissingFileSize { checksum: String, storage: String },

    #[error("No configured storage accepts data object: {filename} with checksum: {checksum}.")]
    NoStorageMatch { checksum: String, filename: String },

    #[error("File: {filename} cannot be referenced, missing fields: {missing}.")]
    InvalidReferenceFile { filename: String, missing: String },

    #[error("Request: {id} does not carry the expected {expected} payload.")]
    UnexpectedPayload { id: Uuid, expected: &'static str },

    #[error("Archive internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for ArchiveException {
    fn from(e: anyhow::Error) -> Self {
        ArchiveException::InternalError { source: e }
    }
}
