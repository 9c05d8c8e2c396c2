/// Opaque task identifier issued by the remote generation API.
pub type TaskId = String;

/// Batch names are derived from local wall-clock time.
pub type Timestamp = chrono::DateTime<chrono::Local>;

/// One result delivered by a callback: a positional index into the
/// submitted scene list plus the remote URL of the generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub index: i64,
    pub url: String,
}

impl Delivery {
    pub fn new(index: i64, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
        }
    }
}
