use serde::{Deserialize, Serialize};

/// Collection responses wrap their records in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}
