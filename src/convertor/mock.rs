use super::{ConvertorError, UrlConvertor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockUrlConvertor {
    mappings: Arc<Mutex<HashMap<String, PathBuf>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockUrlConvertor {
    pub fn new() -> Self {
        Self {
            mappings: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_mapping(self, uri: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.mappings.lock().unwrap().insert(uri.into(), path.into());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockUrlConvertor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlConvertor for MockUrlConvertor {
    async fn filename_from_url(&self, uri: &str) -> std::result::Result<PathBuf, ConvertorError> {
        *self.call_count.lock().unwrap() += 1;

        self.mappings
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| ConvertorError::NotFound(uri.to_string()))
    }
}
