use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    io::Read,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, SystemTime},
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    adapters,
    model::object::{
        ListObjectsPage, ListObjectsRequest, ObjectError, ObjectInfo, ObjectMeta, RequestOptions,
        CONTENT_TYPE,
    },
};

/// Operations that can be made to fail with `MockClient::fail_on`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Exists,
    Put,
    Get,
    Head,
    Delete,
    DeleteMany,
    Copy,
    List,
    Presign,
}

#[derive(Clone, Debug)]
struct StoredObject {
    body: Vec<u8>,
    content_type: Option<String>,
    modified_time: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    failures: HashSet<MockOperation>,
    list_calls: usize,
}

/// In-memory bucket store. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, operation: MockOperation) {
        self.lock().failures.insert(operation);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Number of page fetches served so far.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // State stays consistent across a panicking test thread.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check(state: &MockState, operation: MockOperation, key: &str) -> Result<(), ObjectError> {
        if state.failures.contains(&operation) {
            return Err(ObjectError::with_code(
                format!("injected {:?} failure at: {}", operation, key),
                "InternalError",
            ));
        }

        Ok(())
    }

    fn not_found(key: &str) -> ObjectError {
        ObjectError::with_code(format!("no such key: {}", key), "NoSuchKey")
    }
}

fn format_modified(time: SystemTime) -> Option<String> {
    OffsetDateTime::from(time).format(&Rfc3339).ok()
}

impl adapters::ObjectClient for MockClient {
    fn object_exists(&self, bucket: &str, key: &str) -> Result<bool, ObjectError> {
        let state = self.lock();
        Self::check(&state, MockOperation::Exists, key)?;

        Ok(state
            .buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key)))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: &RequestOptions,
    ) -> Result<(), ObjectError> {
        let mut state = self.lock();
        Self::check(&state, MockOperation::Put, key)?;

        state.buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: options.get(CONTENT_TYPE).cloned(),
                modified_time: SystemTime::now(),
            },
        );

        Ok(())
    }

    fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
        options: &RequestOptions,
    ) -> Result<(), ObjectError> {
        let mut buffer = Vec::new();
        body.read_to_end(&mut buffer)
            .map_err(|err| ObjectError::new(format!("failed to read body for: {}, {}", key, err)))?;

        self.put_object(bucket, key, buffer, options)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError> {
        let state = self.lock();
        Self::check(&state, MockOperation::Get, key)?;

        state
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.body.clone())
            .ok_or_else(|| Self::not_found(key))
    }

    fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMeta, ObjectError> {
        let state = self.lock();
        Self::check(&state, MockOperation::Head, key)?;

        let object = state
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .ok_or_else(|| Self::not_found(key))?;

        Ok(ObjectMeta {
            content_length: Some(object.body.len() as u64),
            content_type: object.content_type.clone(),
            last_modified: format_modified(object.modified_time),
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        let mut state = self.lock();
        Self::check(&state, MockOperation::Delete, key)?;

        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.remove(key);
        }

        Ok(())
    }

    fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ObjectError> {
        let mut state = self.lock();
        Self::check(&state, MockOperation::DeleteMany, bucket)?;

        if keys.is_empty() || keys.len() > 1000 {
            return Err(ObjectError::with_code(
                format!("delete_objects takes 1 to 1000 keys, got: {}", keys.len()),
                "MalformedXML",
            ));
        }

        if let Some(objects) = state.buckets.get_mut(bucket) {
            for key in keys {
                objects.remove(key);
            }
        }

        Ok(())
    }

    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), ObjectError> {
        let mut state = self.lock();
        Self::check(&state, MockOperation::Copy, source_key)?;

        let objects = state.buckets.entry(bucket.to_string()).or_default();
        let mut object = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| Self::not_found(source_key))?;
        object.modified_time = SystemTime::now();
        objects.insert(destination_key.to_string(), object);

        Ok(())
    }

    fn list_objects(
        &self,
        bucket: &str,
        request: &ListObjectsRequest,
    ) -> Result<ListObjectsPage, ObjectError> {
        let mut state = self.lock();
        Self::check(&state, MockOperation::List, &request.prefix)?;
        state.list_calls += 1;

        let Some(objects) = state.buckets.get(bucket) else {
            return Ok(ListObjectsPage::default());
        };

        let max_keys = usize::try_from(request.max_keys).unwrap_or(0).max(1);
        let delimiter = request.delimiter.as_deref().filter(|d| !d.is_empty());
        let start_after = request.continuation_token.as_deref().unwrap_or("");

        let mut page = ListObjectsPage::default();
        let mut seen_prefixes = BTreeSet::new();
        let mut returned = 0;
        let mut last_key = None;

        let candidates = objects
            .iter()
            .filter(|(key, _)| key.starts_with(&request.prefix) && key.as_str() > start_after);

        for (key, object) in candidates {
            let rest = &key[request.prefix.len()..];
            let common_prefix = delimiter.and_then(|d| {
                rest.find(d)
                    .map(|pos| format!("{}{}", request.prefix, &rest[..pos + d.len()]))
            });

            // A grouped prefix costs one key the first time it appears.
            if let Some(prefix) = &common_prefix {
                if seen_prefixes.contains(prefix) {
                    last_key = Some(key.clone());
                    continue;
                }
            }

            if returned == max_keys {
                page.next_continuation_token = last_key.clone();
                break;
            }

            match common_prefix {
                Some(prefix) => {
                    seen_prefixes.insert(prefix.clone());
                    page.common_prefixes.push(prefix);
                }
                None => page.objects.push(ObjectInfo {
                    key: key.clone(),
                    size: object.body.len() as u64,
                    last_modified: format_modified(object.modified_time),
                }),
            }

            returned += 1;
            last_key = Some(key.clone());
        }

        Ok(page)
    }

    fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, ObjectError> {
        let state = self.lock();
        Self::check(&state, MockOperation::Presign, key)?;

        let expires = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|now| (now + expires_in).as_secs())
            .map_err(|err| ObjectError::new(err.to_string()))?;

        Ok(format!(
            "https://{}.mock.invalid/{}?Expires={}&Signature=mock",
            bucket,
            urlencoding::encode(key).replace("%2F", "/"),
            expires
        ))
    }
}
