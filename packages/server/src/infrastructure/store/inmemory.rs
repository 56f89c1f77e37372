//! InMemory KeyValueStore 実装
//!
//! ドメイン層が定義する KeyValueStore trait の具体的な実装。
//! ネストした BTreeMap をバケットとして使用します。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::{KeyValueStore, MAIN_BUCKETS, StoreError, parse_key_path};

#[derive(Debug, Clone)]
enum Node {
    Value(Value),
    Bucket(BTreeMap<String, Node>),
}

impl Node {
    fn to_json(&self) -> Value {
        match self {
            Node::Value(value) => value.clone(),
            Node::Bucket(children) => bucket_to_json(children),
        }
    }
}

fn bucket_to_json(children: &BTreeMap<String, Node>) -> Value {
    Value::Object(
        children
            .iter()
            .map(|(name, node)| (name.clone(), node.to_json()))
            .collect(),
    )
}

/// キーパスのバケットをたどる
fn bucket<'a>(
    mut current: &'a BTreeMap<String, Node>,
    key_path: &str,
    buckets: &[&str],
) -> Result<&'a BTreeMap<String, Node>, StoreError> {
    for name in buckets {
        current = match current.get(*name) {
            Some(Node::Bucket(children)) => children,
            Some(Node::Value(_)) => return Err(StoreError::NotABucket(name.to_string())),
            None => {
                return Err(StoreError::BucketNotFound {
                    key_path: key_path.to_string(),
                    bucket: name.to_string(),
                });
            }
        };
    }
    Ok(current)
}

fn bucket_mut<'a>(
    mut current: &'a mut BTreeMap<String, Node>,
    key_path: &str,
    buckets: &[&str],
) -> Result<&'a mut BTreeMap<String, Node>, StoreError> {
    for name in buckets {
        current = match current.get_mut(*name) {
            Some(Node::Bucket(children)) => children,
            Some(Node::Value(_)) => return Err(StoreError::NotABucket(name.to_string())),
            None => {
                return Err(StoreError::BucketNotFound {
                    key_path: key_path.to_string(),
                    bucket: name.to_string(),
                });
            }
        };
    }
    Ok(current)
}

/// インメモリ KeyValueStore 実装
///
/// 作成時にメインバケット（`users`, `matches`, `levels`）を用意します。
pub struct InMemoryStore {
    root: Mutex<BTreeMap<String, Node>>,
}

impl InMemoryStore {
    /// 新しい InMemoryStore を作成
    pub fn new() -> Self {
        let root = MAIN_BUCKETS
            .iter()
            .map(|name| (name.to_string(), Node::Bucket(BTreeMap::new())))
            .collect();
        tracing::debug!("Created main buckets: {:?}", MAIN_BUCKETS);
        Self {
            root: Mutex::new(root),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key_path: &str) -> Result<Value, StoreError> {
        let (buckets, key) = parse_key_path(key_path)?;
        let root = self.root.lock().await;
        match bucket(&root, key_path, &buckets)?.get(key) {
            Some(Node::Value(value)) => Ok(value.clone()),
            Some(Node::Bucket(_)) => Err(StoreError::NotAValue(key_path.to_string())),
            None => Err(StoreError::KeyNotFound(key_path.to_string())),
        }
    }

    async fn set(&self, key_path: &str, value: Value) -> Result<(), StoreError> {
        let (buckets, key) = parse_key_path(key_path)?;
        let mut root = self.root.lock().await;
        let parent = bucket_mut(&mut root, key_path, &buckets)?;
        if let Some(Node::Bucket(_)) = parent.get(key) {
            return Err(StoreError::NotAValue(key_path.to_string()));
        }
        parent.insert(key.to_string(), Node::Value(value));
        tracing::debug!("Stored value at '{}'", key_path);
        Ok(())
    }

    async fn delete(&self, key_path: &str) -> Result<(), StoreError> {
        let (buckets, key) = parse_key_path(key_path)?;
        let mut root = self.root.lock().await;
        bucket_mut(&mut root, key_path, &buckets)?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::KeyNotFound(key_path.to_string()))
    }

    async fn create_bucket(&self, key_path: &str) -> Result<(), StoreError> {
        let (buckets, key) = parse_key_path(key_path)?;
        let mut root = self.root.lock().await;
        let mut current = &mut *root;
        for name in buckets.into_iter().chain(std::iter::once(key)) {
            let node = current
                .entry(name.to_string())
                .or_insert_with(|| Node::Bucket(BTreeMap::new()));
            current = match node {
                Node::Bucket(children) => children,
                Node::Value(_) => return Err(StoreError::NotABucket(name.to_string())),
            };
        }
        Ok(())
    }

    async fn tree(&self, key_path: &str) -> Result<Value, StoreError> {
        let root = self.root.lock().await;
        if key_path.is_empty() {
            return Ok(bucket_to_json(&root));
        }
        let (buckets, key) = parse_key_path(key_path)?;
        bucket(&root, key_path, &buckets)?
            .get(key)
            .map(Node::to_json)
            .ok_or_else(|| StoreError::KeyNotFound(key_path.to_string()))
    }
}
