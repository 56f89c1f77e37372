//! KeyValueStore trait 定義
//!
//! ユーザーや試合の記録を保存するキーバリューストアのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## キーパス
//!
//! キーは `.` 区切りの階層パスで指定します（例: `users.alice.total_score`）。
//! 最後の要素が値のキー、それ以外の要素がバケット名です。

use async_trait::async_trait;

use super::error::StoreError;

/// 起動時に作成されるメインバケット
pub const MAIN_BUCKETS: [&str; 3] = ["users", "matches", "levels"];

/// キーパスをバケット名の列と最後のキーに分解する
///
/// 空のパスや空の要素（`a..b` など）は不正なキーパスとして扱います。
pub fn parse_key_path(key_path: &str) -> Result<(Vec<&str>, &str), StoreError> {
    let chain: Vec<&str> = key_path.split('.').collect();
    if chain.iter().any(|segment| segment.is_empty()) {
        return Err(StoreError::InvalidKeyPath(key_path.to_string()));
    }
    match chain.split_last() {
        Some((key, buckets)) => Ok((buckets.to_vec(), *key)),
        None => Err(StoreError::InvalidKeyPath(key_path.to_string())),
    }
}

/// Key-value store trait
///
/// HTTP 層はこの trait に依存し、具体的な実装には依存しない。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// キーパスの値を取得
    async fn get(&self, key_path: &str) -> Result<serde_json::Value, StoreError>;

    /// キーパスに値を保存（親バケットは存在している必要がある）
    async fn set(&self, key_path: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// キーパスの値またはバケットを削除
    async fn delete(&self, key_path: &str) -> Result<(), StoreError>;

    /// バケットを作成（既に存在する場合は何もしない）
    async fn create_bucket(&self, key_path: &str) -> Result<(), StoreError>;

    /// キーパス以下のツリーを JSON として取得（空文字列はルート）
    async fn tree(&self, key_path: &str) -> Result<serde_json::Value, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_path_splits_buckets_and_key() {
        // テスト項目: キーパスがバケット名とキーに分解される
        // given (前提条件):
        let key_path = "users.alice.total_score";

        // when (操作):
        let (buckets, key) = parse_key_path(key_path).unwrap();

        // then (期待する結果):
        assert_eq!(buckets, vec!["users", "alice"]);
        assert_eq!(key, "total_score");
    }

    #[test]
    fn test_parse_key_path_rejects_empty_segments() {
        // テスト項目: 空の要素を含むキーパスはエラーになる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(parse_key_path("").is_err());
        assert!(parse_key_path("users..alice").is_err());
        assert!(parse_key_path("users.").is_err());
    }
}
