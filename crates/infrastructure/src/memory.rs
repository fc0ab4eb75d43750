use crate::repositories::TodoStore;
use domain::{TodoError, TodoPatch, TodoRecord};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 簡易な InMemory 実装（ローカル開発/テスト用）
///
/// 更新時の存在チェックなど、振る舞いは DynamoDB 実装に合わせている。
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    records: Mutex<HashMap<String, TodoRecord>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TodoRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TodoStore for InMemoryTodoStore {
    async fn put(&self, record: &TodoRecord) -> Result<(), TodoError> {
        self.lock().insert(record.id().to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<TodoRecord>, TodoError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn scan_all(&self) -> Result<Vec<TodoRecord>, TodoError> {
        Ok(self.lock().values().cloned().collect())
    }

    async fn update(&self, id: &str, patch: &TodoPatch) -> Result<TodoRecord, TodoError> {
        let mut records = self.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        record.apply(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), TodoError> {
        self.lock().remove(id);
        Ok(())
    }
}
