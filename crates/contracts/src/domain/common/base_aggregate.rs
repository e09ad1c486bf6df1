use super::EntityMetadata;
use serde::{Deserialize, Serialize};

/// Базовый агрегат с обязательными полями для всех агрегатов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAggregate<Id> {
    pub id: Id,
    /// Бизнес-код записи (например, "IT-2025-00042")
    #[serde(default)]
    pub code: String,
    /// Описание/назначение платежа
    #[serde(default)]
    pub description: String,
    pub comment: Option<String>,
    #[serde(default)]
    pub metadata: EntityMetadata,
}
