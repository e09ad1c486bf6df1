use super::EntityMetadata;

/// Трейт для корня агрегата
///
/// Определяет обязательные методы и метаданные для всех агрегатов системы
pub trait AggregateRoot {
    type Id;

    fn id(&self) -> Self::Id;

    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    /// Индекс агрегата в системе (например, "a025")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции (сегмент REST пути, например, "input-transaction")
    fn collection_name() -> &'static str;

    /// Имя элемента для UI (единственное число)
    fn element_name() -> &'static str;

    /// Имя списка для UI (множественное число)
    fn list_name() -> &'static str;

    /// Базовый путь REST API агрегата (например, "/api/a025/input-transaction")
    fn api_path() -> String {
        format!("/api/{}/{}", Self::aggregate_index(), Self::collection_name())
    }
}
