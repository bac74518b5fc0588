use dao::dependency::ServiceDependencyEntity;
pub use dao::dependency::DependencyType;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDependency {
    pub id: Uuid,
    pub dependent_service_id: Uuid,
    pub prerequisite_service_id: Uuid,
    pub dependency_type: DependencyType,
}

impl From<&ServiceDependencyEntity> for ServiceDependency {
    fn from(value: &ServiceDependencyEntity) -> Self {
        Self {
            id: value.id,
            dependent_service_id: value.dependent_service_id,
            prerequisite_service_id: value.prerequisite_service_id,
            dependency_type: value.dependency_type,
        }
    }
}
core_utils::derive_from_reference!(ServiceDependencyEntity, ServiceDependency);
