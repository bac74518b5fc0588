use dao::package::{PackageEntity, PackageServiceEntity};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub current_purchases: u32,
}

impl From<&PackageEntity> for Package {
    fn from(value: &PackageEntity) -> Self {
        Self {
            id: value.id,
            shop_id: value.shop_id,
            current_purchases: value.current_purchases,
        }
    }
}
core_utils::derive_from_reference!(PackageEntity, Package);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageService {
    pub package_id: Uuid,
    pub service_id: Uuid,
    pub order_index: u16,
}

impl From<&PackageServiceEntity> for PackageService {
    fn from(value: &PackageServiceEntity) -> Self {
        Self {
            package_id: value.package_id,
            service_id: value.service_id,
            order_index: value.order_index,
        }
    }
}
core_utils::derive_from_reference!(PackageServiceEntity, PackageService);
