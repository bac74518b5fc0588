use async_trait::async_trait;
use core_utils::{minutes::MinuteOfDay, weekday::weekday_of};
use dao::{
    appointment::{AppointmentDao, AppointmentResourceDao, AppointmentStatus},
    dependency::{DependencyType, ServiceDependencyDao},
    resource::ResourceDao,
};
use service::{
    conflict::{ConflictDetail, ConflictDetector, ConflictDiagnosis, ConflictKind},
    ServiceError,
};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::gen_service_impl;

/// Detail lists are capped here; a shop with a pathologically overbooked
/// specialist still gets a bounded diagnosis back.
const MAX_DETAILS_PER_CHECK: usize = 5;

gen_service_impl! {
    struct ConflictDetectorImpl: ConflictDetector = ConflictDetectorDeps {
        AppointmentDao: dao::appointment::AppointmentDao = appointment_dao,
        AppointmentResourceDao: dao::appointment::AppointmentResourceDao = appointment_resource_dao,
        ResourceDao: dao::resource::ResourceDao = resource_dao,
        ServiceDependencyDao: dao::dependency::ServiceDependencyDao = service_dependency_dao
    }
}

#[async_trait]
impl<Deps> ConflictDetector for ConflictDetectorImpl<Deps>
where
    Deps: ConflictDetectorDeps + Send + Sync + 'static,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
    Deps::AppointmentResourceDao: AppointmentResourceDao<Transaction = Deps::Transaction>,
    Deps::ResourceDao: ResourceDao<Transaction = Deps::Transaction>,
    Deps::ServiceDependencyDao: ServiceDependencyDao<Transaction = Deps::Transaction>,
{
    type Transaction = Deps::Transaction;

    #[tracing::instrument(skip(self, tx))]
    async fn specialist_conflict(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError> {
        let existing = self
            .appointment_dao
            .find_for_specialist(specialist_id, start, end, &AppointmentStatus::LIVE, tx)
            .await?;

        let details = existing
            .iter()
            .filter(|a| exclude_appointment_id != Some(a.id))
            .filter(|a| {
                let buffered_start =
                    a.start - time::Duration::minutes(a.buffer_before_minutes as i64);
                let buffered_end = a.end + time::Duration::minutes(a.buffer_after_minutes as i64);
                start < buffered_end && end > buffered_start
            })
            .take(MAX_DETAILS_PER_CHECK)
            .map(|a| ConflictDetail {
                kind: ConflictKind::Specialist,
                conflicting_appointment_id: Some(a.id),
                message: format!("specialist already booked {} to {}", a.start, a.end),
            })
            .collect();

        Ok(ConflictDiagnosis { details })
    }

    #[tracing::instrument(skip(self, tx))]
    async fn resource_conflict(
        &self,
        resource_id: Uuid,
        quantity: u32,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError> {
        // (a) the resource must be declared available across the whole
        // candidate window on its weekday; no rows at all means the
        // resource carries no restricted schedule and is always available.
        if start.date() != end.date() {
            return Ok(ConflictDiagnosis {
                details: vec![ConflictDetail {
                    kind: ConflictKind::Resource,
                    conflicting_appointment_id: None,
                    message: "resource windows cannot span midnight".into(),
                }],
            });
        }
        let weekday = weekday_of(start.date());
        let availability = self.resource_dao.get_resource_availability(resource_id, weekday, tx.clone()).await?;
        if !availability.is_empty() {
            let start_minute = MinuteOfDay::from(start.time()).value();
            let end_minute = MinuteOfDay::from(end.time()).value();
            let covered = availability.iter().any(|row| {
                row.is_available && start_minute >= row.from_minute && end_minute <= row.to_minute
            });
            if !covered {
                return Ok(ConflictDiagnosis {
                    details: vec![ConflictDetail {
                        kind: ConflictKind::Resource,
                        conflicting_appointment_id: None,
                        message: "resource is not available during the requested window".into(),
                    }],
                });
            }
        }

        // (b) no overlapping allocation of this resource already exists.
        // Each resource row is one bookable unit; any overlapping
        // allocation of it is a conflict regardless of the quantity
        // requested here, which exists for diagnostic detail only.
        let existing = self
            .appointment_resource_dao
            .find_for_resource(
                resource_id,
                start,
                end,
                &AppointmentStatus::LIVE,
                exclude_appointment_id,
                tx,
            )
            .await?;

        let details = existing
            .iter()
            .take(MAX_DETAILS_PER_CHECK)
            .map(|r| ConflictDetail {
                kind: ConflictKind::Resource,
                conflicting_appointment_id: Some(r.appointment_id),
                message: format!(
                    "resource already allocated (quantity {}), requested {quantity}",
                    r.quantity
                ),
            })
            .collect::<Vec<_>>();

        Ok(ConflictDiagnosis { details })
    }

    #[tracing::instrument(skip(self, tx))]
    async fn service_capacity(
        &self,
        service_id: Uuid,
        instant: PrimitiveDateTime,
        max_concurrent_bookings: Option<u32>,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError> {
        let Some(max_concurrent) = max_concurrent_bookings else {
            return Ok(ConflictDiagnosis::default());
        };

        let count = self
            .appointment_dao
            .count_for_service_covering_instant(
                service_id,
                instant,
                &AppointmentStatus::LIVE,
                exclude_appointment_id,
                tx,
            )
            .await?;

        if count as u32 >= max_concurrent {
            Ok(ConflictDiagnosis {
                details: vec![ConflictDetail {
                    kind: ConflictKind::Capacity,
                    conflicting_appointment_id: None,
                    message: format!(
                        "service at capacity: {count} of {max_concurrent} concurrent bookings"
                    ),
                }],
            })
        } else {
            Ok(ConflictDiagnosis::default())
        }
    }

    #[tracing::instrument(skip(self, tx))]
    async fn dependency_conflict(
        &self,
        dependent_service_id: Uuid,
        customer_id: Uuid,
        shop_id: Uuid,
        before: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError> {
        let prerequisites = self
            .service_dependency_dao
            .get_dependencies(dependent_service_id, DependencyType::Prerequisite, tx.clone())
            .await?;

        let mut details = Vec::new();
        for dependency in prerequisites.iter() {
            let satisfied = self
                .appointment_dao
                .has_completed_prerequisite(
                    dependency.prerequisite_service_id,
                    customer_id,
                    shop_id,
                    before,
                    tx.clone(),
                )
                .await?;
            if !satisfied {
                details.push(ConflictDetail {
                    kind: ConflictKind::Dependency,
                    conflicting_appointment_id: None,
                    message: format!(
                        "prerequisite service {} not yet completed",
                        dependency.prerequisite_service_id
                    ),
                });
                if details.len() >= MAX_DETAILS_PER_CHECK {
                    break;
                }
            }
        }

        Ok(ConflictDiagnosis { details })
    }

    #[tracing::instrument(skip(self, tx))]
    async fn aggregate_check(
        &self,
        specialist_id: Uuid,
        resources: Vec<(Uuid, u32)>,
        service_id: Uuid,
        customer_id: Option<Uuid>,
        shop_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        max_concurrent_bookings: Option<u32>,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError> {
        let specialist_fut =
            self.specialist_conflict(specialist_id, start, end, exclude_appointment_id, tx.clone());
        let resource_fut = async {
            let mut diagnosis = ConflictDiagnosis::default();
            for (resource_id, quantity) in resources {
                let result = self
                    .resource_conflict(resource_id, quantity, start, end, exclude_appointment_id, tx.clone())
                    .await?;
                diagnosis = diagnosis.merge(result);
            }
            Ok::<_, ServiceError>(diagnosis)
        };
        let capacity_fut = self.service_capacity(
            service_id,
            start,
            max_concurrent_bookings,
            exclude_appointment_id,
            tx.clone(),
        );
        let dependency_fut = async {
            match customer_id {
                Some(customer_id) => {
                    self.dependency_conflict(service_id, customer_id, shop_id, start, tx.clone())
                        .await
                }
                None => Ok(ConflictDiagnosis::default()),
            }
        };

        let (specialist, resource, capacity, dependency) =
            tokio::join!(specialist_fut, resource_fut, capacity_fut, dependency_fut);

        Ok(specialist?
            .merge(resource?)
            .merge(capacity?)
            .merge(dependency?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_fixed_ordering() {
        let specialist = ConflictDiagnosis {
            details: vec![ConflictDetail {
                kind: ConflictKind::Specialist,
                conflicting_appointment_id: None,
                message: "s".into(),
            }],
        };
        let resource = ConflictDiagnosis {
            details: vec![ConflictDetail {
                kind: ConflictKind::Resource,
                conflicting_appointment_id: None,
                message: "r".into(),
            }],
        };
        let merged = specialist.merge(resource);
        assert_eq!(merged.details[0].kind, ConflictKind::Specialist);
        assert_eq!(merged.details[1].kind, ConflictKind::Resource);
        assert!(merged.has_conflict());
    }

    #[test]
    fn empty_diagnosis_has_no_conflict() {
        assert!(!ConflictDiagnosis::default().has_conflict());
    }
}
