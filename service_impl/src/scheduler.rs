use async_trait::async_trait;
use dao::{
    appointment::{AppointmentDao, AppointmentEntity, AppointmentResourceDao, AppointmentResourceEntity},
    package::PackageDao,
    resource::ResourceDao,
    specialist::SpecialistDao,
    svc::{ServiceDao, ServiceResourceDao, ServiceResourceRequirementEntity},
};
use service::{
    appointment::{Appointment, AppointmentStatus},
    availability::{AvailabilityEngine, Slot},
    buffer::{AdjustmentStrategy, BufferManager},
    clock::ClockService,
    conflict::ConflictDetector,
    scheduler::{PackageLeg, ScheduleMultipleResult, ScheduleRequest, SchedulingOrchestrator, Strategy},
    uuid_service::UuidService,
    ServiceError,
};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::gen_service_impl;
use crate::retry::with_retry;

gen_service_impl! {
    struct SchedulingOrchestratorImpl: SchedulingOrchestrator = SchedulingOrchestratorDeps {
        ServiceDao: dao::svc::ServiceDao = service_dao,
        ServiceResourceDao: dao::svc::ServiceResourceDao = service_resource_dao,
        SpecialistDao: dao::specialist::SpecialistDao = specialist_dao,
        ResourceDao: dao::resource::ResourceDao = resource_dao,
        AppointmentDao: dao::appointment::AppointmentDao = appointment_dao,
        AppointmentResourceDao: dao::appointment::AppointmentResourceDao = appointment_resource_dao,
        PackageDao: dao::package::PackageDao = package_dao,
        AvailabilityEngine: service::availability::AvailabilityEngine = availability_engine,
        ConflictDetector: service::conflict::ConflictDetector = conflict_detector,
        BufferManager: service::buffer::BufferManager = buffer_manager,
        ClockService: service::clock::ClockService = clock_service,
        UuidService: service::uuid_service::UuidService = uuid_service
    }
}

const MAX_TRANSIENT_RETRIES: u32 = 3;

impl<Deps> SchedulingOrchestratorImpl<Deps>
where
    Deps: SchedulingOrchestratorDeps + Send + Sync + 'static,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::ServiceResourceDao: ServiceResourceDao<Transaction = Deps::Transaction>,
    Deps::SpecialistDao: SpecialistDao<Transaction = Deps::Transaction>,
    Deps::ResourceDao: ResourceDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
    Deps::AppointmentResourceDao: AppointmentResourceDao<Transaction = Deps::Transaction>,
    Deps::PackageDao: PackageDao<Transaction = Deps::Transaction>,
    Deps::AvailabilityEngine: AvailabilityEngine<Transaction = Deps::Transaction>,
    Deps::ConflictDetector: ConflictDetector<Transaction = Deps::Transaction>,
    Deps::BufferManager: BufferManager<Transaction = Deps::Transaction>,
    Deps::ClockService: ClockService,
    Deps::UuidService: UuidService,
{
    /// Picks a specialist and start time for `request` according to its
    /// strategy. `EarliestAvailable` and `MinimizeWait` both take the
    /// first open slot; `BalancedWorkload` prefers the qualified
    /// specialist with the fewest bookings; `ResourceEfficient` scores
    /// same-day slots by how tightly they pack against neighbouring
    /// appointments.
    async fn select_slot(
        &self,
        request: &ScheduleRequest,
        from: PrimitiveDateTime,
        tx: Deps::Transaction,
    ) -> Result<Slot, ServiceError> {
        match request.strategy {
            Strategy::EarliestAvailable | Strategy::MinimizeWait => {
                let slot = if let Some(specialist_id) = request.specialist_id {
                    self.availability_engine
                        .earliest_available(request.service_id, Some(specialist_id), from, tx)
                        .await?
                } else {
                    self.availability_engine
                        .next_available_specialist(request.service_id, from, tx)
                        .await?
                };
                slot.ok_or(ServiceError::Conflict(Default::default()))
            }
            Strategy::BalancedWorkload => {
                let slots = self
                    .availability_engine
                    .slots_for_service(request.service_id, request.specialist_id, from.date(), tx.clone())
                    .await?;
                let mut ranked: Vec<(u32, Slot)> = Vec::new();
                for slot in slots.into_iter().filter(|s| s.start >= from) {
                    let booking_count = self
                        .specialist_dao
                        .get_specialist_service(slot.specialist_id, request.service_id, tx.clone())
                        .await?
                        .map(|s| s.booking_count)
                        .unwrap_or(0);
                    ranked.push((booking_count, slot));
                }
                ranked.sort_by_key(|(count, slot)| (*count, slot.start));
                ranked
                    .into_iter()
                    .next()
                    .map(|(_, slot)| slot)
                    .ok_or(ServiceError::Conflict(Default::default()))
            }
            Strategy::ResourceEfficient => {
                let slots = self
                    .availability_engine
                    .slots_for_service(request.service_id, request.specialist_id, from.date(), tx.clone())
                    .await?;
                let candidates: Vec<Slot> = slots.into_iter().filter(|s| s.start >= from).collect();
                let mut best: Option<(i32, Slot)> = None;
                for slot in candidates {
                    let neighbours = self
                        .availability_engine
                        .slots_for_specialist(slot.specialist_id, slot.start.date(), tx.clone())
                        .await?;
                    let score = resource_efficiency_score(&slot, &neighbours);
                    if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                        best = Some((score, slot));
                    }
                }
                best.map(|(_, slot)| slot)
                    .ok_or(ServiceError::Conflict(Default::default()))
            }
        }
    }

    async fn allocate_resources(
        &self,
        requirements: &[ServiceResourceRequirementEntity],
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Deps::Transaction,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let mut allocated = Vec::new();
        for requirement in requirements {
            let mut candidate = requirement.resource_id;
            loop {
                let diagnosis = self
                    .conflict_detector
                    .resource_conflict(
                        candidate,
                        requirement.quantity,
                        start,
                        end,
                        exclude_appointment_id,
                        tx.clone(),
                    )
                    .await?;
                if !diagnosis.has_conflict() {
                    allocated.push(candidate);
                    break;
                }
                let alternates = self.resource_dao.find_same_type_in_shop(candidate, tx.clone()).await?;
                match alternates.iter().find(|r| r.id != candidate && !allocated.contains(&r.id)) {
                    Some(alternate) => candidate = alternate.id,
                    None => return Err(ServiceError::Conflict(diagnosis)),
                }
            }
        }
        Ok(allocated)
    }

    /// `sequential = true` path: orders legs by descending duration and
    /// chains them back-to-back, preferring to keep the specialist that
    /// booked the previous leg when that specialist also qualifies for
    /// the next one.
    async fn schedule_sequential(
        &self,
        shop_id: Uuid,
        package_id: Uuid,
        customer_id: Option<Uuid>,
        legs: Vec<PackageLeg>,
        start_from: PrimitiveDateTime,
        strategy: Strategy,
        tx: Deps::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError> {
        let mut with_duration = Vec::with_capacity(legs.len());
        for leg in legs {
            let service = self
                .service_dao
                .get_service(leg.service_id, tx.clone())
                .await?
                .ok_or(ServiceError::NotFound {
                    kind: dao::EntityKind::Service,
                    id: leg.service_id,
                })?;
            with_duration.push((leg, service.duration_minutes));
        }
        with_duration.sort_by_key(|(_, duration)| std::cmp::Reverse(*duration));

        let mut booked = Vec::new();
        let mut cursor = start_from;
        let mut preferred_specialist: Option<Uuid> = None;

        for (leg, _duration) in with_duration {
            let wanted_specialist = leg.specialist_id.or(preferred_specialist);
            let request = ScheduleRequest {
                shop_id,
                service_id: leg.service_id,
                specialist_id: wanted_specialist,
                customer_id,
                requested_start: Some(cursor),
                strategy,
                package_id: Some(package_id),
            };
            let carried_over = leg.specialist_id.is_none() && preferred_specialist.is_some();
            let outcome = match self.schedule(request, tx.clone()).await {
                Err(_) if carried_over => {
                    let fallback = ScheduleRequest {
                        shop_id,
                        service_id: leg.service_id,
                        specialist_id: None,
                        customer_id,
                        requested_start: Some(cursor),
                        strategy,
                        package_id: Some(package_id),
                    };
                    self.schedule(fallback, tx.clone()).await
                }
                other => other,
            };
            match outcome {
                Ok(appointment) => {
                    cursor = appointment.end;
                    preferred_specialist = Some(appointment.specialist_id);
                    booked.push(appointment);
                }
                Err(err) => return self.compensate(package_id, booked, leg.service_id, err, tx).await,
            }
        }

        self.finish_package(package_id, booked, tx).await
    }

    /// `sequential = false` path: every leg is booked independently under
    /// `strategy`, all starting no earlier than `start_from`, with no
    /// chaining between legs.
    async fn schedule_independent(
        &self,
        shop_id: Uuid,
        package_id: Uuid,
        customer_id: Option<Uuid>,
        legs: Vec<PackageLeg>,
        start_from: PrimitiveDateTime,
        strategy: Strategy,
        tx: Deps::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError> {
        let mut booked = Vec::new();
        for leg in legs {
            let request = ScheduleRequest {
                shop_id,
                service_id: leg.service_id,
                specialist_id: leg.specialist_id,
                customer_id,
                requested_start: Some(start_from),
                strategy,
                package_id: Some(package_id),
            };
            match self.schedule(request, tx.clone()).await {
                Ok(appointment) => booked.push(appointment),
                Err(err) => return self.compensate(package_id, booked, leg.service_id, err, tx).await,
            }
        }
        self.finish_package(package_id, booked, tx).await
    }

    async fn compensate(
        &self,
        package_id: Uuid,
        booked: Vec<Appointment>,
        failed_service_id: Uuid,
        err: ServiceError,
        tx: Deps::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError> {
        let mut compensation_note = String::new();
        for appointment in &booked {
            if let Err(cancel_err) = self.cancel(appointment.id, tx.clone()).await {
                compensation_note.push_str(&format!(
                    "; failed to compensate appointment {}: {cancel_err}",
                    appointment.id
                ));
            }
        }
        Ok(ScheduleMultipleResult {
            appointments: Vec::new(),
            partial_failure: Some(format!(
                "package {package_id} failed at leg {failed_service_id}: {err}{compensation_note}"
            )),
        })
    }

    async fn finish_package(
        &self,
        package_id: Uuid,
        booked: Vec<Appointment>,
        tx: Deps::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError> {
        with_retry(MAX_TRANSIENT_RETRIES, || {
            self.package_dao.increment_purchase_counter(package_id, 1, tx.clone())
        })
        .await?;

        Ok(ScheduleMultipleResult {
            appointments: booked,
            partial_failure: None,
        })
    }
}

/// +10 for a gap under 15 minutes to the nearest neighbour, +5 under 30,
/// +1 under 60, -20 if it would overlap (never offered as a slot, kept
/// here for symmetry with the original heuristic).
fn resource_efficiency_score(slot: &Slot, neighbours: &[Slot]) -> i32 {
    let mut nearest_gap_minutes = i64::MAX;
    for other in neighbours {
        if other.end <= slot.start {
            nearest_gap_minutes = nearest_gap_minutes.min((slot.start - other.end).whole_minutes());
        } else if other.start >= slot.end {
            nearest_gap_minutes = nearest_gap_minutes.min((other.start - slot.end).whole_minutes());
        }
    }
    match nearest_gap_minutes {
        gap if gap < 0 => -20,
        gap if gap < 15 => 10,
        gap if gap < 30 => 5,
        gap if gap < 60 => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn slot(specialist_id: Uuid, start: PrimitiveDateTime, end: PrimitiveDateTime) -> Slot {
        Slot { specialist_id, start, end }
    }

    #[test]
    fn tight_gap_scores_highest() {
        let specialist = Uuid::new_v4();
        let candidate = slot(specialist, datetime!(2026-08-03 10:00), datetime!(2026-08-03 10:30));
        let neighbour = slot(specialist, datetime!(2026-08-03 10:40), datetime!(2026-08-03 11:10));
        assert_eq!(resource_efficiency_score(&candidate, &[neighbour]), 10);
    }

    #[test]
    fn distant_neighbour_scores_zero() {
        let specialist = Uuid::new_v4();
        let candidate = slot(specialist, datetime!(2026-08-03 10:00), datetime!(2026-08-03 10:30));
        let neighbour = slot(specialist, datetime!(2026-08-03 13:00), datetime!(2026-08-03 13:30));
        assert_eq!(resource_efficiency_score(&candidate, &[neighbour]), 0);
    }

    #[test]
    fn no_neighbours_scores_zero() {
        let specialist = Uuid::new_v4();
        let candidate = slot(specialist, datetime!(2026-08-03 10:00), datetime!(2026-08-03 10:30));
        assert_eq!(resource_efficiency_score(&candidate, &[]), 0);
    }
}

#[async_trait]
impl<Deps> SchedulingOrchestrator for SchedulingOrchestratorImpl<Deps>
where
    Deps: SchedulingOrchestratorDeps + Send + Sync + 'static,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::ServiceResourceDao: ServiceResourceDao<Transaction = Deps::Transaction>,
    Deps::SpecialistDao: SpecialistDao<Transaction = Deps::Transaction>,
    Deps::ResourceDao: ResourceDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
    Deps::AppointmentResourceDao: AppointmentResourceDao<Transaction = Deps::Transaction>,
    Deps::PackageDao: PackageDao<Transaction = Deps::Transaction>,
    Deps::AvailabilityEngine: AvailabilityEngine<Transaction = Deps::Transaction>,
    Deps::ConflictDetector: ConflictDetector<Transaction = Deps::Transaction>,
    Deps::BufferManager: BufferManager<Transaction = Deps::Transaction>,
    Deps::ClockService: ClockService,
    Deps::UuidService: UuidService,
{
    type Transaction = Deps::Transaction;

    #[tracing::instrument(skip(self, tx))]
    async fn schedule(
        &self,
        request: ScheduleRequest,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError> {
        let service = self
            .service_dao
            .get_service(request.service_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: request.service_id,
            })?;
        if service.status != dao::svc::ServiceStatus::Active {
            return Err(ServiceError::ServiceNotActive);
        }

        let from = request.requested_start.unwrap_or_else(|| self.clock_service.date_time_now());
        let slot = self.select_slot(&request, from, tx.clone()).await?;

        let buffer = self
            .buffer_manager
            .buffer_requirements(request.service_id, tx.clone())
            .await?;
        let (start, end) = self
            .buffer_manager
            .adjust_for_buffer(
                slot.specialist_id,
                slot.start,
                slot.end,
                buffer,
                AdjustmentStrategy::Auto,
                None,
                tx.clone(),
            )
            .await?;

        let requirements = self
            .service_resource_dao
            .get_required_resources(request.service_id, tx.clone())
            .await?;
        let resources: Vec<(Uuid, u32)> = requirements
            .iter()
            .map(|r| (r.resource_id, r.quantity))
            .collect();

        let diagnosis = self
            .conflict_detector
            .aggregate_check(
                slot.specialist_id,
                resources,
                request.service_id,
                request.customer_id,
                request.shop_id,
                start,
                end,
                service.max_concurrent_bookings,
                None,
                tx.clone(),
            )
            .await?;
        if diagnosis.has_conflict() {
            return Err(ServiceError::Conflict(diagnosis));
        }

        let allocated_resources = self
            .allocate_resources(&requirements, start, end, None, tx.clone())
            .await?;

        let entity = AppointmentEntity {
            id: self.uuid_service.new_uuid("appointment"),
            customer_id: request.customer_id,
            shop_id: request.shop_id,
            service_id: request.service_id,
            specialist_id: slot.specialist_id,
            start,
            end,
            buffer_before_minutes: buffer.before_minutes,
            buffer_after_minutes: buffer.after_minutes,
            status: dao::appointment::AppointmentStatus::Scheduled,
            package_id: request.package_id,
        };

        with_retry(MAX_TRANSIENT_RETRIES, || {
            self.appointment_dao.insert(&entity, "schedule", tx.clone())
        })
        .await?;
        for resource_id in &allocated_resources {
            let allocation = AppointmentResourceEntity {
                id: self.uuid_service.new_uuid("appointment_resource"),
                appointment_id: entity.id,
                resource_id: *resource_id,
                quantity: 1,
            };
            with_retry(MAX_TRANSIENT_RETRIES, || {
                self.appointment_resource_dao.insert(&allocation, tx.clone())
            })
            .await?;
        }
        with_retry(MAX_TRANSIENT_RETRIES, || {
            self.specialist_dao
                .increment_booking_count(slot.specialist_id, request.service_id, 1, tx.clone())
        })
        .await?;

        Ok(Appointment::from(&entity))
    }

    #[tracing::instrument(skip(self, tx))]
    async fn schedule_multiple(
        &self,
        shop_id: Uuid,
        package_id: Uuid,
        customer_id: Option<Uuid>,
        legs: Vec<PackageLeg>,
        start_from: PrimitiveDateTime,
        strategy: Strategy,
        sequential: bool,
        tx: Self::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError> {
        if sequential {
            self.schedule_sequential(shop_id, package_id, customer_id, legs, start_from, strategy, tx)
                .await
        } else {
            self.schedule_independent(shop_id, package_id, customer_id, legs, start_from, strategy, tx)
                .await
        }
    }

    #[tracing::instrument(skip(self, tx))]
    async fn reschedule(
        &self,
        appointment_id: Uuid,
        new_start: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError> {
        let entity = self
            .appointment_dao
            .find_by_id(appointment_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Appointment,
                id: appointment_id,
            })?;
        let duration = entity.end - entity.start;
        let new_end = new_start + duration;

        let buffer = service::buffer::BufferRequirements {
            before_minutes: entity.buffer_before_minutes,
            after_minutes: entity.buffer_after_minutes,
        };
        let (start, end) = self
            .buffer_manager
            .adjust_for_buffer(
                entity.specialist_id,
                new_start,
                new_end,
                buffer,
                AdjustmentStrategy::Auto,
                Some(appointment_id),
                tx.clone(),
            )
            .await?;

        let service = self
            .service_dao
            .get_service(entity.service_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: entity.service_id,
            })?;

        let held_resources = self
            .appointment_resource_dao
            .find_for_appointment(appointment_id, tx.clone())
            .await?;
        let resources: Vec<(Uuid, u32)> = held_resources
            .iter()
            .map(|r| (r.resource_id, r.quantity))
            .collect();

        let diagnosis = self
            .conflict_detector
            .aggregate_check(
                entity.specialist_id,
                resources,
                entity.service_id,
                entity.customer_id,
                entity.shop_id,
                start,
                end,
                service.max_concurrent_bookings,
                Some(appointment_id),
                tx.clone(),
            )
            .await?;
        if diagnosis.has_conflict() {
            return Err(ServiceError::Conflict(diagnosis));
        }

        let updated = AppointmentEntity {
            start,
            end,
            ..entity
        };
        with_retry(MAX_TRANSIENT_RETRIES, || {
            self.appointment_dao.update(&updated, "reschedule", tx.clone())
        })
        .await?;

        Ok(Appointment::from(&updated))
    }

    #[tracing::instrument(skip(self, tx))]
    async fn cancel(
        &self,
        appointment_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError> {
        self.mark_status(appointment_id, AppointmentStatus::Cancelled, tx).await
    }

    #[tracing::instrument(skip(self, tx))]
    async fn mark_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError> {
        let entity = self
            .appointment_dao
            .find_by_id(appointment_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Appointment,
                id: appointment_id,
            })?;
        let domain: Appointment = (&entity).into();
        domain.transition_to(status)?;

        let updated = AppointmentEntity {
            status: status.into(),
            ..entity.clone()
        };
        with_retry(MAX_TRANSIENT_RETRIES, || {
            self.appointment_dao.update(&updated, "mark_status", tx.clone())
        })
        .await?;

        // Cancelled and no-show both release buffer ownership and
        // resources immediately; mark_status is the sole choke point for
        // every status change, so this is the only place that needs to do it.
        if matches!(status, AppointmentStatus::Cancelled | AppointmentStatus::NoShow) {
            with_retry(MAX_TRANSIENT_RETRIES, || {
                self.appointment_resource_dao.delete_for_appointment(appointment_id, tx.clone())
            })
            .await?;
            with_retry(MAX_TRANSIENT_RETRIES, || {
                self.specialist_dao.increment_booking_count(entity.specialist_id, entity.service_id, -1, tx.clone())
            })
            .await?;
            if let Some(package_id) = entity.package_id {
                with_retry(MAX_TRANSIENT_RETRIES, || {
                    self.package_dao.increment_purchase_counter(package_id, -1, tx.clone())
                })
                .await?;
            }
        }

        Ok(Appointment::from(&updated))
    }
}
