use async_trait::async_trait;
use dao::{
    appointment::{AppointmentDao, AppointmentStatus},
    svc::ServiceDao,
};
use service::{
    buffer::{
        AdjustmentStrategy, BufferManager, BufferRequirements, BufferViolation, TransitionFactor,
        DEFAULT_CLEANUP_BUFFER_MINUTES, DEFAULT_MIN_BUFFER_MINUTES,
    },
    BufferSide, ServiceError,
};
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct BufferManagerImpl: BufferManager = BufferManagerDeps {
        ServiceDao: dao::svc::ServiceDao = service_dao,
        AppointmentDao: dao::appointment::AppointmentDao = appointment_dao
    }
}

/// A buffer shortfall found by the internal candidate-window check used
/// by `adjust_for_buffer`, distinct from the day-scan `BufferViolation`
/// the trait reports for `check_buffer_conflicts`.
struct CandidateViolation {
    side: BufferSide,
    deficit_minutes: i32,
}

impl<Deps> BufferManagerImpl<Deps>
where
    Deps: BufferManagerDeps + Send + Sync + 'static,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
{
    async fn neighbours(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Deps::Transaction,
    ) -> Result<Vec<dao::appointment::AppointmentEntity>, ServiceError> {
        let window_start = start - time::Duration::hours(24);
        let window_end = end + time::Duration::hours(24);
        let existing = self
            .appointment_dao
            .find_for_specialist(
                specialist_id,
                window_start,
                window_end,
                &AppointmentStatus::LIVE,
                tx,
            )
            .await?;
        Ok(existing
            .iter()
            .filter(|a| exclude_appointment_id != Some(a.id))
            .cloned()
            .collect())
    }

    /// Checks a single candidate `[start, end)` window against its
    /// immediate neighbours on the specialist's calendar, used internally
    /// by `adjust_for_buffer`'s pre-check and re-check. This is not the
    /// day-scan operation the trait exposes as `check_buffer_conflicts`.
    async fn candidate_conflicts(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        buffer: BufferRequirements,
        exclude_appointment_id: Option<Uuid>,
        tx: Deps::Transaction,
    ) -> Result<Vec<CandidateViolation>, ServiceError> {
        let neighbours = self
            .neighbours(specialist_id, start, end, exclude_appointment_id, tx)
            .await?;

        let buffered_start = start - time::Duration::minutes(buffer.before_minutes as i64);
        let buffered_end = end + time::Duration::minutes(buffer.after_minutes as i64);

        let mut violations = Vec::new();
        for appt in &neighbours {
            let other_buffered_start =
                appt.start - time::Duration::minutes(appt.buffer_before_minutes as i64);
            let other_buffered_end =
                appt.end + time::Duration::minutes(appt.buffer_after_minutes as i64);

            if appt.end <= start {
                let gap = (start - appt.end).whole_minutes() as i32;
                let required = buffer.before_minutes.max(appt.buffer_after_minutes) as i32;
                if gap < required && buffered_start < other_buffered_end {
                    violations.push(CandidateViolation {
                        side: BufferSide::Before,
                        deficit_minutes: required - gap,
                    });
                }
            } else if appt.start >= end {
                let gap = (appt.start - end).whole_minutes() as i32;
                let required = buffer.after_minutes.max(appt.buffer_before_minutes) as i32;
                if gap < required && buffered_end > other_buffered_start {
                    violations.push(CandidateViolation {
                        side: BufferSide::After,
                        deficit_minutes: required - gap,
                    });
                }
            }
        }
        Ok(violations)
    }
}

#[async_trait]
impl<Deps> BufferManager for BufferManagerImpl<Deps>
where
    Deps: BufferManagerDeps + Send + Sync + 'static,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
{
    type Transaction = Deps::Transaction;

    #[tracing::instrument(skip(self, tx))]
    async fn buffer_requirements(
        &self,
        service_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<BufferRequirements, ServiceError> {
        let service = self
            .service_dao
            .get_service(service_id, tx)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: service_id,
            })?;
        Ok(BufferRequirements {
            before_minutes: service.buffer_before_minutes,
            after_minutes: service.buffer_after_minutes,
        })
    }

    fn suggest_optimal_buffers(
        &self,
        duration_minutes: u16,
        transition_factor: TransitionFactor,
    ) -> BufferRequirements {
        let base = if duration_minutes <= 15 {
            DEFAULT_MIN_BUFFER_MINUTES
        } else if duration_minutes <= 30 {
            10
        } else {
            DEFAULT_CLEANUP_BUFFER_MINUTES
        };
        let scaled = (base as f64 * transition_factor.multiplier()).round() as u16;
        BufferRequirements {
            before_minutes: scaled,
            after_minutes: scaled,
        }
    }

    #[tracing::instrument(skip(self, tx))]
    async fn check_buffer_conflicts(
        &self,
        specialist_id: Uuid,
        date: Date,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<Vec<BufferViolation>, ServiceError> {
        let day_start = PrimitiveDateTime::new(date, time::Time::MIDNIGHT);
        let day_end = day_start + time::Duration::days(1);

        let mut appointments: Vec<_> = self
            .appointment_dao
            .find_for_specialist(
                specialist_id,
                day_start,
                day_end,
                &AppointmentStatus::LIVE,
                tx,
            )
            .await?
            .iter()
            .filter(|a| exclude_appointment_id != Some(a.id))
            .cloned()
            .collect();
        appointments.sort_by_key(|a| a.start);

        let violations = appointments
            .windows(2)
            .filter_map(|pair| {
                let [first, second] = pair else {
                    unreachable!()
                };
                let actual_gap_minutes = (second.start - first.end).whole_minutes() as i32;
                let required_buffer_minutes =
                    first.buffer_after_minutes.max(second.buffer_before_minutes);
                let deficit_minutes = required_buffer_minutes as i32 - actual_gap_minutes;
                (deficit_minutes > 0).then(|| BufferViolation {
                    first_appointment_id: first.id,
                    second_appointment_id: second.id,
                    actual_gap_minutes,
                    required_buffer_minutes,
                    deficit_minutes,
                })
            })
            .collect();

        Ok(violations)
    }

    #[tracing::instrument(skip(self, tx))]
    async fn adjust_for_buffer(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        buffer: BufferRequirements,
        strategy: AdjustmentStrategy,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<(PrimitiveDateTime, PrimitiveDateTime), ServiceError> {
        let violations = self
            .candidate_conflicts(specialist_id, start, end, buffer, exclude_appointment_id, tx.clone())
            .await?;
        if violations.is_empty() {
            return Ok((start, end));
        }

        // An appointment may be shortened by at most `min(5, duration - 15)`
        // minutes; beyond that the adjustment is refused as `TooShort`
        // rather than eating the appointment down further.
        let duration_minutes = (end - start).whole_minutes();
        let max_shift = DEFAULT_MIN_BUFFER_MINUTES.min((duration_minutes - 15).max(0) as u16) as i64;

        let before_deficit = violations
            .iter()
            .filter(|v| v.side == BufferSide::Before)
            .map(|v| v.deficit_minutes)
            .max()
            .unwrap_or(0);
        let after_deficit = violations
            .iter()
            .filter(|v| v.side == BufferSide::After)
            .map(|v| v.deficit_minutes)
            .max()
            .unwrap_or(0);

        let try_delay_start = before_deficit > 0 && (before_deficit as i64) <= max_shift;
        let try_advance_end = after_deficit > 0 && (after_deficit as i64) <= max_shift;

        let chosen = match strategy {
            AdjustmentStrategy::DelayStart if try_delay_start => Some(true),
            AdjustmentStrategy::AdvanceEnd if try_advance_end => Some(false),
            AdjustmentStrategy::Auto => match (try_delay_start, try_advance_end) {
                (true, true) => Some(before_deficit <= after_deficit),
                (true, false) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            },
            _ => None,
        };

        let Some(delay_start) = chosen else {
            return Err(ServiceError::TooShort);
        };

        let (new_start, new_end) = if delay_start {
            (start + time::Duration::minutes(before_deficit as i64), end)
        } else {
            (start, end - time::Duration::minutes(after_deficit as i64))
        };

        // Re-check: a fix must not create a new conflict on the opposite
        // side rather than chaining into a further search.
        let recheck = self
            .candidate_conflicts(
                specialist_id,
                new_start,
                new_end,
                buffer,
                exclude_appointment_id,
                tx,
            )
            .await?;
        if recheck.is_empty() {
            Ok((new_start, new_end))
        } else {
            Err(ServiceError::TooShort)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::{
        appointment::{AppointmentEntity, MockAppointmentDao},
        svc::MockServiceDao,
    };
    use std::sync::Arc;
    use time::macros::datetime;

    struct TestDeps;
    impl BufferManagerDeps for TestDeps {
        type Context = ();
        type Transaction = dao::MockTransaction;
        type ServiceDao = MockServiceDao;
        type AppointmentDao = MockAppointmentDao;
    }

    fn manager_with(appointment_dao: MockAppointmentDao) -> BufferManagerImpl<TestDeps> {
        BufferManagerImpl {
            service_dao: Arc::new(MockServiceDao::new()),
            appointment_dao: Arc::new(appointment_dao),
        }
    }

    fn manager() -> BufferManagerImpl<TestDeps> {
        manager_with(MockAppointmentDao::new())
    }

    fn appointment(id: Uuid, start: PrimitiveDateTime, end: PrimitiveDateTime) -> AppointmentEntity {
        AppointmentEntity {
            id,
            customer_id: None,
            shop_id: Uuid::nil(),
            service_id: Uuid::nil(),
            specialist_id: Uuid::nil(),
            start,
            end,
            buffer_before_minutes: 0,
            buffer_after_minutes: 10,
            status: AppointmentStatus::Scheduled,
            package_id: None,
        }
    }

    #[test]
    fn short_service_suggests_minimum_buffer() {
        let requirements =
            manager().suggest_optimal_buffers(10, TransitionFactor::Low);
        assert_eq!(requirements.before_minutes, 4);
        assert_eq!(requirements.after_minutes, 4);
    }

    #[test]
    fn long_service_with_high_transition_suggests_cleanup_buffer_scaled_up() {
        let requirements =
            manager().suggest_optimal_buffers(60, TransitionFactor::High);
        let expected = (DEFAULT_CLEANUP_BUFFER_MINUTES as f64 * 1.5).round() as u16;
        assert_eq!(requirements.before_minutes, expected);
    }

    #[tokio::test]
    async fn day_scan_reports_deficit_between_adjacent_appointments() {
        let specialist_id = Uuid::new_v4();
        let b_id = Uuid::new_v4();
        let c_id = Uuid::new_v4();
        let b = appointment(
            b_id,
            datetime!(2024-01-08 09:00),
            datetime!(2024-01-08 10:00),
        );
        let c = appointment(
            c_id,
            datetime!(2024-01-08 10:05),
            datetime!(2024-01-08 11:00),
        );

        let mut dao = MockAppointmentDao::new();
        dao.expect_find_for_specialist()
            .returning(move |_, _, _, _, _| {
                let b = b.clone();
                let c = c.clone();
                Ok(Arc::from(vec![b, c]))
            });

        let violations = manager_with(dao)
            .check_buffer_conflicts(
                specialist_id,
                time::macros::date!(2024-01-08),
                None,
                dao::MockTransaction,
            )
            .await
            .unwrap();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].first_appointment_id, b_id);
        assert_eq!(violations[0].second_appointment_id, c_id);
        assert_eq!(violations[0].actual_gap_minutes, 5);
        assert_eq!(violations[0].required_buffer_minutes, 10);
        assert_eq!(violations[0].deficit_minutes, 5);
    }
}
