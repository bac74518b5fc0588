use async_trait::async_trait;
use core_utils::{minutes::MinuteOfDay, weekday::weekday_of};
use dao::{
    appointment::{AppointmentDao, AppointmentStatus},
    shop::ShopDao,
    specialist::SpecialistDao,
    svc::{ServiceDao, ServiceStatus},
};
use service::{
    availability::{AvailabilityEngine, Slot},
    clock::ClockService,
    ServiceError,
};
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::gen_service_impl;

gen_service_impl! {
    struct AvailabilityEngineImpl: AvailabilityEngine = AvailabilityEngineDeps {
        ShopDao: dao::shop::ShopDao = shop_dao,
        ServiceDao: dao::svc::ServiceDao = service_dao,
        SpecialistDao: dao::specialist::SpecialistDao = specialist_dao,
        AppointmentDao: dao::appointment::AppointmentDao = appointment_dao,
        ClockService: service::clock::ClockService = clock_service
    }
}

fn minute_to_time(minute: u16) -> Result<time::Time, ServiceError> {
    MinuteOfDay::new(minute)
        .map_err(|_| ServiceError::InvalidWindow)?
        .try_into()
        .map_err(|_| ServiceError::InvalidWindow)
}

fn overlaps_buffered(
    candidate_start: PrimitiveDateTime,
    candidate_end: PrimitiveDateTime,
    appt: &dao::appointment::AppointmentEntity,
) -> bool {
    let buffered_start = appt.start - time::Duration::minutes(appt.buffer_before_minutes as i64);
    let buffered_end = appt.end + time::Duration::minutes(appt.buffer_after_minutes as i64);
    candidate_start < buffered_end && candidate_end > buffered_start
}

impl<Deps> AvailabilityEngineImpl<Deps>
where
    Deps: AvailabilityEngineDeps + Send + Sync + 'static,
    Deps::ShopDao: ShopDao<Transaction = Deps::Transaction>,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::SpecialistDao: SpecialistDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
    Deps::ClockService: ClockService,
{
    /// Every open slot for `service_id` on `date`, across qualified
    /// specialists (or pinned to one), in a single day's scan.
    ///
    /// Step 2 of the day-window computation: an open, non-closed
    /// exception for the date fully replaces the day's hours. Otherwise
    /// the shop's hours are the baseline, narrowed by the service's own
    /// per-weekday override only when `has_custom_availability` is set.
    async fn slots_on_date(
        &self,
        service_id: Uuid,
        specialist_id: Option<Uuid>,
        date: Date,
        tx: Deps::Transaction,
    ) -> Result<Vec<Slot>, ServiceError> {
        let service = self
            .service_dao
            .get_service(service_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: service_id,
            })?;
        if service.status != ServiceStatus::Active {
            return Ok(vec![]);
        }

        let today = self.clock_service.date_now();
        let horizon = today + time::Duration::days(service.max_advance_booking_days as i64);
        if date < today || date > horizon {
            return Ok(vec![]);
        }

        let weekday = weekday_of(date);
        let exception = self
            .service_dao
            .get_service_exception(service_id, date, tx.clone())
            .await?;
        let (service_from, service_to) = if let Some(exception) = exception {
            if exception.is_closed {
                return Ok(vec![]);
            }
            (exception.from_minute, exception.to_minute)
        } else {
            // Shop hours are the mandatory baseline; the shop being closed
            // always wins over anything the service declares.
            let Some(shop_hours) = self
                .shop_dao
                .get_shop_hours(service.shop_id, weekday, tx.clone())
                .await?
                .filter(|h| !h.is_closed)
            else {
                return Ok(vec![]);
            };
            let mut window = (shop_hours.from_minute, shop_hours.to_minute);
            if service.has_custom_availability {
                match self.service_dao.get_service_hours(service_id, weekday, tx.clone()).await? {
                    Some(custom) if !custom.is_closed => {
                        window.0 = window.0.max(custom.from_minute);
                        window.1 = window.1.min(custom.to_minute);
                    }
                    _ => return Ok(vec![]),
                }
            }
            window
        };
        if service_from >= service_to {
            return Ok(vec![]);
        }

        let midnight = PrimitiveDateTime::new(date, time::Time::MIDNIGHT);
        let next_midnight = midnight + time::Duration::days(1);

        let candidates = self
            .specialist_dao
            .get_specialists_for_service(service_id, tx.clone())
            .await?;
        let granularity = service.slot_granularity_minutes.max(1);
        let earliest_allowed = self.clock_service.date_time_now()
            + time::Duration::minutes(service.min_booking_notice_minutes as i64);

        let mut slots = Vec::new();
        for sp_service in candidates.iter() {
            if let Some(wanted) = specialist_id {
                if sp_service.specialist_id != wanted {
                    continue;
                }
            }
            let Some(working_hours) = self
                .specialist_dao
                .get_specialist_working_hours(sp_service.specialist_id, weekday, tx.clone())
                .await?
            else {
                continue;
            };
            if working_hours.is_off {
                continue;
            }

            let window_from = service_from.max(working_hours.from_minute);
            let window_to = service_to.min(working_hours.to_minute);
            if window_from >= window_to {
                continue;
            }

            let duration = sp_service.effective_duration_minutes(service.duration_minutes);
            if duration == 0 {
                continue;
            }

            let existing = self
                .appointment_dao
                .find_for_specialist(
                    sp_service.specialist_id,
                    midnight,
                    next_midnight,
                    &AppointmentStatus::LIVE,
                    tx.clone(),
                )
                .await?;

            // The window itself opens `buffer_before` after the shop/working
            // hours open and must leave room for `buffer_after` before
            // close, on top of the service's own duration.
            let mut cursor = window_from.saturating_add(service.buffer_before_minutes);
            while cursor.saturating_add(duration).saturating_add(service.buffer_after_minutes) <= window_to {
                let start = PrimitiveDateTime::new(date, minute_to_time(cursor)?);
                let end = PrimitiveDateTime::new(date, minute_to_time(cursor + duration)?);
                let too_soon = start < earliest_allowed;
                let conflict = existing.iter().any(|a| overlaps_buffered(start, end, a));
                if !too_soon && !conflict {
                    slots.push(Slot {
                        specialist_id: sp_service.specialist_id,
                        start,
                        end,
                    });
                }
                cursor += granularity;
            }
        }

        slots.sort_by_key(|s| (s.start, s.specialist_id));
        Ok(slots)
    }
}

#[async_trait]
impl<Deps> AvailabilityEngine for AvailabilityEngineImpl<Deps>
where
    Deps: AvailabilityEngineDeps + Send + Sync + 'static,
    Deps::ShopDao: ShopDao<Transaction = Deps::Transaction>,
    Deps::ServiceDao: ServiceDao<Transaction = Deps::Transaction>,
    Deps::SpecialistDao: SpecialistDao<Transaction = Deps::Transaction>,
    Deps::AppointmentDao: AppointmentDao<Transaction = Deps::Transaction>,
    Deps::ClockService: ClockService,
{
    type Transaction = Deps::Transaction;

    #[tracing::instrument(skip(self, tx))]
    async fn slots_for_service(
        &self,
        service_id: Uuid,
        specialist_id: Option<Uuid>,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Slot>, ServiceError> {
        self.slots_on_date(service_id, specialist_id, date, tx).await
    }

    #[tracing::instrument(skip(self, tx))]
    async fn slots_for_specialist(
        &self,
        specialist_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Slot>, ServiceError> {
        if date < self.clock_service.date_now() {
            return Ok(vec![]);
        }

        let weekday = weekday_of(date);
        let Some(working_hours) = self
            .specialist_dao
            .get_specialist_working_hours(specialist_id, weekday, tx.clone())
            .await?
        else {
            return Ok(vec![]);
        };
        if working_hours.is_off {
            return Ok(vec![]);
        }

        let midnight = PrimitiveDateTime::new(date, time::Time::MIDNIGHT);
        let next_midnight = midnight + time::Duration::days(1);
        let existing = self
            .appointment_dao
            .find_for_specialist(
                specialist_id,
                midnight,
                next_midnight,
                &AppointmentStatus::LIVE,
                tx,
            )
            .await?;

        // Subtract each buffered appointment window from the working-hours
        // window, leaving the specialist's free intervals for the day.
        let mut busy: Vec<(u16, u16)> = existing
            .iter()
            .filter_map(|a| {
                if a.start.date() != date && a.end.date() != date {
                    return None;
                }
                let buffered_start = a.start - time::Duration::minutes(a.buffer_before_minutes as i64);
                let buffered_end = a.end + time::Duration::minutes(a.buffer_after_minutes as i64);
                let from_minute = if buffered_start.date() < date {
                    0
                } else {
                    MinuteOfDay::from(buffered_start.time()).value()
                };
                let to_minute = if buffered_end.date() > date {
                    core_utils::minutes::MINUTES_PER_DAY
                } else {
                    MinuteOfDay::from(buffered_end.time()).value()
                };
                Some((from_minute.max(working_hours.from_minute), to_minute.min(working_hours.to_minute)))
            })
            .filter(|(s, e)| s < e)
            .collect();
        busy.sort();

        let mut slots = Vec::new();
        let mut cursor = working_hours.from_minute;
        for (busy_start, busy_end) in busy {
            if cursor < busy_start {
                slots.push(Slot {
                    specialist_id,
                    start: PrimitiveDateTime::new(date, minute_to_time(cursor)?),
                    end: PrimitiveDateTime::new(date, minute_to_time(busy_start)?),
                });
            }
            cursor = cursor.max(busy_end);
        }
        if cursor < working_hours.to_minute {
            slots.push(Slot {
                specialist_id,
                start: PrimitiveDateTime::new(date, minute_to_time(cursor)?),
                end: PrimitiveDateTime::new(date, minute_to_time(working_hours.to_minute)?),
            });
        }
        Ok(slots)
    }

    #[tracing::instrument(skip(self, tx))]
    async fn next_available_specialist(
        &self,
        service_id: Uuid,
        from: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Option<Slot>, ServiceError> {
        let service = self
            .service_dao
            .get_service(service_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: service_id,
            })?;

        let mut date = from.date();
        let horizon = date + time::Duration::days(service.max_advance_booking_days as i64);
        while date <= horizon {
            let slots = self.slots_on_date(service_id, None, date, tx.clone()).await?;
            if let Some(slot) = slots.into_iter().find(|s| s.start >= from) {
                return Ok(Some(slot));
            }
            date += time::Duration::days(1);
        }
        Ok(None)
    }

    #[tracing::instrument(skip(self, tx))]
    async fn earliest_available(
        &self,
        service_id: Uuid,
        specialist_id: Option<Uuid>,
        from: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Option<Slot>, ServiceError> {
        let service = self
            .service_dao
            .get_service(service_id, tx.clone())
            .await?
            .ok_or(ServiceError::NotFound {
                kind: dao::EntityKind::Service,
                id: service_id,
            })?;

        let mut date = from.date();
        let horizon = date + time::Duration::days(service.max_advance_booking_days as i64);
        while date <= horizon {
            let slots = self
                .slots_on_date(service_id, specialist_id, date, tx.clone())
                .await?;
            if let Some(slot) = slots.into_iter().find(|s| s.start >= from) {
                return Ok(Some(slot));
            }
            date += time::Duration::days(1);
        }
        Ok(None)
    }

    #[tracing::instrument(skip(self, tx))]
    async fn available_days(
        &self,
        service_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Date>, ServiceError> {
        let mut days = Vec::new();
        let mut date = from;
        while date <= to {
            let slots = self.slots_on_date(service_id, None, date, tx.clone()).await?;
            if !slots.is_empty() {
                days.push(date);
            }
            date += time::Duration::days(1);
        }
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn minute_to_time_rejects_out_of_range() {
        assert!(minute_to_time(1440).is_err());
        assert!(minute_to_time(0).is_ok());
    }

    #[test]
    fn overlaps_buffered_accounts_for_both_sides() {
        let appt = dao::appointment::AppointmentEntity {
            id: Uuid::new_v4(),
            customer_id: None,
            shop_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            specialist_id: Uuid::new_v4(),
            start: datetime!(2026-08-03 10:00),
            end: datetime!(2026-08-03 10:30),
            buffer_before_minutes: 5,
            buffer_after_minutes: 10,
            status: AppointmentStatus::Scheduled,
            package_id: None,
        };
        // Starts right after the raw end, but within the trailing buffer.
        assert!(overlaps_buffered(
            datetime!(2026-08-03 10:30),
            datetime!(2026-08-03 11:00),
            &appt
        ));
        // Starts after the buffer has elapsed.
        assert!(!overlaps_buffered(
            datetime!(2026-08-03 10:40),
            datetime!(2026-08-03 11:00),
            &appt
        ));
    }
}
