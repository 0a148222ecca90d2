use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;
use uuid::Uuid;

use shared_store::{CareStore, ScheduleSlot, SlotWindow};

use crate::models::{ScheduleError, SetScheduleRequest};

pub struct ScheduleService {
    store: Arc<dyn CareStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    /// Replaces the caregiver's slots for the date with the given windows.
    /// A full overwrite: submitting the same windows twice leaves the same
    /// schedule.
    pub async fn set_schedule(
        &self,
        request: SetScheduleRequest,
    ) -> Result<Vec<ScheduleSlot>, ScheduleError> {
        let caregiver_id = request.caregiver_id.ok_or_else(|| {
            ScheduleError::InvalidArgument("caregiver_id is required".to_string())
        })?;
        let date = request
            .date
            .ok_or_else(|| ScheduleError::InvalidArgument("date is required".to_string()))?;
        let slots = request
            .slots
            .ok_or_else(|| ScheduleError::InvalidArgument("slots are required".to_string()))?;

        let mut windows = Vec::with_capacity(slots.len());
        for slot in slots {
            let start = slot.start_time.ok_or_else(|| {
                ScheduleError::InvalidArgument("Each slot needs a start_time".to_string())
            })?;
            let end = slot.end_time.ok_or_else(|| {
                ScheduleError::InvalidArgument("Each slot needs an end_time".to_string())
            })?;
            if start >= end {
                return Err(ScheduleError::InvalidArgument(format!(
                    "Slot start {} must be before end {}",
                    start, end
                )));
            }
            windows.push(SlotWindow { start, end });
        }

        self.store
            .caregiver(caregiver_id)
            .await?
            .ok_or(ScheduleError::CaregiverNotFound)?;

        let created = self
            .store
            .replace_schedule(caregiver_id, date, windows)
            .await?;

        info!(
            "Set schedule for caregiver {} on {}: {} slots",
            caregiver_id,
            date,
            created.len()
        );
        Ok(created)
    }

    /// True iff some available slot covers the time. The end boundary is
    /// inclusive: a request exactly at end_time still fits.
    pub async fn is_available(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<bool, ScheduleError> {
        let slots = self.store.schedule_for(caregiver_id, date).await?;
        Ok(slots
            .iter()
            .any(|s| s.is_available && s.start_time <= time && time <= s.end_time))
    }

    /// Caregiver profile linked to an authenticated user, when one exists.
    pub async fn caregiver_id_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, ScheduleError> {
        Ok(self.store.caregiver_by_user(user_id).await?.map(|c| c.id))
    }

    pub async fn day_schedule(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleSlot>, ScheduleError> {
        self.store
            .caregiver(caregiver_id)
            .await?
            .ok_or(ScheduleError::CaregiverNotFound)?;
        Ok(self.store.schedule_for(caregiver_id, date).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_store::{MemoryStore, NewCaregiver};

    use crate::models::SlotInput;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    async fn setup() -> (ScheduleService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let caregiver = store
            .insert_caregiver(NewCaregiver {
                user_id: None,
                name: "Niamh Byrne".into(),
                specialization: None,
                availability: true,
            })
            .await
            .unwrap();
        (ScheduleService::new(store), caregiver.id)
    }

    fn morning_shift(caregiver_id: Uuid) -> SetScheduleRequest {
        SetScheduleRequest {
            caregiver_id: Some(caregiver_id),
            date: Some(date("2024-03-04")),
            slots: Some(vec![SlotInput {
                start_time: Some(time("09:00:00")),
                end_time: Some(time("12:00:00")),
            }]),
        }
    }

    #[tokio::test]
    async fn set_schedule_twice_yields_the_same_slots() {
        let (service, caregiver_id) = setup().await;

        service.set_schedule(morning_shift(caregiver_id)).await.unwrap();
        let slots = service.set_schedule(morning_shift(caregiver_id)).await.unwrap();
        assert_eq!(slots.len(), 1);

        let day = service
            .day_schedule(caregiver_id, date("2024-03-04"))
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
    }

    #[tokio::test]
    async fn availability_is_inclusive_of_the_end_boundary() {
        let (service, caregiver_id) = setup().await;
        service.set_schedule(morning_shift(caregiver_id)).await.unwrap();
        let day = date("2024-03-04");

        assert!(service.is_available(caregiver_id, day, time("09:00:00")).await.unwrap());
        assert!(service.is_available(caregiver_id, day, time("10:30:00")).await.unwrap());
        assert!(service.is_available(caregiver_id, day, time("12:00:00")).await.unwrap());
        assert!(!service.is_available(caregiver_id, day, time("12:01:00")).await.unwrap());
        assert!(!service.is_available(caregiver_id, day, time("08:59:00")).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_windows_are_rejected() {
        let (service, caregiver_id) = setup().await;

        let inverted = SetScheduleRequest {
            caregiver_id: Some(caregiver_id),
            date: Some(date("2024-03-04")),
            slots: Some(vec![SlotInput {
                start_time: Some(time("12:00:00")),
                end_time: Some(time("09:00:00")),
            }]),
        };
        assert_matches!(
            service.set_schedule(inverted).await,
            Err(ScheduleError::InvalidArgument(_))
        );

        let missing = SetScheduleRequest {
            caregiver_id: Some(caregiver_id),
            date: None,
            slots: Some(vec![]),
        };
        assert_matches!(
            service.set_schedule(missing).await,
            Err(ScheduleError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn unknown_caregiver_is_not_found() {
        let (service, _) = setup().await;
        assert_matches!(
            service.set_schedule(morning_shift(Uuid::new_v4())).await,
            Err(ScheduleError::CaregiverNotFound)
        );
    }
}
