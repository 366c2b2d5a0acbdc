#[cfg(test)]
mod tests {
    use crate::error::BookingError;
    use crate::logic::{available_slots, check_request, overlaps, BookingRequest, SlotPolicy};
    use chrono::{Duration, NaiveDate, NaiveTime};
    use clinic_common::{Appointment, NewAppointment};
    use proptest::prelude::*;
    use serde_json::json;

    fn minutes_to_time(minutes: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap()
    }

    // Helper function to create a booked slot for every chosen start
    fn booked_at(starts: &[NaiveTime]) -> Vec<Appointment> {
        let date = NaiveDate::from_ymd_opt(2025, 5, 15).unwrap();
        starts
            .iter()
            .enumerate()
            .map(|(i, start)| {
                NewAppointment {
                    doctor_id: 1,
                    date,
                    start_time: *start,
                    end_time: *start + Duration::minutes(30),
                    patient_name: format!("Patient {}", i),
                }
                .with_id(i as i64 + 1)
            })
            .collect()
    }

    proptest! {
        // Only the nine half-hour marks between 14:00 and 18:00 are accepted
        #[test]
        fn test_only_grid_starts_are_accepted(minutes in 0u32..(24 * 60)) {
            let policy = SlotPolicy::default();
            let start = minutes_to_time(minutes);
            let request = BookingRequest {
                doctor: Some(json!(1)),
                date: Some("2025-05-15".into()),
                start_time: Some(start.format("%H:%M").to_string().into()),
                patient_name: Some("Jane Doe".into()),
            };

            let on_grid = (14 * 60..=18 * 60).contains(&minutes) && minutes % 30 == 0;
            match check_request(&policy, &request) {
                Ok(candidate) => {
                    prop_assert!(on_grid, "{} accepted", start);
                    prop_assert_eq!(candidate.end_time - candidate.start_time, Duration::minutes(30));
                }
                Err(e) => {
                    prop_assert!(!on_grid, "{} rejected", start);
                    prop_assert_eq!(e, BookingError::InvalidSlot);
                }
            }
        }

        // The overlap test is symmetric and touching ranges never overlap
        #[test]
        fn test_overlap_symmetry(
            a_start in 0u32..1370,
            a_len in 1u32..60,
            b_start in 0u32..1370,
            b_len in 1u32..60,
        ) {
            let (a0, a1) = (minutes_to_time(a_start), minutes_to_time(a_start + a_len));
            let (b0, b1) = (minutes_to_time(b_start), minutes_to_time(b_start + b_len));

            prop_assert_eq!(overlaps(a0, a1, b0, b1), overlaps(b0, b1, a0, a1));
            prop_assert!(!overlaps(a0, a1, a1, minutes_to_time(a_start + a_len + 1)));
        }

        // Free slots and booked slots partition the day
        #[test]
        fn test_free_and_booked_partition_the_day(mask in 0u16..512) {
            let policy = SlotPolicy::default();
            let all = policy.allowed_starts();
            let chosen: Vec<NaiveTime> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, t)| *t)
                .collect();

            let free = available_slots(&policy, &booked_at(&chosen));
            prop_assert_eq!(free.len() + chosen.len(), all.len());
            for slot in &free {
                prop_assert!(!chosen.contains(&slot.start_time));
            }
        }
    }
}
