use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::value_objects::availability::AvailabilitySlot;

/// Weekly template: six 30-minute evening slots, 17:00-20:00.
const EVENING_SLOTS: [(&str, &str); 6] = [
    ("17:00", "5:00 PM"),
    ("17:30", "5:30 PM"),
    ("18:00", "6:00 PM"),
    ("18:30", "6:30 PM"),
    ("19:00", "7:00 PM"),
    ("19:30", "7:30 PM"),
];

/// Bookable slots for a calendar date. Sundays are closed; every other day
/// serves the same fixed evening template.
///
/// Existing bookings are NOT cross-referenced, so two users can book the same
/// slot. Known gap, kept deliberately; see DESIGN.md.
pub fn slots_for_date(date: NaiveDate) -> Vec<AvailabilitySlot> {
    if date.weekday() == Weekday::Sun {
        return Vec::new();
    }

    EVENING_SLOTS
        .iter()
        .map(|(time, label)| AvailabilitySlot::new(time, label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_has_no_slots() {
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert!(slots_for_date(sunday).is_empty());
    }

    #[test]
    fn weekdays_share_the_fixed_template_in_order() {
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();

        let monday_slots = slots_for_date(monday);
        assert_eq!(monday_slots.len(), 6);
        assert_eq!(monday_slots[0].time, "17:00");
        assert_eq!(monday_slots[0].label, "5:00 PM");
        assert_eq!(monday_slots[5].time, "19:30");

        assert_eq!(slots_for_date(saturday), monday_slots);
    }
}
