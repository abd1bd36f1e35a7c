use chrono::Weekday;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    Morning,
    Evening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: u32,
    pub name: &'static str,
    pub label: &'static str,
    pub period: Period,
}

const fn slot(id: u32, name: &'static str, label: &'static str, period: Period) -> TimeSlot {
    TimeSlot {
        id,
        name,
        label,
        period,
    }
}

/// One-hour pool sessions, in chronological order.
pub const TIME_SLOTS: [TimeSlot; 8] = [
    slot(1, "Early Bird Batch", "5:00 AM - 6:00 AM", Period::Morning),
    slot(2, "Rise and Glide", "6:00 AM - 7:00 AM", Period::Morning),
    slot(3, "Morning Masters", "7:00 AM - 8:00 AM", Period::Morning),
    slot(4, "Bright Start", "8:00 AM - 9:00 AM", Period::Morning),
    slot(5, "Aqua Prep Batch", "4:00 PM - 5:00 PM", Period::Evening),
    slot(6, "Twilight Learners", "5:00 PM - 6:00 PM", Period::Evening),
    slot(7, "Evening Wave", "6:00 PM - 7:00 PM", Period::Evening),
    slot(8, "Night Glide", "7:00 PM - 8:00 PM", Period::Evening),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassStatus {
    Active,
    Full,
}

/// A weekly class held in one of the time slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwimClass {
    pub id: u32,
    pub name: &'static str,
    pub instructor: &'static str,
    pub level: Level,
    pub capacity: u32,
    pub enrolled: u32,
    pub slot_id: u32,
    pub time_slot: &'static str,
    pub days: &'static [Weekday],
    pub location: &'static str,
    pub status: ClassStatus,
}

impl SwimClass {
    pub fn meets_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }
}

const MWF: &[Weekday] = &[Weekday::Mon, Weekday::Wed, Weekday::Fri];
const TU_TH: &[Weekday] = &[Weekday::Tue, Weekday::Thu];

#[allow(clippy::too_many_arguments)]
const fn class(
    slot: TimeSlot,
    instructor: &'static str,
    level: Level,
    capacity: u32,
    enrolled: u32,
    days: &'static [Weekday],
    location: &'static str,
    status: ClassStatus,
) -> SwimClass {
    SwimClass {
        id: slot.id,
        name: slot.name,
        instructor,
        level,
        capacity,
        enrolled,
        slot_id: slot.id,
        time_slot: slot.label,
        days,
        location,
        status,
    }
}

/// Read-only class catalogue, one class per slot, in slot order.
pub const CLASSES: [SwimClass; 8] = [
    class(TIME_SLOTS[0], "Coach Sarah", Level::Beginner, 12, 8, MWF, "Pool A", ClassStatus::Active),
    class(TIME_SLOTS[1], "Coach Alex", Level::Intermediate, 10, 7, MWF, "Pool A", ClassStatus::Active),
    class(TIME_SLOTS[2], "Coach Lisa", Level::Advanced, 8, 6, &[Weekday::Sat], "Pool A", ClassStatus::Active),
    class(TIME_SLOTS[3], "Coach James", Level::Beginner, 10, 5, MWF, "Pool A", ClassStatus::Active),
    class(TIME_SLOTS[4], "Coach Mike", Level::Intermediate, 10, 10, TU_TH, "Pool B", ClassStatus::Full),
    class(TIME_SLOTS[5], "Coach Emma", Level::Advanced, 12, 9, TU_TH, "Pool B", ClassStatus::Active),
    class(TIME_SLOTS[6], "Coach Tom", Level::Beginner, 15, 12, &[Weekday::Mon, Weekday::Wed], "Pool C", ClassStatus::Active),
    class(TIME_SLOTS[7], "Coach Maria", Level::Advanced, 8, 6, TU_TH, "Pool B", ClassStatus::Active),
];

/// Classes still taking enrolments.
pub fn active_class_count() -> usize {
    CLASSES
        .iter()
        .filter(|c| c.status == ClassStatus::Active)
        .count()
}

pub fn instructor_count() -> usize {
    CLASSES
        .iter()
        .map(|c| c.instructor)
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn sessions_on(day: Weekday) -> usize {
    CLASSES.iter().filter(|c| c.meets_on(day)).count()
}
