use chrono::{DateTime, FixedOffset, Local, Utc};

/// Source of "now" for the roster, expressed in the academy's UTC offset so
/// that day boundaries and month arithmetic follow the local calendar.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// `None` follows the host's local offset.
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }
}

/// Test clock that only moves when told to. Clones share the same instant.
#[cfg(test)]
#[derive(Clone)]
pub struct FixedClock(std::rc::Rc<std::cell::Cell<DateTime<FixedOffset>>>);

#[cfg(test)]
impl FixedClock {
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(now)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0.get()
    }
}
