use chrono::{DateTime, Local};

pub(crate) trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct ManualClock(std::rc::Rc<std::cell::Cell<DateTime<Local>>>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(start: DateTime<Local>) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(start)))
    }

    pub(crate) fn advance(&self, by: chrono::Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}
