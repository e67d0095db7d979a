/// Monotonic identifier (correlation ids, scene generations).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id(pub u64);

/// Issues strictly increasing ids, starting at 1.
#[derive(Debug, Default, Clone)]
pub struct IdGen {
    last: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> Id {
        self.last += 1;
        Id(self.last)
    }

    pub fn last(&self) -> Option<Id> {
        (self.last > 0).then_some(Id(self.last))
    }
}
