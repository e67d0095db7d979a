/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn after(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }

    pub fn is_past(self, deadline: Time) -> bool {
        self.0 > deadline.0
    }
}
