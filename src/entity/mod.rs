pub mod person;
pub mod traits;

pub use person::{DailyOutcome, FamilyLinks, Person};
pub use traits::{TraitAxis, Traits};
