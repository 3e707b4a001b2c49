pub mod jurisdiction;
pub mod occurrence;
pub mod rule;
pub mod tag;

pub use jurisdiction::{Jurisdiction, Location, PerJurisdiction};
pub use occurrence::{RawOccurrence, ResolvedEvent};
pub use rule::{MappingRule, MatchKind};
pub use tag::{FastStart, Sanctity, Tag, TagNames, TagType, TransliterationStyle};
