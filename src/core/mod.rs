pub mod format;
pub use self::format::{FileHeader, KeyRecord};

mod selector;
pub use self::selector::{select_keys, KeyFilter, Selector};

mod dump;
pub use self::dump::{dump, dump_key, DumpSummary};

mod restore;
pub use self::restore::{restore, RestoreOptions, RestoreSummary};

pub mod inspect;
pub use self::inspect::Inspector;
