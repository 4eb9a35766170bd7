mod dump;
mod keys;
mod print;
mod restore;
mod root;

pub use root::{parse, ClientOptions, Command, KvdumpCommand, SelectOptions};
