mod config;
pub use config::Config;

pub mod env {
    pub const LOG_DIRECTIVE: &str = "KVDUMP_LOG";
    pub const HOST: &str = "KVDUMP_HOST";
    pub const PORT: &str = "KVDUMP_PORT";
    pub const USERNAME: &str = "KVDUMP_USERNAME";
    pub const PASSWORD: &str = "KVDUMP_PASSWORD";
    pub const CONFIG_PATH: &str = "KVDUMP_CONFIG_PATH";
}
