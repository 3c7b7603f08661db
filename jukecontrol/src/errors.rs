use thiserror::Error;

#[derive(Error, Debug)]
pub enum JukeboxError {
    #[error("Backend command '{0}' failed: {1}")]
    BackendCommand(String, String),
    #[error("Backend unreachable: {0}")]
    BackendUnavailable(String),
    #[error("Invalid {0} value returned by backend: {1}")]
    BackendBadReturnValue(String, String),
    #[error("Unknown collection {0}")]
    UnknownCollection(String),
    #[error("Invalid RFID uid '{0}'")]
    InvalidUid(String),
    #[error("The library does not contain any collection")]
    EmptyLibrary,
    #[error("Invalid sequence rule '{0}': {1}")]
    InvalidRule(String, String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Display Error: {0}")]
    Display(String),
    #[error("RFID reader Error: {0}")]
    Rfid(String),
    #[error("GPIO Error: {0}")]
    Gpio(String),
    #[error("Power control Error: {0}")]
    Power(String),
    #[error("Cannot spawn worker {0}: {1}")]
    Spawn(String, String),
}

impl JukeboxError {
    pub fn backend_command(command: &str, message: &str) -> Self {
        JukeboxError::BackendCommand(command.to_string(), message.to_string())
    }

    pub fn backend_bad_return_value(name: &str, value: &str) -> Self {
        JukeboxError::BackendBadReturnValue(name.to_string(), value.to_string())
    }
}
