/// Exit code for bad input: unknown district, unusable export path, etc.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when the dataset cannot be fetched or parsed.
pub const EXIT_DATA_LOAD: u8 = 3;
/// Exit code for terminal/UI failures.
pub const EXIT_UI: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// The dataset fetch or parse failed.
    pub fn data_load(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA_LOAD, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn is_data_load(&self) -> bool {
        self.exit_code == EXIT_DATA_LOAD
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
