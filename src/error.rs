use thiserror::Error;

/// Rejection sampling gave up before finding a free cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no free cell found after {attempts} attempts ({occupied} cells occupied)")]
    Exhausted { attempts: u32, occupied: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial train size must be at least 1")]
    ZeroSize,
    #[error("initial speed must be at least 1 tick per second")]
    ZeroSpeed,
    #[error("{what} start ({x}, {y}) is off the grid")]
    OffGrid { what: &'static str, x: i32, y: i32 },
    #[error("train and passenger cannot start on the same cell")]
    OverlappingStart,
    #[error("invalid vanish delay window [{min}, {max})")]
    VanishWindow { min: f64, max: f64 },
    #[error("invalid vanish phase length {0}")]
    VanishPhase(f64),
    #[error("clock and blink periods must be non-zero")]
    ZeroPeriod,
    #[error("placement attempts must be non-zero")]
    ZeroAttempts,
    #[error("station roll scale must be positive, got {0}")]
    RollScale(f64),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("placement failed: {0}")]
    Placement(#[from] PlacementError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
