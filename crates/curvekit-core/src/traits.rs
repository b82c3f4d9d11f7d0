use crate::error::Result;

/// Validate the structural integrity of authored curve data.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
