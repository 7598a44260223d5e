//! Content transforms applied while loading an asset

use std::fmt;

use crate::Result;

/// A transform run over asset content during `Asset::load`.
///
/// Concrete minifiers and preprocessors live outside this crate; they only
/// need to implement this trait.
pub trait Filter: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Transform freshly loaded content
    fn filter_load(&self, content: String) -> Result<String>;
}

/// Adapts a closure into a `Filter`
pub struct FnFilter<F> {
    name: String,
    func: F,
}

impl<F> FnFilter<F>
where
    F: Fn(String) -> Result<String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(String) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn filter_load(&self, content: String) -> Result<String> {
        (self.func)(content)
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").field("name", &self.name).finish()
    }
}
