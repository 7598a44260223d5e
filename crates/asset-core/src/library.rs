//! Library descriptor model

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Initial values for a library, as handed to `Library::from_values`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryValues {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<(String, String)>,
}

/// A named, versioned bundle of assets and its dependencies on other libraries.
///
/// Libraries are built up through the setters and then frozen before being
/// shared. Once frozen every mutator fails with `Error::Frozen`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Library {
    title: Option<String>,
    version: Option<String>,
    website: Option<String>,
    dependencies: Vec<(String, String)>,
    frozen: bool,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: LibraryValues) -> Result<Self> {
        let mut library = Self::new();
        if let Some(title) = values.title {
            library.set_title(title)?;
        }
        if let Some(version) = values.version {
            library.set_version(version)?;
        }
        if let Some(website) = values.website {
            library.set_website(website)?;
        }
        for (name, reference) in values.dependencies {
            library.add_dependency(name, reference)?;
        }
        Ok(library)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    /// `(library name, asset or library reference)` pairs in declaration order
    pub fn dependencies(&self) -> &[(String, String)] {
        &self.dependencies
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&mut Self> {
        self.ensure_writable("title cannot be changed")?;
        self.title = Some(title.into());
        Ok(self)
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> Result<&mut Self> {
        self.ensure_writable("version cannot be changed")?;
        self.version = Some(version.into());
        Ok(self)
    }

    pub fn set_website(&mut self, website: impl Into<String>) -> Result<&mut Self> {
        self.ensure_writable("website cannot be changed")?;
        self.website = Some(website.into());
        Ok(self)
    }

    pub fn add_dependency(
        &mut self,
        name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Result<&mut Self> {
        self.ensure_writable("dependencies cannot be added")?;
        self.dependencies.push((name.into(), reference.into()));
        Ok(self)
    }

    pub fn clear_dependencies(&mut self) -> Result<&mut Self> {
        self.ensure_writable("dependencies cannot be cleared")?;
        self.dependencies.clear();
        Ok(self)
    }

    /// Make the library read-only. Freezing twice is harmless.
    pub fn freeze(&mut self) -> &mut Self {
        self.frozen = true;
        self
    }

    fn ensure_writable(&self, what: &str) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen(what.to_string()));
        }
        Ok(())
    }
}
