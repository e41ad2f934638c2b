//! Sources for `import name`. The parser asks a [`SourceResolver`] for the
//! text of a module and never touches the file system itself.

use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::{Context, bail};

pub trait SourceResolver {
	/// The source text of module `name`.
	fn resolve(&self, name: &str) -> anyhow::Result<String>;
}

/// Reads `<base>/<name>.prg`.
#[derive(Debug, Clone)]
pub struct FsResolver {
	base: PathBuf,
}

impl FsResolver {
	pub const EXTENSION: &'static str = "prg";

	pub fn new(base: impl Into<PathBuf>) -> Self { Self { base: base.into() } }
}

impl SourceResolver for FsResolver {
	fn resolve(&self, name: &str) -> anyhow::Result<String> {
		let path = self.base.join(name).with_extension(Self::EXTENSION);
		fs::read_to_string(&path).with_context(|| format!("failed to read `{}`", path.display()))
	}
}

/// Modules held in memory, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
	modules: HashMap<String, String>,
}

impl MemoryResolver {
	pub fn with(mut self, name: &str, source: &str) -> Self {
		self.modules.insert(name.to_lowercase(), source.to_string());
		self
	}
}

impl SourceResolver for MemoryResolver {
	fn resolve(&self, name: &str) -> anyhow::Result<String> {
		match self.modules.get(&name.to_lowercase()) {
			Some(source) => Ok(source.clone()),
			None => bail!("no module named `{name}`"),
		}
	}
}

/// Refuses every import.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl SourceResolver for NoImports {
	fn resolve(&self, name: &str) -> anyhow::Result<String> { bail!("imports are disabled, cannot load `{name}`") }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_modules_ignore_case() {
		let resolver = MemoryResolver::default().with("Util", "x = 1");
		assert_eq!(resolver.resolve("UTIL").unwrap(), "x = 1");
		assert!(resolver.resolve("other").is_err());
		assert!(NoImports.resolve("util").is_err());
	}

	#[test]
	fn file_modules() {
		let resolver = FsResolver::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scripts"));
		assert!(resolver.resolve("greeting").unwrap().contains("function"));
		let error = resolver.resolve("missing").unwrap_err();
		assert!(format!("{error:#}").contains("missing.prg"));
	}
}
