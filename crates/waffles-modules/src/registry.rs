//! Gridding module trait and the registry of built-in modules.

use crate::{ModuleError, ModuleOptions, Result};
use waffles_datalist::ResolvedSource;
use waffles_grid::RasterTile;
use waffles_region::Region;

/// One interpolation strategy turning scattered sources into a grid.
///
/// Modules are stateless; all per-run knobs arrive through
/// [`ModuleOptions`]. `validate` runs once at configuration time so a
/// bad option string fails before any data is touched.
pub trait GriddingModule: Send + Sync {
    /// Registry name, as used in `-M name:opt=val` specs.
    fn name(&self) -> &'static str;

    /// One-line description for `--modules` listings.
    fn describe(&self) -> &'static str;

    /// Check the option set without touching data.
    fn validate(&self, opts: &ModuleOptions) -> Result<()>;

    /// Grid `sources` onto the cell lattice of `region` at the given
    /// increments. An empty source list yields an all-nodata tile.
    fn generate(
        &self,
        sources: &[ResolvedSource],
        region: &Region,
        inc_x: f64,
        inc_y: f64,
        opts: &ModuleOptions,
    ) -> Result<RasterTile>;
}

/// Lookup table of available gridding modules.
pub struct ModuleRegistry {
    modules: Vec<Box<dyn GriddingModule>>,
}

impl ModuleRegistry {
    /// Registry holding every built-in module.
    pub fn builtin() -> Self {
        ModuleRegistry {
            modules: vec![
                Box::new(crate::nearest::NearestModule),
                Box::new(crate::num::NumModule),
                Box::new(crate::invdst::InvDstModule),
                Box::new(crate::average::AverageModule),
                Box::new(crate::gmt::SurfaceModule),
                Box::new(crate::gmt::TriangulateModule),
                Box::new(crate::mbgrid::MbGridModule),
                Box::new(crate::vdatum::VDatumModule),
            ],
        }
    }

    /// Find a module by registry name.
    pub fn get(&self, name: &str) -> Result<&dyn GriddingModule> {
        self.modules
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
            .ok_or_else(|| ModuleError::UnknownModule {
                name: name.to_string(),
                known: self
                    .modules
                    .iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// `(name, description)` pairs for every registered module.
    pub fn describe_all(&self) -> Vec<(&'static str, &'static str)> {
        self.modules
            .iter()
            .map(|m| (m.name(), m.describe()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = ModuleRegistry::builtin();
        assert_eq!(registry.get("nearest").unwrap().name(), "nearest");
        assert_eq!(registry.get("surface").unwrap().name(), "surface");
    }

    #[test]
    fn test_unknown_module_lists_known() {
        let registry = ModuleRegistry::builtin();
        let err = registry.get("kriging").err().expect("unknown module");
        let msg = err.to_string();
        assert!(msg.contains("kriging"));
        assert!(msg.contains("nearest") && msg.contains("invdst"));
    }

    #[test]
    fn test_describe_all_covers_every_module() {
        let registry = ModuleRegistry::builtin();
        let listing = registry.describe_all();
        assert_eq!(listing.len(), 8);
        assert!(listing.iter().all(|(_, d)| !d.is_empty()));
    }
}
