pub mod bundle;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod fs;
pub mod minifier;

pub use bundle::{
    bundle_file, map_file_name, minify_source, minify_source_as, output_file_name, Bundler,
    Module, ModuleGraph, ModuleStatus, MinifyOutput,
};
pub use codegen::{Fragment, MapSource, Printer, SourceMap, SourceMapBuilder};
pub use config::{CliOverrides, MinifyConfig, MinifyOptions};
pub use errors::{MinifyError, Result};
pub use fs::{FsModuleSource, LoadedModule, MemoryModuleSource, ModuleSource};
pub use minifier::{MinifySession, NameGenerator};
