//! Module resolution and bundling.
//!
//! [`Bundler::bundle`] runs in two phases. Discovery loads the entry module,
//! parses it, reserves its globals and follows every static `require`
//! depth first. Printing then renders each module once, in discovery order,
//! so that every global name of the run is known before the first short
//! name is handed out.

pub mod bootstrap;
pub mod requires;

use crate::codegen::{Fragment, MapSource, Printer, SourceMap};
use crate::config::MinifyOptions;
use crate::errors::{MinifyError, Result};
use crate::fs::{FsModuleSource, LoadedModule, ModuleSource};
use crate::minifier::MinifySession;
use indexmap::IndexMap;
use luamin_parser::Chunk;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use bootstrap::{dispatcher, pragma_comments, prepend_pragmas};
pub use requires::collect_requires;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Requested but not loaded yet.
    Pending,
    /// Parsed; not printed yet.
    Generating,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub path: PathBuf,
    pub source: String,
    pub chunk: Option<Chunk>,
    pub fragment: Option<Fragment>,
    pub status: ModuleStatus,
}

impl Module {
    fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::new(),
            source: String::new(),
            chunk: None,
            fragment: None,
            status: ModuleStatus::Pending,
        }
    }
}

/// Modules of one run keyed by name, in discovery order.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: IndexMap<String, Module>,
    entry: Option<String>,
}

impl ModuleGraph {
    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Printed output of a module, once it is `Done`.
    pub fn fragment(&self, name: &str) -> Option<&Fragment> {
        self.modules.get(name).and_then(|m| m.fragment.as_ref())
    }
}

/// Minified code plus the source map describing it.
#[derive(Debug, Clone)]
pub struct MinifyOutput {
    pub code: String,
    pub source_map: SourceMap,
}

/// Bundles an entry module and everything it statically requires.
pub struct Bundler<'a> {
    source: &'a dyn ModuleSource,
    options: &'a MinifyOptions,
    session: MinifySession,
    graph: ModuleGraph,
}

impl<'a> Bundler<'a> {
    pub fn new(source: &'a dyn ModuleSource, options: &'a MinifyOptions) -> Self {
        Self {
            source,
            options,
            session: MinifySession::new(),
            graph: ModuleGraph::default(),
        }
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// Resolve, print and stitch `entry` and its dependencies.
    ///
    /// `file` is recorded as the map's generated file name.
    pub fn bundle(&mut self, entry: &str, file: Option<&str>) -> Result<MinifyOutput> {
        self.run(entry, None, file)
    }

    /// Like [`Bundler::bundle`], but the entry's text is already loaded and
    /// is not looked up through the module source. Its dependencies are.
    pub fn bundle_entry(
        &mut self,
        entry: &str,
        loaded: LoadedModule,
        file: Option<&str>,
    ) -> Result<MinifyOutput> {
        self.run(entry, Some(loaded), file)
    }

    fn run(
        &mut self,
        entry: &str,
        preloaded: Option<LoadedModule>,
        file: Option<&str>,
    ) -> Result<MinifyOutput> {
        self.graph.entry = Some(entry.to_string());

        let options = self.options;
        let mut chain = Vec::new();
        self.load(entry, preloaded, &mut chain)?;
        if options.module_mode {
            for extra in &options.include {
                self.load(extra, None, &mut chain)?;
            }
        }

        self.print_modules();
        let output = self.assemble(entry);

        let graph = &self.graph;
        let (code, source_map) = output.finalize(file, |module| match graph.get(module) {
            Some(m) => MapSource {
                path: m.path.to_string_lossy().into_owned(),
                content: options.sources_content.then(|| m.source.clone()),
            },
            None => MapSource::path(module),
        });

        info!(
            entry,
            modules = self.graph.len(),
            bytes = code.len(),
            "bundled"
        );
        Ok(MinifyOutput { code, source_map })
    }

    fn load(
        &mut self,
        name: &str,
        preloaded: Option<LoadedModule>,
        chain: &mut Vec<String>,
    ) -> Result<()> {
        if chain.iter().any(|n| n == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(MinifyError::CyclicDependency { chain: cycle });
        }
        if self.graph.contains(name) {
            debug!(module = name, "already loaded");
            return Ok(());
        }

        self.graph
            .modules
            .insert(name.to_string(), Module::pending(name));
        chain.push(name.to_string());
        let result = self.discover(name, preloaded, chain);
        chain.pop();

        if result.is_err() {
            if let Some(module) = self.graph.modules.get_mut(name) {
                module.status = ModuleStatus::Failed;
            }
        }
        result
    }

    fn discover(
        &mut self,
        name: &str,
        preloaded: Option<LoadedModule>,
        chain: &mut Vec<String>,
    ) -> Result<()> {
        let loaded = match preloaded {
            Some(loaded) => loaded,
            None => self.source.load(name)?,
        };
        let chunk = luamin_parser::parse(&loaded.source).map_err(|source| MinifyError::Parse {
            module: name.to_string(),
            source,
        })?;
        debug!(module = name, path = %loaded.path.display(), "loaded module");

        self.session.reserve(&chunk.globals);
        let dependencies = if self.options.module_mode {
            collect_requires(&chunk)
        } else {
            Vec::new()
        };

        if let Some(module) = self.graph.modules.get_mut(name) {
            module.path = loaded.path;
            module.source = loaded.source;
            module.chunk = Some(chunk);
            module.status = ModuleStatus::Generating;
        }

        for dependency in dependencies {
            self.load(&dependency, None, chain)?;
        }
        Ok(())
    }

    fn print_modules(&mut self) {
        let Self { graph, session, .. } = self;
        for module in graph.modules.values_mut() {
            if module.status != ModuleStatus::Generating {
                continue;
            }
            if let Some(chunk) = &module.chunk {
                let fragment = Printer::new(session, module.name.as_str()).print_chunk(chunk);
                module.fragment = Some(fragment);
                module.status = ModuleStatus::Done;
                debug!(module = module.name.as_str(), "printed module");
            }
        }
    }

    fn assemble(&mut self, entry: &str) -> Fragment {
        let mut output = Fragment::new();

        if self.options.module_mode {
            let bundled: Vec<(String, Fragment)> = self
                .graph
                .modules
                .values()
                .filter(|m| m.name != entry)
                .filter_map(|m| m.fragment.clone().map(|f| (m.name.clone(), f)))
                .collect();
            output.append(dispatcher(&mut self.session, bundled));
        }

        if let Some(body) = self.graph.fragment(entry) {
            output.join(body.clone());
        }

        if let Some(chunk) = self.graph.get(entry).and_then(|m| m.chunk.as_ref()) {
            let pragmas = pragma_comments(&chunk.comments, &self.options.pragma_marker);
            prepend_pragmas(&mut output, &pragmas, entry);
        }
        output
    }
}

/// Minify one standalone source text.
///
/// `name` identifies the source in errors and in the map's `sources`.
pub fn minify_source(name: &str, source: &str, options: &MinifyOptions) -> Result<MinifyOutput> {
    minify_source_as(name, source, options, None)
}

/// Like [`minify_source`], recording `file` as the generated file name.
pub fn minify_source_as(
    name: &str,
    source: &str,
    options: &MinifyOptions,
    file: Option<&str>,
) -> Result<MinifyOutput> {
    let chunk = luamin_parser::parse(source).map_err(|source| MinifyError::Parse {
        module: name.to_string(),
        source,
    })?;

    let mut session = MinifySession::with_reserved(&chunk.globals);
    let mut output = Printer::new(&mut session, name).print_chunk(&chunk);
    let pragmas = pragma_comments(&chunk.comments, &options.pragma_marker);
    prepend_pragmas(&mut output, &pragmas, name);

    let (code, source_map) = output.finalize(file, |module| MapSource {
        path: module.to_string(),
        content: options.sources_content.then(|| source.to_string()),
    });
    debug!(module = name, bytes = code.len(), "minified");
    Ok(MinifyOutput { code, source_map })
}

/// Bundle the module at `entry_path`, resolving requires against the
/// configured module root or, failing that, the entry's directory.
///
/// The entry is read from `entry_path` itself, wherever it sits relative to
/// the root, and is named after its file stem.
pub fn bundle_file(entry_path: &Path, options: &MinifyOptions) -> Result<MinifyOutput> {
    let root = match &options.module_root {
        Some(root) => PathBuf::from(root),
        None => entry_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let entry = entry_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            MinifyError::Config(format!("not a module file: {}", entry_path.display()))
        })?;

    let loaded = match std::fs::read_to_string(entry_path) {
        Ok(source) => LoadedModule {
            path: entry_path.to_path_buf(),
            source,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MinifyError::ModuleNotFound {
                name: entry,
                path: entry_path.to_path_buf(),
            })
        }
        Err(e) => return Err(MinifyError::Io(e)),
    };

    let source = FsModuleSource::new(root, options.extension.clone());
    let file = output_file_name(entry_path, &options.extension);
    let mut bundler = Bundler::new(&source, options);
    bundler.bundle_entry(&entry, loaded, file.as_deref())
}

/// `dir/name.lua` becomes `name.min.lua`.
pub fn output_file_name(input: &Path, extension: &str) -> Option<String> {
    let stem = input.file_stem()?.to_string_lossy();
    Some(format!("{}.min.{}", stem, extension))
}

/// `dir/name.lua` becomes `name.lua.map`.
pub fn map_file_name(input: &Path, extension: &str) -> Option<String> {
    let stem = input.file_stem()?.to_string_lossy();
    Some(format!("{}.{}.map", stem, extension))
}
