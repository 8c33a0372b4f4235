use anyhow::Context;
use clap::Parser;
use luamin_core::{
    bundle_file, map_file_name, minify_source_as, output_file_name, CliOverrides, MinifyConfig,
    MinifyOptions, MinifyOutput, SourceMap,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// luamin - A minifier and bundler for Lua 5.3 sources
#[derive(Parser, Debug, Clone)]
#[command(name = "luamin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files or directories to minify
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to luamin.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for minified files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Bundle required modules into the output
    #[arg(short, long)]
    module_mode: bool,

    /// Directory that module names are resolved against
    #[arg(long, value_name = "DIR")]
    module_root: Option<PathBuf>,

    /// Source file extension (default: lua)
    #[arg(long, value_name = "EXT")]
    extension: Option<String>,

    /// Comments starting with this marker are kept (default: #)
    #[arg(long, value_name = "MARKER")]
    pragma_marker: Option<String>,

    /// Extra modules to bundle (comma-separated)
    #[arg(long, value_name = "MODULES")]
    include: Option<String>,

    /// Do not write source map files
    #[arg(long)]
    no_source_map: bool,

    /// Inline source map in output file
    #[arg(long)]
    inline_source_map: bool,

    /// Embed original sources in the source map
    #[arg(long)]
    sources_content: bool,

    /// Write a default luamin.yaml to the current directory
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for detailed logs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        return init_project();
    }

    let config = load_config(&cli)?;
    let options = config.minify_options;

    let files = collect_inputs(&cli.files, &options.extension);
    if files.is_empty() {
        eprintln!("Error: No input files specified. Use --help for usage information.");
        std::process::exit(1);
    }

    info!("Minifying {} file(s)", files.len());
    debug!("Module mode: {}", options.module_mode);

    if !run(&files, &options) {
        std::process::exit(1);
    }
    Ok(())
}

fn init_project() -> anyhow::Result<()> {
    let path = Path::new(MinifyConfig::DEFAULT_FILE_NAME);
    MinifyConfig::init_file(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", MinifyConfig::DEFAULT_FILE_NAME);
    Ok(())
}

/// Load the config file (explicit or `luamin.yaml` in the working
/// directory) and apply command line overrides on top.
fn load_config(cli: &Cli) -> anyhow::Result<MinifyConfig> {
    let mut config = match &cli.config {
        Some(path) => MinifyConfig::from_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => {
            let default_path = PathBuf::from(MinifyConfig::DEFAULT_FILE_NAME);
            if default_path.exists() {
                MinifyConfig::from_file(&default_path)
                    .with_context(|| format!("failed to load {}", default_path.display()))?
            } else {
                MinifyConfig::default()
            }
        }
    };

    let mut overrides = CliOverrides::default();
    if cli.module_mode {
        overrides.module_mode = Some(true);
    }
    if let Some(ref out_dir) = cli.out_dir {
        overrides.out_dir = Some(out_dir.to_string_lossy().to_string());
    }
    if let Some(ref root) = cli.module_root {
        overrides.module_root = Some(root.to_string_lossy().to_string());
    }
    overrides.extension = cli.extension.clone();
    overrides.pragma_marker = cli.pragma_marker.clone();
    if let Some(ref include) = cli.include {
        overrides.include = Some(
            include
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }
    if cli.no_source_map {
        overrides.source_map = Some(false);
    }
    if cli.inline_source_map {
        overrides.inline_source_map = Some(true);
    }
    if cli.sources_content {
        overrides.sources_content = Some(true);
    }

    config.merge(&overrides);
    Ok(config)
}

/// Expand directories into the source files below them. Paths that are not
/// directories are kept as given so that missing inputs get reported.
fn collect_inputs(paths: &[PathBuf], extension: &str) -> Vec<PathBuf> {
    let minified_suffix = format!(".min.{}", extension);
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map(|e| e == extension).unwrap_or(false))
            .filter(|p| !p.to_string_lossy().ends_with(&minified_suffix))
            .collect();
        found.sort();
        debug!("{} file(s) under {:?}", found.len(), path);
        files.extend(found);
    }
    files
}

/// Result of minifying a single input
struct MinifyResult {
    file_path: PathBuf,
    result: anyhow::Result<MinifyOutput>,
}

/// Minify every input and write the outputs. Returns false if any input
/// failed.
fn run(files: &[PathBuf], options: &MinifyOptions) -> bool {
    use rayon::prelude::*;

    // Each input gets its own session inside minify_file.
    let results: Vec<MinifyResult> = files
        .par_iter()
        .map(|file_path| MinifyResult {
            file_path: file_path.clone(),
            result: minify_file(file_path, options),
        })
        .collect();

    // Written sequentially for deterministic output and error reporting
    let mut had_errors = false;
    for result in results {
        let written = result
            .result
            .and_then(|output| write_output(&result.file_path, output, options));
        if let Err(error) = written {
            had_errors = true;
            eprintln!("Error: {:#}", error);
        }
    }

    if !had_errors {
        info!("Minification completed successfully!");
    }
    !had_errors
}

fn minify_file(file_path: &Path, options: &MinifyOptions) -> anyhow::Result<MinifyOutput> {
    debug!("Minifying {:?}...", file_path);

    if options.module_mode {
        return bundle_file(file_path, options)
            .with_context(|| format!("failed to bundle {}", file_path.display()));
    }

    let source = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    let name = file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string_lossy().into_owned());
    let file = output_file_name(file_path, &options.extension);

    minify_source_as(&name, &source, options, file.as_deref())
        .with_context(|| format!("failed to minify {}", file_path.display()))
}

/// Determine the directory outputs for `file_path` are written to
fn output_dir(file_path: &Path, options: &MinifyOptions) -> PathBuf {
    match &options.out_dir {
        Some(out_dir) => PathBuf::from(out_dir),
        None => file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

fn write_output(
    file_path: &Path,
    output: MinifyOutput,
    options: &MinifyOptions,
) -> anyhow::Result<()> {
    let dir = output_dir(file_path, options);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let output_name = output_file_name(file_path, &options.extension)
        .with_context(|| format!("no file name in {}", file_path.display()))?;
    let output_path = dir.join(output_name);

    let mut code = output.code;
    if options.inline_source_map {
        code.push('\n');
        code.push_str(&output.source_map.to_comment()?);
    } else if options.source_map {
        let map_name = map_file_name(file_path, &options.extension)
            .with_context(|| format!("no file name in {}", file_path.display()))?;
        let map_path = dir.join(&map_name);
        std::fs::write(&map_path, output.source_map.to_json()?)
            .with_context(|| format!("failed to write {}", map_path.display()))?;
        info!("Generated source map: {:?}", map_path);

        code.push('\n');
        code.push_str(&SourceMap::url_comment(&map_name));
    }
    code.push('\n');

    std::fs::write(&output_path, code)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    info!("Generated: {:?}", output_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_inputs_skips_minified_outputs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.lua"), "").unwrap();
        std::fs::write(dir.path().join("a.min.lua"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("nested").join("b.lua"), "").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()], "lua");
        assert_eq!(
            files,
            vec![dir.path().join("a.lua"), dir.path().join("nested").join("b.lua")]
        );
    }

    #[test]
    fn test_missing_paths_are_kept() {
        let missing = PathBuf::from("does/not/exist.lua");
        assert_eq!(collect_inputs(&[missing.clone()], "lua"), vec![missing]);
    }

    #[test]
    fn test_output_dir_defaults_to_input_parent() {
        let options = MinifyOptions::default();
        assert_eq!(
            output_dir(Path::new("src/app.lua"), &options),
            PathBuf::from("src")
        );

        let options = MinifyOptions {
            out_dir: Some("dist".to_string()),
            ..MinifyOptions::default()
        };
        assert_eq!(
            output_dir(Path::new("src/app.lua"), &options),
            PathBuf::from("dist")
        );
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "luamin",
            "-m",
            "--include",
            "plugins.a, plugins.b",
            "--no-source-map",
            "--pragma-marker",
            "!",
            "--sources-content",
        ]);
        let options = load_config(&cli).unwrap().minify_options;
        assert!(options.module_mode);
        assert!(!options.source_map);
        assert_eq!(options.pragma_marker, "!");
        assert!(options.sources_content);
        assert_eq!(options.include, vec!["plugins.a", "plugins.b"]);
        assert_eq!(options.extension, "lua");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["luamin", "--config", "missing.yaml", "a.lua"]);
        assert!(load_config(&cli).is_err());
    }
}
