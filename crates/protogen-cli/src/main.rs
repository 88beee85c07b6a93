//! protogen - Generate protobuf-net C# sources from protobuf descriptors
//!
//! Reads `FileDescriptorSet`s written by `protoc --descriptor_set_out`, or
//! runs as a protoc plugin, and renders one C# source file per schema file.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use prost::Message;
use protogen_core::plugin;
use protogen_core::{
    decode_file_set, CSharpCodeGenerator, Error, GeneratedFile, Generator, GeneratorConfig, NamingStyle,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// File extensions recognized as serialized descriptor sets in directory mode
const DESCRIPTOR_SET_EXTENSIONS: &[&str] = &["pb", "desc", "protoset", "binpb"];

type CSharpGenerator = Generator<CSharpCodeGenerator>;

/// Generate protobuf-net C# sources from protobuf descriptor sets
#[derive(Parser, Debug)]
#[command(name = "protogen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Output directory for generated .cs files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Identifier naming style
    #[arg(long, value_enum, default_value = "auto")]
    names: NamesArg,

    /// Spaces per indentation level
    #[arg(long, default_value = "4")]
    indent: usize,

    /// Dry run - don't write files, just show what would be generated
    #[arg(long)]
    dry_run: bool,

    /// Overwrite existing files without prompting
    #[arg(long)]
    force: bool,

    /// Only list the files that would be generated
    #[arg(long)]
    list_only: bool,

    /// How to place a generated file whose name is taken by different content
    #[arg(long, value_enum, default_value = "hash-suffix")]
    conflict_strategy: ConflictStrategy,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a serialized FileDescriptorSet
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of descriptor sets to process
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Run as a protoc plugin (CodeGeneratorRequest on stdin)
    #[arg(long)]
    plugin: bool,
}

/// Identifier naming style
#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamesArg {
    /// snake_case schema names become PascalCase
    Auto,
    /// Schema names are used verbatim
    Original,
}

impl From<NamesArg> for NamingStyle {
    fn from(arg: NamesArg) -> Self {
        match arg {
            NamesArg::Auto => NamingStyle::Auto,
            NamesArg::Original => NamingStyle::Original,
        }
    }
}

/// Placement of a generated file whose name an earlier descriptor set
/// already produced with different content
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictStrategy {
    /// Append a short content hash: demo~a1b2c3d4.cs
    HashSuffix,
    /// Append the descriptor set name: demo~from-billing.cs
    SourceSuffix,
    /// Keep the first variant only
    SkipConflicts,
}

/// What to do with one generated file
#[derive(Debug, PartialEq, Eq)]
enum Placement {
    /// Write it here
    Write(PathBuf),
    /// Identical to an output already placed under the same name
    Duplicate,
    /// Differs from an earlier output and `skip-conflicts` is active
    Dropped,
}

/// One output already placed under a generated file name
struct Placed {
    digest: blake3::Hash,
    path: PathBuf,
}

/// Generated files seen so far, keyed by the name the generator gave them.
///
/// protoc embeds imported files in every descriptor set built with
/// `--include_imports`, so a directory scan regenerates shared schemas once
/// per set. Variants are told apart by a blake3 digest of their content.
#[derive(Default)]
struct OutputRegistry {
    placed: HashMap<String, Vec<Placed>>,
    stats: RegistryStats,
}

#[derive(Default)]
struct RegistryStats {
    generated: usize,
    duplicates: usize,
    renamed: usize,
    dropped: usize,
    existing: usize,
    written: usize,
}

impl OutputRegistry {
    fn new() -> Self {
        Self::default()
    }

    /// Decides where `file`, produced from the descriptor set at `source`,
    /// goes under `output_dir`
    fn place(
        &mut self,
        file: &GeneratedFile,
        source: &Path,
        output_dir: &Path,
        strategy: ConflictStrategy,
    ) -> Placement {
        self.stats.generated += 1;
        let digest = blake3::hash(file.content.as_bytes());
        let variants = self.placed.entry(file.name.clone()).or_default();

        if let Some(earlier) = variants.iter().find(|p| p.digest == digest) {
            debug!(
                "{} from {} is identical to {}",
                file.name,
                source.display(),
                earlier.path.display()
            );
            self.stats.duplicates += 1;
            return Placement::Duplicate;
        }

        let name = if variants.is_empty() {
            file.name.clone()
        } else {
            let suffix = match strategy {
                ConflictStrategy::SkipConflicts => {
                    warn!(
                        "Dropping {} from {}: content differs from the first variant",
                        file.name,
                        source.display()
                    );
                    self.stats.dropped += 1;
                    return Placement::Dropped;
                }
                ConflictStrategy::HashSuffix => short_digest(&digest),
                ConflictStrategy::SourceSuffix => {
                    let set_name = source
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unknown");
                    format!("from-{}", set_name)
                }
            };
            let renamed = variant_name(&file.name, &suffix);
            info!("Conflict resolved: {} -> {} (content differs)", file.name, renamed);
            self.stats.renamed += 1;
            renamed
        };

        let path = output_dir.join(name);
        variants.push(Placed {
            digest,
            path: path.clone(),
        });
        Placement::Write(path)
    }

    fn print_summary(&self) {
        let s = &self.stats;
        info!(
            "Summary: {} generated, {} duplicates, {} renamed, {} dropped, {} already existed, {} written",
            s.generated, s.duplicates, s.renamed, s.dropped, s.existing, s.written
        );
    }
}

/// First 8 hex digits of a content digest
fn short_digest(digest: &blake3::Hash) -> String {
    digest.to_hex()[..8].to_string()
}

/// Inserts `~suffix` before the extension of the last path segment
fn variant_name(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.contains('/') => {
            format!("{}~{}.{}", stem, suffix, extension)
        }
        _ => format!("{}~{}", name, suffix),
    }
}

fn main() -> Result<()> {
    // protoc runs plugins as `protoc-gen-<name>` with no arguments
    if invoked_as_plugin() {
        init_tracing(0);
        return run_plugin(Generator::csharp());
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let generator = Generator::csharp().with_config(
        GeneratorConfig::new()
            .naming(cli.names.into())
            .indent_str(" ".repeat(cli.indent)),
    );

    if cli.input.plugin {
        run_plugin(generator)
    } else if let Some(ref file) = cli.input.file {
        process_single_file(&cli, &generator, file)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, &generator, directory)
    } else {
        bail!("One of --file, --directory or --plugin must be specified")
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the plugin response
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn invoked_as_plugin() -> bool {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with("protoc-gen-"))
        .unwrap_or(false)
}

/// Answer one CodeGeneratorRequest from stdin
fn run_plugin(generator: CSharpGenerator) -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;

    let request = plugin::decode_request(&input).context("Failed to decode CodeGeneratorRequest")?;
    let response = plugin::respond(&generator, &request);
    if let Some(ref message) = response.error {
        error!("{}", message);
    }

    io::stdout()
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse to stdout")?;
    Ok(())
}

/// Process a single descriptor set
fn process_single_file(cli: &Cli, generator: &CSharpGenerator, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let mut registry = OutputRegistry::new();
    process_descriptor_set(cli, generator, file, &mut registry)?;

    if !cli.list_only && !cli.dry_run {
        registry.print_summary();
    }

    Ok(())
}

/// Process a directory of descriptor sets recursively.
///
/// A set that cannot be read or decoded is skipped; failures on the output
/// side stop the scan.
fn process_directory(cli: &Cli, generator: &CSharpGenerator, directory: &Path) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut registry = OutputRegistry::new();
    let mut sets_processed = 0;
    let mut sets_skipped = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if !is_descriptor_set(path) {
            trace!("Skipping non-descriptor file: {}", path.display());
            continue;
        }

        debug!("Processing descriptor set: {}", path.display());
        if let Err(e) = process_descriptor_set(cli, generator, path, &mut registry) {
            match e.downcast_ref::<Error>() {
                Some(cause) if cause.is_recoverable() => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    sets_skipped += 1;
                    continue;
                }
                _ => return Err(e.context(format!("Stopped scan at {}", path.display()))),
            }
        }
        sets_processed += 1;
    }

    info!(
        "Processed {} descriptor sets, skipped {}",
        sets_processed, sets_skipped
    );

    if !cli.list_only && !cli.dry_run {
        registry.print_summary();
    }

    Ok(())
}

/// Whether the path looks like a serialized descriptor set
fn is_descriptor_set(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false);

    !hidden
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| DESCRIPTOR_SET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// Generate every file of one descriptor set
fn process_descriptor_set(
    cli: &Cli,
    generator: &CSharpGenerator,
    set_path: &Path,
    registry: &mut OutputRegistry,
) -> Result<()> {
    trace!("Reading {}", set_path.display());
    let data = fs::read(set_path).map_err(|e| Error::file_read(set_path, e))?;

    let files = decode_file_set(&data)
        .with_context(|| format!("Failed to decode descriptor set: {}", set_path.display()))?;
    debug!("{} file descriptor(s) in {}", files.len(), set_path.display());

    let generated = generator
        .generate(&files)
        .with_context(|| format!("Failed to generate sources for {}", set_path.display()))?;

    for file in &generated {
        if cli.list_only {
            println!("{}", file.name);
            continue;
        }

        let output_path = match registry.place(file, set_path, &cli.output, cli.conflict_strategy) {
            Placement::Write(path) => path,
            Placement::Duplicate | Placement::Dropped => continue,
        };

        if cli.dry_run {
            println!("Would write: {}", output_path.display());
            if cli.verbose > 0 {
                println!("---");
                println!("{}", file.content);
                println!("---");
            }
            continue;
        }

        if output_path.exists() && !cli.force {
            warn!(
                "File already exists: {} (use --force to overwrite)",
                output_path.display()
            );
            registry.stats.existing += 1;
            continue;
        }

        write_output_file(&cli.output, &output_path, &file.content)?;
        println!("Wrote {}", output_path.display());
        registry.stats.written += 1;
    }

    Ok(())
}

/// Rejects generated names that would land outside the output directory
fn check_confined(output_dir: &Path, output_path: &Path) -> protogen_core::Result<()> {
    let relative = output_path.strip_prefix(output_dir).unwrap_or(output_path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::path_traversal(output_path));
    }
    Ok(())
}

/// Write a generated file to disk with path traversal protection
fn write_output_file(output_dir: &Path, output_path: &Path, content: &str) -> protogen_core::Result<()> {
    check_confined(output_dir, output_path)?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
    }

    fs::write(output_path, content).map_err(|e| Error::file_write(output_path, e))
}
