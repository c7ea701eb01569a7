//! CLI entry point. A real C/C++ front-end is out of scope for this
//! crate (see `varflow::ast`'s module docs), so this reads its input as
//! a small JSON envelope: the original source text, plus an
//! already-parsed `ast::FunctionDecl` over it. Everything else —
//! argument shape, the `fout` default, logging the requested
//! transformation list without applying it — follows the original
//! driver.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;

use varflow::ast::FunctionDecl;
use varflow::error::{Result, ResultExt};
use varflow::source::{ResolvedText, SourceLocation, SourceRange, SourceResolver};
use varflow::{lowering, output};

#[derive(Parser)]
#[command(
    name = "varflow",
    about = "Lowers a C function AST into a def/use-annotated control-flow graph IR"
)]
struct Cli {
    /// Input file: a JSON envelope of `{ "source": ..., "function": ... }`.
    #[arg(long = "fin")]
    fin: PathBuf,

    /// Output file. Defaults to the input's stem with a `.varflow.bin` extension.
    #[arg(long = "fout")]
    fout: Option<PathBuf>,

    /// Transformation passes to apply. Logged, not implemented: transformation
    /// passes over the IR are out of scope for this crate.
    trans: Vec<String>,
}

#[derive(serde::Deserialize)]
struct InputFile {
    source: String,
    function: FunctionDecl,
}

/// Resolves a `SourceRange` against the input envelope's embedded source
/// text, computing 1-based line/column the way a real front-end would.
struct FileResolver {
    source: String,
}

impl SourceResolver for FileResolver {
    fn resolve(&self, range: SourceRange) -> ResolvedText {
        let text = self.source[range.begin as usize..range.end as usize].to_string();
        let locate = |offset: u32| {
            let prefix = &self.source[..offset as usize];
            let line = prefix.matches('\n').count() as u32 + 1;
            let column = match prefix.rfind('\n') {
                Some(pos) => offset - pos as u32,
                None => offset + 1,
            };
            SourceLocation {
                file: "<input>".to_string(),
                line,
                column,
            }
        };
        ResolvedText {
            text,
            begin: locate(range.begin),
            end: locate(range.end),
        }
    }
}

fn default_fout(fin: &Path) -> PathBuf {
    let stem = fin.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let dir = fin.parent().filter(|p| !p.as_os_str().is_empty());
    match dir {
        Some(dir) => dir.join(format!("{}.varflow.bin", stem)),
        None => PathBuf::from(format!("{}.varflow.bin", stem)),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let fout = cli.fout.clone().unwrap_or_else(|| default_fout(&cli.fin));

    info!("fin: {}", cli.fin.display());
    info!("fout: {}", fout.display());
    for rule in &cli.trans {
        info!("transformation (not applied, out of scope): {}", rule);
    }

    let raw = fs::read_to_string(&cli.fin).chain_err(|| format!("reading {}", cli.fin.display()))?;
    let input: InputFile =
        serde_json::from_str(&raw).chain_err(|| format!("parsing input AST from {}", cli.fin.display()))?;

    let resolver = FileResolver { source: input.source };
    let function = lowering::lower_function(&resolver, &input.function)?;
    function.validate()?;
    output::write_to_file(&fout, &function)?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        for cause in e.iter().skip(1) {
            eprintln!("caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
