use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aster::bytecode::disasm::{print_bc, print_bc_stats, print_tokens};
use aster::bytecode::{Assembler, Program};
use aster::frontend::lexer::Lexer;
use aster::frontend::token_dumper::TokenDumper;
use aster::runtime::{Vm, VmConfig};

/// Extension of serialized program images; anything else is read as IR text.
const IMAGE_EXTENSION: &str = "aimg";

#[derive(Parser, Debug)]
#[command(name = "aster", version)]
#[command(about = "Assemble and run stack-VM IR")]
struct Cli {
    /// IR document, or a program image ending in `.aimg`
    file: PathBuf,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colors in --tokens output
    #[arg(long)]
    no_color: bool,

    /// Print tokens, instructions, function table and constants before running
    #[arg(long)]
    dump: bool,

    /// Print instruction statistics before running
    #[arg(long)]
    stats: bool,

    /// Refuse to run when the assembler reported any diagnostic
    #[arg(long)]
    strict: bool,

    /// Operand stack capacity
    #[arg(long, default_value_t = 1024)]
    stack_size: usize,

    /// Call stack capacity
    #[arg(long, default_value_t = 1024)]
    call_depth: usize,

    /// Start at address 0 when there is no `main` instead of faulting
    #[arg(long)]
    allow_missing_main: bool,

    /// Write the assembled program image to this path and exit
    #[arg(long, value_name = "IMAGE")]
    emit: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aster=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let program = if is_image(&cli.file) {
        if cli.tokens {
            bail!(
                "--tokens needs an IR document, '{}' is a program image",
                cli.file.display()
            );
        }
        if cli.dump {
            eprintln!(
                "note: '{}' is a program image, the token listing is not available",
                cli.file.display()
            );
        }
        let bytes = fs::read(&cli.file)
            .with_context(|| format!("failed to read '{}'", cli.file.display()))?;
        Program::from_bytes(&bytes)?
    } else {
        let source = fs::read_to_string(&cli.file)
            .with_context(|| format!("failed to read '{}'", cli.file.display()))?;
        let tokens = Lexer::new(&source).tokenize();

        if cli.tokens {
            let mut dumper = TokenDumper::new();
            if cli.no_color {
                dumper = dumper.no_color();
            }
            dumper.dump(&tokens)?;
            return Ok(ExitCode::SUCCESS);
        }
        if cli.dump {
            print_tokens(&tokens);
        }

        let assembly = Assembler::new(tokens).assemble();
        for d in &assembly.diagnostics {
            eprintln!("warning: {}:{}", cli.file.display(), d);
        }
        if cli.strict && !assembly.is_clean() {
            bail!(
                "assembly of '{}' produced {} diagnostic(s)",
                cli.file.display(),
                assembly.diagnostics.len()
            );
        }
        assembly.program
    };

    if cli.dump {
        print_bc(&program);
    }
    if cli.stats {
        print_bc_stats(&program);
    }

    if let Some(path) = &cli.emit {
        fs::write(path, program.to_bytes()?)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = VmConfig {
        max_stack_size: cli.stack_size,
        max_call_depth: cli.call_depth,
        require_main: !cli.allow_missing_main,
    };
    let mut vm = Vm::with_config(program, config);
    let execution = vm.run();

    match execution.into_result() {
        Ok(value) => {
            println!("\nVM execution finished: {}", value);
            Ok(ExitCode::SUCCESS)
        }
        Err(fault) => {
            eprintln!("runtime error: {}", fault);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(IMAGE_EXTENSION)
}
