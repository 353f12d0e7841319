use clap::Parser;
use imitation_scss::{CompileError, DOCTYPE, Options, Output, compile_with, provenance_comment};
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "iscss")]
#[command(about = "Compile imitation SCSS templates to HTML")]
struct Cli {
    /// Template to compile
    #[arg(required_unless_present = "stdin")]
    input: Option<PathBuf>,

    /// HTML file to write
    #[arg(required_unless_present = "stdin")]
    output: Option<PathBuf>,

    /// Read the template from stdin and write HTML to stdout
    #[arg(long, conflicts_with_all = ["input", "output"])]
    stdin: bool,

    /// Print every (token, frame) step as a JSON line on stderr
    #[arg(long)]
    trace: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.stdin {
        compile_stdin(cli.trace);
    } else if let (Some(input), Some(output)) = (cli.input, cli.output) {
        compile_file(&input, &output, cli.trace);
    } else {
        fail("provide an input and an output file, or use --stdin");
    }
}

fn compile_stdin(trace: bool) {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        fail(&format!("failed to read stdin: {}", e));
    }

    let output = compile_or_exit(&source, "<stdin>", trace);
    let mut stdout = io::stdout();
    if let Err(e) = stdout.write_all(output.html.as_bytes()).and_then(|_| stdout.flush()) {
        fail(&format!("failed to write stdout: {}", e));
    }
}

fn compile_file(input: &Path, output: &Path, trace: bool) {
    let start = Instant::now();
    let input_name = input.display().to_string();

    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => fail(&format!("failed to read {}: {}", input_name, e)),
    };

    let result = compile_or_exit(&source, &input_name, trace);
    let html = result.html + &provenance_comment(&input_name);

    if let Err(e) = fs::write(output, html) {
        fail(&format!("failed to write {}: {}", output.display(), e));
    }
    print_generated(&output.display().to_string(), start.elapsed());
}

fn compile_or_exit(source: &str, filename: &str, trace: bool) -> Output {
    let options = Options {
        prefix: DOCTYPE.to_string(),
        trace,
    };

    match compile_with(source, &options) {
        Ok(output) => {
            print_trace(&output);
            output
        }
        Err(err) => report(&err, source, filename),
    }
}

fn print_trace(output: &Output) {
    for step in &output.trace {
        match serde_json::to_string(step) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => eprintln!("trace: {}", e),
        }
    }
}

fn report(err: &CompileError, source: &str, filename: &str) -> ! {
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color(source, filename));
    } else {
        eprint!("{}", err.render(source, filename));
    }
    std::process::exit(1);
}

fn fail(message: &str) -> ! {
    if io::stderr().is_terminal() {
        eprintln!("\x1b[1;31merror:\x1b[0m {}", message);
    } else {
        eprintln!("error: {}", message);
    }
    std::process::exit(1);
}

fn print_generated(path: &str, elapsed: std::time::Duration) {
    let time = format_duration(elapsed);
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m✓\x1b[0m {} \x1b[2m({})\x1b[0m", path, time);
    } else {
        eprintln!("  ✓ {} ({})", path, time);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
