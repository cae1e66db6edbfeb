mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

const SUBCOMMANDS: &[&str] = &["compile", "test", "help"];

#[derive(Parser)]
#[command(name = "msgtype", version, about = "Message type schema compiler")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a schema into C struct declarations and reflection tables
    Compile(CompileArgs),

    /// Run .test.type golden test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CompileArgs {
    /// Schema file to compile
    file: String,

    /// Module name for the include guard and generated filenames
    /// (defaults to the input file stem)
    #[arg(short, long)]
    module: Option<String>,

    /// Directory the generated .h/.c pair is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Print both artifacts to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Parse only, don't generate (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the parsed element list
    #[arg(long)]
    ast: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.type file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // Backwards compatibility: if the first positional arg is not a known
    // subcommand, inject "compile" so `msgtype robot.type` works like
    // `msgtype compile robot.type`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(first_pos) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        let first_pos = first_pos.clone();
        if !SUBCOMMANDS.contains(&first_pos.as_str()) {
            let pos = args.iter().position(|a| *a == first_pos).unwrap();
            args.insert(pos, "compile".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    match cli.command {
        Command::Compile(compile_args) => do_compile(compile_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_compile(args: CompileArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read source
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    // Parse
    let parser = msgtype::parser::Parser::new(source, file_id);
    let schema = match parser.parse() {
        Ok(s) => s,
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic();
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            process::exit(1);
        }
    };

    // --check: parse succeeded, exit
    if args.check {
        eprintln!("ok: {} parsed successfully", args.file);
        return;
    }

    // --ast: dump the element list
    if args.ast {
        println!("{:#?}", schema.elements);
        return;
    }

    let module = match &args.module {
        Some(module) => module.clone(),
        None => Path::new(&args.file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("schema")
            .to_string(),
    };

    let header = codegen::generate_header(&module, &schema);
    let metadata = codegen::generate_source(&module, &schema);

    if args.stdout {
        print!("{}", header);
        print!("{}", metadata);
        return;
    }

    let header_path = args.out_dir.join(format!("{}.h", module));
    let metadata_path = args.out_dir.join(format!("{}.c", module));
    for (path, contents) in [(&header_path, &header), (&metadata_path, &metadata)] {
        if let Err(e) = std::fs::write(path, contents) {
            eprintln!("error: cannot write '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
