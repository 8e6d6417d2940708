//! CLI entry point for vnscript
//!
//! Plays a dialogue script in the terminal.

use std::path::PathBuf;
use std::process;
use vnscript::cli::PlayOptions;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "play" => {
            if args.len() < 3 {
                eprintln!("Error: Missing script file path");
                eprintln!();
                print_usage();
                process::exit(1);
            }
            let file_path = PathBuf::from(&args[2]);
            let options = match parse_play_options(&args[3..]) {
                Ok(options) => options,
                Err(message) => {
                    eprintln!("Error: {}", message);
                    eprintln!();
                    print_usage();
                    process::exit(1);
                }
            };
            run_play(file_path, options);
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    }
}

fn parse_play_options(args: &[String]) -> Result<PlayOptions, String> {
    let mut options = PlayOptions::default();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" => options.debug = true,
            "--night" => options.night = true,
            "--saves" => {
                let dir = args.next().ok_or("--saves needs a directory")?;
                options.save_dir = PathBuf::from(dir);
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }
    Ok(options)
}

fn print_usage() {
    println!("vnscript - Dialogue Script Engine");
    println!();
    println!("USAGE:");
    println!("    vnscript play <script.json> [--debug] [--night] [--saves <dir>]");
    println!();
    println!("COMMANDS:");
    println!("    play <file>    Play a script in the terminal");
    println!("    --help, -h     Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --debug          Show debug logs and session variables");
    println!("    --night          Play as if it were night");
    println!("    --saves <dir>    Save directory (default: saves)");
    println!();
    println!("EXAMPLES:");
    println!("    vnscript play scripts/shopkeeper.json");
    println!("    vnscript play scripts/shopkeeper.json --night --debug");
}

fn run_play(file_path: PathBuf, options: PlayOptions) {
    vnscript::logging::init(options.debug);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: Failed to start async runtime");
            eprintln!("Reason: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(vnscript::cli::run_play(&file_path, options)) {
        eprintln!("Error: Player mode failed");
        eprintln!("Reason: {:#}", err);
        process::exit(1);
    }
}
