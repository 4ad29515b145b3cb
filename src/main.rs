use anyhow::Result;
use clap::Parser;
use doblaje::cli::{Cli, Commands};
use doblaje::config::Config;
use doblaje::exec::{CommandExecutor, SystemCommandExecutor};
use doblaje::pipeline::PipelineExecutor;
use doblaje::pool::ResourcePool;
use doblaje::progress::JsonLineSink;
use doblaje::worker::Worker;
use owo_colors::OwoColorize;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        None => run_worker(cli.config.as_deref()),
        Some(Commands::Voices) => {
            list_voices();
            Ok(())
        }
        Some(Commands::Check) => {
            run_check(cli.config.as_deref())?;
            Ok(())
        }
    }
}

/// Logging goes to stderr; stdout is reserved for protocol records.
fn init_logging(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/doblaje/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())
    };
    Ok(config.with_env_overrides())
}

/// Run the worker loop over stdin/stdout until shutdown.
fn run_worker(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    apply_thread_hints(&config);

    // Pool construction emits loading/ready status lines on stdout before
    // the first job is read
    let mut sink = JsonLineSink::new(std::io::stdout());
    let pool = ResourcePool::initialize(&config, &mut sink)?;
    drop(sink);

    let executor = PipelineExecutor::new(pool);
    let stdin = std::io::stdin();
    let mut worker = Worker::new(executor, stdin.lock(), std::io::stdout());
    worker.serve()?;
    Ok(())
}

/// Export CPU thread hints for the backend math runtimes.
///
/// Only sets the variables when the environment doesn't already carry them,
/// and before any backend is constructed.
fn apply_thread_hints(config: &Config) {
    if std::env::var_os("OMP_NUM_THREADS").is_none() {
        std::env::set_var("OMP_NUM_THREADS", config.runtime.omp_threads.to_string());
    }
    if std::env::var_os("MKL_NUM_THREADS").is_none() {
        std::env::set_var("MKL_NUM_THREADS", config.runtime.mkl_threads.to_string());
    }
}

/// Print the voice catalogue.
fn list_voices() {
    println!(
        "Voices (default: {}):",
        doblaje::tts::DEFAULT_VOICE.green()
    );
    for (id, file) in doblaje::tts::voices::PIPER_VOICES {
        if *id == doblaje::tts::DEFAULT_VOICE {
            println!("  {} {} ({})", "●".green(), id, file.dimmed());
        } else {
            println!("  ○ {} ({})", id, file.dimmed());
        }
    }

    println!();
    println!("Legacy aliases:");
    for (old, new) in doblaje::tts::voices::VOICE_MIGRATION {
        println!("  {} -> {}", old.dimmed(), new);
    }
}

/// Report tool and model availability for this machine.
fn run_check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let executor = SystemCommandExecutor::new();

    println!("doblaje {}", doblaje::version_string());
    println!("compute backend: {}", doblaje::defaults::gpu_backend());
    println!();

    println!("Compiled-in engines:");
    print_feature("whisper (in-process stt)", cfg!(feature = "whisper"));
    print_feature("marian (translation)", cfg!(feature = "marian"));
    print_feature("textgen (t5)", cfg!(feature = "textgen"));
    println!();

    println!("External tools:");
    let mut tools: Vec<&str> = vec![
        doblaje::stt::whisper_cli::WHISPER_CLI_BINARY,
        doblaje::tts::piper::PIPER_BINARY,
        doblaje::tts::espeak::ESPEAK_NG_BINARY,
        doblaje::tts::espeak::ESPEAK_BINARY,
    ];
    if cfg!(target_os = "macos") {
        tools.push(doblaje::tts::say::SAY_BINARY);
    }
    for tool in tools {
        print_probe(tool, executor.is_available(tool));
    }
    println!();

    println!("Models:");
    let models_dir = config.stt_models_dir();
    for model in [&config.stt.model, &config.stt.english_model] {
        let path = models_dir.join(format!("ggml-{}.bin", model));
        print_probe(&format!("stt {} ({})", model, path.display()), path.exists());
    }
    let voices_dir = config.tts_voices_dir();
    let voice = doblaje::tts::normalize_voice(&config.tts.voice);
    let voice_present = doblaje::tts::voices::model_file(voice)
        .map(|file| voices_dir.join(file).exists())
        .unwrap_or(false);
    print_probe(&format!("voice {} ({})", voice, voices_dir.display()), voice_present);

    Ok(())
}

fn print_feature(name: &str, enabled: bool) {
    if enabled {
        println!("  {} {}", "●".green(), name);
    } else {
        println!("  ○ {}", name.dimmed());
    }
}

fn print_probe(name: &str, found: bool) {
    if found {
        println!("  {} {}", "found  ".green(), name);
    } else {
        println!("  {} {}", "missing".red(), name);
    }
}
