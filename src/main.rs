use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use polyscript::daemon::{self, Client, Server};
use polyscript::{HostConfig, Language};

#[derive(Parser)]
#[command(
    name = "polyscript",
    version,
    about = "Polyglot script runner: native modules over a C ABI, scripts over subprocess bridges"
)]
struct Cli {
    /// Log level (trace|debug|info|warn|error); overrides POLYSCRIPT_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Arguments shared by every script subcommand.
#[derive(Args)]
struct ScriptArgs {
    /// Path to the script file
    script: String,
    /// Arguments forwarded to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Python script (python3)
    Py(ScriptArgs),
    /// Julia script (julia)
    Jl(ScriptArgs),
    /// Julia script compiled ahead of time (juliac)
    Jlc(ScriptArgs),
    /// Go program (go run)
    Go(ScriptArgs),
    /// JavaScript (node)
    Js(ScriptArgs),
    /// TypeScript (deno run)
    Ts(ScriptArgs),
    /// Lua script
    Lua(ScriptArgs),
    /// R script (Rscript)
    R(ScriptArgs),
    /// Mojo script
    Mojo(ScriptArgs),
    /// Zig program (zig run)
    Zig(ScriptArgs),
    /// WebAssembly module (wasmtime run)
    Wasm(ScriptArgs),
    /// Haskell script (runghc)
    Hs(ScriptArgs),
    /// Swift script
    Swift(ScriptArgs),
    /// Kotlin script (kotlinc -script)
    Kt(ScriptArgs),
    /// Kotlin program compiled to a jar (kotlinc + java -jar)
    Ktn(ScriptArgs),
    /// Nim program (nim r)
    Nim(ScriptArgs),
    /// Fortran source (gfortran, then run)
    Fort(ScriptArgs),
    /// Call the entry point of a native shared library
    Native {
        /// Path to the shared library
        lib: String,
        /// Exported symbol to call
        #[arg(long, default_value = polyscript::ENTRY_SYMBOL)]
        symbol: String,
        /// Arguments passed as argv
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Manage the resident daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonCmd,
    },
}

#[derive(Subcommand)]
enum DaemonCmd {
    /// Start the daemon in the background
    Start,
    /// Run the daemon server loop in the foreground (used by `start`)
    Serve,
    /// Stop a running daemon
    Stop,
    /// Report whether the daemon is running
    Status,
    /// Run a script through the daemon
    Run {
        /// Language short name (py, js, go, ...)
        lang: String,
        #[command(flatten)]
        target: ScriptArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = HostConfig::from_env().context("invalid POLYSCRIPT_* environment")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    polyscript::init_logging(&config.log_level)?;

    match cli.cmd {
        Cmd::Native { lib, symbol, args } => polyscript::run_native(&lib, &symbol, &args)
            .with_context(|| format!("native call {}::{} failed", lib, symbol)),
        Cmd::Daemon { action } => run_daemon(action, &config),
        Cmd::Py(a) => run_bridge(Language::Python, a, &config),
        Cmd::Jl(a) => run_bridge(Language::Julia, a, &config),
        Cmd::Jlc(a) => run_bridge(Language::JuliaAot, a, &config),
        Cmd::Go(a) => run_bridge(Language::Go, a, &config),
        Cmd::Js(a) => run_bridge(Language::JavaScript, a, &config),
        Cmd::Ts(a) => run_bridge(Language::TypeScript, a, &config),
        Cmd::Lua(a) => run_bridge(Language::Lua, a, &config),
        Cmd::R(a) => run_bridge(Language::R, a, &config),
        Cmd::Mojo(a) => run_bridge(Language::Mojo, a, &config),
        Cmd::Zig(a) => run_bridge(Language::Zig, a, &config),
        Cmd::Wasm(a) => run_bridge(Language::Wasm, a, &config),
        Cmd::Hs(a) => run_bridge(Language::Haskell, a, &config),
        Cmd::Swift(a) => run_bridge(Language::Swift, a, &config),
        Cmd::Kt(a) => run_bridge(Language::Kotlin, a, &config),
        Cmd::Ktn(a) => run_bridge(Language::KotlinAot, a, &config),
        Cmd::Nim(a) => run_bridge(Language::Nim, a, &config),
        Cmd::Fort(a) => run_bridge(Language::Fortran, a, &config),
    }
}

fn run_bridge(lang: Language, target: ScriptArgs, config: &HostConfig) -> Result<()> {
    polyscript::run_script(lang, &target.script, &target.args, &config.tmp_dir)
        .with_context(|| format!("{} bridge failed for {}", lang, target.script))
}

fn run_daemon(action: DaemonCmd, config: &HostConfig) -> Result<()> {
    match action {
        DaemonCmd::Start => {
            let pid = daemon::start(config).context("failed to start daemon")?;
            println!("polyscript daemon started (PID {})", pid);
            Ok(())
        }
        DaemonCmd::Status => {
            let status = daemon::status(&config.pid_file)?;
            println!("polyscript daemon {}", status);
            Ok(())
        }
        DaemonCmd::Serve => {
            let runtime = daemon::build_runtime(config)?;
            let exe = std::env::current_exe()?;
            let server = {
                let _guard = runtime.enter();
                Server::bind(&config.socket_path, exe)?
            };
            runtime.block_on(server.serve())?;
            Ok(())
        }
        DaemonCmd::Stop => {
            let runtime = daemon::build_runtime(config)?;
            let client = Client::new(&config.socket_path);
            runtime.block_on(client.stop())?;
            daemon::clear_pid_file(&config.pid_file)?;
            println!("daemon stopped");
            Ok(())
        }
        DaemonCmd::Run { lang, target } => {
            lang.parse::<Language>()?;
            let runtime = daemon::build_runtime(config)?;
            let client = Client::new(&config.socket_path);
            let resp = runtime.block_on(client.run_script(&lang, &target.script, &target.args))?;
            print!("{}", resp.stdout);
            eprint!("{}", resp.stderr);
            resp.check()?;
            Ok(())
        }
    }
}
