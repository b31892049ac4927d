use pid1::{cli, load_from_env, subscribe_all, Config, LogWriter, Sinks, Supervisor};

#[tokio::main]
async fn main() {
    let code = run().await;
    std::process::exit(code);
}

async fn run() -> i32 {
    let opts = cli::parse();
    if opts.command.is_empty() {
        eprintln!("no command provided");
        return 1;
    }

    let services = match load_from_env() {
        Ok(services) => services,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let cfg = Config {
        orphan_policy: opts.orphan_policy,
        services,
        ..Config::default()
    };

    let signals = match subscribe_all() {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("failed to subscribe to signals: {e}");
            return 1;
        }
    };

    let supervisor = Supervisor::new(cfg, Sinks::stdio(), LogWriter::new(opts.debug));
    match supervisor.run(&opts.command, signals).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    }
}
