//! jobstream - follow the progress of an indexing job from the terminal.

use color_eyre::Result;
use jobstream::cli::{exit_code, parse_args, version_line, CliCommand, RunArgs, TerminalHandler, USAGE};
use jobstream::client::{IndexRequest, IndexingClient};
use jobstream::config::StreamConfig;
use jobstream::logging::init_logging;
use jobstream::session::StreamSession;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = match parse_args(std::env::args()) {
        Ok(CliCommand::Version) => {
            println!("{}", version_line());
            return Ok(());
        }
        Ok(CliCommand::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(CliCommand::Run(args)) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    init_logging();

    let runtime = tokio::runtime::Runtime::new()?;
    let code = runtime.block_on(run(args))?;
    std::process::exit(code);
}

async fn run(args: RunArgs) -> Result<i32> {
    let mut config = StreamConfig::from_env()?;
    if let Some(url) = args.base_url {
        config = config.with_base_url(url);
    }
    let token = config.require_token()?.to_string();
    let client = IndexingClient::from_config(&config)?;

    let mut request = IndexRequest::new(args.resource_id, token);
    if let Some(branch) = args.branch {
        request = request.with_branch(branch);
    }

    let session = StreamSession::from_config(&config);
    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut handler = TerminalHandler::stdio();
    let outcome = session.run(&client, &request, &mut handler).await;
    Ok(exit_code(&outcome))
}
