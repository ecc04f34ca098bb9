//! Entry point of the setup-slv action.

use clap::Parser;
use setup_slv::cli::{self, Cli};
use setup_slv::orchestrator::Orchestrator;
use setup_slv::tracing::{TracingConfig, init_tracing};
use setup_slv_core::{ActionsHost, PlatformKey, SystemToolRunner, TOOL_NAME};
use setup_slv_github::{GitHubActions, GitHubReleases, ReleaseFeedConfig, TOOL_OWNER, TOOL_REPO};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Application panicked: {panic_info}");
            eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
        }
    }));

    let host = GitHubActions::from_env();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if cli::is_informational(&e) => e.exit(),
        Err(e) => {
            host.set_failed(&cli::input_error(&e).to_string());
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{e}");
            }
            std::process::exit(1);
        }
    };

    if let Err(error) = init_tracing(&TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
    }) {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{error:?}");
        }
    }

    if let Err(error) = run(&cli, &host).await {
        host.set_failed(&error.to_string());
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{:?}", miette::Report::new(error));
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, host: &GitHubActions) -> setup_slv_core::Result<()> {
    let inputs = cli.inputs();
    let feed = GitHubReleases::new(
        ReleaseFeedConfig::new(TOOL_OWNER, TOOL_REPO)
            .with_api_url(&cli.api_url)
            .with_token(inputs.github_token.clone()),
    )?;
    let runner = SystemToolRunner::new(TOOL_NAME);

    Orchestrator::new(&feed, &runner, host, PlatformKey::current(), cli.temp_root())
        .run(&inputs)
        .await
}
