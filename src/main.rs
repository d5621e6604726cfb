use clap::Parser;

use vigil::cli::{Cli, Commands, cmd_create_admin, cmd_list_admins};
use vigil::{Config, init_tracing, run};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        if Config::create_default_if_missing()? {
            println!("Created default config: config.toml");
        } else {
            println!("config.toml already exists");
        }
        return Ok(());
    }

    let config = Config::load()?;
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;

    runtime.block_on(async move {
        init_tracing(&config.general.log_level);

        match cli.command {
            Some(Commands::CreateAdmin {
                handle,
                contact,
                role,
            }) => cmd_create_admin(&config, &handle, contact.as_deref(), &role).await,
            Some(Commands::ListAdmins) => cmd_list_admins(&config).await,
            _ => run(config).await,
        }
    })
}
