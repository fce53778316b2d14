use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tagboard::app::AppContext;
use tagboard::cli::{commands, AccountAction, BlacklistAction, Cli, Commands, ProxyAction};
use tagboard::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it logs to a file instead.
    if !matches!(cli.command, Commands::Tui) {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let config = Config::load()?;
    let mut ctx = AppContext::new(cli.db, config)?;

    match cli.command {
        Commands::Posts {
            query,
            favorites,
            page,
            limit,
            all,
        } => {
            commands::list_posts(&ctx, &query, favorites, page, limit, all).await?;
        }
        Commands::Tags { query } => {
            commands::search_tags(&ctx, &query).await?;
        }
        Commands::Comments { post_id } => {
            commands::show_comments(&ctx, post_id).await?;
        }
        Commands::User { id_or_name } => {
            commands::show_user(&ctx, &id_or_name).await?;
        }
        Commands::Account { action } => match action {
            AccountAction::Add {
                username,
                api_key,
                host,
                label,
            } => {
                commands::add_account(
                    &mut ctx,
                    &username,
                    &api_key,
                    host.as_deref(),
                    label.as_deref(),
                )?;
            }
            AccountAction::Remove { account } => commands::remove_account(&mut ctx, &account)?,
            AccountAction::Use { account } => commands::use_account(&mut ctx, &account)?,
            AccountAction::List => commands::list_accounts(&ctx)?,
        },
        Commands::Proxy { action } => match action {
            ProxyAction::Set { url } => commands::set_proxy(&mut ctx, &url)?,
            ProxyAction::Enable => commands::toggle_proxy(&mut ctx, true)?,
            ProxyAction::Disable => commands::toggle_proxy(&mut ctx, false)?,
            ProxyAction::Show => commands::show_proxy(&ctx)?,
        },
        Commands::Blacklist { action } => match action {
            BlacklistAction::Add { tags } => commands::blacklist_add(&mut ctx, &tags)?,
            BlacklistAction::Remove { tags } => commands::blacklist_remove(&mut ctx, &tags)?,
            BlacklistAction::List => commands::blacklist_list(&ctx)?,
        },
        Commands::Set {
            nsfw,
            safe_blur,
            dark_theme,
        } => {
            commands::set_flags(&mut ctx, nsfw, safe_blur, dark_theme)?;
        }
        Commands::Settings { reset } => {
            if reset {
                commands::reset_settings(&mut ctx)?;
            }
            commands::show_settings(&ctx)?;
        }
        Commands::Tui => {
            tagboard::tui::run(ctx).await?;
        }
    }

    Ok(())
}
