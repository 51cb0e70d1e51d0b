use std::sync::Arc;

use colored::Colorize;
use megamint_client::app::controller::{
    ConnectionState, NetworkStatus, NoticeLevel, ViewController, ViewModel,
};
use megamint_client::app::projector::short_address;
use megamint_client::domain::token::TokenInfo;
use megamint_client::infrastructure::config::AppConfig;
use megamint_client::infrastructure::logger::{LogConfig, Logger};
use megamint_wallet_core::{Eip1193Wallet, SharedWallet, WalletProvider};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  connect            connect the wallet
  name <text>        set token name
  symbol <text>      set token symbol
  supply <number>    set total supply (whole tokens)
  create             create the token
  list               reload token lists
  add <n>            add token n from 'My Tokens' to the wallet
  dismiss            clear the current message
  help               show this help
  quit               exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e:#}", "Configuration error:".red().bold());
            std::process::exit(1);
        }
    };

    Logger::init_with(LogConfig {
        enable_console: false,
        ..LogConfig::with_level(&config.log_level)
    });
    log::info!("🚀 Starting MegaMint on {}", config.chain.chain_name);

    let wallet = Eip1193Wallet::new(&config.wallet_rpc_url)?
        .with_poll_interval(config.event_poll_interval());
    let mut events = wallet.subscribe();
    let wallet: SharedWallet = Arc::new(wallet);

    let controller = Arc::new(ViewController::from_config(wallet, &config)?);
    let mut view = controller.subscribe_view();

    println!("{}", "MegaMint Token Factory".bold().cyan());
    println!("Factory: {}  Chain: {} ({})", config.factory_address, config.chain.chain_name, config.chain.chain_id);
    println!("{HELP}");

    controller.load().await;
    render(&view.borrow_and_update());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !dispatch(&controller, line.trim()).await {
                    break;
                }
            }
            Some(event) = events.next() => {
                controller.handle_event(event).await;
            }
            Ok(()) = view.changed() => {
                render(&view.borrow_and_update());
            }
        }
    }

    log::info!("👋 MegaMint stopped");
    Ok(())
}

/// Runs one command line. Returns false on quit.
async fn dispatch(controller: &Arc<ViewController>, line: &str) -> bool {
    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "connect" => {
            controller.connect().await;
        }
        "name" => controller.update_form(|form| form.name = arg.to_string()),
        "symbol" => controller.update_form(|form| form.set_symbol(arg)),
        "supply" => controller.update_form(|form| form.supply = arg.to_string()),
        "create" => {
            let controller = controller.clone();
            tokio::spawn(async move {
                // Outcome is published through the view
                let _ = controller.create_token().await;
            });
        }
        "list" => {
            if let Err(e) = controller.reload_tokens().await {
                println!("{} {e}", "Failed to load tokens:".red());
            }
        }
        "add" => {
            let tokens = controller.snapshot().my_tokens;
            match arg.parse::<usize>().ok().and_then(|i| i.checked_sub(1)).and_then(|i| tokens.get(i)) {
                Some(token) => {
                    if controller.add_to_wallet(token).await {
                        println!("{} {} added to wallet", "✔".green(), token.symbol);
                    }
                }
                None => println!("{}", "No such token, use the number shown under My Tokens".yellow()),
            }
        }
        "dismiss" => controller.dismiss_notice(),
        "help" => println!("{HELP}"),
        "quit" | "exit" => return false,
        other => println!("{} '{other}', type 'help'", "Unknown command".yellow()),
    }
    true
}

fn render(view: &ViewModel) {
    println!();
    match view.connection {
        ConnectionState::Disconnected => println!("Wallet: {}", "disconnected".red()),
        ConnectionState::Connecting => println!("Wallet: {}", "connecting...".yellow()),
        ConnectionState::Connected { account, network } => {
            let network = match network {
                NetworkStatus::CorrectNetwork => "correct network".green(),
                NetworkStatus::WrongNetwork => "wrong network".red(),
            };
            println!("Wallet: {} ({})", short_address(&account).bold(), network);
        }
    }

    let form = &view.form;
    let action = if view.creating {
        "creating...".yellow()
    } else if view.can_create() {
        "ready".green()
    } else {
        "unavailable".dimmed()
    };
    println!(
        "Form: name='{}' symbol='{}' supply='{}' [create: {}]",
        form.name, form.symbol, form.supply, action
    );

    if let Some(notice) = &view.notice {
        let message = match notice.level {
            NoticeLevel::Info => notice.message.normal(),
            NoticeLevel::Success => notice.message.green(),
            NoticeLevel::Warning => notice.message.yellow(),
            NoticeLevel::Error => notice.message.red(),
        };
        println!("{message}");
    }

    print_tokens("My Tokens", &view.my_tokens);
    print_tokens("All Tokens", &view.all_tokens);
}

fn print_tokens(title: &str, tokens: &[TokenInfo]) {
    println!("{} ({})", title.bold(), tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        println!(
            "  {:>2}. {} ({}) supply {} at {} owner {} created {}",
            i + 1,
            token.name,
            token.symbol.bold(),
            token.total_supply,
            short_address(&token.token_address),
            short_address(&token.owner),
            token.created_at
        );
    }
}
