// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::process::exit;

use clap::Parser;
use tokio::spawn;

use crate::cmd::check::check_bank;
use crate::cmd::drill::server::ServerConfig;
use crate::cmd::drill::server::start_server;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::utils::clock_seed;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Take a quiz through a web interface.
    Drill {
        /// Path to a bank file or directory. By default, the current working directory is used.
        bank: Option<String>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// The player's name. If given, the quiz starts right away.
        #[arg(long)]
        player: Option<String>,
        /// Seed for hint randomness. By default, the clock is used.
        #[arg(long)]
        hint_seed: Option<u64>,
    },
    /// Check that a bank parses and that its media references resolve.
    Check {
        /// Path to a bank file or directory. By default, the current working directory is used.
        bank: Option<String>,
    },
    /// Print bank statistics.
    Stats {
        /// Path to a bank file or directory. By default, the current working directory is used.
        bank: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            bank,
            host,
            port,
            open_browser,
            player,
            hint_seed,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                bank,
                host,
                port,
                player,
                hint_seed: hint_seed.unwrap_or_else(clock_seed),
            };
            start_server(config).await
        }
        Command::Check { bank } => check_bank(bank),
        Command::Stats { bank, format } => print_stats(bank, format),
    }
}
