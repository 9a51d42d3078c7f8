//! ldapadm - interactive LDAPS directory administration.
//!
//! Prompts for a domain and administrator credentials, then offers a small menu: count users,
//! list users, reset a user's password.

mod args;
mod menu;
mod prompt;

use anyhow::Context;
use clap::Parser;
use console::Term;
use ldapadm_core::{Credentials, ServerEndpoint};
use ldapadm_directory::resolve;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::args::Cli;
use crate::menu::Connection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let term = Term::stdout();
    term.write_line(&format!(
        "ldapadm v{} - LDAPS directory administration",
        env!("CARGO_PKG_VERSION")
    ))?;

    let domain = match &cli.domain {
        Some(domain) => domain.clone(),
        None => prompt::line(&term, "Domain:")?,
    };
    let base_dn = resolve(&domain).with_context(|| format!("cannot use domain `{domain}`"))?;
    let host = cli.server.clone().unwrap_or_else(|| domain.clone());
    let endpoint = ServerEndpoint::ldaps(host)?;

    let principal = match &cli.admin {
        Some(admin) => admin.clone(),
        None => prompt::line(&term, "Admin login:")?,
    };
    let secret = prompt::secret(&term, "Admin password:")?;

    let options = cli.session_options().validated()?;
    debug!(url = %endpoint.url(), base_dn = %base_dn, "configuration ready");

    let connection = Connection {
        endpoint,
        options,
        credentials: Credentials::new(principal, secret),
        base_dn,
    };

    menu::run(&term, &connection).await
}
