//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use ldapadm_core::config::{
    SessionOptions, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_OPERATION_TIMEOUT_SECS,
};

#[derive(Debug, Parser)]
#[command(name = "ldapadm")]
#[command(version)]
#[command(about = "Interactive LDAPS directory administration", long_about = None)]
pub struct Cli {
    /// DNS domain of the directory (e.g. corp.example.com); prompted for when omitted
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Server host to connect to, if different from the domain
    #[arg(short, long)]
    pub server: Option<String>,

    /// Administrator bind name; prompted for when omitted
    #[arg(short, long)]
    pub admin: Option<String>,

    /// Accept any server certificate (self-signed directories on trusted networks only)
    #[arg(long)]
    pub insecure_skip_server_verify: bool,

    /// Additional PEM CA certificate to trust
    #[arg(long, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CONNECTION_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Per-operation timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_OPERATION_TIMEOUT_SECS)]
    pub operation_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Session options described by the flags.
    pub fn session_options(&self) -> SessionOptions {
        let mut options = SessionOptions::new()
            .with_insecure_skip_server_verify(self.insecure_skip_server_verify)
            .with_connection_timeout_secs(self.connect_timeout)
            .with_operation_timeout_secs(self.operation_timeout);
        if let Some(path) = &self.ca_cert {
            options = options.with_ca_cert(path.clone());
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_keep_verification_on() {
        let cli = Cli::try_parse_from(["ldapadm"]).unwrap();
        assert!(cli.domain.is_none());
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.session_options(), SessionOptions::default());
    }

    #[test]
    fn flags_flow_into_session_options() {
        let cli = Cli::try_parse_from([
            "ldapadm",
            "--domain",
            "int.example.com",
            "--server",
            "dc01.int.example.com",
            "--admin",
            "Administrator@int.example.com",
            "--insecure-skip-server-verify",
            "--ca-cert",
            "/etc/ssl/corp.pem",
            "--connect-timeout",
            "3",
            "--operation-timeout",
            "45",
        ])
        .unwrap();

        assert_eq!(cli.domain.as_deref(), Some("int.example.com"));
        assert_eq!(cli.server.as_deref(), Some("dc01.int.example.com"));
        assert_eq!(cli.admin.as_deref(), Some("Administrator@int.example.com"));

        let options = cli.session_options();
        assert!(options.insecure_skip_server_verify);
        assert_eq!(options.tls_ca_cert, Some(PathBuf::from("/etc/ssl/corp.pem")));
        assert_eq!(options.connection_timeout_secs, 3);
        assert_eq!(options.operation_timeout_secs, 45);
    }
}
