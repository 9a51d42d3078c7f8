//! Interactive action menu.

use std::io;

use console::Term;
use ldapadm_core::{Credentials, Error, ErrorKind, ServerEndpoint, SessionOptions};
use ldapadm_directory::{
    DirectorySession, DistinguishedName, PasswordResetOperator, SearchExecutor, USER_FILTER,
};
use secrecy::SecretString;
use tracing::{debug, error};
use uuid::Uuid;

/// Everything needed to open and bind a session.
#[derive(Debug)]
pub struct Connection {
    pub endpoint: ServerEndpoint,
    pub options: SessionOptions,
    pub credentials: Credentials,
    pub base_dn: DistinguishedName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    CountUsers,
    ShowUsers,
    ResetPassword,
    Quit,
}

impl Action {
    fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::CountUsers),
            '2' => Some(Self::ShowUsers),
            '3' => Some(Self::ResetPassword),
            'q' | 'Q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Action with its operator input already collected.
enum Job {
    CountUsers,
    ShowUsers,
    ResetPassword { target_dn: String, password: String },
}

impl Job {
    const fn name(&self) -> &'static str {
        match self {
            Self::CountUsers => "count-users",
            Self::ShowUsers => "show-users",
            Self::ResetPassword { .. } => "reset-password",
        }
    }
}

const MENU: &[&str] = &[
    "",
    "Select action:",
    "1 - users count",
    "2 - show users",
    "3 - user password reset",
    "q - quit",
];

/// Runs the menu until the operator quits.
pub async fn run(term: &Term, connection: &Connection) -> anyhow::Result<()> {
    loop {
        for line in MENU {
            term.write_line(line)?;
        }
        let key = term.read_char()?;
        term.write_line("")?;

        let job = match Action::from_key(key) {
            Some(Action::Quit) => break,
            Some(Action::CountUsers) => Job::CountUsers,
            Some(Action::ShowUsers) => Job::ShowUsers,
            Some(Action::ResetPassword) => {
                term.write_line(
                    "Enter user DN (example: CN=Test,CN=Users,DC=int,DC=example,DC=com)",
                )?;
                let target_dn = term.read_line()?.trim().to_string();
                Job::ResetPassword {
                    target_dn,
                    password: generate_password(),
                }
            }
            None => {
                term.write_line("unhandled action")?;
                continue;
            }
        };

        if let Err(err) = execute(term, connection, &job).await {
            if err.should_log() {
                error!(code = err.error_code(), error = %err, "action failed");
            }
            for line in describe_error(&err) {
                term.write_line(&line)?;
            }
        }
    }
    Ok(())
}

/// Opens a fresh session for one job.
async fn execute(term: &Term, connection: &Connection, job: &Job) -> Result<(), ActionError> {
    let session = DirectorySession::open(connection.endpoint.clone(), connection.options.clone())?;
    run_job(term, session, connection, job).await
}

/// Runs `job` on `session` and closes the session whatever the outcome.
async fn run_job(
    term: &Term,
    mut session: DirectorySession,
    connection: &Connection,
    job: &Job,
) -> Result<(), ActionError> {
    let outcome = perform(term, &mut session, connection, job).await;
    session.close().await;
    outcome
}

async fn perform(
    term: &Term,
    session: &mut DirectorySession,
    connection: &Connection,
    job: &Job,
) -> Result<(), ActionError> {
    session.bind(&connection.credentials).await?;
    debug!(action = job.name(), "running action");

    match job {
        Job::CountUsers => {
            let count = SearchExecutor::new(session)
                .count(&connection.base_dn, USER_FILTER)
                .await?;
            term.write_line(&format!("Users count: {count}"))?;
        }
        Job::ShowUsers => {
            let users = SearchExecutor::new(session)
                .list(&connection.base_dn, USER_FILTER)
                .await?;
            for dn in users.distinguished_names() {
                term.write_line(dn)?;
            }
        }
        Job::ResetPassword {
            target_dn,
            password,
        } => {
            let secret = SecretString::from(password.clone());
            PasswordResetOperator::new(session)
                .reset_password(target_dn, &secret)
                .await?;
            term.write_line("Password changed successfully.")?;
            term.write_line(&format!("New password: {password}"))?;
        }
    }
    Ok(())
}

/// Random password in the shape `<uuid-v4>@$$`.
fn generate_password() -> String {
    format!("{}@$$", Uuid::new_v4())
}

/// Failure of a single menu action.
#[derive(Debug, thiserror::Error)]
enum ActionError {
    #[error(transparent)]
    Directory(#[from] Error),
    #[error("Console error: {0}")]
    Console(#[from] io::Error),
}

impl ActionError {
    fn should_log(&self) -> bool {
        match self {
            Self::Directory(err) => err.should_log(),
            Self::Console(_) => true,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Directory(err) => err.error_code(),
            Self::Console(_) => "CONSOLE_ERROR",
        }
    }
}

/// Lines shown to the operator for a failed action.
fn describe_error(err: &ActionError) -> Vec<String> {
    let ActionError::Directory(err) = err else {
        return vec![err.to_string()];
    };

    let mut lines = vec![err.to_string()];
    match err.kind() {
        ErrorKind::Server => {
            if let Some(code) = err.result_code() {
                lines.push(format!("Result code: {code}"));
            }
            if let Some(message) = err.server_message() {
                lines.push(format!("Server message: {message}"));
            }
        }
        ErrorKind::Transport => {
            lines.push(
                "The directory could not be reached; check the server and port 636.".to_string(),
            );
        }
        ErrorKind::Local => {}
    }
    lines
}
