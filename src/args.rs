//! These structs provide the CLI interface for the updash CLI.

use crate::model::Amount;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// updash: A command-line dashboard for your Up Bank data.
///
/// The purpose of this program is to fetch your accounts and transactions from the Up API
/// (see https://up.com.au), enrich transactions with merchant logos, merge the two legs of
/// internal transfers into single rows, and show balances and spending statistics in your
/// terminal.
///
/// You will need a personal access token from https://api.up.com.au/getting_started. Store it
/// once with `updash auth --token ... --pin ...` and it is kept encrypted under your PIN. To
/// try the program without an Up account, pass `--token __DEMO__` to any command.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and initialize the configuration file.
    ///
    /// This is the first command you should run when setting up the updash CLI. By default the
    /// home directory is $HOME/updash; pass --updash-home (or set UPDASH_HOME) to put it
    /// somewhere else.
    Init,
    /// Store, verify or clear the Up API token.
    ///
    /// With --token and --pin, validates the token and stores it encrypted under the PIN.
    /// With --verify, decrypts the stored token (or uses --token directly) and pings the API.
    /// With --clear, deletes the stored token.
    Auth(AuthArgs),
    /// Show balances, recent activity and spending stats in one screen.
    Dash(DashArgs),
    /// List accounts and balances.
    Accounts(AccountsArgs),
    /// List recent transactions grouped by day.
    Transactions(TransactionsArgs),
    /// Show spending statistics for the recent transaction window.
    Stats(StatsArgs),
    /// Manage merchant logo overrides.
    Override(OverrideArgs),
    /// Manage per-account saver goals.
    Goal(GoalArgs),
    /// Export recent transactions to CSV.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where updash data and configuration is held. Defaults to ~/updash
    #[arg(long, env = "UPDASH_HOME", default_value_t = default_updash_home())]
    updash_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, updash_home: PathBuf) -> Self {
        Self {
            log_level,
            updash_home: updash_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn updash_home(&self) -> &DisplayPath {
        &self.updash_home
    }
}

/// Credential arguments shared by the commands that call the API.
#[derive(Debug, Parser, Clone, Default)]
pub struct CredentialArgs {
    /// An Up API personal access token. When omitted, the token stored by 'updash auth' is
    /// used, which requires --pin. The special value __DEMO__ serves bundled demo data.
    #[arg(long, env = "UP_TOKEN")]
    token: Option<String>,

    /// The PIN that unlocks the stored token.
    #[arg(long, env = "UPDASH_PIN")]
    pin: Option<String>,
}

impl CredentialArgs {
    pub fn new(token: Option<String>, pin: Option<String>) -> Self {
        Self { token, pin }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }
}

/// Args for the `updash auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// The Up API personal access token to store.
    #[arg(long, env = "UP_TOKEN")]
    token: Option<String>,

    /// The PIN that encrypts the token. Minimum 4 characters.
    #[arg(long, env = "UPDASH_PIN")]
    pin: Option<String>,

    /// Decrypt the stored token and ping the API with it.
    #[arg(long)]
    verify: bool,

    /// Delete the stored token.
    #[arg(long)]
    clear: bool,
}

impl AuthArgs {
    pub fn new(token: Option<String>, pin: Option<String>, verify: bool, clear: bool) -> Self {
        Self {
            token,
            pin,
            verify,
            clear,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    pub fn clear(&self) -> bool {
        self.clear
    }
}

/// Args for the `updash dash` command.
#[derive(Debug, Parser, Clone)]
pub struct DashArgs {
    #[clap(flatten)]
    credentials: CredentialArgs,

    /// How many transactions to include. Defaults to the configured transaction_count.
    #[arg(long)]
    count: Option<usize>,

    /// Drop cached responses and fetch fresh data.
    #[arg(long)]
    refresh: bool,
}

impl DashArgs {
    pub fn new(credentials: CredentialArgs, count: Option<usize>, refresh: bool) -> Self {
        Self {
            credentials,
            count,
            refresh,
        }
    }

    pub fn credentials(&self) -> &CredentialArgs {
        &self.credentials
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }
}

/// Args for the `updash accounts` command.
#[derive(Debug, Parser, Clone)]
pub struct AccountsArgs {
    #[clap(flatten)]
    credentials: CredentialArgs,

    /// Drop cached responses and fetch fresh data.
    #[arg(long)]
    refresh: bool,
}

impl AccountsArgs {
    pub fn new(credentials: CredentialArgs, refresh: bool) -> Self {
        Self {
            credentials,
            refresh,
        }
    }

    pub fn credentials(&self) -> &CredentialArgs {
        &self.credentials
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }
}

/// Args for the `updash transactions` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionsArgs {
    #[clap(flatten)]
    credentials: CredentialArgs,

    /// How many transactions to fetch. Defaults to the configured transaction_count.
    #[arg(long)]
    count: Option<usize>,

    /// Only show transactions for the account whose name contains this text.
    #[arg(long)]
    account: Option<String>,

    /// Only show transactions from this calendar month, e.g. 2025-07
    #[arg(long)]
    month: Option<String>,

    /// Drop cached responses and fetch fresh data.
    #[arg(long)]
    refresh: bool,

    /// Probe the logo sources and keep only URLs that actually answer.
    #[arg(long)]
    verify_logos: bool,
}

impl TransactionsArgs {
    pub fn new(
        credentials: CredentialArgs,
        count: Option<usize>,
        account: Option<String>,
        month: Option<String>,
        refresh: bool,
        verify_logos: bool,
    ) -> Self {
        Self {
            credentials,
            count,
            account,
            month,
            refresh,
            verify_logos,
        }
    }

    pub fn credentials(&self) -> &CredentialArgs {
        &self.credentials
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }

    pub fn verify_logos(&self) -> bool {
        self.verify_logos
    }
}

/// Args for the `updash stats` command.
#[derive(Debug, Parser, Clone)]
pub struct StatsArgs {
    #[clap(flatten)]
    credentials: CredentialArgs,

    /// How many transactions the statistics cover. Defaults to the configured
    /// transaction_count.
    #[arg(long)]
    count: Option<usize>,

    /// Only count transactions for the account whose name contains this text.
    #[arg(long)]
    account: Option<String>,
}

impl StatsArgs {
    pub fn new(
        credentials: CredentialArgs,
        count: Option<usize>,
        account: Option<String>,
    ) -> Self {
        Self {
            credentials,
            count,
            account,
        }
    }

    pub fn credentials(&self) -> &CredentialArgs {
        &self.credentials
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }
}

/// Args for the `updash override` command.
#[derive(Debug, Parser, Clone)]
pub struct OverrideArgs {
    #[command(subcommand)]
    action: OverrideAction,
}

impl OverrideArgs {
    pub fn new(action: OverrideAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &OverrideAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum OverrideAction {
    /// Pin a merchant label to a domain or a full logo URL.
    Set(SetOverrideArgs),
    /// Remove the override for a merchant label.
    Clear(ClearOverrideArgs),
    /// List all overrides.
    List,
}

/// Args for `updash override set`.
#[derive(Debug, Parser, Clone)]
pub struct SetOverrideArgs {
    /// The merchant label as it appears in the transaction listing.
    label: String,

    /// The domain (e.g. woolworths.com.au) or logo URL to use for it.
    domain: String,
}

impl SetOverrideArgs {
    pub fn new(label: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            domain: domain.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// Args for `updash override clear`.
#[derive(Debug, Parser, Clone)]
pub struct ClearOverrideArgs {
    /// The merchant label whose override should be removed.
    label: String,
}

impl ClearOverrideArgs {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Args for the `updash goal` command.
#[derive(Debug, Parser, Clone)]
pub struct GoalArgs {
    #[command(subcommand)]
    action: GoalAction,
}

impl GoalArgs {
    pub fn new(action: GoalAction) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &GoalAction {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalAction {
    /// Set a savings target for an account.
    Set(SetGoalArgs),
    /// Remove the savings target for an account.
    Clear(ClearGoalArgs),
    /// List all savings targets.
    List,
}

/// Args for `updash goal set`.
#[derive(Debug, Parser, Clone)]
pub struct SetGoalArgs {
    /// The account id the goal applies to, as shown by 'updash accounts'.
    account: String,

    /// The target amount, e.g. 5000 or $5,000.00
    target: Amount,
}

impl SetGoalArgs {
    pub fn new(account: impl Into<String>, target: Amount) -> Self {
        Self {
            account: account.into(),
            target,
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn target(&self) -> Amount {
        self.target
    }
}

/// Args for `updash goal clear`.
#[derive(Debug, Parser, Clone)]
pub struct ClearGoalArgs {
    /// The account id whose goal should be removed.
    account: String,
}

impl ClearGoalArgs {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

/// Args for the `updash export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    credentials: CredentialArgs,

    /// How many transactions to export. Defaults to the configured transaction_count.
    #[arg(long)]
    count: Option<usize>,

    /// Write the CSV here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(
        credentials: CredentialArgs,
        count: Option<usize>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            credentials,
            count,
            output,
        }
    }

    pub fn credentials(&self) -> &CredentialArgs {
        &self.credentials
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_updash_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("updash"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --updash-home or UPDASH_HOME instead of relying on the default \
                updash home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("updash")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
